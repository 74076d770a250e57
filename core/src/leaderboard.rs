//! Top-ten score table.

use serde::{Deserialize, Serialize};

/// Number of entries retained.
pub const LEADERBOARD_CAP: usize = 10;

/// Name recorded when the player leaves the field blank.
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub date: String,
}

/// Named scores, highest first, capped at [`LEADERBOARD_CAP`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Leaderboard {
        Leaderboard::default()
    }

    /// Append an entry and re-rank. Entries stay sorted descending by
    /// score; equal scores keep insertion order (stable sort). A blank or
    /// whitespace name becomes [`DEFAULT_PLAYER_NAME`].
    pub fn record(&mut self, name: &str, score: u32, date: &str) {
        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_PLAYER_NAME
        } else {
            name
        };
        self.entries.push(LeaderboardEntry {
            name: name.to_string(),
            score,
            date: date.to_string(),
        });
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_CAP);
    }

    /// Whether `score` would make the table right now.
    pub fn qualifies(&self, score: u32) -> bool {
        self.entries.len() < LEADERBOARD_CAP
            || self.entries.last().is_some_and(|e| score > e.score)
    }

    /// Entries, highest score first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_descending() {
        let mut board = Leaderboard::new();
        board.record("ana", 40, "2025-01-01");
        board.record("ben", 120, "2025-01-02");
        board.record("cid", 80, "2025-01-03");

        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![120, 80, 40]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut board = Leaderboard::new();
        board.record("first", 100, "2025-01-01");
        board.record("second", 100, "2025-01-02");
        board.record("third", 100, "2025-01-03");

        let names: Vec<&str> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cap_drops_lowest() {
        let mut board = Leaderboard::new();
        for score in 1..=12 {
            board.record("p", score * 10, "2025-01-01");
        }
        assert_eq!(board.entries().len(), LEADERBOARD_CAP);
        assert_eq!(board.entries().first().map(|e| e.score), Some(120));
        assert_eq!(board.entries().last().map(|e| e.score), Some(30));
    }

    #[test]
    fn test_blank_name_gets_placeholder() {
        let mut board = Leaderboard::new();
        board.record("   ", 50, "2025-01-01");
        assert_eq!(board.entries()[0].name, DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn test_qualifies() {
        let mut board = Leaderboard::new();
        assert!(board.qualifies(0));
        for score in 1..=10 {
            board.record("p", score * 10, "2025-01-01");
        }
        assert!(!board.qualifies(10));
        assert!(board.qualifies(55));
    }
}
