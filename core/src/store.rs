//! Snapshot schema shared with the host's persistence layer.
//!
//! The engine treats persistence as an opaque key-value collaborator: it
//! hands out [`SaveData`] and takes validated [`SaveData`] back. Anything a
//! host cannot turn into a valid snapshot is treated as "no saved state",
//! never as a fatal condition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::GRID_SIZE;

/// Persisted form of one game session.
///
/// Wrong dimensions or negative values cannot survive deserialization into
/// this shape; [`SaveData::validate`] covers the remaining invariant, that
/// occupied cells hold powers of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub grid: [[u32; GRID_SIZE]; GRID_SIZE],
    pub score: u32,
    pub is_terminal: bool,
}

/// Why a persisted snapshot was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SaveDataError {
    #[error("tile value {value} at row {row}, column {col} is not a power of two")]
    InvalidTile {
        row: usize,
        col: usize,
        value: u32,
    },
}

impl SaveData {
    /// Check that every occupied cell holds a power of two (2, 4, 8, ...).
    pub fn validate(&self) -> Result<(), SaveDataError> {
        for (row, cells) in self.grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let valid = value == 0 || (value >= 2 && value.is_power_of_two());
                if !valid {
                    return Err(SaveDataError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(())
    }
}

/// Host-side durable storage for the latest snapshot and the best score.
///
/// Implementations pick the medium: browser localStorage, a JSON file, an
/// in-memory map in tests. They also absorb their own I/O failures; a load
/// that cannot produce a valid snapshot reports `None` and the host starts
/// a fresh session.
pub trait PersistenceStore {
    /// Durably record the latest snapshot, replacing any previous one.
    fn save(&mut self, data: &SaveData);

    /// The last recorded snapshot, if one exists and validates.
    fn load(&self) -> Option<SaveData>;

    /// Highest score ever observed, across sessions. Monotonic.
    fn best_score(&self) -> u32;

    /// Raise the stored best score to `score` if it is higher.
    fn record_best(&mut self, score: u32);
}

/// In-memory store for tests and examples.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<SaveData>,
    best: u32,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn save(&mut self, data: &SaveData) {
        self.snapshot = Some(*data);
    }

    fn load(&self) -> Option<SaveData> {
        self.snapshot.filter(|data| data.validate().is_ok())
    }

    fn best_score(&self) -> u32 {
        self.best
    }

    fn record_best(&mut self, score: u32) {
        self.best = self.best.max(score);
    }
}

// =============================================================================
// Tests
// =============================================================================
