//! # gridmerge core engine
//!
//! A pure Rust implementation of a 2048-style sliding-merge puzzle with
//! deterministic, seedable randomness, bounded single-step undo, and
//! host-facing persistence and leaderboard contracts. Designed for easy
//! integration with terminal and WebAssembly hosts.
//!
//! ## Example
//!
//! ```rust
//! use gridmerge_core::{Direction, Session};
//!
//! let mut session = Session::new(42); // Create a session with seed 42
//! let outcome = session.step(Direction::Left);
//! println!("Score: {}, Changed: {}", session.score(), outcome.changed);
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub mod grid;
pub mod history;
pub mod leaderboard;
pub mod store;

pub use grid::{CellRef, Direction, Grid, ShiftOutcome, GRID_SIZE};
pub use history::{HistoryStack, Snapshot, HISTORY_CAP};
pub use leaderboard::{Leaderboard, LeaderboardEntry, DEFAULT_PLAYER_NAME, LEADERBOARD_CAP};
pub use store::{MemoryStore, PersistenceStore, SaveData, SaveDataError};

/// Whether a session can still accept moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Active,
    Terminal,
}

/// Everything a host needs to react to one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The grid after the move (and spawn, if the move changed anything).
    pub grid: Grid,
    /// Points earned from merges in this move.
    pub score_delta: u32,
    /// Whether the grid changed at all.
    pub changed: bool,
    /// Cells holding a tile merged this move.
    pub merged: Vec<CellRef>,
    /// Cells that received a newly spawned tile this move.
    pub spawned: Vec<CellRef>,
    /// Session state after the move.
    pub state: GameState,
}

/// Callback surface for a visual board.
///
/// Hosts invoke this only after a changed move; the two cell sets drive
/// transient styling for spawned and merged tiles. The engine consumes no
/// return value.
pub trait Renderer {
    fn on_move_applied(&mut self, grid: &Grid, new_tiles: &[CellRef], merged_tiles: &[CellRef]);
}

/// One game: grid, score, liveness state, undo history, and the RNG that
/// drives tile spawning.
///
/// All randomness (initial tile count, placement, the 2-vs-4 draw) flows
/// from the single seeded generator, so equal seeds replay equal games.
/// A session is mutated only through [`Session::step`], [`Session::undo`]
/// and [`Session::restart`]; hosts react to the returned [`MoveOutcome`].
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    score: u32,
    state: GameState,
    history: HistoryStack,
    rng: SmallRng,
}

impl Session {
    /// Create a session with the given seed.
    ///
    /// Between one and three tiles are pre-spawned, the count drawn
    /// uniformly; each tile is 2 with probability 0.9, else 4. The initial
    /// state is pushed as the first history snapshot, so undo can never
    /// fall off the start of the game.
    pub fn new(seed: u64) -> Session {
        let mut session = Session {
            grid: Grid::EMPTY,
            score: 0,
            state: GameState::Active,
            history: HistoryStack::new(),
            rng: SmallRng::seed_from_u64(seed),
        };
        let count = session.rng.gen_range(1..=3);
        for _ in 0..count {
            session.spawn_tile();
        }
        session.history.push(session.snapshot());
        session
    }

    /// Resurrect a session from a persisted snapshot.
    ///
    /// The snapshot is validated first; hosts treat an error as "no saved
    /// state" and start fresh. The restored state seeds the history, and
    /// `seed` starts a new RNG stream (snapshots carry no generator state).
    pub fn restore(data: &SaveData, seed: u64) -> Result<Session, SaveDataError> {
        data.validate()?;
        let mut session = Session {
            grid: Grid::from_rows(data.grid),
            score: data.score,
            state: if data.is_terminal {
                GameState::Terminal
            } else {
                GameState::Active
            },
            history: HistoryStack::new(),
            rng: SmallRng::seed_from_u64(seed),
        };
        session.history.push(session.snapshot());
        Ok(session)
    }

    /// Replace this session with a fresh one.
    pub fn restart(&mut self, seed: u64) {
        *self = Session::new(seed);
    }

    /// Execute a move in the given direction.
    ///
    /// If the move changes the grid: the merge score is accrued, one tile
    /// is spawned on a random empty cell, terminal state is evaluated, and
    /// a snapshot is pushed. An unchanged move (including any move on a
    /// terminal session) does none of that and reports `changed: false`.
    pub fn step(&mut self, direction: Direction) -> MoveOutcome {
        if self.state == GameState::Terminal {
            return self.unchanged_outcome();
        }

        let shift = self.grid.shift(direction);
        if !shift.changed {
            return self.unchanged_outcome();
        }

        self.grid = shift.grid;
        self.score += shift.score_delta;
        let spawned = self.spawn_tile();
        if self.grid.is_terminal() {
            self.state = GameState::Terminal;
        }
        self.history.push(self.snapshot());

        MoveOutcome {
            grid: self.grid,
            score_delta: shift.score_delta,
            changed: true,
            merged: shift.merged,
            spawned: spawned.into_iter().collect(),
            state: self.state,
        }
    }

    /// Restore the state before the last changed move.
    ///
    /// Returns `false` (and leaves everything untouched) when only the
    /// initial snapshot remains. Undo restores the recorded grid, score and
    /// state exactly; it spawns nothing and recomputes nothing, and it
    /// works on a terminal session, which becomes playable again.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.grid = snapshot.grid;
                self.score = snapshot.score;
                self.state = snapshot.state;
                true
            }
            None => false,
        }
    }

    /// The current grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The current score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The current liveness state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Whether no further move can change the grid.
    pub fn is_terminal(&self) -> bool {
        self.state == GameState::Terminal
    }

    /// Number of snapshots currently held for undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Legal moves as a boolean array in [`Direction::all`] order.
    ///
    /// A direction is legal iff shifting it would change the grid.
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::all().map(|direction| self.grid.shift(direction).changed)
    }

    /// The current state as a history snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            score: self.score,
            state: self.state,
        }
    }

    /// The current state in persisted form.
    pub fn save_data(&self) -> SaveData {
        SaveData {
            grid: *self.grid.rows(),
            score: self.score,
            is_terminal: self.state == GameState::Terminal,
        }
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    /// Spawn a tile on a random empty cell: 2 with probability 0.9, else 4.
    /// No-op on a full board.
    fn spawn_tile(&mut self) -> Option<CellRef> {
        let empty = self.grid.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let cell = empty[self.rng.gen_range(0..empty.len())];
        let value = if self.rng.gen::<f32>() < 0.9 { 2 } else { 4 };
        self.grid.set(cell, value);
        Some(cell)
    }

    fn unchanged_outcome(&self) -> MoveOutcome {
        MoveOutcome {
            grid: self.grid,
            score_delta: 0,
            changed: false,
            merged: Vec::new(),
            spawned: Vec::new(),
            state: self.state,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
