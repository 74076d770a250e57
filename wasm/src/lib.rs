//! # gridmerge WebAssembly bindings
//!
//! This crate wraps the session for browser hosts using wasm-bindgen. Move
//! outcomes and snapshots cross the boundary as serialized values; the
//! JavaScript side owns DOM rendering and localStorage persistence.

use gridmerge_core::{CellRef, Direction, GameState, MoveOutcome, SaveData, Session};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Move outcome serialized for JavaScript.
#[derive(Serialize)]
pub struct JsMoveOutcome {
    /// Board rows after the move.
    pub grid: [[u32; 4]; 4],
    /// Total score after the move.
    pub score: u32,
    /// Points earned from this move's merges.
    pub score_delta: u32,
    /// Whether the board changed.
    pub changed: bool,
    /// Cells that received a spawned tile this move, as {row, col}.
    pub spawned: Vec<CellRef>,
    /// Cells that received a merged tile this move, as {row, col}.
    pub merged: Vec<CellRef>,
    /// Whether the session is terminal.
    pub terminal: bool,
}

/// WebAssembly wrapper for one game session.
#[wasm_bindgen]
pub struct WasmSession {
    session: Session,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a new session with the given seed.
    ///
    /// The seed is a 64-bit integer driving the deterministic RNG that
    /// controls initial tile count, tile placement, and the 2-vs-4 draw.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WasmSession {
        WasmSession {
            session: Session::new(seed),
        }
    }

    /// Restore a session from a snapshot previously produced by `saveData`.
    ///
    /// A malformed snapshot is an error; callers fall back to a fresh
    /// session.
    #[wasm_bindgen(js_name = fromSaved)]
    pub fn from_saved(saved: JsValue, seed: u64) -> Result<WasmSession, JsValue> {
        let data: SaveData = serde_wasm_bindgen::from_value(saved)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let session = Session::restore(&data, seed)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(WasmSession { session })
    }

    /// Replace this session with a fresh one.
    pub fn restart(&mut self, seed: u64) {
        self.session.restart(seed);
    }

    /// Execute a move.
    ///
    /// Direction codes: 0 = Up, 1 = Down, 2 = Left, 3 = Right. An invalid
    /// code is an error and leaves the session untouched.
    ///
    /// Returns an object with: grid (4x4 rows), score, score_delta,
    /// changed, spawned, merged, terminal.
    pub fn step(&mut self, direction: u8) -> Result<JsValue, JsValue> {
        let direction = Direction::from_u8(direction)
            .ok_or_else(|| JsValue::from_str(&format!("invalid direction code: {direction}")))?;
        let outcome = self.session.step(direction);
        self.outcome_to_js(&outcome)
    }

    /// Undo the last move. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    /// Get the current board as a flat array (16 elements, row-major).
    #[wasm_bindgen(js_name = getGrid)]
    pub fn get_grid(&self) -> Vec<u32> {
        self.session.grid().rows().iter().flatten().copied().collect()
    }

    /// Get the current score.
    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u32 {
        self.session.score()
    }

    /// Check if the session is terminal (no move can change the board).
    #[wasm_bindgen(js_name = isTerminal)]
    pub fn is_terminal(&self) -> bool {
        self.session.is_terminal()
    }

    /// Get legal moves as an array of 4 flags [Up, Down, Left, Right].
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Vec<u8> {
        self.session
            .legal_moves()
            .iter()
            .map(|&legal| u8::from(legal))
            .collect()
    }

    /// Snapshot the session for the host's storage key.
    #[wasm_bindgen(js_name = saveData)]
    pub fn save_data(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.save_data())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Helper method to serialize a move outcome for JavaScript.
    fn outcome_to_js(&self, outcome: &MoveOutcome) -> Result<JsValue, JsValue> {
        let js_outcome = JsMoveOutcome {
            grid: *outcome.grid.rows(),
            score: self.session.score(),
            score_delta: outcome.score_delta,
            changed: outcome.changed,
            spawned: outcome.spawned.clone(),
            merged: outcome.merged.clone(),
            terminal: outcome.state == GameState::Terminal,
        };
        serde_wasm_bindgen::to_value(&js_outcome).map_err(|err| JsValue::from_str(&err.to_string()))
    }
}
