//! Property-based tests for the move/merge algebra and session invariants.
//!
//! Run with: cargo test -p gridmerge-core --test properties

use proptest::prelude::*;

use gridmerge_core::{Direction, GameState, Grid, Session};

/// Boards of empty cells and small power-of-two tiles.
fn arb_grid() -> impl Strategy<Value = Grid> {
    proptest::array::uniform4(proptest::array::uniform4(0u32..=6)).prop_map(|exponents| {
        let mut rows = [[0u32; 4]; 4];
        for (r, row) in exponents.iter().enumerate() {
            for (c, &exp) in row.iter().enumerate() {
                rows[r][c] = if exp == 0 { 0 } else { 1 << exp };
            }
        }
        Grid::from_rows(rows)
    })
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn tile_sum(grid: &Grid) -> u64 {
    grid.rows().iter().flatten().map(|&v| u64::from(v)).sum()
}

fn tile_count(grid: &Grid) -> usize {
    16 - grid.empty_count()
}

proptest! {
    /// Merging neither creates nor destroys value: tile sums are conserved
    /// through every shift.
    #[test]
    fn prop_shift_conserves_sum(grid in arb_grid(), direction in arb_direction()) {
        let outcome = grid.shift(direction);
        prop_assert_eq!(tile_sum(&grid), tile_sum(&outcome.grid));
    }

    /// A shift that reports no change returns the input grid untouched,
    /// with no score and no merge markers.
    #[test]
    fn prop_unchanged_shift_is_identity(grid in arb_grid(), direction in arb_direction()) {
        let outcome = grid.shift(direction);
        if !outcome.changed {
            prop_assert_eq!(outcome.grid, grid);
            prop_assert_eq!(outcome.score_delta, 0);
            prop_assert!(outcome.merged.is_empty());
        }
    }

    /// Each merge combines exactly one pair: the score delta equals the sum
    /// of the merged cells' values, and the tile count drops by exactly the
    /// number of merges.
    #[test]
    fn prop_merge_accounting(grid in arb_grid(), direction in arb_direction()) {
        let outcome = grid.shift(direction);
        let merged_sum: u32 = outcome.merged.iter().map(|&cell| outcome.grid.get(cell)).sum();
        prop_assert_eq!(outcome.score_delta, merged_sum);
        prop_assert_eq!(tile_count(&outcome.grid), tile_count(&grid) - outcome.merged.len());
    }

    /// Shift output stays on powers of two.
    #[test]
    fn prop_shift_preserves_tile_invariant(grid in arb_grid(), direction in arb_direction()) {
        let outcome = grid.shift(direction);
        for row in outcome.grid.rows() {
            for &value in row {
                prop_assert!(value == 0 || (value >= 2 && value.is_power_of_two()));
            }
        }
    }

    /// A terminal grid admits no changing shift; a full grid that is not
    /// terminal always admits one.
    #[test]
    fn prop_terminal_means_no_legal_move(grid in arb_grid()) {
        if grid.is_terminal() {
            for direction in Direction::all() {
                prop_assert!(!grid.shift(direction).changed);
            }
        } else if grid.empty_count() == 0 {
            let any_legal = Direction::all().iter().any(|&d| grid.shift(d).changed);
            prop_assert!(any_legal);
        }
    }

    /// Session scores never decrease across moves.
    #[test]
    fn prop_session_score_monotonic(seed in any::<u64>()) {
        let mut session = Session::new(seed);
        let mut last = session.score();
        let directions = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
        for &direction in directions.iter().cycle().take(64) {
            session.step(direction);
            prop_assert!(session.score() >= last);
            last = session.score();
        }
    }

    /// After any changed move, undo restores the exact prior
    /// {grid, score, state} triple.
    #[test]
    fn prop_undo_restores_prior_state(seed in any::<u64>()) {
        let mut session = Session::new(seed);
        let directions = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];

        let mut changed_moves = 0;
        for &direction in directions.iter().cycle().take(32) {
            let before = session.snapshot();
            let outcome = session.step(direction);
            if outcome.changed {
                changed_moves += 1;
                prop_assert!(session.undo());
                prop_assert_eq!(session.snapshot(), before);

                // Keep playing from the restored state
                session.step(direction);
            }
        }
        prop_assert!(changed_moves > 0);
    }

    /// Whole games stay internally consistent: the session is terminal
    /// exactly when its grid is, and every changed move spawns one tile.
    #[test]
    fn prop_session_consistency(seed in any::<u64>()) {
        let mut session = Session::new(seed);
        let directions = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
        for &direction in directions.iter().cycle().take(128) {
            let tiles_before = tile_count(session.grid());
            let outcome = session.step(direction);
            if outcome.changed {
                prop_assert_eq!(outcome.spawned.len(), 1);
                prop_assert_eq!(
                    tile_count(session.grid()),
                    tiles_before - outcome.merged.len() + 1
                );
            }
            let terminal = session.state() == GameState::Terminal;
            prop_assert_eq!(terminal, session.grid().is_terminal());
        }
    }
}
