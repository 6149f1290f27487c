use std::num::NonZeroU8;

use itertools::Itertools;

use crate::board::{Board, HEIGHT, MAX_VALUE, NUM_CELLS, WIDTH};

use super::possible_values::PossibleValues;

/// Ordered candidate lists for the currently empty cells of a board.
///
/// This is a derived structure: it is rebuilt from the board whenever the board
/// changes materially, never persisted alongside it.
pub struct CandidateCache {
    lists: [Option<Vec<NonZeroU8>>; NUM_CELLS],
}

impl CandidateCache {
    /// Computes the candidate list of every empty cell, each in ascending
    /// numeric order. Cells of a contradictory board simply end up with empty
    /// lists; it is the search's job to fail on those.
    pub fn from_board(board: &Board) -> Self {
        let possible = PossibleValues::from_board(board);
        let mut lists: [Option<Vec<NonZeroU8>>; NUM_CELLS] = std::array::from_fn(|_| None);
        for (row, col) in (0..HEIGHT).cartesian_product(0..WIDTH) {
            if board.field(row, col).is_empty() {
                lists[row * WIDTH + col] = Some(possible.for_cell(row, col).collect());
            }
        }
        Self { lists }
    }

    /// The candidate list for a cell, or `None` if the cell holds a value.
    pub fn get(&self, row: usize, col: usize) -> Option<&[NonZeroU8]> {
        assert!(row < HEIGHT && col < WIDTH);
        self.lists[row * WIDTH + col].as_deref()
    }

    fn list_mut(&mut self, row: usize, col: usize) -> Option<&mut Vec<NonZeroU8>> {
        self.lists[row * WIDTH + col].as_mut()
    }

    fn take(&mut self, row: usize, col: usize) {
        self.lists[row * WIDTH + col] = None;
    }
}

/// Per-unit tally: `counts[unit][value]` is the number of empty cells in that
/// unit whose candidate list contains `value`.
type UnitCounts = [[u8; MAX_VALUE as usize + 1]; 9];

const fn box_of(row: usize, col: usize) -> usize {
    row / 3 * 3 + col / 3
}

/// One round of single-position deductions over the candidate cache.
///
/// A value whose tally is 1 within a cell's row, column or box has no other
/// place in that unit, so it is written into the board right away. Everything
/// that stays undecided gets its candidate list reordered ascending by combined
/// constraint pressure (row + column + box tally): rarer values are tried first
/// because they force contradictions earlier during backtracking. The sort is
/// stable, so equal pressure keeps ascending numeric order.
///
/// Returns whether any value was committed to the board. Callers are expected
/// to rebuild the cache and call again until this settles.
pub fn apply_forced_placements(board: &mut Board, cache: &mut CandidateCache) -> bool {
    let mut row_counts: UnitCounts = [[0; MAX_VALUE as usize + 1]; 9];
    let mut col_counts: UnitCounts = [[0; MAX_VALUE as usize + 1]; 9];
    let mut box_counts: UnitCounts = [[0; MAX_VALUE as usize + 1]; 9];

    for (row, col) in (0..HEIGHT).cartesian_product(0..WIDTH) {
        if let Some(values) = cache.get(row, col) {
            for &value in values {
                let value = value.get() as usize;
                row_counts[row][value] += 1;
                col_counts[col][value] += 1;
                box_counts[box_of(row, col)][value] += 1;
            }
        }
    }

    let mut committed = false;
    for (row, col) in (0..HEIGHT).cartesian_product(0..WIDTH) {
        let box_index = box_of(row, col);
        let forced = cache.get(row, col).and_then(|values| {
            values.iter().copied().find(|value| {
                let value = value.get() as usize;
                row_counts[row][value] == 1
                    || col_counts[col][value] == 1
                    || box_counts[box_index][value] == 1
            })
        });
        if let Some(value) = forced {
            // The tallies are not refreshed within the round; the caller's
            // rebuild-and-repeat loop picks up the consequences.
            log::trace!("forced {value} at ({row}, {col})");
            board.field_mut(row, col).set(Some(value));
            cache.take(row, col);
            committed = true;
        } else if let Some(values) = cache.list_mut(row, col) {
            values.sort_by_key(|value| {
                let value = value.get() as usize;
                u32::from(row_counts[row][value])
                    + u32::from(col_counts[col][value])
                    + u32::from(box_counts[box_index][value])
            });
        }
    }
    committed
}

/// Runs [apply_forced_placements] to its fixpoint, rebuilding the candidate
/// cache after every round that committed something.
///
/// This converges to everything single-position deductions can reach on their
/// own; deliberately no pairs, X-wings or other techniques. The returned cache
/// is pressure-ordered and ready for the backtracking search.
// TODO Maintain the cache incrementally across rounds instead of rebuilding it
// from the board each time.
pub fn prune_candidates(board: &mut Board) -> CandidateCache {
    loop {
        let mut cache = CandidateCache::from_board(board);
        if !apply_forced_placements(board, &mut cache) {
            return cache;
        }
    }
}
