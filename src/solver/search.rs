use std::num::NonZeroU8;

use crate::board::{Board, ScanOrder};

use super::strategies::CandidateCache;

/// Which end of a cell's candidate list the search tries first.
///
/// `Forward` walks the list as ordered (ascending constraint pressure after
/// pruning, ascending numeric before). `Reverse` walks it from the other end;
/// solving the same puzzle in both directions is what the agreement heuristic
/// in [super::uniqueness] compares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueOrder {
    #[default]
    Forward,
    Reverse,
}

// Invariant:
//  - When `fill_cells` returns false, `board` is unchanged. Any value placed
//    during the search has been reset to empty before returning.
pub(super) fn fill_cells(
    board: &mut Board,
    cache: &CandidateCache,
    scan: ScanOrder,
    order: ValueOrder,
) -> bool {
    let Some((row, col)) = board.first_empty_cell(scan) else {
        // No empty cells left, the board is fully assigned.
        return true;
    };
    let Some(values) = cache.get(row, col) else {
        // Every cell that was empty at cache build time has a list; a missing
        // one means the cache does not belong to this board. Fail the branch.
        return false;
    };
    match order {
        ValueOrder::Forward => {
            for &value in values {
                if try_value(board, cache, scan, order, row, col, value) {
                    return true;
                }
            }
        }
        ValueOrder::Reverse => {
            for &value in values.iter().rev() {
                if try_value(board, cache, scan, order, row, col, value) {
                    return true;
                }
            }
        }
    }
    false
}

fn try_value(
    board: &mut Board,
    cache: &CandidateCache,
    scan: ScanOrder,
    order: ValueOrder,
    row: usize,
    col: usize,
    value: NonZeroU8,
) -> bool {
    // The cached list can be stale further down the search path, so every
    // placement is re-checked against the current board.
    if !board.can_place(row, col, value) {
        return false;
    }
    board.field_mut(row, col).set(Some(value));
    if fill_cells(board, cache, scan, order) {
        return true;
    }
    board.field_mut(row, col).set(None);
    false
}
