use thiserror::Error;

use crate::board::{Board, ScanOrder};

mod possible_values;
mod search;
mod strategies;
mod uniqueness;

pub use possible_values::PossibleValues;
pub use search::ValueOrder;
pub use strategies::{apply_forced_placements, prune_candidates, CandidateCache};
pub use uniqueness::{appears_unique, has_unique_solution};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("board has conflicting givens")]
    InvalidBoard,

    #[error("sudoku is not solvable")]
    NotSolvable,
}

/// Solves a puzzle and returns the completed board.
///
/// An unsolvable board is a normal outcome reported through the `Err` variant,
/// not a panic. The input is taken by value; the caller's board is untouched
/// either way.
pub fn solve(board: Board) -> Result<Board, SolveError> {
    solve_with(board, ScanOrder::ColumnMajor, ValueOrder::Forward)
}

/// [solve] with explicit scan and candidate orders.
///
/// Conflicting givens are rejected before any search starts. Otherwise the
/// single-position deductions run to convergence first and the backtracking
/// search only has to cover the residual candidate lists.
pub fn solve_with(
    mut board: Board,
    scan: ScanOrder,
    order: ValueOrder,
) -> Result<Board, SolveError> {
    if board.has_conflicts() {
        return Err(SolveError::InvalidBoard);
    }
    let cache = strategies::prune_candidates(&mut board);
    if search::fill_cells(&mut board, &cache, scan, order) && !board.has_conflicts() {
        debug_assert!(board.is_filled());
        Ok(board)
    } else {
        Err(SolveError::NotSolvable)
    }
}
