use crate::board::{Board, ScanOrder};

use super::search::ValueOrder;
use super::strategies::{self, CandidateCache};
use super::solve_with;

/// Checks whether a puzzle has exactly one solution.
///
/// Runs the backtracking search without stopping at the first completed
/// assignment and aborts as soon as a second one turns up. Exact, but can get
/// slow on very sparse boards with many solutions. Boards with conflicting
/// givens or no solution at all are not unique.
pub fn has_unique_solution(board: &Board) -> bool {
    if board.has_conflicts() {
        return false;
    }
    let mut board = *board;
    let cache = strategies::prune_candidates(&mut board);
    let mut count = 0;
    count_solutions_up_to(&mut board, &cache, 2, &mut count);
    count == 1
}

fn count_solutions_up_to(
    board: &mut Board,
    cache: &CandidateCache,
    limit: usize,
    count: &mut usize,
) {
    if *count >= limit {
        return;
    }
    let Some((row, col)) = board.first_empty_cell(ScanOrder::ColumnMajor) else {
        // Forced placements can fill cells blindly on impossible boards, so a
        // completed assignment only counts when it is actually consistent.
        if !board.has_conflicts() {
            *count += 1;
        }
        return;
    };
    let Some(values) = cache.get(row, col) else {
        return;
    };
    for &value in values {
        if board.can_place(row, col, value) {
            board.field_mut(row, col).set(Some(value));
            count_solutions_up_to(board, cache, limit, count);
            board.field_mut(row, col).set(None);
            if *count >= limit {
                return;
            }
        }
    }
}

/// Fast uniqueness approximation: solve once walking candidate lists forward
/// and once walking them in reverse, and report whether the two searches land
/// on the same board.
///
/// This is a heuristic, not a proof. Two particular search orders agreeing
/// does not logically rule out a third solution elsewhere in the tree; in
/// practice it correlates well and is much cheaper on sparse boards. Callers
/// that need certainty use [has_unique_solution] instead. The two solves are
/// independent and run in parallel.
pub fn appears_unique(board: &Board) -> bool {
    let (forward, reverse) = rayon::join(
        || solve_with(*board, ScanOrder::ColumnMajor, ValueOrder::Forward),
        || solve_with(*board, ScanOrder::ColumnMajor, ValueOrder::Reverse),
    );
    match (forward, reverse) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Arto Inkala's 2012 puzzle, known to have exactly one solution.
    const HARDEST: &str = "
        8__ ___ ___
        __3 6__ ___
        _7_ _9_ 2__

        _5_ __7 ___
        ___ _45 7__
        ___ 1__ _3_

        __1 ___ _68
        __8 5__ _1_
        _9_ ___ 4__
    ";

    // The solved HARDEST board with an unavoidable rectangle removed: the 2/3
    // pairs at (0,2)/(0,5) and (1,2)/(1,5) can be swapped without breaking any
    // row, column or box, so this board has at least two solutions.
    const TWO_SOLUTIONS: &str = "
        81_ 75_ 649
        94_ 68_ 175
        675 491 283

        154 237 896
        369 845 721
        287 169 534

        521 974 368
        438 526 917
        796 318 452
    ";

    #[test]
    fn unique_puzzle_is_recognized() {
        let board: Board = HARDEST.parse().unwrap();
        assert!(has_unique_solution(&board));
        assert!(appears_unique(&board));
    }

    #[test]
    fn swappable_rectangle_is_not_unique() {
        let board: Board = TWO_SOLUTIONS.parse().unwrap();
        assert!(!has_unique_solution(&board));
        assert!(!appears_unique(&board));
    }

    #[test]
    fn empty_board_is_not_unique() {
        assert!(!has_unique_solution(&Board::new_empty()));
    }

    #[test]
    fn unsolvable_board_is_not_unique() {
        // (0, 8) has no candidates: its row holds 1..=8, its column a 9.
        let board: Board = "
            123 456 78_
            ___ ___ ___
            ___ ___ ___

            ___ ___ ___
            ___ ___ __9
            ___ ___ ___

            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
        "
        .parse()
        .unwrap();
        assert!(!has_unique_solution(&board));
    }

    #[test]
    fn conflicting_givens_are_not_unique() {
        let mut board = Board::new_empty();
        board.field_mut(0, 0).set(std::num::NonZeroU8::new(4));
        board.field_mut(8, 0).set(std::num::NonZeroU8::new(4));
        assert!(!has_unique_solution(&board));
    }

    #[test]
    fn solved_board_is_unique() {
        let board: Board = "
            123 456 789
            456 789 123
            789 123 456

            234 567 891
            567 891 234
            891 234 567

            345 678 912
            678 912 345
            912 345 678
        "
        .parse()
        .unwrap();
        assert!(has_unique_solution(&board));
        assert!(appears_unique(&board));
    }
}
