use std::num::NonZeroU8;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, ScanOrder, HEIGHT, MAX_VALUE, WIDTH};

/// Bounds for how many cells get cleared out of a full board. The more cells
/// are cleared, the more likely the puzzle ends up with several solutions and
/// has to be regenerated.
pub const MIN_CLEARED_CELLS: usize = 35;
pub const MAX_CLEARED_CELLS: usize = 57;

/// Generates a puzzle board: a full valid board with a random number of cells
/// cleared. Uniqueness of the solution is NOT guaranteed here; callers that
/// need it check separately and regenerate.
pub fn generate() -> Board {
    generate_with(&mut rand::thread_rng())
}

/// [generate] with a caller-supplied RNG, for seeded reproducibility.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Board {
    let mut board = generate_solved_with(rng);
    let num_to_clear = rng.gen_range(MIN_CLEARED_CELLS..=MAX_CLEARED_CELLS);
    clear_cells(&mut board, num_to_clear, rng);
    board
}

/// Generates a complete valid board.
pub fn generate_solved() -> Board {
    generate_solved_with(&mut rand::thread_rng())
}

/// [generate_solved] with a caller-supplied RNG.
pub fn generate_solved_with<R: Rng + ?Sized>(rng: &mut R) -> Board {
    let mut board = Board::new_empty();
    // Seed a single random cell, then let the randomized fill do the rest.
    let row = rng.gen_range(0..HEIGHT);
    let col = rng.gen_range(0..WIDTH);
    board
        .field_mut(row, col)
        .set(NonZeroU8::new(rng.gen_range(1..=MAX_VALUE)));
    let filled = fill_random(&mut board, rng);
    assert!(filled, "a board with a single seeded cell can always be completed");
    board
}

// Same contract as the solver's search: when this returns false, every value it
// placed has been reset and `board` is unchanged.
fn fill_random<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> bool {
    let Some((row, col)) = board.first_empty_cell(ScanOrder::ColumnMajor) else {
        return true;
    };
    let mut values: Vec<NonZeroU8> = (1..=MAX_VALUE).filter_map(NonZeroU8::new).collect();
    values.shuffle(rng);
    for value in values {
        if board.can_place(row, col, value) {
            board.field_mut(row, col).set(Some(value));
            if fill_random(board, rng) {
                return true;
            }
            board.field_mut(row, col).set(None);
        }
    }
    false
}

fn clear_cells<R: Rng + ?Sized>(board: &mut Board, count: usize, rng: &mut R) {
    let mut cells: Vec<(usize, usize)> = (0..HEIGHT).cartesian_product(0..WIDTH).collect();
    cells.shuffle(rng);
    for (row, col) in cells.into_iter().take(count) {
        board.field_mut(row, col).set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_full_boards_are_valid() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let board = generate_solved_with(&mut rng);
            assert!(board.is_filled());
            assert!(!board.has_conflicts());
            assert!(board.is_valid_solution());
        }
    }

    #[test]
    fn generated_puzzles_have_conflict_free_givens_and_are_solvable() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..10 {
            let board = generate_with(&mut rng);
            assert!(!board.has_conflicts());
            assert!((MIN_CLEARED_CELLS..=MAX_CLEARED_CELLS).contains(&board.num_empty()));
            let solution = solve(board).unwrap();
            assert!(solution.is_valid_solution());
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_with(&mut StdRng::seed_from_u64(42));
        let b = generate_with(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_seeds_give_distinct_boards() {
        let a = generate_solved_with(&mut StdRng::seed_from_u64(3));
        let b = generate_solved_with(&mut StdRng::seed_from_u64(4));
        assert_ne!(a, b);
    }
}
