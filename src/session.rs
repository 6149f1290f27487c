use std::num::NonZeroU8;

use rand::Rng;
use thiserror::Error;

use crate::board::{Board, HEIGHT, MAX_VALUE, WIDTH};
use crate::generator;
use crate::solver::{self, SolveError};

/// How often a fresh puzzle is generated before giving up on finding one with
/// a unique solution. In practice a handful of attempts suffices; the ceiling
/// exists so a pathological RNG stream cannot loop forever.
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("no puzzle with a unique solution after {0} attempts")]
    GenerationExhausted(usize),

    #[error("puzzle has more than one solution")]
    MultipleSolutions,

    #[error("cell ({row}, {col}) is a given and cannot be changed")]
    GivenCell { row: usize, col: usize },

    #[error("value {0} is outside 1..=9")]
    ValueOutOfRange(u8),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// One playable sudoku game.
///
/// `initial` is the puzzle as handed out and never changes afterwards.
/// `current` starts as a copy of it and takes the player's entries. `solution`
/// is computed once at construction. All the search machinery stays behind
/// this type; a presentation layer only reads boards and writes cells.
#[derive(Clone, Debug)]
pub struct Game {
    initial: Board,
    current: Board,
    solution: Board,
}

impl Game {
    /// Generates a new game, regenerating until the puzzle has a unique
    /// solution.
    pub fn new() -> Result<Self, GameError> {
        Self::with_rng(&mut rand::thread_rng())
    }

    /// [Game::new] with a caller-supplied RNG.
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, GameError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let puzzle = generator::generate_with(rng);
            match Self::from_board(puzzle) {
                Ok(game) => {
                    log::debug!("generated a unique puzzle after {attempt} attempt(s)");
                    return Ok(game);
                }
                Err(err) => {
                    log::debug!("generation attempt {attempt} rejected: {err}");
                }
            }
        }
        Err(GameError::GenerationExhausted(MAX_GENERATION_ATTEMPTS))
    }

    /// Builds a game around an externally produced puzzle, e.g. one fetched
    /// from a remote source or parsed from a file. The same gate applies as
    /// for local generation: the puzzle must have exactly one solution.
    pub fn from_board(initial: Board) -> Result<Self, GameError> {
        let solution = solver::solve(initial)?;
        if !solver::has_unique_solution(&initial) {
            return Err(GameError::MultipleSolutions);
        }
        Ok(Self {
            initial,
            current: initial,
            solution,
        })
    }

    pub fn initial(&self) -> &Board {
        &self.initial
    }

    pub fn current(&self) -> &Board {
        &self.current
    }

    pub fn solution(&self) -> &Board {
        &self.solution
    }

    /// Writes a player value into `current`. Cells that are part of the puzzle
    /// cannot be overwritten.
    pub fn enter(&mut self, row: usize, col: usize, value: u8) -> Result<(), GameError> {
        if !(1..=MAX_VALUE).contains(&value) {
            return Err(GameError::ValueOutOfRange(value));
        }
        if !self.initial.field(row, col).is_empty() {
            return Err(GameError::GivenCell { row, col });
        }
        self.current.field_mut(row, col).set(NonZeroU8::new(value));
        Ok(())
    }

    /// Clears a player-entered value from `current`.
    pub fn erase(&mut self, row: usize, col: usize) -> Result<(), GameError> {
        if !self.initial.field(row, col).is_empty() {
            return Err(GameError::GivenCell { row, col });
        }
        self.current.field_mut(row, col).set(None);
        Ok(())
    }

    /// Sequential read-over of `current`'s rows. Every call starts over from
    /// row 0.
    pub fn rows(&self) -> impl Iterator<Item = [u8; WIDTH]> + '_ {
        (0..HEIGHT).map(|row| self.current.row_values(row))
    }

    /// The values still legal for an empty cell of `current`, ascending. An
    /// occupied cell has no candidates. Presentation layers use this to render
    /// pencil marks or to animate the solving process.
    pub fn candidates_for(&self, row: usize, col: usize) -> Vec<NonZeroU8> {
        if !self.current.field(row, col).is_empty() {
            return Vec::new();
        }
        (1..=MAX_VALUE)
            .filter_map(NonZeroU8::new)
            .filter(|&value| self.current.can_place(row, col, value))
            .collect()
    }

    /// Whether every cell of `current` holds a value.
    pub fn is_complete(&self) -> bool {
        self.current.is_filled()
    }

    /// Whether `current` is a finished, correct solution.
    pub fn is_won(&self) -> bool {
        self.current.is_filled() && self.current.is_valid_solution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ScanOrder;
    use rand::{rngs::StdRng, SeedableRng};

    fn new_game() -> Game {
        Game::with_rng(&mut StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn fresh_game_exposes_consistent_boards() {
        let game = new_game();
        assert_eq!(game.initial(), game.current());
        assert!(game.solution().is_filled());
        assert!(game.solution().is_valid_solution());
        assert!(solver::has_unique_solution(game.initial()));
        // The solution extends the givens.
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                let given = game.initial().value(row, col);
                if given != 0 {
                    assert_eq!(given, game.solution().value(row, col));
                }
            }
        }
    }

    #[test]
    fn entering_values_only_touches_current() {
        let mut game = new_game();
        let (row, col) = game
            .initial()
            .first_empty_cell(ScanOrder::ColumnMajor)
            .unwrap();
        game.enter(row, col, 5).unwrap();
        assert_eq!(game.current().value(row, col), 5);
        assert_eq!(game.initial().value(row, col), 0);
        game.erase(row, col).unwrap();
        assert_eq!(game.current().value(row, col), 0);
    }

    #[test]
    fn givens_cannot_be_changed() {
        let mut game = new_game();
        let (row, col) = (0..HEIGHT)
            .flat_map(|r| (0..WIDTH).map(move |c| (r, c)))
            .find(|&(r, c)| game.initial().value(r, c) != 0)
            .unwrap();
        assert_eq!(game.enter(row, col, 1), Err(GameError::GivenCell { row, col }));
        assert_eq!(game.erase(row, col), Err(GameError::GivenCell { row, col }));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut game = new_game();
        let (row, col) = game
            .initial()
            .first_empty_cell(ScanOrder::ColumnMajor)
            .unwrap();
        assert_eq!(game.enter(row, col, 0), Err(GameError::ValueOutOfRange(0)));
        assert_eq!(game.enter(row, col, 10), Err(GameError::ValueOutOfRange(10)));
    }

    #[test]
    fn copying_the_solution_wins_the_game() {
        let mut game = new_game();
        assert!(!game.is_complete());
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                if game.initial().value(row, col) == 0 {
                    let value = game.solution().value(row, col);
                    game.enter(row, col, value).unwrap();
                }
            }
        }
        assert!(game.is_complete());
        assert!(game.is_won());
        assert_eq!(game.current(), game.solution());
    }

    #[test]
    fn rows_iteration_restarts_every_call() {
        let game = new_game();
        let first: Vec<[u8; WIDTH]> = game.rows().collect();
        let second: Vec<[u8; WIDTH]> = game.rows().collect();
        assert_eq!(first.len(), HEIGHT);
        assert_eq!(first, second);
        assert_eq!(first[0], game.current().row_values(0));
    }

    #[test]
    fn candidates_reflect_current_entries() {
        let mut game = new_game();
        let (row, col) = game
            .initial()
            .first_empty_cell(ScanOrder::ColumnMajor)
            .unwrap();
        let before = game.candidates_for(row, col);
        assert!(!before.is_empty());

        let value = game.solution().value(row, col);
        game.enter(row, col, value).unwrap();
        assert!(game.candidates_for(row, col).is_empty());
    }

    #[test]
    fn from_board_rejects_ambiguous_puzzles() {
        let err = Game::from_board(Board::new_empty()).unwrap_err();
        assert_eq!(err, GameError::MultipleSolutions);
    }

    #[test]
    fn from_board_rejects_unsolvable_puzzles() {
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
        let err = Game::from_board(board).unwrap_err();
        assert_eq!(err, GameError::Solve(SolveError::NotSolvable));
    }

    #[test]
    fn from_board_accepts_a_unique_puzzle() {
        let board: Board = "
            8__ ___ ___
            __3 6__ ___
            _7_ _9_ 2__

            _5_ __7 ___
            ___ _45 7__
            ___ 1__ _3_

            __1 ___ _68
            __8 5__ _1_
            _9_ ___ 4__
        "
        .parse()
        .unwrap();
        let game = Game::from_board(board).unwrap();
        assert_eq!(game.initial(), &board);
        assert!(game.solution().is_valid_solution());
    }
}
