mod board;
mod generator;
mod session;
mod solver;
mod utils;

pub use board::{Board, ParseBoardError, ScanOrder, HEIGHT, MAX_VALUE, NUM_CELLS, WIDTH};
pub use generator::{
    generate, generate_solved, generate_solved_with, generate_with, MAX_CLEARED_CELLS,
    MIN_CLEARED_CELLS,
};
pub use session::{Game, GameError, MAX_GENERATION_ATTEMPTS};
pub use solver::{
    appears_unique, apply_forced_placements, has_unique_solution, prune_candidates, solve,
    solve_with, CandidateCache, PossibleValues, SolveError, ValueOrder,
};
