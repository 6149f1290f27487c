use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sudoku_engine::{has_unique_solution, solve, Board, Game, SolveError};

#[derive(Parser, Debug)]
#[command(name = "sudoku-engine", version, about = "Generate, solve and check 9x9 sudoku puzzles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a puzzle with a unique solution
    Generate {
        /// Seed for deterministic generation
        #[arg(long)]
        seed: Option<u64>,

        /// Also print the solution
        #[arg(long)]
        solution: bool,
    },
    /// Solve a puzzle read from a file or stdin (digits, '.', '_' or '0' for blanks)
    Solve {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Report conflicts, solvability and uniqueness of a puzzle
    Check {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn read_board(input: &Option<PathBuf>) -> Result<Board> {
    let text = match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    text.parse().context("parsing puzzle")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Generate { seed, solution } => {
            let game = match seed {
                Some(seed) => Game::with_rng(&mut StdRng::seed_from_u64(seed))?,
                None => Game::new()?,
            };
            println!("{}", game.initial());
            if solution {
                println!("Solution:");
                println!("{}", game.solution());
            }
        }
        Command::Solve { input } => {
            let board = read_board(&input)?;
            match solve(board) {
                Ok(solved) => println!("{solved}"),
                Err(SolveError::NotSolvable) => println!("No solution exists."),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Check { input } => {
            let board = read_board(&input)?;
            if board.has_conflicts() {
                println!("Board has conflicting givens.");
            } else if solve(board).is_err() {
                println!("Not solvable.");
            } else if has_unique_solution(&board) {
                println!("Solvable with a unique solution.");
            } else {
                println!("Solvable with multiple solutions.");
            }
        }
    }
    Ok(())
}
