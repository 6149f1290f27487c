use std::num::NonZeroU8;

use bitvec::prelude::*;
use itertools::Itertools;

use crate::board::{Board, HEIGHT, MAX_VALUE, NUM_CELLS, WIDTH};

const VALUES_PER_CELL: usize = MAX_VALUE as usize;

/// Tracks which values are still legal for each cell.
///
/// Stores 9 bits per cell. A set bit means the value does not clash with any
/// value currently on the board. Only meaningful for empty cells; filled cells
/// keep whatever bits remain but are never queried.
#[derive(Clone, Copy)]
pub struct PossibleValues {
    bits: BitArr!(for NUM_CELLS * VALUES_PER_CELL),
}

impl PossibleValues {
    const fn new_all_possible() -> Self {
        Self {
            bits: bitarr![const 1; NUM_CELLS * VALUES_PER_CELL],
        }
    }

    /// Derives the possible values from the values already on the board.
    pub fn from_board(board: &Board) -> Self {
        let mut possible = Self::new_all_possible();
        for (row, col) in (0..HEIGHT).cartesian_product(0..WIDTH) {
            if let Some(value) = board.field(row, col).get() {
                possible.remove_conflicting(row, col, value);
            }
        }
        possible
    }

    fn cell_start(row: usize, col: usize) -> usize {
        assert!(row < HEIGHT && col < WIDTH);
        VALUES_PER_CELL * (row * WIDTH + col)
    }

    fn index(row: usize, col: usize, value: NonZeroU8) -> usize {
        assert!(value.get() <= MAX_VALUE);
        Self::cell_start(row, col) + usize::from(value.get()) - 1
    }

    pub fn is_possible(&self, row: usize, col: usize, value: NonZeroU8) -> bool {
        self.bits[Self::index(row, col, value)]
    }

    /// The legal values for a cell, in ascending numeric order.
    pub fn for_cell(&self, row: usize, col: usize) -> impl Iterator<Item = NonZeroU8> + '_ {
        let start = Self::cell_start(row, col);
        (1u8..=MAX_VALUE)
            .filter(move |value| self.bits[start + usize::from(*value) - 1])
            .map(|value| NonZeroU8::new(value).unwrap())
    }

    pub fn remove(&mut self, row: usize, col: usize, value: NonZeroU8) {
        let index = Self::index(row, col, value);
        self.bits.set(index, false);
    }

    /// Removes `value` from all cells that share a row, column or box with
    /// `(row, col)`, including the cell itself.
    pub fn remove_conflicting(&mut self, row: usize, col: usize, value: NonZeroU8) {
        for c in 0..WIDTH {
            self.remove(row, c, value);
        }
        for r in 0..HEIGHT {
            self.remove(r, col, value);
        }
        let box_row = row - row % 3;
        let box_col = col - col % 3;
        for (r, c) in (box_row..box_row + 3).cartesian_product(box_col..box_col + 3) {
            self.remove(r, c, value);
        }
    }
}
