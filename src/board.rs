use std::fmt;
use std::num::NonZeroU8;
use std::str::FromStr;

use itertools::Itertools;
use thiserror::Error;

use crate::utils::div_ceil;

pub const WIDTH: usize = 9;
pub const HEIGHT: usize = 9;
pub const NUM_CELLS: usize = WIDTH * HEIGHT;
pub const MAX_VALUE: u8 = 9;

const NUM_BYTES: usize = div_ceil(NUM_CELLS, 2);

/// What every complete row, column and box sums to.
const UNIT_SUM: u32 = 45;

/// Scan order used when looking for the next empty cell.
///
/// Column-major turned out to be the faster default for solving. Row-major is
/// for consumers that step through the search in reading order, e.g. to
/// visualize it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanOrder {
    RowMajor,
    #[default]
    ColumnMajor,
}

/// A [Board] is a 9x9 sudoku board.
/// Each cell contains `None` (empty) or a value in 1..=9.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    // Every byte stores two cells, the first cell in the low 4 bits, the second
    // in the high 4 bits. Cells are ordered by rows, left-to-right, top-to-bottom.
    packed: [u8; NUM_BYTES],
}

#[derive(Clone, Copy)]
enum FieldSubindex {
    FirstHalfByte,
    SecondHalfByte,
}

pub struct FieldRef<T> {
    field: T,
    subindex: FieldSubindex,
}

impl FieldRef<&u8> {
    #[inline]
    pub fn get(&self) -> Option<NonZeroU8> {
        let value = match self.subindex {
            FieldSubindex::FirstHalfByte => self.field & 0x0F,
            FieldSubindex::SecondHalfByte => self.field >> 4,
        };
        assert!(value <= MAX_VALUE);
        NonZeroU8::new(value)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}

impl FieldRef<&mut u8> {
    #[inline]
    pub fn get(&self) -> Option<NonZeroU8> {
        FieldRef::<&u8> {
            field: self.field,
            subindex: self.subindex,
        }
        .get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }

    #[inline]
    pub fn set(&mut self, value: Option<NonZeroU8>) {
        let value = value.map_or(0, NonZeroU8::get);
        assert!(value <= MAX_VALUE);
        match self.subindex {
            FieldSubindex::FirstHalfByte => *self.field = (*self.field & 0xF0) | value,
            FieldSubindex::SecondHalfByte => *self.field = (*self.field & 0x0F) | (value << 4),
        }
    }
}

impl Board {
    #[inline]
    pub fn new_empty() -> Self {
        Board {
            packed: [0; NUM_BYTES],
        }
    }

    fn index(row: usize, col: usize) -> (usize, FieldSubindex) {
        // Bounds must be checked here. An out-of-range coordinate would otherwise
        // silently alias another cell through the packed index arithmetic.
        assert!(row < HEIGHT && col < WIDTH);
        let index = row * WIDTH + col;
        let subindex = if index % 2 == 0 {
            FieldSubindex::FirstHalfByte
        } else {
            FieldSubindex::SecondHalfByte
        };
        (index, subindex)
    }

    #[inline]
    pub fn field(&self, row: usize, col: usize) -> FieldRef<&'_ u8> {
        let (index, subindex) = Self::index(row, col);
        FieldRef {
            field: &self.packed[index / 2],
            subindex,
        }
    }

    #[inline]
    pub fn field_mut(&mut self, row: usize, col: usize) -> FieldRef<&'_ mut u8> {
        let (index, subindex) = Self::index(row, col);
        FieldRef {
            field: &mut self.packed[index / 2],
            subindex,
        }
    }

    /// Raw cell value with 0 denoting an empty cell.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> u8 {
        self.field(row, col).get().map_or(0, NonZeroU8::get)
    }

    /// Checks whether `value` can be placed at `(row, col)` without clashing
    /// with the cell's row, column or 3x3 box. Intended for empty cells.
    /// 27 cell reads, no allocation; this sits in the innermost search loop.
    pub fn can_place(&self, row: usize, col: usize, value: NonZeroU8) -> bool {
        let value = value.get();
        for c in 0..WIDTH {
            if self.value(row, c) == value {
                return false;
            }
        }
        for r in 0..HEIGHT {
            if self.value(r, col) == value {
                return false;
            }
        }
        let box_row = row - row % 3;
        let box_col = col - col % 3;
        for r in box_row..box_row + 3 {
            for c in box_col..box_col + 3 {
                if self.value(r, c) == value {
                    return false;
                }
            }
        }
        true
    }

    pub fn row_values(&self, row: usize) -> [u8; WIDTH] {
        let mut values = [0; WIDTH];
        for (col, value) in values.iter_mut().enumerate() {
            *value = self.value(row, col);
        }
        values
    }

    pub fn col_values(&self, col: usize) -> [u8; HEIGHT] {
        let mut values = [0; HEIGHT];
        for (row, value) in values.iter_mut().enumerate() {
            *value = self.value(row, col);
        }
        values
    }

    /// Values of the 3x3 box with index `box_index` in 0..9, read row by row.
    pub fn box_values(&self, box_index: usize) -> [u8; 9] {
        assert!(box_index < 9);
        let box_row = box_index / 3 * 3;
        let box_col = box_index % 3 * 3;
        let mut values = [0; 9];
        for (i, (r, c)) in (box_row..box_row + 3)
            .cartesian_product(box_col..box_col + 3)
            .enumerate()
        {
            values[i] = self.value(r, c);
        }
        values
    }

    /// True iff some row, column or box contains the same non-zero value twice.
    pub fn has_conflicts(&self) -> bool {
        (0..HEIGHT).any(|row| has_duplicate(&self.row_values(row)))
            || (0..WIDTH).any(|col| has_duplicate(&self.col_values(col)))
            || (0..9).any(|b| has_duplicate(&self.box_values(b)))
    }

    /// Checks that every row, column and box sums to 45.
    ///
    /// This is a cheap stand-in for the full permutation check. It is sufficient
    /// for boards that were filled through [Board::can_place]-guarded assignment;
    /// for arbitrary boards, combine it with [Board::has_conflicts] since
    /// compensating duplicates can also reach the right sum.
    pub fn is_valid_solution(&self) -> bool {
        (0..HEIGHT).all(|row| unit_sum(&self.row_values(row)) == UNIT_SUM)
            && (0..WIDTH).all(|col| unit_sum(&self.col_values(col)) == UNIT_SUM)
            && (0..9).all(|b| unit_sum(&self.box_values(b)) == UNIT_SUM)
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.num_empty() == 0
    }

    pub fn num_empty(&self) -> usize {
        (0..HEIGHT)
            .cartesian_product(0..WIDTH)
            .filter(|&(row, col)| self.field(row, col).is_empty())
            .count()
    }

    /// The first empty cell in the given scan order, or `None` if the board is
    /// completely filled.
    pub fn first_empty_cell(&self, order: ScanOrder) -> Option<(usize, usize)> {
        match order {
            ScanOrder::RowMajor => (0..HEIGHT)
                .cartesian_product(0..WIDTH)
                .find(|&(row, col)| self.field(row, col).is_empty()),
            ScanOrder::ColumnMajor => (0..WIDTH)
                .cartesian_product(0..HEIGHT)
                .map(|(col, row)| (row, col))
                .find(|&(row, col)| self.field(row, col).is_empty()),
        }
    }

    /// Builds a board from the row-major 9x9 exchange shape.
    pub fn from_rows(rows: [[u8; WIDTH]; HEIGHT]) -> Result<Self, ParseBoardError> {
        let mut board = Self::new_empty();
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value > MAX_VALUE {
                    return Err(ParseBoardError::ValueOutOfRange { row, col, value });
                }
                board.field_mut(row, col).set(NonZeroU8::new(value));
            }
        }
        Ok(board)
    }

    /// The row-major 9x9 exchange shape, 0 for empty cells.
    pub fn to_rows(&self) -> [[u8; WIDTH]; HEIGHT] {
        let mut rows = [[0; WIDTH]; HEIGHT];
        for (row, values) in rows.iter_mut().enumerate() {
            *values = self.row_values(row);
        }
        rows
    }

    /// Extracts a board from text containing exactly 81 ASCII digits mixed with
    /// arbitrary other characters. Remote puzzle services reply in this shape
    /// (a JSON payload carrying one digit per cell); the caller does the fetch,
    /// this does the boundary conversion.
    pub fn from_digit_text(text: &str) -> Result<Self, ParseBoardError> {
        let digits: Vec<u8> = text
            .chars()
            .filter(char::is_ascii_digit)
            .map(|ch| ch as u8 - b'0')
            .collect();
        if digits.len() != NUM_CELLS {
            return Err(ParseBoardError::WrongCellCount(digits.len()));
        }
        let mut board = Self::new_empty();
        for (i, &value) in digits.iter().enumerate() {
            board
                .field_mut(i / WIDTH, i % WIDTH)
                .set(NonZeroU8::new(value));
        }
        Ok(board)
    }

    /// 81 digit characters, row-major, '0' for empty cells.
    pub fn to_digit_string(&self) -> String {
        let mut text = String::with_capacity(NUM_CELLS);
        for (row, col) in (0..HEIGHT).cartesian_product(0..WIDTH) {
            text.push((b'0' + self.value(row, col)) as char);
        }
        text
    }
}

fn has_duplicate(values: &[u8; 9]) -> bool {
    let mut seen = [false; MAX_VALUE as usize + 1];
    for &value in values {
        if value != 0 {
            if seen[value as usize] {
                return true;
            }
            seen[value as usize] = true;
        }
    }
    false
}

fn unit_sum(values: &[u8; 9]) -> u32 {
    values.iter().map(|&value| u32::from(value)).sum()
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected 81 cells, found {0}")]
    WrongCellCount(usize),

    #[error("invalid character {0:?} in board text")]
    InvalidCharacter(char),

    #[error("cell value {value} at ({row}, {col}) is outside 0..=9")]
    ValueOutOfRange { row: usize, col: usize, value: u8 },
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses the human grid format: digits for values, '_', '.' or '0' for
    /// empty cells, any whitespace ignored. Exactly 81 cells are required.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(NUM_CELLS);
        for ch in text.chars() {
            match ch {
                '1'..='9' => cells.push(ch as u8 - b'0'),
                '0' | '.' | '_' => cells.push(0),
                ch if ch.is_whitespace() => {}
                ch => return Err(ParseBoardError::InvalidCharacter(ch)),
            }
        }
        if cells.len() != NUM_CELLS {
            return Err(ParseBoardError::WrongCellCount(cells.len()));
        }
        let mut board = Self::new_empty();
        for (i, &value) in cells.iter().enumerate() {
            board
                .field_mut(i / WIDTH, i % WIDTH)
                .set(NonZeroU8::new(value));
        }
        Ok(board)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..HEIGHT {
            if row > 0 && row % 3 == 0 {
                writeln!(f)?;
            }
            for col in 0..WIDTH {
                if col > 0 && col % 3 == 0 {
                    write!(f, " ")?;
                }
                match self.field(row, col).get() {
                    Some(value) => write!(f, "{value}")?,
                    None => write!(f, "_")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    /// Renders the board with box-drawing characters: heavy rules around 3x3
    /// boxes, light dashed rules inside them, and a figure space for empty
    /// cells so the grid stays aligned.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..HEIGHT {
            let (joint, dash) = if row == 0 {
                ('┳', '━')
            } else if row % 3 == 0 {
                ('╋', '━')
            } else {
                ('╋', '┄')
            };
            write!(f, " ")?;
            for _ in 0..WIDTH {
                write!(f, "{joint}{dash}{dash}{dash}")?;
            }
            writeln!(f, "{joint}")?;
            for col in 0..WIDTH {
                if col % 3 == 0 {
                    write!(f, " ┃ ")?;
                }
                match self.field(row, col).get() {
                    Some(value) => write!(f, "{value}")?,
                    None => write!(f, "\u{2007}")?,
                }
                if col == WIDTH - 1 {
                    write!(f, " ┃ ")?;
                } else if col % 3 != 2 {
                    write!(f, " ┆ ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, " ")?;
        for _ in 0..WIDTH {
            write!(f, "┻━━━")?;
        }
        writeln!(f, "┻")
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Board;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Board {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_digit_string())
        }
    }

    impl<'de> Deserialize<'de> for Board {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let text = String::deserialize(deserializer)?;
            Board::from_digit_text(&text).map_err(de::Error::custom)
        }
    }
}
