//! Algebraic squares and their grid indices (row 0 = rank 8).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Grid indices to square, `None` when either index is off the board.
    pub fn from_indices(row: i32, col: i32) -> Option<Square> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// `file` and `rank` are zero-based (a = 0, rank 1 = 0).
    pub fn from_file_rank(file: u8, rank: u8) -> Option<Square> {
        Square::from_indices(7 - rank as i32, file as i32)
    }

    pub fn parse(name: &str) -> Option<Square> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Square::from_file_rank(file - b'a', rank - b'1')
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    pub fn indices(self) -> (usize, usize) {
        (self.row(), self.col())
    }

    /// Zero-based file (a = 0).
    pub fn file(self) -> u8 {
        self.col
    }

    /// Zero-based rank (rank 1 = 0).
    pub fn rank(self) -> u8 {
        7 - self.row
    }

    /// Square shifted by a (row, col) delta, if still on the board.
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Square> {
        Square::from_indices(self.row as i32 + d_row, self.col as i32 + d_col)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }

    pub fn to_shakmaty(self) -> shakmaty::Square {
        shakmaty::Square::from_coords(
            shakmaty::File::new(self.file() as u32),
            shakmaty::Rank::new(self.rank() as u32),
        )
    }

    pub fn from_shakmaty(sq: shakmaty::Square) -> Square {
        Square {
            row: 7 - sq.rank() as u8,
            col: sq.file() as u8,
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::parse(s).ok_or_else(|| NotationError::InvalidSquare(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = NotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> String {
        sq.to_string()
    }
}
