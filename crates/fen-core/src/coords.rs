//! Coordinate mapping and the two board transforms.
//!
//! `Direction` changes how stored squares are *interpreted* (a 180° logical
//! reflection); `Flip` only changes where squares are *drawn*. Every
//! stored-to-logic conversion goes through [`map_square`] / [`map_position`].

use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Reversed,
}

impl Direction {
    pub fn toggled(self) -> Direction {
        match self {
            Direction::Forward => Direction::Reversed,
            Direction::Reversed => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flip {
    #[default]
    WhiteBottom,
    BlackBottom,
}

impl Flip {
    pub fn toggled(self) -> Flip {
        match self {
            Flip::WhiteBottom => Flip::BlackBottom,
            Flip::BlackBottom => Flip::WhiteBottom,
        }
    }

    /// Stored square drawn at a screen cell (row 0 = top of the screen).
    pub fn square_at(self, screen_row: usize, screen_col: usize) -> Option<Square> {
        let sq = indices_to_square(screen_row as i32, screen_col as i32)?;
        Some(match self {
            Flip::WhiteBottom => sq,
            Flip::BlackBottom => reverse_square(sq),
        })
    }

    /// Screen cell of a stored square.
    pub fn screen_coords(self, square: Square) -> (usize, usize) {
        match self {
            Flip::WhiteBottom => square.indices(),
            Flip::BlackBottom => reverse_square(square).indices(),
        }
    }
}

pub fn square_to_indices(square: Square) -> (usize, usize) {
    square.indices()
}

pub fn indices_to_square(row: i32, col: i32) -> Option<Square> {
    Square::from_indices(row, col)
}

/// 180° point reflection: `(row, col) -> (7 - row, 7 - col)`.
pub fn reverse_square(square: Square) -> Square {
    let (row, col) = square.indices();
    // Both indices are in 0..8, so the reflection is on the board.
    Square::from_indices(7 - row as i32, 7 - col as i32).unwrap_or(square)
}

/// Reflects every occupied square and the en-passant target. Side to move,
/// castling and the clocks are untouched: this relabels geometry only.
pub fn reverse_position(position: &Position) -> Position {
    let mut reversed = position.clone();
    for (row, cells) in position.grid.iter().enumerate() {
        let mut cells = *cells;
        cells.reverse();
        reversed.grid[7 - row] = cells;
    }
    reversed.en_passant = position.en_passant.map(reverse_square);
    reversed
}

/// Stored square to logic square (and back: the mapping is an involution).
pub fn map_square(square: Square, direction: Direction) -> Square {
    match direction {
        Direction::Forward => square,
        Direction::Reversed => reverse_square(square),
    }
}

/// Stored position to logic position (and back).
pub fn map_position(position: &Position, direction: Direction) -> Position {
    match direction {
        Direction::Forward => position.clone(),
        Direction::Reversed => reverse_position(position),
    }
}
