//! Six-field position notation codec.
//!
//! Parsing is lenient: short strings are padded with default trailing fields,
//! long strings are truncated to six fields, and placement characters beyond
//! eight columns are dropped. Only empty input has no reading, and the lenient
//! entry point maps it to the starting position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotationError;
use crate::piece::{Color, Piece};
use crate::square::Square;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Defaults for fields 2..=6 when a string is short.
const DEFAULT_FIELDS: [&str; 5] = ["w", "-", "-", "0", "1"];

pub type Grid = [[Option<Piece>; 8]; 8];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Position {
    /// Row 0 is rank 8, column 0 is the a-file.
    pub grid: Grid,
    pub side_to_move: Color,
    /// Castling field kept verbatim (`-` when none).
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    /// Lenient parse; never fails.
    pub fn parse(text: &str) -> Position {
        text.parse().unwrap_or_default()
    }

    pub fn empty() -> Position {
        Position {
            grid: [[None; 8]; 8],
            side_to_move: Color::White,
            castling: "-".to_string(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn serialize(&self) -> String {
        let placement = self
            .grid
            .iter()
            .map(encode_row)
            .collect::<Vec<_>>()
            .join("/");
        let en_passant = self
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            placement,
            self.side_to_move.fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Placement field only.
    pub fn placement(&self) -> String {
        self.grid.iter().map(encode_row).collect::<Vec<_>>().join("/")
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let (row, col) = square.indices();
        self.grid[row][col]
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        let (row, col) = square.indices();
        self.grid[row][col] = piece;
    }

    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
    }

    /// Moves whatever stands on `from` to `to` without any rule checks.
    /// A promotion kind replaces the moved piece, keeping its color.
    pub fn move_piece_unchecked(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<crate::piece::PieceKind>,
    ) {
        let Some(mut piece) = self.piece_at(from) else {
            return;
        };
        if let Some(kind) = promotion {
            piece.kind = kind;
        }
        self.set_piece(from, None);
        self.set_piece(to, Some(piece));
        self.en_passant = None;
    }
}

impl Default for Position {
    fn default() -> Self {
        // STARTING_FEN is non-empty, so the strict parse cannot fail.
        STARTING_FEN.parse().unwrap_or_else(|_| Position::empty())
    }
}

impl FromStr for Position {
    type Err = NotationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut fields: Vec<&str> = text.split_whitespace().take(6).collect();
        if fields.is_empty() {
            return Err(NotationError::InvalidNotation);
        }
        let missing = 6 - fields.len();
        fields.extend_from_slice(&DEFAULT_FIELDS[DEFAULT_FIELDS.len() - missing..]);

        Ok(Position {
            grid: decode_placement(fields[0]),
            side_to_move: if fields[1].eq_ignore_ascii_case("b") {
                Color::Black
            } else {
                Color::White
            },
            castling: fields[2].to_string(),
            en_passant: Square::parse(fields[3]),
            halfmove_clock: fields[4].parse().unwrap_or(0),
            fullmove_number: fields[5].parse().unwrap_or(1),
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl From<Position> for String {
    fn from(position: Position) -> String {
        position.serialize()
    }
}

impl From<String> for Position {
    fn from(text: String) -> Position {
        Position::parse(&text)
    }
}

fn decode_placement(placement: &str) -> Grid {
    let mut grid: Grid = [[None; 8]; 8];
    for (row, rank) in placement.split('/').take(8).enumerate() {
        let mut col = 0usize;
        for c in rank.chars() {
            if col >= 8 {
                break;
            }
            if let Some(run) = c.to_digit(10) {
                col = (col + run as usize).min(8);
            } else if let Some(piece) = Piece::from_fen_char(c) {
                grid[row][col] = Some(piece);
                col += 1;
            }
        }
    }
    grid
}

fn encode_row(row: &[Option<Piece>; 8]) -> String {
    let mut out = String::new();
    let mut empty = 0;
    for cell in row {
        match cell {
            Some(piece) => {
                if empty > 0 {
                    out.push_str(&empty.to_string());
                    empty = 0;
                }
                out.push(piece.fen_char());
            }
            None => empty += 1,
        }
    }
    if empty > 0 {
        out.push_str(&empty.to_string());
    }
    out
}
