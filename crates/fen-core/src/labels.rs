//! Detector label grids to placement strings.
//!
//! A recognizer reports one class name per square (`white-king`,
//! `black-pawn`, ...). Anything unrecognised counts as an empty square.

use crate::coords::reverse_position;
use crate::piece::{Color, Piece, PieceKind};
use crate::position::{Grid, Position};

pub fn piece_from_label(label: &str) -> Option<Piece> {
    let (color, kind) = label.trim().split_once('-')?;
    let color = match color {
        "white" => Color::White,
        "black" => Color::Black,
        _ => return None,
    };
    let kind = match kind {
        "king" => PieceKind::King,
        "queen" => PieceKind::Queen,
        "rook" => PieceKind::Rook,
        "bishop" => PieceKind::Bishop,
        "knight" => PieceKind::Knight,
        "pawn" => PieceKind::Pawn,
        _ => return None,
    };
    Some(Piece::new(kind, color))
}

pub fn grid_from_labels<S: AsRef<str>>(labels: &[[S; 8]; 8]) -> Grid {
    let mut grid: Grid = [[None; 8]; 8];
    for (row, cells) in labels.iter().enumerate() {
        for (col, label) in cells.iter().enumerate() {
            grid[row][col] = piece_from_label(label.as_ref());
        }
    }
    grid
}

/// Rotates the grid 180° when white pieces sit, on average, higher up the
/// image than black pieces. Unchanged when either color is missing.
pub fn orient_for_white(grid: &Grid) -> Grid {
    let mut white_rows = Vec::new();
    let mut black_rows = Vec::new();
    for (row, cells) in grid.iter().enumerate() {
        for piece in cells.iter().flatten() {
            match piece.color {
                Color::White => white_rows.push(row as f64),
                Color::Black => black_rows.push(row as f64),
            }
        }
    }

    if white_rows.is_empty() || black_rows.is_empty() {
        return *grid;
    }

    let mean = |rows: &[f64]| rows.iter().sum::<f64>() / rows.len() as f64;
    if mean(&white_rows) < mean(&black_rows) {
        let mut position = Position::empty();
        position.grid = *grid;
        reverse_position(&position).grid
    } else {
        *grid
    }
}

/// Oriented placement field for a label grid.
pub fn placement_from_labels<S: AsRef<str>>(labels: &[[S; 8]; 8]) -> String {
    let mut position = Position::empty();
    position.grid = orient_for_white(&grid_from_labels(labels));
    position.placement()
}
