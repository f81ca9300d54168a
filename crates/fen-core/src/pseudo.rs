//! Occupancy-only move generation for positions the rules engine rejects.
//!
//! Checks, pins, castling and en passant are ignored.

use crate::piece::{Color, PieceKind};
use crate::position::Position;
use crate::square::Square;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_RAYS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_RAYS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Row delta of a forward pawn step (row 0 is rank 8).
fn pawn_step(color: Color) -> i32 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

fn pawn_home_row(color: Color) -> usize {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}

/// Destinations for the piece on `from`. Empty when the square is empty.
pub fn pseudo_destinations(position: &Position, from: Square) -> Vec<Square> {
    let Some(piece) = position.piece_at(from) else {
        return Vec::new();
    };

    match piece.kind {
        PieceKind::Pawn => pawn_destinations(position, from, piece.color),
        PieceKind::Knight => step_destinations(position, from, piece.color, &KNIGHT_OFFSETS),
        PieceKind::King => step_destinations(position, from, piece.color, &KING_OFFSETS),
        PieceKind::Bishop => ray_destinations(position, from, piece.color, &BISHOP_RAYS),
        PieceKind::Rook => ray_destinations(position, from, piece.color, &ROOK_RAYS),
        PieceKind::Queen => {
            let mut moves = ray_destinations(position, from, piece.color, &ROOK_RAYS);
            moves.extend(ray_destinations(position, from, piece.color, &BISHOP_RAYS));
            moves
        }
    }
}

fn pawn_destinations(position: &Position, from: Square, color: Color) -> Vec<Square> {
    let step = pawn_step(color);
    let mut moves = Vec::new();

    if let Some(one) = from.offset(step, 0) {
        if position.piece_at(one).is_none() {
            moves.push(one);
            if from.row() == pawn_home_row(color) {
                if let Some(two) = from.offset(2 * step, 0) {
                    if position.piece_at(two).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        if let Some(target) = from.offset(step, d_col) {
            if matches!(position.piece_at(target), Some(p) if p.color != color) {
                moves.push(target);
            }
        }
    }

    moves
}

fn step_destinations(
    position: &Position,
    from: Square,
    color: Color,
    offsets: &[(i32, i32)],
) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(d_row, d_col)| from.offset(d_row, d_col))
        .filter(|&sq| !matches!(position.piece_at(sq), Some(p) if p.color == color))
        .collect()
}

fn ray_destinations(
    position: &Position,
    from: Square,
    color: Color,
    rays: &[(i32, i32)],
) -> Vec<Square> {
    let mut moves = Vec::new();
    for &(d_row, d_col) in rays {
        let mut current = from;
        while let Some(next) = current.offset(d_row, d_col) {
            match position.piece_at(next) {
                None => moves.push(next),
                Some(p) => {
                    if p.color != color {
                        moves.push(next);
                    }
                    break;
                }
            }
            current = next;
        }
    }
    moves
}
