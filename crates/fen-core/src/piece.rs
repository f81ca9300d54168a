//! Piece, piece kind and color values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Side-to-move token used in the notation.
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Kinds a pawn may promote to, in palette order.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Lowercase notation letter.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn to_role(self) -> shakmaty::Role {
        match self {
            PieceKind::Pawn => shakmaty::Role::Pawn,
            PieceKind::Knight => shakmaty::Role::Knight,
            PieceKind::Bishop => shakmaty::Role::Bishop,
            PieceKind::Rook => shakmaty::Role::Rook,
            PieceKind::Queen => shakmaty::Role::Queen,
            PieceKind::King => shakmaty::Role::King,
        }
    }

    pub fn from_role(role: shakmaty::Role) -> PieceKind {
        match role {
            shakmaty::Role::Pawn => PieceKind::Pawn,
            shakmaty::Role::Knight => PieceKind::Knight,
            shakmaty::Role::Bishop => PieceKind::Bishop,
            shakmaty::Role::Rook => PieceKind::Rook,
            shakmaty::Role::Queen => PieceKind::Queen,
            shakmaty::Role::King => PieceKind::King,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Uppercase for white, lowercase for black.
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { kind, color })
    }

    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    /// All twelve piece/color combinations offered by the editing palette.
    pub fn all() -> impl Iterator<Item = Piece> {
        [Color::White, Color::Black]
            .into_iter()
            .flat_map(|color| PieceKind::ALL.into_iter().map(move |kind| Piece { kind, color }))
    }
}
