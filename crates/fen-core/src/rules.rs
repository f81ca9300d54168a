//! Rules-aware move engine backed by shakmaty.
//!
//! Construction fails (returns `None`) whenever the notation is not a legal
//! game state; callers fall back to [`crate::pseudo`] in that case.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position as _, PositionError};
use tracing::debug;

use crate::error::RulesError;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

/// One legal move; castling is expressed as the king's two-square step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone)]
pub struct RulesEngine {
    chess: Chess,
}

impl RulesEngine {
    /// `None` when the string is malformed or describes an impossible
    /// position. Stale castling rights and en-passant squares are dropped
    /// rather than rejected.
    pub fn from_fen(text: &str) -> Option<RulesEngine> {
        let fen: Fen = match text.trim().parse() {
            Ok(f) => f,
            Err(e) => {
                debug!(fen = text, error = %e, "Rules engine unavailable: unparseable FEN");
                return None;
            }
        };

        match fen
            .into_position::<Chess>(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
        {
            Ok(chess) => Some(Self { chess }),
            Err(e) => {
                debug!(fen = text, error = %e, "Rules engine unavailable: illegal position");
                None
            }
        }
    }

    pub fn from_position(position: &Position) -> Option<RulesEngine> {
        Self::from_fen(&position.serialize())
    }

    /// Current position in the codec's representation.
    pub fn position(&self) -> Position {
        let fen = Fen::from_position(&self.chess, EnPassantMode::Legal);
        Position::parse(&fen.to_string())
    }

    pub fn moves_from(&self, from: Square) -> Vec<LegalMove> {
        let origin = from.to_shakmaty();
        self.chess
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(origin))
            .filter_map(|m| match m.to_uci(CastlingMode::Standard) {
                UciMove::Normal {
                    from,
                    to,
                    promotion,
                } => Some(LegalMove {
                    from: Square::from_shakmaty(from),
                    to: Square::from_shakmaty(to),
                    promotion: promotion.map(PieceKind::from_role),
                }),
                _ => None,
            })
            .collect()
    }

    /// Plays a move given by squares; the engine advances on success.
    pub fn play(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Position, RulesError> {
        let uci = UciMove::Normal {
            from: from.to_shakmaty(),
            to: to.to_shakmaty(),
            promotion: promotion.map(PieceKind::to_role),
        };
        let mv = uci
            .to_move(&self.chess)
            .map_err(|_| RulesError::IllegalMove(uci.to_string()))?;
        self.chess.play_unchecked(mv);
        Ok(self.position())
    }

    /// Plays a move in short algebraic notation (`+`/`#` suffixes allowed).
    pub fn play_san(&mut self, token: &str) -> Result<Position, RulesError> {
        let san: SanPlus = token
            .trim()
            .parse()
            .map_err(|_| RulesError::InvalidSan(token.to_string()))?;
        let mv = san
            .san
            .to_move(&self.chess)
            .map_err(|_| RulesError::IllegalMove(token.to_string()))?;
        self.chess.play_unchecked(mv);
        Ok(self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::STARTING_FEN;

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    #[test]
    fn test_starting_position_is_available() {
        let engine = RulesEngine::from_fen(STARTING_FEN).unwrap();
        let moves = engine.moves_from(sq("g1"));
        let mut targets: Vec<String> = moves.iter().map(|m| m.to.to_string()).collect();
        targets.sort();
        assert_eq!(targets, vec!["f3", "h3"]);
    }

    #[test]
    fn test_impossible_positions_are_unavailable() {
        // Two white kings.
        assert!(RulesEngine::from_fen("4k3/8/8/8/8/8/8/K3K3 w - - 0 1").is_none());
        // Pawn on the back rank.
        assert!(RulesEngine::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").is_none());
        // No kings at all.
        assert!(RulesEngine::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_none());
        assert!(RulesEngine::from_fen("not a fen").is_none());
    }

    #[test]
    fn test_stale_castling_rights_are_tolerated() {
        let engine = RulesEngine::from_fen("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1");
        assert!(engine.is_some());
    }

    #[test]
    fn test_castling_uses_king_destination() {
        let engine = RulesEngine::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let moves = engine.moves_from(sq("e1"));
        assert!(moves.iter().any(|m| m.to == sq("g1")));
    }

    #[test]
    fn test_play_rejects_illegal_move() {
        let mut engine = RulesEngine::from_fen(STARTING_FEN).unwrap();
        let err = engine.play(sq("e2"), sq("e5"), None).unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
        let after = engine.play(sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(
            after.serialize(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_promotion_requires_a_piece() {
        let mut engine = RulesEngine::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(engine.play(sq("e7"), sq("e8"), None).is_err());
        let after = engine.play(sq("e7"), sq("e8"), Some(PieceKind::Queen)).unwrap();
        assert_eq!(after.placement(), "4Q2k/8/8/8/8/8/8/4K3");
    }

    #[test]
    fn test_play_san_accepts_suffixes() {
        let mut engine = RulesEngine::from_fen(STARTING_FEN).unwrap();
        engine.play_san("e4").unwrap();
        engine.play_san("e5").unwrap();
        let after = engine.play_san("Qh5").unwrap();
        assert_eq!(after.side_to_move, crate::piece::Color::Black);
        assert!(matches!(engine.play_san("Z9"), Err(RulesError::InvalidSan(_))));
        assert!(matches!(engine.play_san("Ke3"), Err(RulesError::IllegalMove(_))));
    }
}
