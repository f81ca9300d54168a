//! POST /analyze_position/: fixed-depth multi-PV analysis of one position.
use axum::{Extension, Json};
use fen_core::analysis::{
    AnalysisLine, AnalysisRequest, AnalysisResponse, Evaluation, DEFAULT_DEPTH, DEFAULT_LINES,
    MAX_DEPTH, MAX_LINES,
};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};
use tracing::info;

use crate::engine::{spawn_analysis, PvLine, SharedEngine};
use crate::error::AppError;

pub async fn analyze_position(
    Extension(engine): Extension<SharedEngine>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let (depth, multipv) = validate_parameters(&req)?;

    let slot = engine.lock_owned().await;
    if slot.is_none() {
        return Err(AppError::EngineUnavailable);
    }

    let pos = validate_position(&req.fen)?;
    let fen = Fen::from_position(&pos, EnPassantMode::Legal).to_string();

    let (raw_lines, engine_name) = spawn_analysis(slot, fen.clone(), depth, multipv)
        .await
        .map_err(|e| AppError::Internal(format!("Analysis task failed: {e}")))??;

    let lines: Vec<AnalysisLine> = raw_lines
        .iter()
        .filter_map(|line| build_line(&pos, line))
        .collect();

    if lines.is_empty() {
        return Err(AppError::Internal("Engine returned no analysis.".into()));
    }

    info!(fen = %fen, depth, lines = lines.len(), "Analysis complete");

    Ok(Json(AnalysisResponse {
        status: "success".to_string(),
        lines,
        depth,
        engine: engine_name,
    }))
}

/// Depth and line count with defaults applied.
pub fn validate_parameters(req: &AnalysisRequest) -> Result<(u32, u32), AppError> {
    let depth = req.depth.unwrap_or(DEFAULT_DEPTH);
    if !(1..=MAX_DEPTH).contains(&depth) {
        return Err(AppError::Validation(format!(
            "depth must be between 1 and {MAX_DEPTH}"
        )));
    }
    let multipv = req.multipv.unwrap_or(DEFAULT_LINES);
    if !(1..=MAX_LINES).contains(&multipv) {
        return Err(AppError::Validation(format!(
            "multipv must be between 1 and {MAX_LINES}"
        )));
    }
    Ok((depth, multipv))
}

pub fn validate_position(fen: &str) -> Result<Chess, AppError> {
    let setup: Fen = fen
        .trim()
        .parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid FEN: {e}")))?;

    let board = &setup.as_setup().board;
    let missing: Vec<&str> = [(Color::White, "white king"), (Color::Black, "black king")]
        .into_iter()
        .filter(|(color, _)| board.king_of(*color).is_none())
        .map(|(_, name)| name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Invalid FEN: missing {}",
            missing.join(" and ")
        )));
    }

    setup
        .into_position(CastlingMode::Standard)
        .map_err(|_| AppError::BadRequest("Invalid FEN: board state is not valid chess.".into()))
}

/// SAN rendering of an engine line with a White-relative score. PV moves
/// after the first one that does not replay are dropped; an empty PV yields
/// no line.
pub fn build_line(pos: &Chess, raw: &PvLine) -> Option<AnalysisLine> {
    let mut board = pos.clone();
    let mut pv_san = Vec::new();
    for token in &raw.pv {
        let Ok(uci) = token.parse::<UciMove>() else {
            break;
        };
        let Ok(mv) = uci.to_move(&board) else {
            break;
        };
        pv_san.push(SanPlus::from_move_and_play_unchecked(&mut board, mv).to_string());
    }

    let best_move_san = pv_san.first()?.clone();

    let sign = match pos.turn() {
        Color::White => 1,
        Color::Black => -1,
    };
    let evaluation = match (raw.mate, raw.cp) {
        (Some(mate), _) => Evaluation::mate(mate * sign),
        (None, Some(cp)) => Evaluation::cp(cp * sign),
        (None, None) => Evaluation::unknown(),
    };

    Some(AnalysisLine {
        best_move: raw.pv[0].clone(),
        best_move_san,
        evaluation,
        pv: pv_san,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fen_core::analysis::EvalKind;

    fn request(depth: Option<u32>, multipv: Option<u32>) -> AnalysisRequest {
        AnalysisRequest {
            fen: fen_core::STARTING_FEN.to_string(),
            depth,
            multipv,
        }
    }

    #[test]
    fn test_parameter_defaults_and_bounds() {
        assert_eq!(validate_parameters(&request(None, None)).unwrap(), (14, 1));
        assert_eq!(validate_parameters(&request(Some(40), Some(5))).unwrap(), (40, 5));
        assert!(matches!(
            validate_parameters(&request(Some(0), None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_parameters(&request(None, Some(6))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_kings_are_named() {
        let err = validate_position("8/8/8/8/8/8/8/8 w - - 0 1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid FEN: missing white king and black king");
        let err = validate_position("4k3/8/8/8/8/8/8/8 w - - 0 1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid FEN: missing white king");
    }

    #[test]
    fn test_invalid_board_state_rejected() {
        let err = validate_position("4k3/8/8/8/8/8/8/4K2P w - - 0 1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid FEN: board state is not valid chess.");
        assert!(validate_position("garbage").unwrap_err().to_string().starts_with("Invalid FEN"));
        assert!(validate_position(fen_core::STARTING_FEN).is_ok());
    }

    #[test]
    fn test_build_line_renders_san_with_suffixes() {
        let pos = validate_position(fen_core::STARTING_FEN).unwrap();
        let raw = PvLine {
            pv: vec!["f2f3".into(), "e7e5".into(), "g2g4".into(), "d8h4".into()],
            cp: None,
            mate: Some(-2),
        };
        let line = build_line(&pos, &raw).unwrap();
        assert_eq!(line.best_move, "f2f3");
        assert_eq!(line.best_move_san, "f3");
        assert_eq!(line.pv, vec!["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(line.evaluation, Evaluation::mate(-2));
    }

    #[test]
    fn test_build_line_scores_from_white_side() {
        let pos = validate_position(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let raw = PvLine {
            pv: vec!["c7c5".into()],
            cp: Some(-30),
            mate: None,
        };
        let line = build_line(&pos, &raw).unwrap();
        assert_eq!(line.evaluation.kind, EvalKind::Cp);
        assert_eq!(line.evaluation.value, Some(30));
        assert_eq!(line.pv, vec!["c5"]);
    }

    #[test]
    fn test_build_line_skips_empty_pv_and_truncates_bad_moves() {
        let pos = validate_position(fen_core::STARTING_FEN).unwrap();
        assert!(build_line(&pos, &PvLine::default()).is_none());

        let raw = PvLine {
            pv: vec!["e2e4".into(), "e2e4".into(), "g1f3".into()],
            cp: Some(20),
            mate: None,
        };
        let line = build_line(&pos, &raw).unwrap();
        assert_eq!(line.pv, vec!["e4"]);
        assert_eq!(line.evaluation.label(), "+0.20");
    }
}
