//! Board editor state machine.
//!
//! The editor owns the single live position plus the overlay state (selected
//! square, candidate destinations, pending promotion, palette target). Squares
//! passed in and out are *display* squares, i.e. stored-grid coordinates; all
//! move generation happens on the *logic* position obtained through
//! [`map_position`] under the current [`Direction`]. Rendering is pull-based:
//! callers read [`BoardEditor::view`] after each transition.

use serde::Serialize;
use tracing::debug;

use crate::coords::{map_position, map_square, Direction, Flip};
use crate::error::RulesError;
use crate::piece::{Color, Piece, PieceKind};
use crate::position::{Grid, Position};
use crate::pseudo::pseudo_destinations;
use crate::rules::RulesEngine;
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateMove {
    pub display_from: Square,
    pub display_to: Square,
    pub logic_from: Square,
    pub logic_to: Square,
    pub promotion: Option<PieceKind>,
    /// Applied by grid mutation, without legality checks.
    pub free: bool,
}

impl CandidateMove {
    fn new(logic_from: Square, logic_to: Square, direction: Direction, free: bool) -> Self {
        Self {
            display_from: map_square(logic_from, direction),
            display_to: map_square(logic_to, direction),
            logic_from,
            logic_to,
            promotion: None,
            free,
        }
    }

    fn with_promotion(self, kind: PieceKind) -> Self {
        Self {
            promotion: Some(kind),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    SquareSelected {
        square: Square,
        candidates: Vec<CandidateMove>,
    },
    AwaitingPromotion {
        candidate: CandidateMove,
    },
    EditingSquare {
        square: Square,
    },
}

impl EditorState {
    pub fn mode(&self) -> EditorMode {
        match self {
            EditorState::Idle => EditorMode::Idle,
            EditorState::SquareSelected { .. } => EditorMode::SquareSelected,
            EditorState::AwaitingPromotion { .. } => EditorMode::AwaitingPromotion,
            EditorState::EditingSquare { .. } => EditorMode::EditingSquare,
        }
    }

    fn is_modal(&self) -> bool {
        matches!(
            self,
            EditorState::AwaitingPromotion { .. } | EditorState::EditingSquare { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    Idle,
    SquareSelected,
    AwaitingPromotion,
    EditingSquare,
}

/// What a palette returns to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteChoice {
    Place(Piece),
    Clear,
    Cancel,
}

/// Outcome of a transition, ordered by how much it disturbs the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Effect {
    Unchanged,
    ViewChanged,
    AnalysisInvalidated,
    PositionChanged,
}

impl Effect {
    pub fn invalidates_analysis(self) -> bool {
        self >= Effect::AnalysisInvalidated
    }

    pub fn position_changed(self) -> bool {
        self == Effect::PositionChanged
    }
}

/// Render output of the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub position: Position,
    /// The stored grid in screen order (row 0 drawn at the top).
    pub screen: Grid,
    pub mode: EditorMode,
    pub selected: Option<Square>,
    pub highlights: Vec<Square>,
    pub pending_promotion: Option<CandidateMove>,
    pub editing: Option<Square>,
    pub flip: Flip,
    pub direction: Direction,
}

impl BoardView {
    /// Screen cells to highlight, after the visual flip.
    pub fn highlight_cells(&self) -> Vec<(usize, usize)> {
        self.highlights
            .iter()
            .map(|&sq| self.flip.screen_coords(sq))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BoardEditor {
    position: Position,
    state: EditorState,
    direction: Direction,
    flip: Flip,
}

impl Default for BoardEditor {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl BoardEditor {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            state: EditorState::Idle,
            direction: Direction::Forward,
            flip: Flip::WhiteBottom,
        }
    }

    pub fn from_fen(text: &str) -> Self {
        Self::new(Position::parse(text))
    }

    /// Stored position, as drawn.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Position as interpreted under the current direction.
    pub fn logic_position(&self) -> Position {
        map_position(&self.position, self.direction)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn flip(&self) -> Flip {
        self.flip
    }

    /// Replaces the position wholesale (scan result, navigation).
    pub fn load(&mut self, position: Position) -> Effect {
        self.position = position;
        self.state = EditorState::Idle;
        Effect::PositionChanged
    }

    /// Shows a logic-space position without counting as a user edit. Used by
    /// analysis playback, which shares the live position with the editor.
    pub fn show_logic(&mut self, logic: &Position) {
        self.position = map_position(logic, self.direction);
        self.state = EditorState::Idle;
    }

    /// Candidate moves for the piece drawn on `display`.
    pub fn candidates_for(&self, display: Square) -> Vec<CandidateMove> {
        let logic = self.logic_position();
        let logic_from = map_square(display, self.direction);

        match RulesEngine::from_position(&logic) {
            Some(engine) => {
                let mut candidates: Vec<CandidateMove> = Vec::new();
                for mv in engine.moves_from(logic_from) {
                    // Promotion variants collapse into one destination; the
                    // piece is chosen in AwaitingPromotion.
                    if candidates.iter().any(|c| c.logic_to == mv.to) {
                        continue;
                    }
                    candidates.push(CandidateMove::new(mv.from, mv.to, self.direction, false));
                }
                candidates
            }
            None => pseudo_destinations(&logic, logic_from)
                .into_iter()
                .map(|to| CandidateMove::new(logic_from, to, self.direction, true))
                .collect(),
        }
    }

    pub fn tap(&mut self, target: Square) -> Effect {
        let selection = match &self.state {
            EditorState::AwaitingPromotion { .. } | EditorState::EditingSquare { .. } => {
                return Effect::Unchanged;
            }
            EditorState::Idle => None,
            EditorState::SquareSelected { square, candidates } => Some((
                *square,
                candidates.iter().find(|c| c.display_to == target).copied(),
            )),
        };

        match selection {
            None => self.select(target),
            Some((selected, _)) if selected == target => {
                debug!(square = %target, "Deselect");
                self.state = EditorState::Idle;
                Effect::ViewChanged
            }
            Some((_, Some(candidate))) => self.commit(candidate),
            Some(_) if self.position.piece_at(target).is_some() => self.select(target),
            Some(_) => {
                self.state = EditorState::Idle;
                Effect::ViewChanged
            }
        }
    }

    pub fn choose_promotion(&mut self, kind: PieceKind) -> Effect {
        match self.state {
            EditorState::AwaitingPromotion { candidate } => self.apply(candidate.with_promotion(kind)),
            _ => Effect::Unchanged,
        }
    }

    pub fn cancel_promotion(&mut self) -> Effect {
        match self.state {
            EditorState::AwaitingPromotion { .. } => {
                self.state = EditorState::Idle;
                Effect::ViewChanged
            }
            _ => Effect::Unchanged,
        }
    }

    /// Opens the palette for `target`, from any state.
    pub fn long_press(&mut self, target: Square) -> Effect {
        debug!(square = %target, "Editing square");
        self.state = EditorState::EditingSquare { square: target };
        Effect::ViewChanged
    }

    pub fn choose_palette(&mut self, choice: PaletteChoice) -> Effect {
        let EditorState::EditingSquare { square } = self.state else {
            return Effect::Unchanged;
        };
        self.state = EditorState::Idle;

        match choice {
            PaletteChoice::Place(piece) => self.position.set_piece(square, Some(piece)),
            PaletteChoice::Clear => self.position.set_piece(square, None),
            PaletteChoice::Cancel => return Effect::ViewChanged,
        }
        debug!(square = %square, ?choice, "Square edited");
        Effect::PositionChanged
    }

    pub fn toggle_side_to_move(&mut self) -> Effect {
        if self.state.is_modal() {
            return Effect::Unchanged;
        }
        self.position.toggle_side_to_move();
        // Legal destinations depend on the side to move; keep the selection
        // but refresh what it offers.
        if let EditorState::SquareSelected { square, .. } = self.state {
            let candidates = self.candidates_for(square);
            self.state = EditorState::SquareSelected { square, candidates };
        }
        Effect::PositionChanged
    }

    pub fn toggle_direction(&mut self) -> Effect {
        self.direction = self.direction.toggled();
        if !matches!(self.state, EditorState::EditingSquare { .. }) {
            self.state = EditorState::Idle;
        }
        debug!(direction = ?self.direction, "Direction toggled");
        Effect::AnalysisInvalidated
    }

    pub fn toggle_flip(&mut self) -> Effect {
        self.flip = self.flip.toggled();
        Effect::ViewChanged
    }

    pub fn view(&self) -> BoardView {
        let mut screen: Grid = [[None; 8]; 8];
        for square in Square::all() {
            let (row, col) = self.flip.screen_coords(square);
            screen[row][col] = self.position.piece_at(square);
        }

        let (selected, highlights, pending_promotion, editing) = match &self.state {
            EditorState::Idle => (None, Vec::new(), None, None),
            EditorState::SquareSelected { square, candidates } => (
                Some(*square),
                candidates.iter().map(|c| c.display_to).collect(),
                None,
                None,
            ),
            EditorState::AwaitingPromotion { candidate } => (
                Some(candidate.display_from),
                vec![candidate.display_to],
                Some(*candidate),
                None,
            ),
            EditorState::EditingSquare { square } => (None, Vec::new(), None, Some(*square)),
        };

        BoardView {
            position: self.position.clone(),
            screen,
            mode: self.state.mode(),
            selected,
            highlights,
            pending_promotion,
            editing,
            flip: self.flip,
            direction: self.direction,
        }
    }

    fn select(&mut self, target: Square) -> Effect {
        if self.position.piece_at(target).is_none() {
            return match self.state {
                EditorState::Idle => Effect::Unchanged,
                _ => {
                    self.state = EditorState::Idle;
                    Effect::ViewChanged
                }
            };
        }
        let candidates = self.candidates_for(target);
        debug!(square = %target, count = candidates.len(), "Square selected");
        self.state = EditorState::SquareSelected {
            square: target,
            candidates,
        };
        Effect::ViewChanged
    }

    fn commit(&mut self, candidate: CandidateMove) -> Effect {
        if candidate.promotion.is_none() && self.reaches_promotion_rank(&candidate) {
            debug!(to = %candidate.display_to, "Awaiting promotion choice");
            self.state = EditorState::AwaitingPromotion { candidate };
            return Effect::ViewChanged;
        }
        self.apply(candidate)
    }

    /// Pawn landing on the far rank for its color, in logic coordinates.
    fn reaches_promotion_rank(&self, candidate: &CandidateMove) -> bool {
        let logic = self.logic_position();
        match logic.piece_at(candidate.logic_from) {
            Some(Piece {
                kind: PieceKind::Pawn,
                color,
            }) => match color {
                Color::White => candidate.logic_to.rank() == 7,
                Color::Black => candidate.logic_to.rank() == 0,
            },
            _ => false,
        }
    }

    fn apply(&mut self, candidate: CandidateMove) -> Effect {
        self.state = EditorState::Idle;
        let mut logic = self.logic_position();

        let result = if candidate.free {
            logic.move_piece_unchecked(candidate.logic_from, candidate.logic_to, candidate.promotion);
            Ok(logic)
        } else {
            RulesEngine::from_position(&logic)
                .ok_or(RulesError::Unavailable)
                .and_then(|mut engine| {
                    engine.play(candidate.logic_from, candidate.logic_to, candidate.promotion)
                })
        };

        match result {
            Ok(next) => {
                debug!(
                    from = %candidate.display_from,
                    to = %candidate.display_to,
                    free = candidate.free,
                    "Move applied"
                );
                self.position = map_position(&next, self.direction);
                Effect::PositionChanged
            }
            Err(e) => {
                debug!(error = %e, "Move dropped");
                Effect::ViewChanged
            }
        }
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
    fn test_tap_empty_square_stays_idle() {
        let mut editor = BoardEditor::default();
        assert_eq!(editor.tap(sq("e4")), Effect::Unchanged);
        assert_eq!(editor.state(), &EditorState::Idle);
    }

    #[test]
    fn test_select_and_move_legal_pawn() {
        let mut editor = BoardEditor::default();
        assert_eq!(editor.tap(sq("e2")), Effect::ViewChanged);
        let view = editor.view();
        assert_eq!(view.selected, Some(sq("e2")));
        let mut targets = view.highlights.clone();
        targets.sort();
        assert_eq!(targets, vec![sq("e4"), sq("e3")]);

        assert_eq!(editor.tap(sq("e4")), Effect::PositionChanged);
        assert_eq!(editor.state(), &EditorState::Idle);
        assert_eq!(
            editor.position().serialize(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_tap_selected_square_deselects() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("g1"));
        assert_eq!(editor.tap(sq("g1")), Effect::ViewChanged);
        assert_eq!(editor.state(), &EditorState::Idle);
    }

    #[test]
    fn test_tap_other_piece_switches_selection() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("g1"));
        editor.tap(sq("b1"));
        match editor.state() {
            EditorState::SquareSelected { square, candidates } => {
                assert_eq!(*square, sq("b1"));
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_tap_unrelated_empty_square_clears_selection() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("g1"));
        assert_eq!(editor.tap(sq("d5")), Effect::ViewChanged);
        assert_eq!(editor.state(), &EditorState::Idle);
        assert_eq!(editor.position().serialize(), STARTING_FEN);
    }

    #[test]
    fn test_wrong_side_piece_has_no_legal_candidates() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("e7"));
        assert!(editor.view().highlights.is_empty());
        assert_eq!(editor.view().mode, EditorMode::SquareSelected);
    }

    #[test]
    fn test_illegal_position_uses_free_moves() {
        // No kings: the rules engine is unavailable.
        let mut editor = BoardEditor::from_fen("8/8/8/8/3N4/8/8/8 w - - 0 1");
        editor.tap(sq("d4"));
        match editor.state() {
            EditorState::SquareSelected { candidates, .. } => {
                assert_eq!(candidates.len(), 8);
                assert!(candidates.iter().all(|c| c.free));
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(editor.tap(sq("f5")), Effect::PositionChanged);
        assert_eq!(editor.position().placement(), "8/8/8/5N2/8/8/8/8");
        // Free moves leave the side to move alone.
        assert_eq!(editor.position().side_to_move, Color::White);
    }

    #[test]
    fn test_promotion_waits_for_choice() {
        let mut editor = BoardEditor::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        editor.tap(sq("e7"));
        assert_eq!(editor.tap(sq("e8")), Effect::ViewChanged);
        assert_eq!(editor.view().mode, EditorMode::AwaitingPromotion);
        // Board is untouched until a piece is chosen.
        assert_eq!(editor.position().placement(), "7k/4P3/8/8/8/8/8/4K3");
        // Taps are ignored while the choice is pending.
        assert_eq!(editor.tap(sq("e1")), Effect::Unchanged);

        assert_eq!(editor.choose_promotion(PieceKind::Knight), Effect::PositionChanged);
        assert_eq!(editor.position().placement(), "4N2k/8/8/8/8/8/8/4K3");
        assert_eq!(editor.state(), &EditorState::Idle);
    }

    #[test]
    fn test_rejected_move_is_dropped() {
        let mut editor = BoardEditor::default();
        editor.state = EditorState::SquareSelected {
            square: sq("e2"),
            candidates: vec![CandidateMove::new(sq("e2"), sq("e5"), Direction::Forward, false)],
        };

        assert_eq!(editor.tap(sq("e5")), Effect::ViewChanged);
        assert_eq!(editor.state(), &EditorState::Idle);
        assert_eq!(editor.position().serialize(), STARTING_FEN);
    }

    #[test]
    fn test_cancel_promotion_keeps_position() {
        let mut editor = BoardEditor::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        editor.tap(sq("e7"));
        editor.tap(sq("e8"));
        assert_eq!(editor.cancel_promotion(), Effect::ViewChanged);
        assert_eq!(editor.state(), &EditorState::Idle);
        assert_eq!(editor.position().placement(), "7k/4P3/8/8/8/8/8/4K3");
    }

    #[test]
    fn test_free_promotion_uses_chosen_piece() {
        let mut editor = BoardEditor::from_fen("8/1P6/8/8/8/8/8/8");
        editor.tap(sq("b7"));
        editor.tap(sq("b8"));
        assert_eq!(editor.view().mode, EditorMode::AwaitingPromotion);
        editor.choose_promotion(PieceKind::Rook);
        assert_eq!(editor.position().placement(), "1R6/8/8/8/8/8/8/8");
    }

    #[test]
    fn test_palette_writes_and_clears() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("e2"));
        assert_eq!(editor.long_press(sq("e4")), Effect::ViewChanged);
        assert_eq!(editor.view().editing, Some(sq("e4")));
        // Side-to-move toggle is blocked while the palette is open.
        assert_eq!(editor.toggle_side_to_move(), Effect::Unchanged);

        let queen = Piece::new(PieceKind::Queen, Color::Black);
        assert_eq!(editor.choose_palette(PaletteChoice::Place(queen)), Effect::PositionChanged);
        assert_eq!(editor.position().piece_at(sq("e4")), Some(queen));
        assert_eq!(editor.state(), &EditorState::Idle);

        editor.long_press(sq("a1"));
        editor.choose_palette(PaletteChoice::Clear);
        assert_eq!(editor.position().piece_at(sq("a1")), None);

        editor.long_press(sq("h1"));
        assert_eq!(editor.choose_palette(PaletteChoice::Cancel), Effect::ViewChanged);
        assert!(editor.position().piece_at(sq("h1")).is_some());
    }

    #[test]
    fn test_toggle_side_twice_restores() {
        let mut editor = BoardEditor::default();
        assert_eq!(editor.toggle_side_to_move(), Effect::PositionChanged);
        assert_eq!(editor.position().side_to_move, Color::Black);
        editor.toggle_side_to_move();
        assert_eq!(editor.position().serialize(), STARTING_FEN);
    }

    #[test]
    fn test_toggle_side_refreshes_selection() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("e7"));
        assert!(editor.view().highlights.is_empty());
        editor.toggle_side_to_move();
        assert_eq!(editor.view().mode, EditorMode::SquareSelected);
        assert_eq!(editor.view().highlights.len(), 2);
    }

    #[test]
    fn test_direction_reversal_maps_through_logic_squares() {
        // Stored upside down: white pieces drawn at the top.
        let upside_down = crate::coords::reverse_position(&Position::default());
        let mut editor = BoardEditor::new(upside_down.clone());
        assert_eq!(editor.toggle_direction(), Effect::AnalysisInvalidated);
        assert_eq!(editor.logic_position(), Position::default());

        // The white e-pawn is drawn on d7.
        editor.tap(sq("d7"));
        let view = editor.view();
        let mut targets = view.highlights.clone();
        targets.sort();
        assert_eq!(targets, vec![sq("d6"), sq("d5")]);

        match editor.state() {
            EditorState::SquareSelected { candidates, .. } => {
                for c in candidates {
                    assert_eq!(c.logic_from, sq("e2"));
                    assert_eq!(c.display_from, sq("d7"));
                    assert_eq!(crate::coords::reverse_square(c.logic_to), c.display_to);
                }
            }
            other => panic!("unexpected state {other:?}"),
        }

        editor.tap(sq("d5"));
        assert_eq!(
            editor.logic_position().serialize(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert!(editor.position().piece_at(sq("d5")).is_some());
    }

    #[test]
    fn test_direction_toggle_clears_selection_not_grid() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("e2"));
        editor.toggle_direction();
        assert_eq!(editor.state(), &EditorState::Idle);
        assert_eq!(editor.position().serialize(), STARTING_FEN);
    }

    #[test]
    fn test_promotion_rank_follows_direction() {
        // Logic: white pawn on e7. Stored reversed, so it is drawn on d2.
        let logic = Position::parse("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let mut editor = BoardEditor::new(crate::coords::reverse_position(&logic));
        editor.toggle_direction();
        editor.tap(sq("d2"));
        editor.tap(sq("d1"));
        assert_eq!(editor.view().mode, EditorMode::AwaitingPromotion);
        editor.choose_promotion(PieceKind::Queen);
        assert_eq!(editor.logic_position().placement(), "4Q2k/8/8/8/8/8/8/4K3");
    }

    #[test]
    fn test_flip_changes_screen_only() {
        let mut editor = BoardEditor::default();
        editor.tap(sq("e2"));
        assert_eq!(editor.toggle_flip(), Effect::ViewChanged);
        assert_eq!(editor.view().mode, EditorMode::SquareSelected);
        let view = editor.view();
        // White rook from a1 is drawn top-right.
        assert_eq!(
            view.screen[0][7],
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert!(view.highlight_cells().contains(&(3, 3)));
        assert_eq!(editor.position().serialize(), STARTING_FEN);
    }

    #[test]
    fn test_effect_ordering() {
        assert!(Effect::PositionChanged.invalidates_analysis());
        assert!(Effect::AnalysisInvalidated.invalidates_analysis());
        assert!(!Effect::ViewChanged.invalidates_analysis());
        assert!(!Effect::AnalysisInvalidated.position_changed());
    }
}
