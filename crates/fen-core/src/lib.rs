//! Position model and board-interaction core.
//!
//! The six-field notation codec, coordinate transforms, occupancy-only and
//! rules-aware move generation, the board editor state machine and the
//! principal-variation playback controller. Everything here is synchronous
//! and side-effect free apart from `tracing` events.

pub mod analysis;
pub mod coords;
pub mod editor;
pub mod error;
pub mod labels;
pub mod piece;
pub mod playback;
pub mod position;
pub mod pseudo;
pub mod rules;
pub mod square;

pub use coords::{Direction, Flip};
pub use editor::{BoardEditor, BoardView, CandidateMove, Effect, EditorMode, EditorState, PaletteChoice};
pub use error::{NotationError, RulesError};
pub use piece::{Color, Piece, PieceKind};
pub use playback::Playback;
pub use position::{Position, STARTING_FEN};
pub use rules::RulesEngine;
pub use square::Square;
