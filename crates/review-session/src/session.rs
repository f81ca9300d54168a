//! The review session: one live editor, at most one outstanding analysis, and
//! playback of the best line over the editor's position.

use fen_core::analysis::{AnalysisLine, AnalysisRequest, AnalysisResponse};
use fen_core::{
    BoardEditor, BoardView, Effect, PaletteChoice, PieceKind, Playback, Position, Square,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::provider::{AnalysisProvider, RecognitionProvider};
use crate::settings::Settings;

/// Handle for one analysis request. Only the newest ticket can be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub id: u64,
    pub request: AnalysisRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Applied,
    /// The position was edited while the request was in flight.
    Stale,
    /// A newer request was issued after this one.
    Superseded,
    /// The provider failed; the message is shown as is.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub lines: Vec<AnalysisLine>,
    pub depth: u32,
    pub engine: String,
    /// Line the playback follows.
    pub selected_line: usize,
    /// Current playback ply, 0 at the analysed position.
    pub ply: usize,
    pub plies: usize,
}

/// Everything a renderer needs after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub board: BoardView,
    pub analysis: Option<AnalysisSummary>,
    pub analyzing: bool,
    pub error: Option<String>,
}

struct Pending {
    id: u64,
    anchor: Position,
}

struct ActiveAnalysis {
    response: AnalysisResponse,
    selected_line: usize,
    playback: Playback,
}

impl ActiveAnalysis {
    fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            lines: self.response.lines.clone(),
            depth: self.response.depth,
            engine: self.response.engine.clone(),
            selected_line: self.selected_line,
            ply: self.playback.index(),
            plies: self.playback.len() - 1,
        }
    }
}

pub struct ReviewSession {
    editor: BoardEditor,
    settings: Settings,
    analysis: Option<ActiveAnalysis>,
    pending: Option<Pending>,
    last_error: Option<String>,
    next_ticket: u64,
    views: watch::Sender<SessionView>,
}

impl ReviewSession {
    pub fn new(settings: Settings, position: Position) -> Self {
        let editor = BoardEditor::new(position);
        let (views, _) = watch::channel(SessionView {
            board: editor.view(),
            analysis: None,
            analyzing: false,
            error: None,
        });
        Self {
            editor,
            settings,
            analysis: None,
            pending: None,
            last_error: None,
            next_ticket: 1,
            views,
        }
    }

    pub fn editor(&self) -> &BoardEditor {
        &self.editor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Receives a fresh [`SessionView`] after every visible change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.subscribe()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            board: self.editor.view(),
            analysis: self.analysis.as_ref().map(ActiveAnalysis::summary),
            analyzing: self.pending.is_some(),
            error: self.last_error.clone(),
        }
    }

    pub fn analysis(&self) -> Option<AnalysisSummary> {
        self.analysis.as_ref().map(ActiveAnalysis::summary)
    }

    pub fn is_analyzing(&self) -> bool {
        self.pending.is_some()
    }

    fn publish(&self) {
        self.views.send_replace(self.view());
    }

    /// Runs an editor transition and applies its effect to the session.
    fn edit(&mut self, action: impl FnOnce(&mut BoardEditor) -> Effect) -> Effect {
        let effect = action(&mut self.editor);
        if effect.invalidates_analysis() {
            if self.analysis.take().is_some() {
                debug!(?effect, "Analysis discarded");
            }
            self.last_error = None;
        }
        if effect != Effect::Unchanged {
            self.publish();
        }
        effect
    }

    pub fn tap(&mut self, display: Square) -> Effect {
        self.edit(|e| e.tap(display))
    }

    pub fn long_press(&mut self, display: Square) -> Effect {
        self.edit(|e| e.long_press(display))
    }

    pub fn choose_palette(&mut self, choice: PaletteChoice) -> Effect {
        self.edit(|e| e.choose_palette(choice))
    }

    pub fn choose_promotion(&mut self, kind: PieceKind) -> Effect {
        self.edit(|e| e.choose_promotion(kind))
    }

    pub fn cancel_promotion(&mut self) -> Effect {
        self.edit(|e| e.cancel_promotion())
    }

    pub fn toggle_side_to_move(&mut self) -> Effect {
        self.edit(|e| e.toggle_side_to_move())
    }

    pub fn toggle_direction(&mut self) -> Effect {
        self.edit(|e| e.toggle_direction())
    }

    pub fn toggle_flip(&mut self) -> Effect {
        self.edit(|e| e.toggle_flip())
    }

    /// Replaces the live position, e.g. with a recognition result.
    pub fn load_position(&mut self, position: Position) -> Effect {
        self.edit(|e| e.load(position))
    }

    /// Starts a request for the editor's current logic position. Any earlier
    /// outstanding request is superseded and the current analysis dropped.
    pub fn begin_analysis(&mut self) -> AnalysisTicket {
        let id = self.next_ticket;
        self.next_ticket += 1;

        let anchor = self.editor.logic_position();
        let request = AnalysisRequest {
            fen: anchor.serialize(),
            depth: Some(self.settings.depth),
            multipv: Some(self.settings.lines),
        };
        info!(id, fen = %request.fen, "Analysis requested");

        self.pending = Some(Pending { id, anchor });
        self.analysis = None;
        self.last_error = None;
        self.publish();

        AnalysisTicket { id, request }
    }

    /// Applies a provider result if `ticket` is still the newest request and
    /// the position has not been edited since it was issued.
    pub fn resolve_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: Result<AnalysisResponse, ProviderError>,
    ) -> AnalysisOutcome {
        let pending = match self.pending.take() {
            Some(p) if p.id == ticket.id => p,
            other => {
                self.pending = other;
                debug!(id = ticket.id, "Superseded analysis result dropped");
                return AnalysisOutcome::Superseded;
            }
        };

        let outcome = if pending.anchor != self.editor.logic_position() {
            warn!(id = ticket.id, "Stale analysis result dropped");
            AnalysisOutcome::Stale
        } else {
            match result {
                Ok(response) => self.apply_response(pending.anchor, response),
                Err(e) => {
                    warn!(id = ticket.id, "Analysis failed: {e}");
                    AnalysisOutcome::Failed(e.to_string())
                }
            }
        };

        if let AnalysisOutcome::Failed(message) = &outcome {
            self.last_error = Some(message.clone());
        }
        self.publish();
        outcome
    }

    fn apply_response(&mut self, anchor: Position, response: AnalysisResponse) -> AnalysisOutcome {
        let Some(best) = response.lines.first() else {
            return AnalysisOutcome::Failed("Engine returned no analysis.".to_string());
        };
        let playback = Playback::build(&anchor, &best.pv);
        info!(
            lines = response.lines.len(),
            plies = playback.len() - 1,
            "Analysis applied"
        );
        self.analysis = Some(ActiveAnalysis {
            response,
            selected_line: 0,
            playback,
        });
        AnalysisOutcome::Applied
    }

    /// Issues a request and waits for it. The session stays borrowed for the
    /// duration; callers needing to keep editing use `begin_analysis` and
    /// `resolve_analysis` directly.
    pub async fn analyze<P: AnalysisProvider>(&mut self, provider: &P) -> AnalysisOutcome {
        let ticket = self.begin_analysis();
        let result = provider.analyze(&ticket.request).await;
        self.resolve_analysis(&ticket, result)
    }

    /// Uploads a photo and loads the recognized position.
    pub async fn recognize<P: RecognitionProvider>(
        &mut self,
        provider: &P,
        image: Vec<u8>,
        file_name: &str,
    ) -> Result<Effect, ProviderError> {
        match provider.recognize(image, file_name).await {
            Ok(position) => Ok(self.load_position(position)),
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.publish();
                Err(e)
            }
        }
    }

    /// Switches playback to another analysis line, back at its start.
    pub fn select_line(&mut self, index: usize) -> bool {
        let Some(active) = self.analysis.as_mut() else {
            return false;
        };
        let Some(line) = active.response.lines.get(index) else {
            return false;
        };
        let anchor = active.playback.anchor().clone();
        active.playback = Playback::build(&anchor, &line.pv);
        active.selected_line = index;
        self.editor.show_logic(&anchor);
        self.publish();
        true
    }

    pub fn step_forward(&mut self) -> bool {
        self.step(Playback::step_forward)
    }

    pub fn step_backward(&mut self) -> bool {
        self.step(Playback::step_backward)
    }

    pub fn reset_playback(&mut self) -> bool {
        self.step(Playback::reset)
    }

    fn step(&mut self, f: impl FnOnce(&mut Playback) -> Option<&Position>) -> bool {
        let Some(active) = self.analysis.as_mut() else {
            return false;
        };
        let Some(target) = f(&mut active.playback).cloned() else {
            return false;
        };
        self.editor.show_logic(&target);
        self.publish();
        true
    }
}
