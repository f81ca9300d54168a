//! Step-through playback of an engine's principal variation.

use tracing::debug;

use crate::position::Position;
use crate::rules::RulesEngine;

/// Snapshots of the anchor and of every PV move that applied cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    snapshots: Vec<Position>,
    index: usize,
}

impl Playback {
    /// Replays `pv` from `anchor`, stopping before the first token that fails
    /// to parse or is illegal. An anchor the rules engine rejects yields a
    /// playback holding only the anchor.
    pub fn build<S: AsRef<str>>(anchor: &Position, pv: &[S]) -> Playback {
        let mut snapshots = vec![anchor.clone()];

        if let Some(mut engine) = RulesEngine::from_position(anchor) {
            for token in pv {
                match engine.play_san(token.as_ref()) {
                    Ok(next) => snapshots.push(next),
                    Err(e) => {
                        debug!(token = token.as_ref(), error = %e, "Playback truncated");
                        break;
                    }
                }
            }
        }

        Playback {
            snapshots,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn snapshots(&self) -> &[Position] {
        &self.snapshots
    }

    pub fn anchor(&self) -> &Position {
        &self.snapshots[0]
    }

    pub fn current(&self) -> &Position {
        &self.snapshots[self.index]
    }

    /// Moves one ply forward; `None` (and no change) at the end.
    pub fn step_forward(&mut self) -> Option<&Position> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Moves one ply back; `None` (and no change) at the anchor.
    pub fn step_backward(&mut self) -> Option<&Position> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Returns to the anchor; `None` if already there.
    pub fn reset(&mut self) -> Option<&Position> {
        if self.index == 0 {
            return None;
        }
        self.index = 0;
        Some(self.current())
    }
}
