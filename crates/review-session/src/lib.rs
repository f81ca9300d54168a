//! Review session coordinator.
//!
//! Owns the one live [`fen_core::BoardEditor`], talks to the analysis and
//! recognition providers over HTTP, and publishes the current board view on a
//! `watch` channel.

pub mod client;
pub mod error;
pub mod provider;
pub mod session;
pub mod settings;

pub use client::HttpProvider;
pub use error::ProviderError;
pub use provider::{AnalysisProvider, RecognitionProvider};
pub use session::{AnalysisOutcome, AnalysisTicket, ReviewSession, SessionView};
pub use settings::Settings;
