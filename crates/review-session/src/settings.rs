use std::env;

use fen_core::analysis::{DEFAULT_DEPTH, DEFAULT_LINES};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Base URL shared by the analysis and recognition endpoints.
    pub base_url: String,
    pub depth: u32,
    pub lines: u32,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            depth: DEFAULT_DEPTH,
            lines: DEFAULT_LINES,
            timeout_secs: 120,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            base_url: env::var("PROVIDER_BASE_URL").unwrap_or(defaults.base_url),
            depth: env::var("ANALYSIS_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.depth),
            lines: env::var("ANALYSIS_LINES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lines),
            timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
