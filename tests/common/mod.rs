#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use analysis_server::engine::SharedEngine;
use axum::Router;
use fen_core::analysis::{AnalysisLine, AnalysisRequest, AnalysisResponse, Evaluation};
use fen_core::{Position, Square};
use review_session::{AnalysisProvider, ProviderError, ReviewSession, Settings};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// The real analysis server with no engine process behind it.
pub async fn spawn_engineless_server() -> String {
    let engine: SharedEngine = Arc::new(tokio::sync::Mutex::new(None));
    spawn(analysis_server::app(engine)).await
}

pub fn settings(base_url: &str) -> Settings {
    Settings::default().with_base_url(base_url)
}

pub fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

pub fn session(fen: &str) -> ReviewSession {
    ReviewSession::new(Settings::default(), Position::parse(fen))
}

/// One-line success response following `pv` (SAN).
pub fn success(pv: &[&str]) -> AnalysisResponse {
    AnalysisResponse {
        status: "success".to_string(),
        lines: vec![AnalysisLine {
            best_move: "e2e4".to_string(),
            best_move_san: pv.first().copied().unwrap_or_default().to_string(),
            evaluation: Evaluation::cp(31),
            pv: pv.iter().map(|s| s.to_string()).collect(),
        }],
        depth: 14,
        engine: "Stockfish 16.1".to_string(),
    }
}

/// Analysis provider answering every request with the same result.
pub struct CannedProvider {
    result: Result<AnalysisResponse, ProviderError>,
    pub requests: Mutex<Vec<AnalysisRequest>>,
}

impl CannedProvider {
    pub fn new(result: Result<AnalysisResponse, ProviderError>) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl AnalysisProvider for CannedProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}
