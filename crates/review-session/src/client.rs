use std::time::Duration;

use fen_core::analysis::{AnalysisRequest, AnalysisResponse};
use fen_core::Position;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::provider::{AnalysisProvider, RecognitionProvider};
use crate::settings::Settings;

/// HTTP client for both providers, which share one base URL.
pub struct HttpProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    status: String,
    fen: Option<String>,
    message: Option<String>,
    processing_time_seconds: Option<f64>,
}

impl HttpProvider {
    pub fn new(settings: &Settings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("FenBoard/1.0")
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl AnalysisProvider for HttpProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ProviderError> {
        debug!(fen = %request.fen, "Requesting analysis");
        let resp = self
            .client
            .post(self.url("/analyze_position/"))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let err = error_for_status(status, &text);
            warn!(%status, "Analysis failed: {err}");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

impl RecognitionProvider for HttpProvider {
    async fn recognize(&self, image: Vec<u8>, file_name: &str) -> Result<Position, ProviderError> {
        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("/recognize_board/"))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        let body: RecognitionResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => return Err(error_for_status(status, &text)),
            Err(e) => return Err(ProviderError::Decode(e.to_string())),
        };

        match (body.status.as_str(), body.fen) {
            ("success", Some(fen)) => {
                debug!(
                    fen = %fen,
                    seconds = body.processing_time_seconds.unwrap_or_default(),
                    "Board recognized"
                );
                Ok(Position::parse(&fen))
            }
            _ => {
                let message = body
                    .message
                    .or_else(|| detail_message(&text))
                    .unwrap_or_else(|| format!("HTTP {status}"));
                warn!(%status, "Recognition failed: {message}");
                Err(ProviderError::Recognition(message))
            }
        }
    }
}

/// Best available message from an error body: `detail` (a string, or the
/// validation error list), then `message`.
fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) if !other.is_null() => Some(other.to_string()),
        _ => value.get("message").and_then(|v| v.as_str()).map(str::to_string),
    }
}

fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
    let message = detail_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    match status {
        StatusCode::BAD_REQUEST => ProviderError::InvalidNotation(message),
        StatusCode::SERVICE_UNAVAILABLE => ProviderError::EngineUnavailable(message),
        _ => ProviderError::Internal(message),
    }
}
