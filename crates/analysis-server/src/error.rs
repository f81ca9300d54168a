use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the UCI engine process.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to spawn Stockfish: {0}")]
    Spawn(String),

    #[error("Stockfish I/O error: {0}")]
    Io(String),

    #[error("Stockfish engine terminated unexpectedly.")]
    Terminated,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Stockfish engine is not available on the server.")]
    EngineUnavailable,

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::EngineUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Engine(e) => {
                tracing::error!("Engine error: {e}");
                let message = match e {
                    EngineError::Terminated => e.to_string(),
                    _ => format!("Engine error: {e}"),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
