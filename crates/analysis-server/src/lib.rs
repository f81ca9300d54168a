//! Engine-backed analysis provider.
//!
//! Wraps one Stockfish process behind `POST /analyze_position/`. Responses use
//! the wire types from `fen_core::analysis`; failures are `{"detail": ...}`.

pub mod config;
pub mod engine;
pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::engine::SharedEngine;

pub fn app(engine: SharedEngine) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/analyze_position/", post(routes::analyze::analyze_position))
        .layer(Extension(engine))
        .layer(cors)
}
