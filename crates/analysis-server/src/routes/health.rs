use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};

use crate::engine::SharedEngine;

/// GET /health
pub async fn health_check(Extension(engine): Extension<SharedEngine>) -> Json<JsonValue> {
    let engine_ready = engine.lock().await.is_some();
    Json(json!({ "status": "ok", "engine": engine_ready }))
}
