use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness only: reports whether the pool has connected, never connects itself.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobrisk-api",
        "model": state.config.gemini_model,
        "database": if state.pool.is_initialized() { "connected" } else { "pending" },
    }))
}
