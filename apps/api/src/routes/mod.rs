pub mod health;

use axum::{routing::get, Router};

use crate::jobs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/job/:job_id", get(handlers::handle_get_job))
        .route("/api/search", get(handlers::handle_search))
        .with_state(state)
}
