use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::{JobRecord, SearchHit};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /api/job/:job_id
/// Resolves free text (a title or a previously returned jobId) to its analysis.
pub async fn handle_get_job(
    State(state): State<AppState>,
    job_id: Result<Path<String>, PathRejection>,
) -> Result<Json<JobRecord>, AppError> {
    let Path(job_id) = job_id.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let record = state.jobs.resolve(&job_id).await?;
    Ok(Json(record))
}

/// GET /api/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let hits = state
        .jobs
        .search(params.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(hits))
}
