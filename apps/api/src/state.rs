use std::sync::Arc;

use crate::config::Config;
use crate::db::LazyPool;
use crate::jobs::service::JobService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobService,
    /// Same pool the repository uses; held here only to report readiness.
    pub pool: Arc<LazyPool>,
    pub config: Config,
}
