//! Persistence boundary for job analyses.
//!
//! Records are append-only: `upsert_if_absent` inserts when the canonical id is
//! new and otherwise returns the stored record untouched. Concurrent creators of
//! the same id all receive the single winning row.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::LazyPool;
use crate::errors::AppError;
use crate::models::job::{JobRecord, JobRow, NewJob, SearchHit};

pub const DEFAULT_SEARCH_LIMIT: i64 = 5;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_by_id(&self, job_id: &str) -> Result<Option<JobRecord>, AppError>;

    /// Case-insensitive substring match on the title, newest first.
    async fn find_by_title_substring(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, AppError>;

    /// Inserts `job` unless a record with the same `job_id` exists; returns the stored record.
    async fn upsert_if_absent(&self, job: NewJob) -> Result<JobRecord, AppError>;
}

/// Escapes `\`, `%` and `_` so user text matches literally inside `LIKE ... ESCAPE '\'`.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn into_record(row: JobRow) -> Result<JobRecord, AppError> {
    JobRecord::try_from(row).map_err(AppError::Persistence)
}

pub struct PgJobRepository {
    pool: Arc<LazyPool>,
}

impl PgJobRepository {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self { pool }
    }

    async fn pool(&self) -> Result<&PgPool, AppError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn find_by_id(&self, job_id: &str) -> Result<Option<JobRecord>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(self.pool().await?)
            .await?;

        row.map(into_record).transpose()
    }

    async fn find_by_title_substring(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, AppError> {
        let pattern = format!("%{}%", escape_like(query));

        Ok(sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT job_id, job_title, industry
            FROM jobs
            WHERE job_title ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool().await?)
        .await?)
    }

    async fn upsert_if_absent(&self, job: NewJob) -> Result<JobRecord, AppError> {
        let pool = self.pool().await?;

        // ON CONFLICT DO NOTHING returns no row when another writer already holds the id.
        let inserted = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (id, job_id, job_title, industry, risk_score, risk_level,
                 automation_percentage, time_horizon, reason, future_skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (job_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.job_id)
        .bind(&job.job_title)
        .bind(&job.industry)
        .bind(job.risk_score)
        .bind(job.risk_level.as_str())
        .bind(job.automation_percentage)
        .bind(&job.time_horizon)
        .bind(&job.reason)
        .bind(&job.future_skills)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = inserted {
            info!("Inserted job analysis '{}'", job.job_id);
            return into_record(row);
        }

        debug!("Job '{}' already exists; returning stored record", job.job_id);
        let existing = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1")
            .bind(&job.job_id)
            .fetch_optional(pool)
            .await?;

        existing.map(into_record).transpose()?.ok_or_else(|| {
            AppError::Persistence(format!(
                "upsert for '{}' neither inserted nor found a record",
                job.job_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("c++"), "c++");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("data_entry"), "data\\_entry");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like(".*(dev)"), ".*(dev)");
    }
}
