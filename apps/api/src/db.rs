use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Idempotent schema applied once per successful pool initialization.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id                    UUID PRIMARY KEY,
        job_id                TEXT NOT NULL UNIQUE,
        job_title             TEXT NOT NULL,
        industry              TEXT NOT NULL,
        risk_score            INTEGER NOT NULL CHECK (risk_score BETWEEN 0 AND 100),
        risk_level            TEXT NOT NULL CHECK (risk_level IN ('Low', 'Medium', 'High')),
        automation_percentage INTEGER NOT NULL CHECK (automation_percentage BETWEEN 0 AND 100),
        time_horizon          TEXT NOT NULL,
        reason                TEXT NOT NULL,
        future_skills         TEXT[] NOT NULL,
        created_at            TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS jobs_created_at_idx ON jobs (created_at DESC)",
];

/// A PostgreSQL pool that connects on first use.
///
/// At most one connection attempt is in flight; concurrent first callers wait on it.
/// A failed attempt leaves the cell empty, so the next caller tries again instead of
/// inheriting the error.
pub struct LazyPool {
    options: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
    cell: OnceCell<PgPool>,
}

impl LazyPool {
    pub fn new(
        database_url: &str,
        database_name: Option<&str>,
        max_connections: u32,
    ) -> Result<Self> {
        let mut options = PgConnectOptions::from_str(database_url)
            .context("DATABASE_URL is not a valid Postgres URL")?;
        if let Some(name) = database_name {
            options = options.database(name);
        }

        Ok(Self {
            options,
            max_connections,
            acquire_timeout: Duration::from_secs(10),
            cell: OnceCell::new(),
        })
    }

    #[cfg(test)]
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Returns the shared pool, connecting and applying the schema on first use.
    pub async fn get(&self) -> Result<&PgPool, sqlx::Error> {
        self.cell
            .get_or_try_init(|| async {
                info!("Connecting to PostgreSQL...");
                let pool = match self.connect().await {
                    Ok(pool) => pool,
                    Err(e) => {
                        warn!("PostgreSQL connection failed, will retry on next use: {e}");
                        return Err(e);
                    }
                };
                apply_schema(&pool).await?;
                info!("PostgreSQL connection pool established");
                Ok(pool)
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_with(self.options.clone())
            .await
    }
}

async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        assert!(LazyPool::new("not a url", None, 1).is_err());
    }

    #[test]
    fn test_database_name_override() {
        let pool = LazyPool::new("postgres://u:p@localhost/jobs_default", Some("override"), 1).unwrap();
        assert_eq!(pool.options.get_database(), Some("override"));
    }

    #[tokio::test]
    async fn test_failed_init_is_not_cached() {
        // Port 1 is reserved; the connection is refused immediately.
        let pool = LazyPool::new("postgres://u:p@127.0.0.1:1/jobs", None, 1)
            .unwrap()
            .with_acquire_timeout(Duration::from_millis(500));

        assert!(pool.get().await.is_err());
        assert!(!pool.is_initialized());
        assert!(pool.get().await.is_err());
        assert!(!pool.is_initialized());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_never_caches_failure() {
        let pool = std::sync::Arc::new(
            LazyPool::new("postgres://u:p@127.0.0.1:1/jobs", None, 1)
                .unwrap()
                .with_acquire_timeout(Duration::from_millis(500)),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.get().await.is_err() })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert!(!pool.is_initialized());
    }
}
