//! In-memory `JobRepository` for tests. The upsert holds one lock across the
//! existence check and the insert, giving the same single-winner behavior as the
//! Postgres unique constraint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::AppError;
use crate::jobs::repository::JobRepository;
use crate::models::job::{JobRecord, NewJob, SearchHit};

#[derive(Default)]
pub struct InMemoryJobRepository {
    records: Mutex<HashMap<String, JobRecord>>,
    inserts: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Number of upserts that actually created a record.
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Number of repository calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seed(&self, record: JobRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.job_id.clone(), record);
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_id(&self, job_id: &str) -> Result<Option<JobRecord>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.records.lock().unwrap().get(job_id).cloned())
    }

    async fn find_by_title_substring(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let needle = query.to_lowercase();
        let records = self.records.lock().unwrap();

        let mut matches: Vec<&JobRecord> = records
            .values()
            .filter(|r| r.job_title.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matches
            .into_iter()
            .take(limit.max(0) as usize)
            .map(SearchHit::from)
            .collect())
    }

    async fn upsert_if_absent(&self, job: NewJob) -> Result<JobRecord, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let mut records = self.records.lock().unwrap();
        let record = records.entry(job.job_id.clone()).or_insert_with(|| {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            job.into_record(Utc::now())
        });
        Ok(record.clone())
    }
}
