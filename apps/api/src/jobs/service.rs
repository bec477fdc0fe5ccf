//! Job Resolution Service: turns raw user text into one canonical, persisted
//! risk analysis, and answers title searches.
//!
//! Flow: normalize → lookup(raw id) → validate → normalize(standardized) →
//!       lookup(canonical id) → generate → upsert_if_absent.
//!
//! No locks are taken here. The repository's upsert is the only serialization
//! point between concurrent resolutions of the same title.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::AppError;
use crate::jobs::normalize::normalize_id;
use crate::jobs::repository::{JobRepository, DEFAULT_SEARCH_LIMIT};
use crate::jobs::risk::RiskGenerator;
use crate::jobs::validator::{RoleValidator, ValidationError};
use crate::models::job::{JobRecord, NewJob, SearchHit};

#[derive(Clone)]
pub struct JobService {
    repository: Arc<dyn JobRepository>,
    validator: RoleValidator,
    generator: RiskGenerator,
}

impl JobService {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        validator: RoleValidator,
        generator: RiskGenerator,
    ) -> Self {
        Self {
            repository,
            validator,
            generator,
        }
    }

    /// Returns the stored analysis for `raw_input`, creating it on first sight.
    pub async fn resolve(&self, raw_input: &str) -> Result<JobRecord, AppError> {
        // Step 1: cheap local normalization
        let raw_id = normalize_id(raw_input);
        if raw_id.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "'{raw_input}' has no usable characters"
            )));
        }

        // Step 2: already-canonical repeat queries never reach the oracle
        if let Some(existing) = self.repository.find_by_id(&raw_id).await? {
            debug!("Cache hit for raw id '{raw_id}'");
            return Ok(existing);
        }

        // Step 3: validate
        let validated = self
            .validator
            .validate(raw_input)
            .await
            .map_err(|e| match e {
                ValidationError::Configuration(msg) => AppError::Configuration(msg),
                ValidationError::Unavailable(msg) => AppError::ValidationUnavailable(msg),
            })?;

        if !validated.is_valid || validated.standardized_role.is_empty() {
            return Err(AppError::NotAProfession);
        }

        // Step 4: canonical id from the standardized title
        let canonical_id = normalize_id(&validated.standardized_role);
        if canonical_id.is_empty() {
            return Err(AppError::InvalidCanonicalForm(
                validated.standardized_role.clone(),
            ));
        }

        // Step 5: synonyms of an already-resolved title share its record
        if canonical_id != raw_id {
            if let Some(existing) = self.repository.find_by_id(&canonical_id).await? {
                debug!("Cache hit for canonical id '{canonical_id}' (raw '{raw_id}')");
                return Ok(existing);
            }
        }

        // Step 6: generate and persist; the store decides the winner
        let analysis = self.generator.generate(&validated.standardized_role).await;
        let industry = if validated.industry.is_empty() {
            analysis.industry
        } else {
            validated.industry
        };

        let record = self
            .repository
            .upsert_if_absent(NewJob {
                job_id: canonical_id,
                job_title: validated.standardized_role,
                industry,
                risk_score: analysis.risk_score,
                risk_level: analysis.risk_level,
                automation_percentage: analysis.automation_percentage,
                time_horizon: analysis.time_horizon,
                reason: analysis.reason,
                future_skills: analysis.future_skills,
            })
            .await?;

        info!(
            "Resolved '{}' → '{}' ({} risk, score {})",
            raw_input.trim(),
            record.job_id,
            record.risk_level,
            record.risk_score
        );
        Ok(record)
    }

    /// Title-prefix/substring search. Blank queries return nothing without touching the store.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        self.repository
            .find_by_title_substring(trimmed, DEFAULT_SEARCH_LIMIT)
            .await
    }
}
