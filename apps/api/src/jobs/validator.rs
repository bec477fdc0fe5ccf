//! Role Validator: decides whether raw input names a real profession and
//! returns its standardized title.
//!
//! Chain: oracle → local heuristic. An oracle `is_valid=false` is an answer, not
//! a failure, so the heuristic only runs when the oracle call itself fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::jobs::fallback::{FallbackChain, Stage};
use crate::jobs::normalize::{infer_industry, looks_like_profession, standardize_display_title};
use crate::jobs::prompts::role_validation_prompt;
use crate::llm_client::prompts::PRECISE_TEMPERATURE;
use crate::llm_client::{GeminiClient, LlmError};

pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Clone, PartialEq)]
pub struct RoleValidation {
    pub is_valid: bool,
    pub standardized_role: String,
    pub industry: String,
}

/// Escalated validation failure once every stage has failed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Operator problem, e.g. the oracle credential is not configured.
    #[error("validator misconfigured: {0}")]
    Configuration(String),

    #[error("validator unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ValidationStageError {
    #[error(transparent)]
    Oracle(#[from] LlmError),

    #[error("local heuristic rejected the role")]
    Rejected,
}

#[derive(Debug, Deserialize)]
struct OracleVerdict {
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    standardized_role: String,
    #[serde(default)]
    industry: String,
}

/// Primary stage: asks the oracle, bounded by `timeout`.
pub struct OracleRoleStage {
    client: GeminiClient,
    timeout: Duration,
}

impl OracleRoleStage {
    pub fn new(client: GeminiClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Stage<str, RoleValidation, ValidationStageError> for OracleRoleStage {
    fn name(&self) -> &'static str {
        "oracle"
    }

    async fn attempt(&self, raw_input: &str) -> Result<RoleValidation, ValidationStageError> {
        let verdict: OracleVerdict = self
            .client
            .call_json_with_timeout(
                &role_validation_prompt(raw_input),
                PRECISE_TEMPERATURE,
                self.timeout,
            )
            .await?;

        let standardized_role = verdict.standardized_role.trim().to_string();
        let industry = match verdict.industry.trim() {
            "" if standardized_role.is_empty() => infer_industry(raw_input),
            "" => infer_industry(&standardized_role),
            industry => industry.to_string(),
        };

        Ok(RoleValidation {
            is_valid: verdict.is_valid,
            standardized_role,
            industry,
        })
    }
}

/// Offline stage: display-cases the input and applies the realism heuristic.
pub struct HeuristicRoleStage;

#[async_trait]
impl Stage<str, RoleValidation, ValidationStageError> for HeuristicRoleStage {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn attempt(&self, raw_input: &str) -> Result<RoleValidation, ValidationStageError> {
        let standardized_role = standardize_display_title(raw_input);
        if standardized_role.is_empty() || !looks_like_profession(&standardized_role) {
            return Err(ValidationStageError::Rejected);
        }

        Ok(RoleValidation {
            is_valid: true,
            industry: infer_industry(&standardized_role),
            standardized_role,
        })
    }
}

#[derive(Clone)]
pub struct RoleValidator {
    chain: FallbackChain<str, RoleValidation, ValidationStageError>,
}

impl RoleValidator {
    pub fn new(client: GeminiClient, timeout: Duration) -> Self {
        let chain: FallbackChain<str, RoleValidation, ValidationStageError> = FallbackChain::new();
        Self {
            chain: chain
                .then(Arc::new(OracleRoleStage::new(client, timeout)))
                .then(Arc::new(HeuristicRoleStage)),
        }
    }

    /// Validates `raw_input`. When every stage fails, the primary stage's
    /// failure decides the error kind.
    pub async fn validate(&self, raw_input: &str) -> Result<RoleValidation, ValidationError> {
        match self.chain.run(raw_input).await {
            Ok((stage, validation)) => {
                info!(
                    "Role '{}' validated by {stage}: valid={}, standardized='{}'",
                    raw_input, validation.is_valid, validation.standardized_role
                );
                Ok(validation)
            }
            Err(exhausted) => Err(match exhausted.into_primary() {
                Some(ValidationStageError::Oracle(e)) if e.is_configuration() => {
                    ValidationError::Configuration(e.to_string())
                }
                Some(e) => ValidationError::Unavailable(e.to_string()),
                None => ValidationError::Unavailable("no validation stages configured".into()),
            }),
        }
    }
}
