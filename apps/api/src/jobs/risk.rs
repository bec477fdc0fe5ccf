//! Risk Generator: turns a standardized title into a full risk analysis.
//!
//! Chain: keyword buckets → oracle scoring → local default. The last stage cannot
//! fail, so every title gets an analysis. Level, automation %, horizon, skills and
//! industry are derived the same way whichever stage produced the score.

use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::jobs::fallback::{FallbackChain, Stage};
use crate::jobs::normalize::infer_industry;
use crate::jobs::prompts::risk_scoring_prompt;
use crate::llm_client::prompts::REASONING_TEMPERATURE;
use crate::llm_client::{GeminiClient, LlmError};
use crate::models::job::RiskLevel;

pub const MIN_RISK_SCORE: i32 = 5;
pub const MAX_RISK_SCORE: i32 = 95;
pub const MIN_AUTOMATION: i32 = 15;
pub const MAX_AUTOMATION: i32 = 95;
pub const MAX_FUTURE_SKILLS: usize = 6;
const DEFAULT_SKILL_COUNT: usize = 4;
const MAX_JITTER: i32 = 100;

const SKILL_LIBRARY: &[&str] = &[
    "AI tool orchestration",
    "Prompt engineering",
    "Data literacy",
    "Critical thinking",
    "Complex problem solving",
    "Human communication",
    "Domain specialization",
    "Workflow automation",
    "Cross-functional collaboration",
    "Ethical AI oversight",
];

// ────────────────────────────────────────────────────────────────────────────
// Policy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub keywords: Vec<String>,
    pub base: i32,
}

/// Hand-tuned scoring constants. Overridable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Searched in order; first bucket with a keyword contained in the title wins.
    pub buckets: Vec<RiskBucket>,
    /// Score used when neither a bucket nor the oracle produced one.
    pub default_score: i32,
    /// Inclusive `[min, max]` added to a bucket's base score.
    pub bucket_jitter: (i32, i32),
    /// Inclusive `[min, max]` added to the score to get the automation percentage.
    pub automation_jitter: (i32, i32),
}

impl Default for RiskPolicy {
    fn default() -> Self {
        fn bucket(keywords: &[&str], base: i32) -> RiskBucket {
            RiskBucket {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                base,
            }
        }

        Self {
            buckets: vec![
                bucket(&["judge", "ias", "ips", "entrepreneur", "army", "navy"], 15),
                bucket(&["doctor", "nurse", "teacher", "electrician", "plumber", "police"], 30),
                bucket(&["developer", "engineer", "analyst", "accountant", "lawyer"], 45),
                bucket(&["manager", "consultant", "marketing", "hr", "banker"], 55),
                bucket(&["clerk", "cashier", "data entry", "telecaller", "bpo"], 75),
                bucket(&["driver", "delivery", "content writer", "graphic designer"], 80),
            ],
            default_score: 50,
            bucket_jitter: (-5, 8),
            automation_jitter: (-5, 10),
        }
    }
}

impl RiskPolicy {
    /// Loads the policy from `path`, or the built-in defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read risk policy from {}", path.display()))?;
        let policy: RiskPolicy = serde_json::from_str(&raw)
            .with_context(|| format!("Risk policy at {} is not valid JSON", path.display()))?;
        policy.check()?;
        info!(
            "Loaded risk policy from {} ({} buckets)",
            path.display(),
            policy.buckets.len()
        );
        Ok(policy)
    }

    fn check(&self) -> Result<()> {
        ensure!(
            self.bucket_jitter.0 <= self.bucket_jitter.1,
            "bucket_jitter min must not exceed max"
        );
        ensure!(
            self.automation_jitter.0 <= self.automation_jitter.1,
            "automation_jitter min must not exceed max"
        );
        ensure!(
            self.buckets.iter().all(|b| !b.keywords.is_empty()),
            "every bucket needs at least one keyword"
        );
        ensure!(
            self.buckets.iter().all(|b| (0..=100).contains(&b.base)),
            "bucket base scores must be within 0..=100"
        );
        ensure!(
            (0..=100).contains(&self.default_score),
            "default_score must be within 0..=100"
        );
        for (name, (min, max)) in [
            ("bucket_jitter", self.bucket_jitter),
            ("automation_jitter", self.automation_jitter),
        ] {
            let in_range = |v: i32| (-MAX_JITTER..=MAX_JITTER).contains(&v);
            ensure!(
                in_range(min) && in_range(max),
                "{name} bounds must be within -{MAX_JITTER}..={MAX_JITTER}"
            );
        }
        Ok(())
    }

    pub fn match_bucket(&self, title: &str) -> Option<&RiskBucket> {
        let lower = title.to_lowercase();
        self.buckets.iter().find(|b| {
            b.keywords
                .iter()
                .any(|k| lower.contains(k.to_lowercase().as_str()))
        })
    }
}

fn jitter((min, max): (i32, i32)) -> i32 {
    if min >= max {
        min
    } else {
        rand::thread_rng().gen_range(min..=max)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysis {
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub automation_percentage: i32,
    pub time_horizon: String,
    pub reason: String,
    pub future_skills: Vec<String>,
    pub industry: String,
}

/// What a stage contributes. Missing pieces are derived from the score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEstimate {
    pub score: i32,
    pub reason: Option<String>,
    pub future_skills: Vec<String>,
}

impl ScoreEstimate {
    fn score_only(score: i32) -> Self {
        Self {
            score,
            reason: None,
            future_skills: Vec::new(),
        }
    }
}

pub fn time_horizon(score: i32) -> &'static str {
    match score {
        s if s >= 75 => "5-10 years",
        s if s >= 55 => "10-15 years",
        s if s >= 35 => "15-20 years",
        _ => "20+ years",
    }
}

fn canned_reason(title: &str, score: i32) -> String {
    match score {
        s if s >= 75 => format!(
            "The role of {title} involves repetitive and structured tasks that AI systems can increasingly automate."
        ),
        s if s >= 55 => format!(
            "The role of {title} will be significantly augmented by AI tools, though human oversight remains important."
        ),
        s if s >= 35 => format!(
            "The role of {title} will collaborate with AI systems, improving productivity rather than replacing humans."
        ),
        _ => format!(
            "The role of {title} depends heavily on human judgment, creativity, or physical presence, making automation unlikely in the near future."
        ),
    }
}

/// A rotating slice of the skill library starting at `seed`.
fn pick_future_skills(seed: usize) -> Vec<String> {
    let start = seed % SKILL_LIBRARY.len();
    SKILL_LIBRARY
        .iter()
        .cycle()
        .skip(start)
        .take(DEFAULT_SKILL_COUNT)
        .map(|s| s.to_string())
        .collect()
}

fn finalize(title: &str, estimate: ScoreEstimate, policy: &RiskPolicy) -> RiskAnalysis {
    let score = estimate.score.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE);
    let automation_percentage =
        (score + jitter(policy.automation_jitter)).clamp(MIN_AUTOMATION, MAX_AUTOMATION);

    let future_skills = if estimate.future_skills.is_empty() {
        pick_future_skills(score as usize)
    } else {
        estimate
            .future_skills
            .into_iter()
            .take(MAX_FUTURE_SKILLS)
            .collect()
    };

    RiskAnalysis {
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        automation_percentage,
        time_horizon: time_horizon(score).to_string(),
        reason: estimate
            .reason
            .unwrap_or_else(|| canned_reason(title, score)),
        future_skills,
        industry: infer_industry(title),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stages
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RiskStageError {
    #[error("no keyword bucket matched")]
    NoBucketMatch,

    #[error(transparent)]
    Oracle(#[from] LlmError),
}

pub struct RuleBucketStage {
    policy: Arc<RiskPolicy>,
}

#[async_trait]
impl Stage<str, ScoreEstimate, RiskStageError> for RuleBucketStage {
    fn name(&self) -> &'static str {
        "rule-bucket"
    }

    async fn attempt(&self, title: &str) -> Result<ScoreEstimate, RiskStageError> {
        let bucket = self
            .policy
            .match_bucket(title)
            .ok_or(RiskStageError::NoBucketMatch)?;
        Ok(ScoreEstimate::score_only(
            bucket.base + jitter(self.policy.bucket_jitter),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct OracleRiskReply {
    #[serde(default)]
    risk_score: Value,
    #[serde(default)]
    reason: Value,
    #[serde(default)]
    future_skills: Value,
}

/// Accepts a JSON number or a numeric string; anything else is unusable.
fn numeric_score(value: &Value) -> Option<i32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite()
        .then(|| n.clamp(MIN_RISK_SCORE as f64, MAX_RISK_SCORE as f64).round() as i32)
}

pub struct OracleRiskStage {
    client: GeminiClient,
    policy: Arc<RiskPolicy>,
}

#[async_trait]
impl Stage<str, ScoreEstimate, RiskStageError> for OracleRiskStage {
    fn name(&self) -> &'static str {
        "oracle"
    }

    async fn attempt(&self, title: &str) -> Result<ScoreEstimate, RiskStageError> {
        let reply: OracleRiskReply = self
            .client
            .call_json(&risk_scoring_prompt(title), REASONING_TEMPERATURE)
            .await?;

        let score = numeric_score(&reply.risk_score).unwrap_or_else(|| {
            warn!("Oracle risk_score for '{title}' unusable; using default score");
            self.policy.default_score
        });

        let reason = reply
            .reason
            .as_str()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "The role of {title} will be gradually reshaped by AI adoption, with automation potential varying by workflow and specialization."
                )
            });

        let future_skills = reply
            .future_skills
            .as_array()
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ScoreEstimate {
            score,
            reason: Some(reason),
            future_skills,
        })
    }
}

pub struct LocalDefaultStage {
    policy: Arc<RiskPolicy>,
}

#[async_trait]
impl Stage<str, ScoreEstimate, RiskStageError> for LocalDefaultStage {
    fn name(&self) -> &'static str {
        "local-default"
    }

    async fn attempt(&self, _title: &str) -> Result<ScoreEstimate, RiskStageError> {
        Ok(ScoreEstimate::score_only(self.policy.default_score))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RiskGenerator {
    chain: FallbackChain<str, ScoreEstimate, RiskStageError>,
    policy: Arc<RiskPolicy>,
}

impl RiskGenerator {
    pub fn new(client: GeminiClient, policy: RiskPolicy) -> Self {
        let policy = Arc::new(policy);
        let chain: FallbackChain<str, ScoreEstimate, RiskStageError> = FallbackChain::new();
        Self {
            chain: chain
                .then(Arc::new(RuleBucketStage {
                    policy: policy.clone(),
                }))
                .then(Arc::new(OracleRiskStage {
                    client,
                    policy: policy.clone(),
                }))
                .then(Arc::new(LocalDefaultStage {
                    policy: policy.clone(),
                })),
            policy,
        }
    }

    /// Never fails: the local stage always produces a score.
    pub async fn generate(&self, title: &str) -> RiskAnalysis {
        let estimate = match self.chain.run(title).await {
            Ok((stage, estimate)) => {
                info!("Risk for '{title}' scored by {stage}: {}", estimate.score);
                estimate
            }
            Err(exhausted) => {
                let failed: Vec<String> = exhausted
                    .failures
                    .iter()
                    .map(|f| format!("{}: {}", f.stage, f.error))
                    .collect();
                warn!(
                    "All risk stages failed for '{title}' ({}); using default score",
                    failed.join("; ")
                );
                ScoreEstimate::score_only(self.policy.default_score)
            }
        };

        finalize(title, estimate, &self.policy)
    }
}
