use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Coarse risk bucket. Always derived from `risk_score`, never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Low ≤ 39, Medium 40–69, High ≥ 70.
    pub fn from_score(score: i32) -> Self {
        if score <= 39 {
            RiskLevel::Low
        } else if score <= 69 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level '{other}'")),
        }
    }
}

/// A persisted, immutable automation-risk analysis. Unique by `job_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub industry: String,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub automation_percentage: i32,
    pub time_horizon: String,
    pub reason: String,
    pub future_skills: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Fields written on first creation. `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub job_id: String,
    pub job_title: String,
    pub industry: String,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub automation_percentage: i32,
    pub time_horizon: String,
    pub reason: String,
    pub future_skills: Vec<String>,
}

impl NewJob {
    #[cfg(test)]
    pub fn into_record(self, created_at: DateTime<Utc>) -> JobRecord {
        JobRecord {
            job_id: self.job_id,
            job_title: self.job_title,
            industry: self.industry,
            risk_score: self.risk_score,
            risk_level: self.risk_level,
            automation_percentage: self.automation_percentage,
            time_horizon: self.time_horizon,
            reason: self.reason,
            future_skills: self.future_skills,
            created_at,
        }
    }
}

/// Title-search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SearchHit {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub industry: String,
}

impl From<&JobRecord> for SearchHit {
    fn from(record: &JobRecord) -> Self {
        SearchHit {
            job_id: record.job_id.clone(),
            job_title: record.job_title.clone(),
            industry: record.industry.clone(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub job_id: String,
    pub job_title: String,
    pub industry: String,
    pub risk_score: i32,
    pub risk_level: String,
    pub automation_percentage: i32,
    pub time_horizon: String,
    pub reason: String,
    pub future_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = String;

    /// Rejects rows whose stored level disagrees with their score.
    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let risk_level = RiskLevel::from_str(&row.risk_level)?;
        if risk_level != RiskLevel::from_score(row.risk_score) {
            return Err(format!(
                "row {} stores level {} for score {}",
                row.id, risk_level, row.risk_score
            ));
        }

        Ok(JobRecord {
            job_id: row.job_id,
            job_title: row.job_title,
            industry: row.industry,
            risk_score: row.risk_score,
            risk_level,
            automation_percentage: row.automation_percentage,
            time_horizon: row.time_horizon,
            reason: row.reason,
            future_skills: row.future_skills,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_thresholds() {
        for s in 0..=100 {
            let expected = if s <= 39 {
                RiskLevel::Low
            } else if s <= 69 {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            };
            assert_eq!(RiskLevel::from_score(s), expected, "score {s}");
        }
    }

    #[test]
    fn test_risk_level_is_monotonic() {
        for s in 0..100 {
            assert!(RiskLevel::from_score(s) <= RiskLevel::from_score(s + 1));
        }
    }

    #[test]
    fn test_risk_level_round_trips_through_text() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(level.as_str().parse::<RiskLevel>().unwrap(), level);
        }
        assert!("Severe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_record_serializes_with_public_field_names() {
        let record = NewJob {
            job_id: "truck-driver".into(),
            job_title: "Truck Driver".into(),
            industry: "Transportation".into(),
            risk_score: 82,
            risk_level: RiskLevel::High,
            automation_percentage: 88,
            time_horizon: "5-10 years".into(),
            reason: "Routes are increasingly automated.".into(),
            future_skills: vec!["Data literacy".into()],
        }
        .into_record(Utc::now());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["jobId"], "truck-driver");
        assert_eq!(value["jobTitle"], "Truck Driver");
        assert_eq!(value["risk_level"], "High");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("job_id").is_none());
    }

    #[test]
    fn test_inconsistent_row_is_rejected() {
        let row = JobRow {
            id: Uuid::new_v4(),
            job_id: "clerk".into(),
            job_title: "Clerk".into(),
            industry: "General".into(),
            risk_score: 80,
            risk_level: "Low".into(),
            automation_percentage: 80,
            time_horizon: "5-10 years".into(),
            reason: "x".into(),
            future_skills: vec!["Data literacy".into()],
            created_at: Utc::now(),
        };
        assert!(JobRecord::try_from(row).is_err());
    }
}
