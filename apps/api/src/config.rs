use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{ensure, Context, Result};

use crate::jobs::validator::DEFAULT_VALIDATION_TIMEOUT;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = DEFAULT_VALIDATION_TIMEOUT.as_secs();
const DEFAULT_ORACLE_MAX_RETRIES: u32 = 2;
/// Upper bound for `ORACLE_MAX_RETRIES`.
const MAX_ORACLE_RETRIES: u32 = 8;

/// Application configuration loaded from environment variables.
/// Fails at startup if `DATABASE_URL` is missing or a numeric value is malformed.
///
/// The oracle credential is optional here: a missing key is reported per request
/// as a configuration error, and only when the local fallback cannot answer.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Overrides the database named in `database_url`.
    pub database_name: Option<String>,
    pub database_max_connections: u32,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub oracle_timeout_secs: u64,
    pub oracle_max_retries: u32,
    pub risk_policy_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            database_name: optional_env("DATABASE_NAME"),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            gemini_api_key: optional_env("GEMINI_API_KEY").or_else(|| optional_env("GOOGLE_API_KEY")),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            oracle_timeout_secs: parse_env("ORACLE_TIMEOUT_SECS", DEFAULT_ORACLE_TIMEOUT_SECS)?,
            oracle_max_retries: parse_env("ORACLE_MAX_RETRIES", DEFAULT_ORACLE_MAX_RETRIES)?,
            risk_policy_path: optional_env("RISK_POLICY_PATH").map(PathBuf::from),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        ensure!(
            self.oracle_max_retries <= MAX_ORACLE_RETRIES,
            "ORACLE_MAX_RETRIES must be at most {MAX_ORACLE_RETRIES}, got {}",
            self.oracle_max_retries
        );
        ensure!(
            self.oracle_timeout_secs > 0,
            "ORACLE_TIMEOUT_SECS must be positive"
        );
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "postgres://localhost/jobrisk".into(),
            database_name: None,
            database_max_connections: 10,
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            oracle_timeout_secs: DEFAULT_ORACLE_TIMEOUT_SECS,
            oracle_max_retries: DEFAULT_ORACLE_MAX_RETRIES,
            risk_policy_path: None,
            port: 8080,
            rust_log: "info".into(),
        }
    }

    #[test]
    fn test_oracle_timeout_default_matches_validator() {
        assert_eq!(DEFAULT_ORACLE_TIMEOUT_SECS, 12);
        assert!(sample().check().is_ok());
    }

    #[test]
    fn test_check_rejects_excessive_retries() {
        let config = Config {
            oracle_max_retries: 40,
            ..sample()
        };
        assert!(config.check().is_err());

        let config = Config {
            oracle_max_retries: MAX_ORACLE_RETRIES,
            ..sample()
        };
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_check_rejects_zero_timeout() {
        let config = Config {
            oracle_timeout_secs: 0,
            ..sample()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("JOBRISK_TEST_UNSET_NUMBER", 12).unwrap();
        assert_eq!(value, 12);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("JOBRISK_TEST_BAD_NUMBER", "twelve");
        let result: Result<u64> = parse_env("JOBRISK_TEST_BAD_NUMBER", 12);
        assert!(result.is_err());
        std::env::remove_var("JOBRISK_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_optional_env_treats_blank_as_absent() {
        std::env::set_var("JOBRISK_TEST_BLANK", "   ");
        assert_eq!(optional_env("JOBRISK_TEST_BLANK"), None);
        std::env::remove_var("JOBRISK_TEST_BLANK");
    }
}
