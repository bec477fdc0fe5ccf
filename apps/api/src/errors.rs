use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The response body is always `{"message", "statusCode"}`; server-side failures
/// are logged in full and answered with a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Please enter a realistic profession")]
    NotAProfession,

    #[error("Invalid role format returned by validation: {0}")]
    InvalidCanonicalForm(String),

    #[error("Role validation unavailable: {0}")]
    ValidationUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::NotAProfession
            | AppError::InvalidCanonicalForm(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::Persistence(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The user-facing message. Never includes upstream or driver details.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => "Invalid job input".to_string(),
            AppError::NotAProfession => "Please enter a realistic profession".to_string(),
            AppError::InvalidCanonicalForm(_) => {
                "Invalid role format returned by AI validation".to_string()
            }
            AppError::ValidationUnavailable(_) => {
                "Role validation failed. Please try again.".to_string()
            }
            AppError::Configuration(_) => "Server configuration error".to_string(),
            AppError::Persistence(_) => "Unable to persist generated job analysis".to_string(),
            AppError::Database(_) => "Job store unavailable".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("{self:?}");
        } else {
            tracing::debug!("Rejected request: {self}");
        }

        let body = Json(json!({
            "message": self.public_message(),
            "statusCode": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
