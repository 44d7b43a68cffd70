// src/errors.rs

use crate::models::PeriodStatus;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Business rule errors
    #[error("Cannot {action} a period in status '{status:?}'")]
    InvalidState {
        action: &'static str,
        status: PeriodStatus,
    },

    #[error("Period has no attendance entries: {0}")]
    EmptyPeriod(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_state(action: &'static str, status: PeriodStatus) -> Self {
        AppError::InvalidState { action, status }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidState { .. } | AppError::EmptyPeriod(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Unexpected failures keep their detail server-side only.
        let message = match &self {
            AppError::Database(e) => {
                error!("Database failure: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(detail) => {
                error!("Internal failure: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

// Convenience alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_displays_action_and_status() {
        let err = AppError::invalid_state("approve", PeriodStatus::Draft);
        assert_eq!(err.to_string(), "Cannot approve a period in status 'Draft'");
    }

    #[test]
    fn empty_period_displays_detail() {
        let err = AppError::EmptyPeriod("period 2025-03 has no entries".to_string());
        assert_eq!(
            err.to_string(),
            "Period has no attendance entries: period 2025-03 has no entries"
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn business_rule_errors_map_to_422() {
        assert_eq!(
            AppError::invalid_state("calculate", PeriodStatus::Paid).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::EmptyPeriod("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<AppError>();
    }
}
