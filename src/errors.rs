//! Error types for the QueryHaus crate
//!
//! [`QueryHausError`] covers setup and registry failures. [`AppError`] is the
//! request-level error rendered into the response envelope.

use crate::response::{ApiResponse, ApiStatus};
use config::ConfigError;
use document_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already registered: {0}")]
    ResourceAlreadyRegistered(String),
}

const GENERIC_MESSAGE: &str = "Something went very wrong!";

/// Request error with an HTTP status code
///
/// Operational errors are expected failures whose message is safe to show.
/// Anything else is logged and rendered with a generic message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    status_code: u16,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            status_code,
            message: message.into(),
            is_operational: true,
        }
    }

    /// Unexpected failure, details stay in the logs
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            message: detail.into(),
            is_operational: false,
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::new(format!("No document found with id : {}", id), 404)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, 400)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// `fail` for client errors, `error` otherwise
    pub fn status(&self) -> ApiStatus {
        if (400..500).contains(&self.status_code) {
            ApiStatus::Fail
        } else {
            ApiStatus::Error
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_operational(&self) -> bool {
        self.is_operational
    }

    /// Render the error envelope
    pub fn into_response(self) -> ApiResponse {
        if self.is_operational {
            let status = self.status();
            return ApiResponse::error(self.status_code, status, self.message);
        }

        tracing::error!(status_code = self.status_code, error = %self.message, "Unhandled request error");
        ApiResponse::error(500, ApiStatus::Error, GENERIC_MESSAGE)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateKey { value, .. } => AppError::bad_request(format!(
                "Duplicate field value: {}. Please use another value!",
                value
            )),
            StoreError::InvalidDocument(reason) => {
                AppError::bad_request(format!("Invalid input data. {}", reason))
            }
            StoreError::InvalidCollection(e) => AppError::bad_request(e.to_string()),
            StoreError::Database(e) => AppError::internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_features::ValidationError;

    #[test]
    fn test_status_follows_status_code() {
        assert_eq!(AppError::not_found("x").status(), ApiStatus::Fail);
        assert_eq!(AppError::new("nope", 401).status(), ApiStatus::Fail);
        assert_eq!(AppError::internal("boom").status(), ApiStatus::Error);
    }

    #[test]
    fn test_duplicate_key_message() {
        let error = AppError::from(StoreError::DuplicateKey {
            field: "_id".to_string(),
            value: "t1".to_string(),
        });

        assert_eq!(error.status_code(), 400);
        assert_eq!(
            error.message(),
            "Duplicate field value: t1. Please use another value!"
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let invalid = AppError::from(StoreError::InvalidCollection(ValidationError::Empty));
        assert_eq!(invalid.status_code(), 400);
        assert!(invalid.is_operational());

        let database = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(database.status_code(), 500);
        assert!(!database.is_operational());
    }

    #[test]
    fn test_non_operational_errors_hide_details() {
        let response = AppError::internal("connection reset by peer").into_response();

        assert_eq!(response.status_code(), 500);
        assert_eq!(response.message(), Some(GENERIC_MESSAGE));
    }
}
