//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

/// Application-level errors for ontograph.
#[derive(Error, Debug)]
pub enum AppError {
    // Store errors
    #[error("Neo4j error: {0}")]
    Store(#[from] neo4rs::Error),

    #[error("Neo4j query error: {message}")]
    Query { message: String, query: String },

    #[error("Integrity fault: {0}")]
    Integrity(String),

    // Domain errors
    #[error("{kind} not found: {code}")]
    NotFound { kind: &'static str, code: String },

    #[error("Parent {kind} not found: {code}")]
    ParentNotFound { kind: &'static str, code: String },

    #[error("Validation error: {0}")]
    Validation(String),

    // Auth errors
    #[error("Authentication failed: {0}")]
    Auth(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    // Data loading errors
    #[error("Data processing error: {0}")]
    Data(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: &'static str, code: impl Into<String>) -> Self {
        AppError::NotFound {
            kind,
            code: code.into(),
        }
    }

    pub fn parent_not_found(kind: &'static str, code: impl Into<String>) -> Self {
        AppError::ParentNotFound {
            kind,
            code: code.into(),
        }
    }

    /// Whether the error reports an absent entity or anchor.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. } | AppError::ParentNotFound { .. }
        )
    }
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let (code, app_code) = match &err {
            AppError::NotFound { .. } => (ErrorCode::RESOURCE_NOT_FOUND, "NOT_FOUND"),
            AppError::ParentNotFound { .. } => {
                (ErrorCode::RESOURCE_NOT_FOUND, "PARENT_NOT_FOUND")
            }
            AppError::Validation(_) => (ErrorCode::INVALID_PARAMS, "VALIDATION_ERROR"),
            AppError::Auth(_) => (ErrorCode::INVALID_REQUEST, "AUTH_FAILED"),
            AppError::Config(_) => (ErrorCode::INTERNAL_ERROR, "CONFIG_ERROR"),
            AppError::Store(_) => (ErrorCode::INTERNAL_ERROR, "STORE_ERROR"),
            AppError::Query { .. } => (ErrorCode::INTERNAL_ERROR, "QUERY_ERROR"),
            AppError::Integrity(_) => (ErrorCode::INTERNAL_ERROR, "INTEGRITY_ERROR"),
            AppError::Data(_) => (ErrorCode::INTERNAL_ERROR, "DATA_ERROR"),
            AppError::Internal(_) => (ErrorCode::INTERNAL_ERROR, "INTERNAL_ERROR"),
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", app_code, err), None)
    }
}
