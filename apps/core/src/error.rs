use std::io;
use thiserror::Error;

/// Crate-wide error type, consolidating all possible errors into a single enum.
///
/// Only `Config` and `Validation` are ever returned to callers of the engine; the
/// collaborator variants are produced by external models and absorbed by the
/// orchestrator's fallback path.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed configuration detected at construction time (lexicons, thresholds, tables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors (e.g., out-of-range weights, invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external sentiment or category model failed or returned an unusable answer.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Transport-level failure while talking to a remote model service.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl AppError {
    /// True for errors raised by an external model, which the orchestrator recovers from.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            AppError::Collaborator(_) | AppError::Http(_) | AppError::Timeout(_)
        )
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("HTTP request timed out: {}", err))
        } else {
            AppError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_failures_are_recoverable() {
        assert!(AppError::Collaborator("boom".into()).is_collaborator_failure());
        assert!(AppError::Http("503".into()).is_collaborator_failure());
        assert!(AppError::Timeout("slow".into()).is_collaborator_failure());
        assert!(!AppError::Config("bad lexicon".into()).is_collaborator_failure());
        assert!(!AppError::Validation("weight".into()).is_collaborator_failure());
    }

    #[test]
    fn test_json_error_maps_to_validation() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
