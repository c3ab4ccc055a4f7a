//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn invalid_pattern<T: AsRef<str>>(language: T, pattern: &str, err: regex::Error) -> Self {
        Self::Configuration(format!(
            "invalid filler pattern for '{}': {} ({})",
            language.as_ref(),
            pattern,
            err
        ))
    }
}
