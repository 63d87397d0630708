//! Error types for model operations

use thiserror::Error;

use crate::validate::ValidationError;

/// Errors that can occur while defining a model or running its lifecycle
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model name must be a non-empty string")]
    MissingName,

    #[error("model '{0}' has no adapter bound; call init() first")]
    NotInitialized(String),

    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("record has no id value")]
    MissingId,

    #[error("hook error: {0}")]
    Hook(String),

    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn hook(msg: impl Into<String>) -> Self {
        Self::Hook(msg.into())
    }

    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::Adapter(msg.into())
    }

    /// The accumulated validation errors, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
