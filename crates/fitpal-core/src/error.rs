//! Error taxonomy shared by every fitpal engine.

use thiserror::Error;

use crate::plan::schema::SchemaValidationError;

pub type Result<T, E = FitpalError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FitpalError {
    /// Malformed input, detected before anything was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A generated plan document did not match the plan schema.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing, or owned by someone else.
    #[error("{0} not found")]
    NotFound(String),

    #[error("no linked Google account; connect one before using the calendar")]
    NotConnected,

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("persistence error: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl FitpalError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// True for both plain validation failures and schema mismatches.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::SchemaValidation(_))
    }
}
