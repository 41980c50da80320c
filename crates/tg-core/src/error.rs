use thiserror::Error;

use tg_model::{ArgsError, NameError};

/// Rejection reasons returned by the engine.
///
/// All variants are synchronous, locally detected failures carrying a
/// human-readable reason that names the offending field or value. Nothing
/// is retried internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Unparseable or wrong-shaped JSON-like input.
    #[error("{0}")]
    MalformedInput(String),

    /// Missing required argument, or a default key outside the required
    /// set.
    #[error("{0}")]
    SchemaViolation(String),

    /// Inactive queue, private-queue mismatch, missing whitelist entry, or
    /// a class the queue does not accept.
    #[error("{0}")]
    AuthorizationDenied(String),

    /// Self-inconsistent or conflicting task-type, queue or whitelist
    /// definition.
    #[error("{0}")]
    InvalidDefinition(String),

    /// Referenced task type, queue, whitelist or instance is absent.
    #[error("{0}")]
    NotFound(String),

    /// Lifecycle transition requested on an already-terminal instance.
    #[error("{0}")]
    InvalidTransition(String),
}

impl CoreError {
    /// Stable taxonomy label, for logging and transport mapping.
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::MalformedInput(_) => "malformed_input",
            CoreError::SchemaViolation(_) => "schema_violation",
            CoreError::AuthorizationDenied(_) => "authorization_denied",
            CoreError::InvalidDefinition(_) => "invalid_definition",
            CoreError::NotFound(_) => "not_found",
            CoreError::InvalidTransition(_) => "invalid_transition",
        }
    }
}

impl From<ArgsError> for CoreError {
    fn from(e: ArgsError) -> Self {
        CoreError::MalformedInput(e.to_string())
    }
}

impl From<NameError> for CoreError {
    fn from(e: NameError) -> Self {
        CoreError::InvalidDefinition(e.to_string())
    }
}
