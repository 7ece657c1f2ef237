//! Error types for schema resolution and validation
//!
//! Two failures matter to callers: a missing schema (a wiring mistake, never
//! retryable) and a validation failure carrying the engine's structured
//! failure records. Everything else is configuration plumbing.

use std::fmt;

use crate::engine::FailureRecord;

/// Result type alias for route schemer operations
pub type SchemerResult<T> = Result<T, SchemerError>;

/// Validation failure reported by the schema engine
///
/// The message is the `error` text of the first failure record; `details`
/// holds every failure in the order the engine reported them.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSchemerError {
    message: String,
    details: Vec<FailureRecord>,
}

impl RequestSchemerError {
    /// Create a new error from a message and the engine's failure records
    pub fn new(message: impl Into<String>, details: Vec<FailureRecord>) -> Self {
        Self {
            message: Self::process_error(message.into()),
            details,
        }
    }

    /// Build the error from a non-empty list of failure records
    ///
    /// Returns `None` when the engine reported nothing.
    pub fn from_failures(details: Vec<FailureRecord>) -> Option<Self> {
        let message = details.first()?.error.clone();
        Some(Self::new(message, details))
    }

    /// Message formatting hook, currently the identity
    fn process_error(message: String) -> String {
        message
    }

    /// Human-readable message (first failure's `error` text)
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every failure record reported by the engine
    pub fn details(&self) -> &[FailureRecord] {
        &self.details
    }

    /// Consume the error, returning the failure records
    pub fn into_details(self) -> Vec<FailureRecord> {
        self.details
    }
}

impl fmt::Display for RequestSchemerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RequestSchemerError {}

/// Route schemer error types
#[derive(Debug, thiserror::Error)]
pub enum SchemerError {
    /// No schema was supplied and none is registered for the route
    #[error("No schema defined for validation")]
    MissingSchema,

    /// Data failed schema validation
    #[error(transparent)]
    Validation(#[from] RequestSchemerError),

    /// JSON schema compilation failed
    #[error("Schema compile error for {route}: {message}")]
    SchemaCompile {
        /// Route (or document) the schema belongs to
        route: String,
        /// Compiler message
        message: String,
    },

    /// Allowlist derivation exceeded the configured nesting limit
    #[error("Schema nesting exceeds maximum depth of {max_depth}")]
    SchemaTooDeep {
        /// Configured depth limit
        max_depth: usize,
    },

    /// Schema registry could not be populated
    #[error("Registry error: {0}")]
    Registry(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemerError {
    /// Returns the validation failure, if this is one
    pub fn as_validation(&self) -> Option<&RequestSchemerError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// True for wiring mistakes a client cannot fix by changing its input
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}
