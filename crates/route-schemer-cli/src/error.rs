//! Error types for CLI operations

use std::fmt;
use std::path::PathBuf;

use route_schemer::{ConfigError, SchemerError};
use thiserror::Error;

/// CLI-specific errors with context
#[derive(Error, Debug)]
pub enum CliError {
    /// Schema loading or validation failed
    #[error(transparent)]
    Schemer(#[from] SchemerError),

    /// Configuration file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Controller source file is missing
    #[error("Controller {controller} does not exist at {}", path.display())]
    ControllerNotFound {
        /// Controller as given on the command line
        controller: String,
        /// Expected source path
        path: PathBuf,
    },

    /// Action is not defined in the controller source
    #[error("Method {action} is not defined in {controller}")]
    ActionNotFound {
        /// Controller as given on the command line
        controller: String,
        /// Missing action
        action: String,
    },

    /// No schema directory given and none configured
    #[error("No schema directory given (use --schemas or set schema_dir in the config)")]
    MissingSchemaDir,

    /// Invalid command input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// User-friendly suggestions for resolving the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::ControllerNotFound { .. } => vec![
                "Check the controller name (e.g. Admin::Users or admin/users)",
                "Point --controllers-dir at the directory holding *_controller.rs files",
            ],
            Self::ActionNotFound { .. } => vec![
                "Define the action in the controller before scaffolding its schema",
            ],
            Self::MissingSchemaDir => vec![
                "Pass --schemas <dir>",
                "Set schema_dir in the file given to --config",
            ],
            Self::Schemer(SchemerError::MissingSchema) => vec![
                "Run `route-schemer routes` to list registered schemas",
                "Scaffold the action with `route-schemer scaffold`",
            ],
            Self::Json(_) => vec!["Input must be a single JSON document"],
            _ => vec![],
        }
    }

    /// Error category for output
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Schemer(SchemerError::Validation(_)) => ErrorCategory::Validation,
            Self::Schemer(_) | Self::MissingSchemaDir => ErrorCategory::Schema,
            Self::Config(_) => ErrorCategory::Config,
            Self::ControllerNotFound { .. } | Self::ActionNotFound { .. } | Self::InvalidInput(_) => {
                ErrorCategory::User
            }
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Io(_) => ErrorCategory::System,
        }
    }

    /// Failure records as pretty JSON, for validation errors
    pub fn details_json(&self) -> Option<String> {
        let Self::Schemer(error) = self else {
            return None;
        };
        let failure = error.as_validation()?;
        serde_json::to_string_pretty(failure.details()).ok()
    }
}

/// Error categories for output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Data failed its schema
    Validation,
    /// Schemas missing or malformed
    Schema,
    /// Bad configuration
    Config,
    /// Bad command-line input
    User,
    /// Unparseable input
    Parsing,
    /// Filesystem or OS failure
    System,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "Validation"),
            Self::Schema => write!(f, "Schema"),
            Self::Config => write!(f, "Configuration"),
            Self::User => write!(f, "User Input"),
            Self::Parsing => write!(f, "Parsing"),
            Self::System => write!(f, "System"),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
