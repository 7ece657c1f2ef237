//! Route schemer configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::permit::DEFAULT_MAX_DEPTH;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "ROUTE_SCHEMER";

/// Route schemer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSchemerConfig {
    /// Directory of schemer documents loaded at startup
    pub schema_dir: Option<PathBuf>,
    /// Whether to validate requests (filtering always happens)
    pub validate_requests: bool,
    /// Whether to validate responses
    pub validate_responses: bool,
    /// Maximum schema nesting followed when deriving allowlists
    pub max_depth: usize,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Where log output goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutput {
    /// No logging
    None,
    /// Stderr only
    #[default]
    Stderr,
    /// Rolling file only
    FileOnly,
    /// Stderr and rolling file
    Both,
}

/// Log file rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    /// Rotate every minute
    Minute,
    /// Rotate every hour
    Hourly,
    /// Rotate every day
    Daily,
    /// Never rotate
    #[default]
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (overridden by `RUST_LOG`)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub structured: bool,
    /// Output target
    pub output: LogOutput,
    /// Log directory for file output
    pub directory: Option<PathBuf>,
    /// Log file name prefix
    pub file_prefix: String,
    /// File rotation policy
    pub rotation: LogRotation,
}

impl Default for RouteSchemerConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            validate_requests: true,
            validate_responses: true,
            max_depth: DEFAULT_MAX_DEPTH,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
            output: LogOutput::Stderr,
            directory: None,
            file_prefix: crate::CRATE_NAME.to_string(),
            rotation: LogRotation::Never,
        }
    }
}

impl LoggingConfig {
    /// Errors only, to stderr
    pub fn stderr_minimal() -> Self {
        Self {
            level: "error".to_string(),
            ..Self::default()
        }
    }

    /// Debug level, to stderr
    pub fn stderr_debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Self::default()
        }
    }

    /// Structured logs to stderr and an hourly rotated file
    pub fn production(directory: impl Into<PathBuf>) -> Self {
        Self {
            structured: true,
            output: LogOutput::Both,
            directory: Some(directory.into()),
            rotation: LogRotation::Hourly,
            ..Self::default()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Configuration parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),
}

impl RouteSchemerConfig {
    /// Load configuration from a file (TOML, YAML, or JSON)
    ///
    /// Environment variables with the `ROUTE_SCHEMER_` prefix override file
    /// settings; nested keys use `__` (`ROUTE_SCHEMER_LOGGING__LEVEL=debug`).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration from a file with a custom environment prefix
    pub fn from_file_with_prefix(
        path: impl AsRef<std::path::Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        use config::{Config, File, FileFormat};

        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => return Err(ConfigError::UnsupportedFormat),
        };

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or(ConfigError::UnsupportedFormat)?,
                format,
            ))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }
}

/// Configuration builder
#[derive(Debug)]
pub struct ConfigurationBuilder {
    /// Configuration being built
    config: RouteSchemerConfig,
}

impl ConfigurationBuilder {
    /// Create a new configuration builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RouteSchemerConfig::default(),
        }
    }

    /// Set the schema directory
    pub fn schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.schema_dir = Some(dir.into());
        self
    }

    /// Enable or disable request validation
    #[must_use]
    pub const fn validate_requests(mut self, validate: bool) -> Self {
        self.config.validate_requests = validate;
        self
    }

    /// Enable or disable response validation
    #[must_use]
    pub const fn validate_responses(mut self, validate: bool) -> Self {
        self.config.validate_responses = validate;
        self
    }

    /// Set the allowlist depth limit
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Replace the logging configuration
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> RouteSchemerConfig {
        self.config
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
