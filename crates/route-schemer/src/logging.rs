//! Logging initialization
//!
//! ```rust,no_run
//! use route_schemer::LoggingConfig;
//!
//! // Stderr-only (no guard needed)
//! LoggingConfig::stderr_minimal().init()?;
//!
//! // File logging (guard must be held)
//! let _guard = LoggingConfig::production("/var/log/route-schemer").init()?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! `RUST_LOG` takes precedence over the configured level. Validation failures
//! are logged at `debug`, registry loading at `info`.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogOutput, LogRotation, LoggingConfig};

/// Guard that flushes file logs on drop
///
/// Hold it for the lifetime of the program when logging to a file.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    _stderr_guard: Option<WorkerGuard>,
}

impl LoggingConfig {
    /// Initialize the global subscriber
    ///
    /// Returns `Some(LoggingGuard)` for file-based logging (must be held),
    /// `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if file logging has no directory, the directory
    /// cannot be created, or a global subscriber is already set.
    pub fn init(&self) -> io::Result<Option<LoggingGuard>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.output {
            LogOutput::None => Ok(None),
            LogOutput::Stderr => {
                init_stderr(self, filter)?;
                Ok(None)
            }
            LogOutput::FileOnly => {
                let appender = file_appender(self)?;
                let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
                install(self, filter, file_writer)?;
                Ok(Some(LoggingGuard {
                    _file_guard: file_guard,
                    _stderr_guard: None,
                }))
            }
            LogOutput::Both => {
                let appender = file_appender(self)?;
                let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
                let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(io::stderr());
                install(self, filter, file_writer.and(stderr_writer))?;
                Ok(Some(LoggingGuard {
                    _file_guard: file_guard,
                    _stderr_guard: Some(stderr_guard),
                }))
            }
        }
    }
}

fn init_stderr(config: &LoggingConfig, filter: EnvFilter) -> io::Result<()> {
    install(config, filter, io::stderr)
}

fn install<W>(config: &LoggingConfig, filter: EnvFilter, writer: W) -> io::Result<()>
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::registry().with(filter);

    if config.structured {
        subscriber
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
            .map_err(|e| io::Error::other(e.to_string()))
    } else {
        subscriber
            .with(fmt::layer().with_writer(writer))
            .try_init()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

fn file_appender(config: &LoggingConfig) -> io::Result<RollingFileAppender> {
    let dir: &Path = config.directory.as_deref().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "File logging requires a directory (set logging.directory)",
        )
    })?;
    std::fs::create_dir_all(dir)?;

    let prefix = &config.file_prefix;
    Ok(match config.rotation {
        LogRotation::Minute => tracing_appender::rolling::minutely(dir, prefix),
        LogRotation::Hourly => tracing_appender::rolling::hourly(dir, prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(dir, prefix),
        LogRotation::Never => tracing_appender::rolling::never(dir, prefix),
    })
}
