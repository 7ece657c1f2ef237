//! # Route Schemer CLI
//!
//! Command-line tools for the schemas behind controller actions.
//!
//! ## Usage
//!
//! ```bash
//! # Generate schemer documents for two actions
//! route-schemer scaffold Admin::Users create update --out app/route_schemers
//!
//! # Filter, coerce and validate a request body
//! echo '{"name": "Joe", "age": "30"}' | route-schemer check users create --schemas app/route_schemers
//!
//! # List what is registered
//! route-schemer routes --schemas app/route_schemers
//! ```

pub mod check;
pub mod cli;
pub mod error;
pub mod routes;
pub mod scaffold;

use std::path::{Path, PathBuf};

use route_schemer::RouteSchemerConfig;
use tracing::debug;

pub use cli::{CheckArgs, Cli, Commands, RoutesArgs, ScaffoldArgs};
pub use error::{CliError, CliResult, ErrorCategory};

/// Run a parsed command line
pub fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => RouteSchemerConfig::from_file(path)?,
        None => RouteSchemerConfig::default(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let _guard = config.logging.init()?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Scaffold(args) => {
            for path in scaffold::execute(&args)? {
                println!("  create {}", path.display());
            }
        }
        Commands::Check(args) => {
            let output = check::execute(&args, &config)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Routes(args) => {
            for line in routes::execute(&args, &config)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Schema directory from the flag, falling back to the configuration
pub fn schema_dir(flag: Option<&Path>, config: &RouteSchemerConfig) -> CliResult<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.schema_dir.clone())
        .ok_or(CliError::MissingSchemaDir)
}
