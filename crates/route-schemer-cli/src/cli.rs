//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "route-schemer",
    version,
    about = "Scaffold and check JSON schemas for controller actions",
    long_about = "Route schemer keeps one request schema and one response schema per controller action.\n\
                  `scaffold` writes schemer documents, `check` runs input through the same\n\
                  filter / coerce / validate pipeline the server uses, `routes` lists what is registered."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (.toml, .yaml, .yml or .json)
    #[arg(long, short = 'c', global = true, env = "ROUTE_SCHEMER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate schemer documents for a controller
    Scaffold(ScaffoldArgs),

    /// Validate JSON input against a registered schema
    Check(CheckArgs),

    /// List registered routes
    Routes(RoutesArgs),
}

/// Scaffold command arguments
#[derive(Args, Debug, Clone)]
pub struct ScaffoldArgs {
    /// Controller name (`Users`, `Admin::Users` or `admin/users`)
    pub controller: String,

    /// Actions to generate schemas for
    pub actions: Vec<String>,

    /// Directory the schemer documents are written to
    #[arg(long, short = 'o', default_value = "app/route_schemers")]
    pub out: PathBuf,

    /// Verify the controller and its actions exist in this source directory
    #[arg(long)]
    pub controllers_dir: Option<PathBuf>,
}

/// Check command arguments
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Controller name
    pub controller: String,

    /// Action name
    pub action: String,

    /// Schema directory (defaults to schema_dir from the config)
    #[arg(long, short = 's')]
    pub schemas: Option<PathBuf>,

    /// Input JSON file (stdin when omitted)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Validate against the response schema
    #[arg(long)]
    pub response: bool,

    /// Treat input as a plain map (one-level filtering)
    #[arg(long, conflicts_with = "response")]
    pub plain: bool,
}

/// Routes command arguments
#[derive(Args, Debug, Clone)]
pub struct RoutesArgs {
    /// Schema directory (defaults to schema_dir from the config)
    #[arg(long, short = 's')]
    pub schemas: Option<PathBuf>,
}
