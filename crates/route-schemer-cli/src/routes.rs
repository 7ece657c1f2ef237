//! Routes command implementation

use route_schemer::{RouteSchemerConfig, SchemaRegistry};

use crate::cli::RoutesArgs;
use crate::error::CliResult;
use crate::schema_dir;

/// List registered routes as `route direction Schemer#method` lines
pub fn execute(args: &RoutesArgs, config: &RouteSchemerConfig) -> CliResult<Vec<String>> {
    let dir = schema_dir(args.schemas.as_deref(), config)?;
    Ok(describe(&SchemaRegistry::load_dir(dir)?))
}

/// One line per registered route
pub fn describe(registry: &SchemaRegistry) -> Vec<String> {
    registry
        .routes()
        .into_iter()
        .map(|(key, direction)| {
            format!(
                "{:<32} {:<8} {}#{}",
                key.to_string(),
                direction.as_str(),
                key.schemer_name(),
                key.schema_method(direction)
            )
        })
        .collect()
}
