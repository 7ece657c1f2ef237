//! Check command implementation

use std::fs;
use std::io::Read;
use std::sync::Arc;

use route_schemer::{
    Invocation, ParameterBag, RouteKey, RouteSchemerConfig, SchemaRegistry, ValidateOptions,
};
use serde_json::Value;

use crate::cli::CheckArgs;
use crate::error::{CliError, CliResult};
use crate::schema_dir;

/// Run input through the route's schema and return the result
pub fn execute(args: &CheckArgs, config: &RouteSchemerConfig) -> CliResult<Value> {
    let dir = schema_dir(args.schemas.as_deref(), config)?;
    let registry = SchemaRegistry::load_dir(dir)?;

    let raw = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let input: Value = serde_json::from_str(&raw)?;

    validate(registry, args, config, input)
}

/// Validate already-parsed input against a loaded registry
pub fn validate(
    registry: SchemaRegistry,
    args: &CheckArgs,
    config: &RouteSchemerConfig,
    input: Value,
) -> CliResult<Value> {
    let key = RouteKey::new(&args.controller, &args.action);

    let (params, options) = if args.response {
        (ParameterBag::new(), ValidateOptions::response().with_data(input))
    } else if args.plain {
        if !input.is_object() {
            return Err(CliError::InvalidInput(
                "plain input must be a JSON object".to_string(),
            ));
        }
        (ParameterBag::new(), ValidateOptions::request().with_data(input))
    } else {
        (ParameterBag::from_json(input), ValidateOptions::request())
    };

    let mut invocation = Invocation::new(Arc::new(registry), key, params)
        .with_config(Arc::new(config.clone()));
    Ok(invocation.validated_params(options)?)
}
