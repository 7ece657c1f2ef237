//! Scaffold command implementation
//!
//! Writes an `application.json` schemer document once and (re)writes the
//! controller's `<name>_route_schemer.json` with an empty object schema per
//! action and direction.

use std::fs;
use std::path::{Path, PathBuf};

use route_schemer::registry::ActionSchemas;
use route_schemer::{APPLICATION_CONTROLLER, RouteKey, SchemerDocument};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::cli::ScaffoldArgs;
use crate::error::{CliError, CliResult};

/// Application document file name
pub const APPLICATION_FILE: &str = "application.json";

/// Execute the scaffold command, returning the files written
pub fn execute(args: &ScaffoldArgs) -> CliResult<Vec<PathBuf>> {
    let controller_path = RouteKey::new(&args.controller, "index").controller().to_string();
    let actions: Vec<String> = args
        .actions
        .iter()
        .map(|action| RouteKey::new(&controller_path, action).action().to_string())
        .collect();

    if let Some(dir) = &args.controllers_dir {
        verify_controller(&args.controller, &controller_path, &actions, dir)?;
    }

    fs::create_dir_all(&args.out)?;
    let mut written = Vec::new();

    let application = args.out.join(APPLICATION_FILE);
    if application.exists() {
        debug!(path = %application.display(), "Keeping existing application schemer");
    } else {
        let document = SchemerDocument {
            controller: Some(APPLICATION_CONTROLLER.to_string()),
            ..SchemerDocument::default()
        };
        write_document(&application, &document)?;
        written.push(application);
    }

    let basename = controller_path.rsplit('/').next().unwrap_or(&controller_path);
    let schemer = args.out.join(format!("{basename}_route_schemer.json"));
    let document = SchemerDocument {
        controller: Some(controller_path.clone()),
        actions: actions
            .iter()
            .map(|action| {
                let schemas = ActionSchemas {
                    request: Some(empty_schema()),
                    response: Some(empty_schema()),
                };
                (action.clone(), schemas)
            })
            .collect(),
    };
    write_document(&schemer, &document)?;
    written.push(schemer);

    info!(controller = %controller_path, actions = actions.len(), "Scaffolded route schemer");
    Ok(written)
}

/// Check that `<dir>/<controller_path>_controller.rs` defines every action
fn verify_controller(
    controller: &str,
    controller_path: &str,
    actions: &[String],
    dir: &Path,
) -> CliResult<()> {
    let path = dir.join(format!("{controller_path}_controller.rs"));
    if !path.is_file() {
        return Err(CliError::ControllerNotFound {
            controller: controller.to_string(),
            path,
        });
    }

    let source = fs::read_to_string(&path)?;
    for action in actions {
        if !defines_fn(&source, action) {
            return Err(CliError::ActionNotFound {
                controller: controller.to_string(),
                action: action.clone(),
            });
        }
    }
    Ok(())
}

fn defines_fn(source: &str, name: &str) -> bool {
    let needle = format!("fn {name}");
    source.match_indices(&needle).any(|(at, _)| {
        matches!(
            source[at + needle.len()..].chars().next(),
            Some('(' | '<' | ' ')
        )
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn write_document(path: &Path, document: &SchemerDocument) -> CliResult<()> {
    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}
