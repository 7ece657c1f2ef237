//! Integration tests for the scaffold, check and routes commands

use std::fs;

use pretty_assertions::assert_eq;
use route_schemer::{RouteSchemerConfig, SchemaRegistry, SchemerError};
use route_schemer_cli::{CheckArgs, CliError, ErrorCategory, RoutesArgs, ScaffoldArgs, check, routes, scaffold};
use serde_json::{Value, json};
use tempfile::TempDir;

fn scaffold_args(out: &std::path::Path, controller: &str, actions: &[&str]) -> ScaffoldArgs {
    ScaffoldArgs {
        controller: controller.to_string(),
        actions: actions.iter().map(ToString::to_string).collect(),
        out: out.to_path_buf(),
        controllers_dir: None,
    }
}

fn check_args(controller: &str, action: &str) -> CheckArgs {
    CheckArgs {
        controller: controller.to_string(),
        action: action.to_string(),
        schemas: None,
        input: None,
        response: false,
        plain: false,
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_scaffold_writes_application_and_controller_documents() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("route_schemers");

    let written = scaffold::execute(&scaffold_args(&out, "Admin::Users", &["create", "Update"])).unwrap();
    assert_eq!(written.len(), 2);

    let application = read_json(&out.join("application.json"));
    assert_eq!(application["controller"], json!("application"));

    let users = read_json(&out.join("users_route_schemer.json"));
    assert_eq!(users["controller"], json!("admin/users"));
    assert_eq!(
        users["actions"]["update"]["request"],
        json!({ "type": "object", "properties": {} })
    );
    assert!(users["actions"]["create"]["response"].is_object());

    let registry = SchemaRegistry::load_dir(&out).unwrap();
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_scaffold_keeps_application_and_rewrites_controller() {
    let temp = TempDir::new().unwrap();
    let out = temp.path();
    scaffold::execute(&scaffold_args(out, "users", &["index"])).unwrap();

    let custom = json!({ "controller": "application", "actions": { "index": { "request": { "type": "object" } } } });
    fs::write(out.join("application.json"), custom.to_string()).unwrap();

    let written = scaffold::execute(&scaffold_args(out, "users", &["show"])).unwrap();
    assert_eq!(written, vec![out.join("users_route_schemer.json")]);
    assert_eq!(read_json(&out.join("application.json")), custom);

    let users = read_json(&out.join("users_route_schemer.json"));
    assert!(users["actions"].get("index").is_none());
    assert!(users["actions"].get("show").is_some());
}

#[test]
fn test_scaffold_verifies_controller_source() {
    let temp = TempDir::new().unwrap();
    let controllers = temp.path().join("controllers");
    fs::create_dir_all(controllers.join("admin")).unwrap();
    fs::write(
        controllers.join("admin/users_controller.rs"),
        "pub async fn create() {}\npub async fn index() {}\n",
    )
    .unwrap();

    let mut args = scaffold_args(&temp.path().join("out"), "Admin::Users", &["create", "index"]);
    args.controllers_dir = Some(controllers.clone());
    assert!(scaffold::execute(&args).is_ok());

    args.actions.push("destroy".to_string());
    let err = scaffold::execute(&args).unwrap_err();
    assert!(matches!(&err, CliError::ActionNotFound { action, .. } if action == "destroy"));
    assert_eq!(err.category(), ErrorCategory::User);

    args.controller = "Posts".to_string();
    let err = scaffold::execute(&args).unwrap_err();
    assert!(matches!(err, CliError::ControllerNotFound { .. }));
    assert!(!err.suggestions().is_empty());
}

fn users_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .register_request(
            "users",
            "create",
            json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer" },
                    "address": { "type": "object", "properties": { "city": { "type": "string" } } }
                }
            }),
        )
        .unwrap();
    registry
        .register_response(
            "users",
            "create",
            json!({ "type": "object", "required": ["id"] }),
        )
        .unwrap();
    registry
}

#[test]
fn test_check_filters_and_coerces_bag_input() {
    let output = check::validate(
        users_registry(),
        &check_args("users", "create"),
        &RouteSchemerConfig::default(),
        json!({ "name": "Joe", "age": "30", "admin": true, "address": { "city": "Oslo", "zip": "0150" } }),
    )
    .unwrap();

    assert_eq!(output, json!({ "name": "Joe", "age": 30, "address": { "city": "Oslo" } }));
}

#[test]
fn test_check_plain_input_filters_one_level() {
    let mut args = check_args("users", "create");
    args.plain = true;

    let output = check::validate(
        users_registry(),
        &args,
        &RouteSchemerConfig::default(),
        json!({ "name": "Joe", "admin": true, "address": { "city": "Oslo", "zip": "0150" } }),
    )
    .unwrap();

    assert_eq!(output, json!({ "name": "Joe", "address": { "city": "Oslo", "zip": "0150" } }));
}

#[test]
fn test_check_response_returns_payload_unchanged() {
    let mut args = check_args("users", "create");
    args.response = true;
    let payload = json!({ "id": "7", "extra": [1, 2] });

    let output = check::validate(users_registry(), &args, &RouteSchemerConfig::default(), payload.clone()).unwrap();
    assert_eq!(output, payload);

    let err = check::validate(users_registry(), &args, &RouteSchemerConfig::default(), json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.details_json().is_some());
}

#[test]
fn test_check_reports_validation_and_missing_schema() {
    let err = check::validate(
        users_registry(),
        &check_args("users", "create"),
        &RouteSchemerConfig::default(),
        json!({ "age": "30" }),
    )
    .unwrap_err();
    let CliError::Schemer(SchemerError::Validation(failure)) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(failure.details().len(), 1);
    assert_eq!(failure.details()[0].keyword, "required");

    let err = check::validate(
        users_registry(),
        &check_args("users", "destroy"),
        &RouteSchemerConfig::default(),
        json!({}),
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Schemer(SchemerError::MissingSchema)));
    assert!(err.details_json().is_none());
}

#[test]
fn test_check_reads_input_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("schemas");
    scaffold::execute(&scaffold_args(&out, "users", &["create"])).unwrap();
    let input = temp.path().join("input.json");
    fs::write(&input, r#"{"anything": "goes"}"#).unwrap();

    let mut args = check_args("users", "create");
    args.schemas = Some(out);
    args.input = Some(input);

    let output = check::execute(&args, &RouteSchemerConfig::default()).unwrap();
    assert_eq!(output, json!({}));
}

#[test]
fn test_routes_lists_conventional_names() {
    let lines = routes::describe(&users_registry());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("users#create"));
    assert!(lines[0].ends_with("UsersRouteSchemer#create_request_schema"));
    assert!(lines[1].ends_with("UsersRouteSchemer#create_response_schema"));
}

#[test]
fn test_schema_dir_is_required() {
    let err = routes::execute(&RoutesArgs { schemas: None }, &RouteSchemerConfig::default()).unwrap_err();
    assert!(matches!(err, CliError::MissingSchemaDir));

    let temp = TempDir::new().unwrap();
    scaffold::execute(&scaffold_args(temp.path(), "orders", &["index"])).unwrap();
    let config = RouteSchemerConfig::builder().schema_dir(temp.path()).build();
    let lines = routes::execute(&RoutesArgs { schemas: None }, &config).unwrap();
    assert_eq!(lines.len(), 2);
}
