//! End-to-end tests driving axum handlers through `RouteSchemerLayer`

#![cfg(feature = "axum")]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use route_schemer::{
    ConfigurationBuilder, Invocation, RouteSchemerLayer, SchemaRegistry, SchemerError,
    ValidateOptions,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn registry() -> Arc<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry
        .register_request(
            "Admin::UsersController",
            "update",
            json!({
                "type": "object",
                "required": ["id", "user"],
                "properties": {
                    "id": { "type": "integer" },
                    "user": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "age": { "type": "integer" },
                            "tags": { "type": "array", "items": { "type": "string" } }
                        }
                    }
                }
            }),
        )
        .unwrap();
    registry
        .register_response(
            "admin/users",
            "update",
            json!({ "type": "object", "required": ["id"], "properties": { "id": { "type": "integer" } } }),
        )
        .unwrap();
    Arc::new(registry)
}

async fn update(mut invocation: Invocation) -> Result<Json<Value>, SchemerError> {
    let params = invocation.validated_params(ValidateOptions::default())?;
    let cached = invocation.validated_params(ValidateOptions::default().permit(false))?;
    assert_eq!(params, cached);

    let mut body = params;
    if body.get("user").and_then(|user| user.get("name")) == Some(&json!("drop-id"))
        && let Some(object) = body.as_object_mut()
    {
        object.remove("id");
    }
    Ok(Json(invocation.validated_response(body)?))
}

async fn unbound(mut invocation: Invocation) -> Result<Json<Value>, SchemerError> {
    Ok(Json(invocation.validated_params(ValidateOptions::default())?))
}

fn app() -> Router {
    let registry = registry();
    Router::new()
        .route(
            "/admin/users/{id}",
            post(update).layer(RouteSchemerLayer::new(Arc::clone(&registry), "Admin::Users", "update")),
        )
        .route(
            "/admin/users/{id}/audit",
            get(update).layer(RouteSchemerLayer::new(registry, "admin/users", "audit")),
        )
        .route("/unbound", post(unbound))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_json_body_is_filtered_and_coerced() {
    let (status, body) = send(json_request(
        "/admin/users/42?debug=1",
        &json!({ "user": { "name": "Joe", "age": "30", "admin": true, "tags": ["a", {"x": 1}] } }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 42, "user": { "name": "Joe", "age": 30 } }));
}

#[tokio::test]
async fn test_form_body_with_brackets() {
    let request = Request::post("/admin/users/7")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("user[name]=Ann&user[tags][]=a&user[tags][]=b&user[role]=root"))
        .unwrap();

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 7, "user": { "name": "Ann", "tags": ["a", "b"] } }));
}

#[tokio::test]
async fn test_query_parameters_feed_the_bag() {
    let request = Request::post("/admin/users/3?user[name]=Q&user[age]=9")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 3, "user": { "name": "Q", "age": 9 } }));
}

#[tokio::test]
async fn test_validation_failure_is_unprocessable() {
    let (status, body) = send(json_request(
        "/admin/users/1",
        &json!({ "user": { "age": "old" } }),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["type"], json!("type"));
    assert_eq!(details[0]["data_pointer"], json!("/user/age"));
    assert_eq!(body["error"], details[0]["error"]);
}

#[tokio::test]
async fn test_response_failure_is_unprocessable() {
    let (status, body) = send(json_request(
        "/admin/users/1",
        &json!({ "user": { "name": "drop-id" } }),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["type"], json!("required"));
}

#[tokio::test]
async fn test_missing_schema_is_server_error() {
    let request = Request::get("/admin/users/1/audit").body(Body::empty()).unwrap();

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("No schema defined for validation"));
}

#[tokio::test]
async fn test_missing_binding_is_server_error() {
    let (status, _) = send(json_request("/unbound", &json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::post("/admin/users/1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_layer_config_disables_response_validation() {
    let config = Arc::new(ConfigurationBuilder::new().validate_responses(false).build());
    let app = Router::new().route(
        "/admin/users/{id}",
        post(update).layer(RouteSchemerLayer::new(registry(), "admin/users", "update").with_config(config)),
    );

    let response = app
        .oneshot(json_request("/admin/users/5", &json!({ "user": { "name": "drop-id" } })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
