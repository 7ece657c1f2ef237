//! Axum extractor and error responses

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, RawPathParams, Request};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{debug, error};

use super::RouteBinding;
use crate::error::SchemerError;
use crate::invocation::Invocation;
use crate::params::ParameterBag;

impl<S> FromRequest<S> for Invocation
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let Some(binding) = parts.extensions.get::<RouteBinding>().cloned() else {
            return Err(SchemerError::Registry(
                "route is not bound to a schemer (missing RouteSchemerLayer)".to_string(),
            )
            .into_response());
        };

        let mut params = parts
            .uri
            .query()
            .map(ParameterBag::from_query)
            .unwrap_or_default();

        let path = RawPathParams::from_request_parts(&mut parts, state).await.ok();
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(IntoResponse::into_response)?;

        if !bytes.is_empty() {
            if content_type.starts_with("application/json") || content_type.ends_with("+json") {
                let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
                    debug!(error = %e, "Rejecting malformed JSON body");
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": format!("Malformed JSON body: {e}") })),
                    )
                        .into_response()
                })?;
                params.merge(ParameterBag::from_json(body));
            } else if content_type.starts_with("application/x-www-form-urlencoded") {
                params.merge(ParameterBag::from_form(&bytes));
            }
        }

        if let Some(path) = path {
            for (key, value) in path.iter() {
                params.insert(key, Value::String(value.to_string()));
            }
        }

        Ok(binding.invocation(params))
    }
}

impl IntoResponse for SchemerError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(failure) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": failure.message(),
                    "details": failure.details(),
                })),
            )
                .into_response(),
            other => {
                error!(error = %other, "Route schemer misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
