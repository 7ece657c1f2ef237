//! # Route Schemer
//!
//! JSON Schema validation for web controller actions. Each action
//! (`users#create`) maps to a request schema and a response schema; incoming
//! parameters are filtered down to the fields the request schema declares,
//! numeric strings are coerced to the declared types, and the result is
//! validated before the handler sees it. Outgoing payloads are validated
//! against the response schema before they leave the handler.
//!
//! ## Pipeline
//!
//! 1. [`SchemaRegistry`] resolves the schema for `(controller, action, direction)`
//! 2. [`Allowlist`] is derived from the schema's `properties`
//! 3. [`ParamInput`] is filtered through the allowlist
//! 4. [`coerce`](crate::coerce::coerce) converts numeric strings
//! 5. [`CompiledSchema`] validates and reports [`FailureRecord`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use route_schemer::{Invocation, ParameterBag, RouteKey, SchemaRegistry, ValidateOptions};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_request(
//!     "users",
//!     "create",
//!     json!({
//!         "type": "object",
//!         "required": ["name"],
//!         "properties": { "name": { "type": "string" }, "age": { "type": "integer" } }
//!     }),
//! )?;
//!
//! let params = ParameterBag::from_query("name=Joe&age=30&admin=true");
//! let mut invocation = Invocation::new(Arc::new(registry), RouteKey::new("users", "create"), params);
//!
//! let permitted = invocation.validated_params(ValidateOptions::default())?;
//! assert_eq!(permitted, json!({ "name": "Joe", "age": 30 }));
//! # Ok::<(), route_schemer::SchemerError>(())
//! ```
//!
//! ## Axum Integration
//!
//! ```rust,ignore
//! use axum::{Json, Router, routing::post};
//! use route_schemer::{Invocation, RouteSchemerLayer, SchemerError, ValidateOptions};
//!
//! async fn create(mut invocation: Invocation) -> Result<Json<serde_json::Value>, SchemerError> {
//!     let user = invocation.validated_params(ValidateOptions::default())?;
//!     Ok(Json(invocation.validated_response(user)?))
//! }
//!
//! let app = Router::new().route(
//!     "/users",
//!     post(create).layer(RouteSchemerLayer::new(registry, "users", "create")),
//! );
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod invocation;
pub mod logging;
pub mod middleware;
pub mod params;
pub mod permit;
pub mod registry;

pub use config::{
    ConfigError, ConfigurationBuilder, LogOutput, LogRotation, LoggingConfig, RouteSchemerConfig,
};
pub use engine::{CompiledSchema, FailureRecord};
pub use error::{RequestSchemerError, SchemerError, SchemerResult};
pub use invocation::{Invocation, ValidateOptions};
pub use logging::LoggingGuard;
pub use middleware::{RouteBinding, RouteSchemerLayer, RouteSchemerService};
pub use params::{ParamInput, ParameterBag, filter};
pub use permit::{Allowlist, DEFAULT_MAX_DEPTH, PermitEntry};
pub use registry::{Direction, RouteKey, RouteSchema, RouteSchemer, SchemaRegistry, SchemerDocument};

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

/// Crate version
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Controller path whose schemas every other controller inherits
pub const APPLICATION_CONTROLLER: &str = "application";
