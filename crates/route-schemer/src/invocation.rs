//! Per-request validation state
//!
//! An [`Invocation`] lives for exactly one request. It knows which route it
//! serves, holds the request's ambient parameters, and remembers the last
//! permitted-params result so a handler can ask for it again without
//! re-filtering. A fresh invocation is built for every request, so the
//! cached result never leaks into another one.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::RouteSchemerConfig;
use crate::engine::CompiledSchema;
use crate::error::{SchemerError, SchemerResult};
use crate::params::{ParamInput, ParameterBag, filter_bounded};
use crate::registry::{Direction, RouteKey, RouteSchema, SchemaRegistry};

/// Explicit schema supplied by the caller
#[derive(Debug, Clone)]
enum SchemaSource {
    Document(Value),
    Compiled(CompiledSchema),
}

/// Options for [`Invocation::validated_params`]
///
/// Defaults: schema resolved from the registry, the request's own
/// parameters, request direction, permit filtering on.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    schema: Option<SchemaSource>,
    params: Option<ParamInput>,
    payload: Option<Value>,
    request: bool,
    permit: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            schema: None,
            params: None,
            payload: None,
            request: true,
            permit: true,
        }
    }
}

impl ValidateOptions {
    /// Request direction (filter, coerce, validate)
    pub fn request() -> Self {
        Self::default()
    }

    /// Response direction (validate as-is)
    pub fn response() -> Self {
        Self {
            request: false,
            ..Self::default()
        }
    }

    /// Validate against this schema instead of the registered one
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(SchemaSource::Document(schema));
        self
    }

    /// Validate against an already compiled schema
    pub fn with_compiled(mut self, schema: CompiledSchema) -> Self {
        self.schema = Some(SchemaSource::Compiled(schema));
        self
    }

    /// Validate these parameters instead of the request's own
    pub fn with_params(mut self, params: impl Into<ParamInput>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Validate an arbitrary JSON payload (typically a response body)
    ///
    /// In the request direction the payload is treated as a plain map.
    pub fn with_data(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the direction from a `request` flag
    pub fn direction(mut self, request: bool) -> Self {
        self.request = request;
        self
    }

    /// Enable or disable permit filtering
    pub fn permit(mut self, permit: bool) -> Self {
        self.permit = permit;
        self
    }
}

/// Validation state for one request
#[derive(Debug, Clone)]
pub struct Invocation {
    registry: Arc<SchemaRegistry>,
    config: Arc<RouteSchemerConfig>,
    key: RouteKey,
    params: ParameterBag,
    permitted: Option<Value>,
}

impl Invocation {
    /// Start an invocation for a route with the request's parameters
    pub fn new(registry: Arc<SchemaRegistry>, key: RouteKey, params: ParameterBag) -> Self {
        Self {
            registry,
            config: Arc::new(RouteSchemerConfig::default()),
            key,
            params,
            permitted: None,
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: Arc<RouteSchemerConfig>) -> Self {
        self.config = config;
        self
    }

    /// Route this invocation serves
    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    /// The request's ambient parameters
    pub fn params(&self) -> &ParameterBag {
        &self.params
    }

    /// Last permitted-params result, if any
    pub fn permitted(&self) -> Option<&Value> {
        self.permitted.as_ref()
    }

    /// Registered schema for this route and direction
    pub fn schema_for_current_action(&self, direction: Direction) -> Option<Arc<RouteSchema>> {
        self.registry.resolve(&self.key, direction)
    }

    /// Filter parameters through a schema's allowlist
    pub fn permitted_params(
        &self,
        schema: &Value,
        params: &ParamInput,
    ) -> SchemerResult<serde_json::Map<String, Value>> {
        filter_bounded(schema, params, self.config.max_depth)
    }

    /// Validate parameters (request) or a payload (response)
    ///
    /// Request direction: filters through the schema's allowlist, coerces
    /// numeric strings, validates, caches and returns the result. With
    /// `permit(false)` a cached result is returned when one exists;
    /// otherwise the raw parameters are coerced and validated unfiltered.
    ///
    /// Response direction: validates a coerced copy of the payload and
    /// returns the payload unchanged. A numeric string that passes an
    /// `integer` or `number` schema is still emitted as a string, so a
    /// passing payload is not guaranteed to conform to the schema as sent.
    ///
    /// # Errors
    ///
    /// [`SchemerError::MissingSchema`] when no schema is supplied or
    /// registered; [`SchemerError::Validation`] when the data fails it.
    #[tracing::instrument(skip_all, fields(route = %self.key, request = options.request))]
    pub fn validated_params(&mut self, options: ValidateOptions) -> SchemerResult<Value> {
        let ValidateOptions {
            schema,
            params,
            payload,
            request,
            permit,
        } = options;
        let direction = Direction::from_request(request);

        let schema = self.resolve_schema(schema, direction)?;

        if request {
            if !permit && let Some(cached) = &self.permitted {
                debug!("Returning cached permitted params");
                return Ok(cached.clone());
            }

            let params = match payload {
                Some(payload) => ParamInput::plain_value(payload),
                None => params.unwrap_or_else(|| ParamInput::Bag(self.params.clone())),
            };
            let data = if permit {
                Value::Object(self.permitted_params(schema.document(), &params)?)
            } else {
                params.to_value()
            };

            let validated = if self.config.validate_requests {
                schema.check(&data)?
            } else {
                data
            };
            if permit {
                self.permitted = Some(validated.clone());
            }
            debug!("Request parameters validated");
            Ok(validated)
        } else {
            let data = match (payload, params) {
                (Some(payload), _) => payload,
                (None, Some(params)) => params.to_value(),
                (None, None) => Value::Object(self.params.as_map().clone()),
            };
            if self.config.validate_responses {
                schema.check(&data)?;
            }
            debug!("Response payload validated");
            Ok(data)
        }
    }

    /// Validate a response payload against the registered response schema
    pub fn validated_response(&mut self, payload: Value) -> SchemerResult<Value> {
        self.validated_params(ValidateOptions::response().with_data(payload))
    }

    fn resolve_schema(
        &self,
        explicit: Option<SchemaSource>,
        direction: Direction,
    ) -> SchemerResult<CompiledSchema> {
        match explicit {
            Some(SchemaSource::Compiled(schema)) => Ok(schema),
            Some(SchemaSource::Document(document)) => {
                CompiledSchema::compile_for(&format!("{} {direction}", self.key), document)
            }
            None => self
                .schema_for_current_action(direction)
                .map(|entry| entry.schema().clone())
                .ok_or(SchemerError::MissingSchema),
        }
    }
}
