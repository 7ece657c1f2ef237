//! JSON Schema engine adapter using the high-performance jsonschema library
//!
//! A [`CompiledSchema`] pairs the schema document with its compiled
//! validator. Validation always runs the numeric [`coerce`] step first, and
//! failures are reported as [`FailureRecord`]s in the engine's order.

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::coerce::coerce;
use crate::error::{RequestSchemerError, SchemerError, SchemerResult};

/// One constraint violation reported by the schema engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Human-readable message
    pub error: String,
    /// Schema keyword that failed (`required`, `type`, ...)
    #[serde(rename = "type")]
    pub keyword: String,
    /// JSON pointer into the validated data
    pub data_pointer: String,
    /// JSON pointer into the schema
    pub schema_pointer: String,
    /// The offending value
    pub data: Value,
}

/// Schema document together with its compiled validator
#[derive(Clone)]
pub struct CompiledSchema {
    document: Arc<Value>,
    validator: Arc<Validator>,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Compile a schema document
    pub fn compile(document: Value) -> SchemerResult<Self> {
        Self::compile_for("schema", document)
    }

    /// Compile a schema document, naming the route in compile errors
    pub fn compile_for(route: &str, document: Value) -> SchemerResult<Self> {
        let validator =
            jsonschema::validator_for(&document).map_err(|e| {
                warn!(route, error = %e, "Schema failed to compile");
                SchemerError::SchemaCompile {
                    route: route.to_string(),
                    message: e.to_string(),
                }
            })?;

        Ok(Self {
            document: Arc::new(document),
            validator: Arc::new(validator),
        })
    }

    /// The schema document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Apply numeric coercion to `data` per this schema
    pub fn coerce(&self, data: &Value) -> Value {
        coerce(&self.document, data)
    }

    /// True when `data` satisfies the schema as given (no coercion)
    pub fn is_valid(&self, data: &Value) -> bool {
        self.validator.is_valid(data)
    }

    /// Every failure for `data` as given (no coercion)
    pub fn validate(&self, data: &Value) -> Vec<FailureRecord> {
        self.validator
            .iter_errors(data)
            .map(|e| {
                let data_pointer = e.instance_path.to_string();
                let schema_pointer = e.schema_path.to_string();
                FailureRecord {
                    error: e.to_string(),
                    keyword: keyword_of(&schema_pointer),
                    data: data.pointer(&data_pointer).cloned().unwrap_or(Value::Null),
                    data_pointer,
                    schema_pointer,
                }
            })
            .collect()
    }

    /// Coerce then validate, returning the coerced data on success
    pub fn check(&self, data: &Value) -> Result<Value, RequestSchemerError> {
        let coerced = self.coerce(data);
        if self.is_valid(&coerced) {
            return Ok(coerced);
        }

        let failures = self.validate(&coerced);
        debug!(failures = failures.len(), "Schema validation failed");
        Err(RequestSchemerError::from_failures(failures).unwrap_or_else(|| {
            RequestSchemerError::new("value does not match schema", Vec::new())
        }))
    }
}

/// Last schema-pointer segment, which names the failing keyword
fn keyword_of(schema_pointer: &str) -> String {
    schema_pointer
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("schema")
        .to_string()
}
