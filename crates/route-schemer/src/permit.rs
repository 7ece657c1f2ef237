//! Permitted-field allowlists derived from schemas
//!
//! An [`Allowlist`] mirrors the object/array-of-object nesting of a schema's
//! `properties`. It is the permit list a [`ParameterBag`](crate::ParameterBag)
//! is filtered through, and is rebuilt on every filter call.

use serde_json::Value;

use crate::coerce::declared_type;
use crate::error::{SchemerError, SchemerResult};

/// Default nesting limit for allowlist derivation
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One permitted field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermitEntry {
    /// Scalar field
    Field(String),
    /// Array of scalars with unconstrained contents
    Opaque(String),
    /// Object, or array of objects, filtered by a nested allowlist
    Nested(String, Allowlist),
}

impl PermitEntry {
    /// Field name this entry permits
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Opaque(name) | Self::Nested(name, _) => name,
        }
    }
}

/// Ordered permit list, in `properties` declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    entries: Vec<PermitEntry>,
}

impl Allowlist {
    /// Derive the allowlist for a schema with the default depth limit
    pub fn derive(schema: &Value) -> SchemerResult<Self> {
        Self::derive_bounded(schema, DEFAULT_MAX_DEPTH)
    }

    /// Derive the allowlist, failing once nesting exceeds `max_depth`
    pub fn derive_bounded(schema: &Value, max_depth: usize) -> SchemerResult<Self> {
        derive_at(schema, 0, max_depth)
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[PermitEntry] {
        &self.entries
    }

    /// Look up the entry for a field
    pub fn get(&self, name: &str) -> Option<&PermitEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// True when no field is permitted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render in the `[name, {name: [...]}]` shape a permit call takes
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|entry| match entry {
                    PermitEntry::Field(name) => Value::String(name.clone()),
                    PermitEntry::Opaque(name) => single(name, Value::Array(Vec::new())),
                    PermitEntry::Nested(name, inner) => single(name, inner.to_value()),
                })
                .collect(),
        )
    }
}

impl FromIterator<PermitEntry> for Allowlist {
    fn from_iter<T: IntoIterator<Item = PermitEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn single(name: &str, value: Value) -> Value {
    let mut object = serde_json::Map::new();
    object.insert(name.to_string(), value);
    Value::Object(object)
}

fn derive_at(schema: &Value, depth: usize, max_depth: usize) -> SchemerResult<Allowlist> {
    if depth > max_depth {
        return Err(SchemerError::SchemaTooDeep { max_depth });
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(Allowlist::default());
    };

    properties
        .iter()
        .map(|(name, property)| {
            let entry = match declared_type(property) {
                Some("object") => {
                    PermitEntry::Nested(name.clone(), derive_at(property, depth + 1, max_depth)?)
                }
                Some("array") => match property.get("items") {
                    Some(items) if declared_type(items) == Some("object") => {
                        PermitEntry::Nested(name.clone(), derive_at(items, depth + 1, max_depth)?)
                    }
                    _ => PermitEntry::Opaque(name.clone()),
                },
                _ => PermitEntry::Field(name.clone()),
            };
            Ok(entry)
        })
        .collect()
}
