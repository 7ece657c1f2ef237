//! Request parameters and allowlist filtering
//!
//! Input arrives in one of two shapes, picked by the caller:
//!
//! - [`ParameterBag`]: the framework's parameter bag, built from the query
//!   string, form body, JSON body and path parameters. Filtered recursively
//!   through the schema's [`Allowlist`].
//! - a plain JSON map: filtered one level deep against the schema's
//!   top-level `properties`. Nested values pass through untouched.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::SchemerResult;
use crate::permit::{Allowlist, DEFAULT_MAX_DEPTH, PermitEntry};

/// Key a non-object JSON body is stored under
pub const JSON_BODY_KEY: &str = "_json";

/// Mutable bag of request parameters with permit-list filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    values: Map<String, Value>,
}

impl ParameterBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing map
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Wrap a decoded JSON body; non-object bodies land under `_json`
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Object(values) => Self { values },
            other => {
                let mut values = Map::new();
                values.insert(JSON_BODY_KEY.to_string(), other);
                Self { values }
            }
        }
    }

    /// Parse a query string (`user[name]=Joe&tags[]=a&tags[]=b`)
    pub fn from_query(query: &str) -> Self {
        Self::from_form(query.trim_start_matches('?').as_bytes())
    }

    /// Parse an `application/x-www-form-urlencoded` body
    pub fn from_form(body: &[u8]) -> Self {
        let mut bag = Self::new();
        for (key, value) in form_urlencoded::parse(body) {
            bag.assign(&key, Value::String(value.into_owned()));
        }
        bag
    }

    /// Assign a value under a bracketed key, creating nested containers
    pub fn assign(&mut self, key: &str, value: Value) {
        let segments = parse_key(key);
        let Some((Segment::Key(first), rest)) = segments.split_first() else {
            return;
        };
        let slot = self.values.entry(first.clone()).or_insert(Value::Null);
        assign_path(slot, rest, value);
    }

    /// Insert a top-level value, replacing any previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Merge another bag over this one; later keys win
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Look up a top-level value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// True when the bag holds no parameters
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw parameters
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consume the bag, returning the raw parameters
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// Keep only what `allowlist` permits, as a plain map
    pub fn permit(&self, allowlist: &Allowlist) -> Map<String, Value> {
        permit_object(&self.values, allowlist)
    }
}

/// Raw parameters handed to the filter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInput {
    /// Framework parameter bag, filtered recursively
    Bag(ParameterBag),
    /// Plain map, filtered one level deep
    Plain(Map<String, Value>),
}

impl ParamInput {
    /// Wrap a parameter bag
    pub fn bag(bag: ParameterBag) -> Self {
        Self::Bag(bag)
    }

    /// Wrap a plain map
    pub fn plain(map: Map<String, Value>) -> Self {
        Self::Plain(map)
    }

    /// Wrap a plain JSON value; non-objects become an empty map
    pub fn plain_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Plain(map),
            _ => Self::Plain(Map::new()),
        }
    }

    /// Unfiltered parameters as a JSON object
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bag(bag) => Value::Object(bag.as_map().clone()),
            Self::Plain(map) => Value::Object(map.clone()),
        }
    }
}

impl From<ParameterBag> for ParamInput {
    fn from(bag: ParameterBag) -> Self {
        Self::Bag(bag)
    }
}

impl From<Map<String, Value>> for ParamInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Plain(map)
    }
}

/// Filter `input` down to the fields `schema` declares
pub fn filter(schema: &Value, input: &ParamInput) -> SchemerResult<Map<String, Value>> {
    filter_bounded(schema, input, DEFAULT_MAX_DEPTH)
}

/// Filter with an explicit allowlist depth limit
pub fn filter_bounded(
    schema: &Value,
    input: &ParamInput,
    max_depth: usize,
) -> SchemerResult<Map<String, Value>> {
    match input {
        ParamInput::Bag(bag) => Ok(bag.permit(&Allowlist::derive_bounded(schema, max_depth)?)),
        ParamInput::Plain(map) => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return Ok(Map::new());
            };
            Ok(map
                .iter()
                .filter(|(key, _)| properties.contains_key(key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect())
        }
    }
}

fn permit_object(values: &Map<String, Value>, allowlist: &Allowlist) -> Map<String, Value> {
    let mut permitted = Map::new();
    for entry in allowlist.entries() {
        let Some(value) = values.get(entry.name()) else {
            continue;
        };
        let kept = match entry {
            PermitEntry::Field(_) => is_scalar(value).then(|| value.clone()),
            PermitEntry::Opaque(_) => match value {
                Value::Array(elements) if elements.iter().all(is_scalar) => Some(value.clone()),
                _ => None,
            },
            PermitEntry::Nested(_, inner) => match value {
                Value::Object(object) => Some(Value::Object(permit_object(object, inner))),
                Value::Array(elements) => Some(Value::Array(
                    elements
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|object| Value::Object(permit_object(object, inner)))
                        .collect(),
                )),
                _ => None,
            },
        };
        if let Some(kept) = kept {
            permitted.insert(entry.name().to_string(), kept);
        }
    }
    permitted
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Bracketed key segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Append,
}

/// Split `a[b][]` into segments; malformed keys are taken literally
fn parse_key(key: &str) -> Vec<Segment> {
    let literal = || vec![Segment::Key(key.to_string())];
    let Some(open) = key.find('[') else {
        return literal();
    };
    if open == 0 {
        return literal();
    }

    let mut segments = vec![Segment::Key(key[..open].to_string())];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return literal();
        };
        let Some(close) = inner.find(']') else {
            return literal();
        };
        let name = &inner[..close];
        segments.push(if name.is_empty() {
            Segment::Append
        } else {
            Segment::Key(name.to_string())
        });
        rest = &inner[close + 1..];
    }
    segments
}

fn assign_path(slot: &mut Value, segments: &[Segment], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    match segment {
        Segment::Key(key) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(object) = slot {
                let child = object.entry(key.clone()).or_insert(Value::Null);
                assign_path(child, rest, value);
            }
        }
        Segment::Append => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            let Value::Array(elements) = slot else {
                return;
            };
            match rest.first() {
                None => elements.push(value),
                Some(Segment::Key(key)) => {
                    // `items[][sku]=a&items[][qty]=1` fills the last element until a key repeats
                    let reuse_last = elements
                        .last()
                        .and_then(Value::as_object)
                        .is_some_and(|last| !last.contains_key(key.as_str()));
                    if !reuse_last {
                        elements.push(Value::Object(Map::new()));
                    }
                    if let Some(last) = elements.last_mut() {
                        assign_path(last, rest, value);
                    }
                }
                Some(Segment::Append) => {
                    let mut nested = Value::Array(Vec::new());
                    assign_path(&mut nested, rest, value);
                    elements.push(nested);
                }
            }
        }
    }
}
