//! Numeric coercion of string inputs
//!
//! Query strings and form bodies only carry strings, so `age=30` arrives as
//! `"30"`. Before validation every property whose schema declares
//! `integer` or `number` gets its string value converted when the string is
//! lexically numeric. Anything else is left for the validator to reject.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

/// Digits only, no sign (`"42"`)
static INTEGER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid integer regex pattern"));

/// Optional sign, optional integer part, optional point (`"-0.5"`, `".5"`, `"3"`)
static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[0-9]*\.?[0-9]+$").expect("Invalid number regex pattern"));

/// Return a copy of `data` with numeric strings converted per `schema`
///
/// Coercion fires for each property present in `data` at every level the
/// validator visits: nested object `properties`, and the elements of arrays
/// whose `items` schema declares properties.
pub fn coerce(schema: &Value, data: &Value) -> Value {
    let mut coerced = data.clone();
    coerce_in_place(schema, &mut coerced);
    coerced
}

/// Coerce a single scalar against a property schema
///
/// Returns `None` when the value is left untouched.
pub fn coerce_scalar(property_schema: &Value, value: &Value) -> Option<Value> {
    let text = value.as_str()?;
    match declared_type(property_schema)? {
        "integer" if INTEGER_REGEX.is_match(text) => parse_integer(text),
        "number" if NUMBER_REGEX.is_match(text) => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

/// The single `type` a schema declares
///
/// Accepts `"type": "integer"` and the nullable form `"type": ["integer", "null"]`.
pub fn declared_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(kind) => Some(kind.as_str()),
        Value::Array(kinds) => {
            let mut non_null = kinds
                .iter()
                .filter_map(Value::as_str)
                .filter(|kind| *kind != "null");
            let kind = non_null.next()?;
            non_null.next().is_none().then_some(kind)
        }
        _ => None,
    }
}

fn coerce_in_place(schema: &Value, data: &mut Value) {
    match data {
        Value::Object(object) => coerce_object(schema, object),
        Value::Array(elements) => {
            if let Some(items) = schema.get("items").filter(|items| items.is_object()) {
                for element in elements.iter_mut() {
                    coerce_in_place(items, element);
                }
            }
        }
        _ => {}
    }
}

fn coerce_object(schema: &Value, object: &mut Map<String, Value>) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (name, property_schema) in properties {
        let Some(value) = object.get_mut(name) else {
            continue;
        };
        if let Some(converted) = coerce_scalar(property_schema, value) {
            *value = converted;
        } else {
            coerce_in_place(property_schema, value);
        }
    }
}

/// Digits that overflow `u64` stay strings and fail type validation
fn parse_integer(text: &str) -> Option<Value> {
    text.parse::<u64>().ok().map(|n| Value::Number(n.into()))
}
