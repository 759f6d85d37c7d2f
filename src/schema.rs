//! Parse-or-default validation of response bodies.
//!
//! The backend owns its schemas. When a payload does not have the expected
//! shape the page still renders, with an empty result, and a warning is logged.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

fn parse_body(body: &str) -> Option<Value> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Schema mismatch: response body is not JSON: {}", err);
            None
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn list_from_value<T: DeserializeOwned>(value: Value, field: &str) -> Vec<T> {
    let Value::Array(items) = value else {
        warn!(
            "Schema mismatch: expected `{}` to be an array, got {}",
            field,
            describe(&value)
        );
        return Vec::new();
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if parsed.len() < total {
        warn!(
            "Schema mismatch: skipped {} of {} entries in `{}`",
            total - parsed.len(),
            total,
            field
        );
    }
    parsed
}

/// Read `body[field]` as a list of `T`; anything unexpected yields `[]`.
pub fn extract_list<T: DeserializeOwned>(body: &str, field: &str) -> Vec<T> {
    let Some(mut value) = parse_body(body) else {
        return Vec::new();
    };
    match value.get_mut(field).map(Value::take) {
        Some(inner) => list_from_value(inner, field),
        None => {
            warn!("Schema mismatch: field `{}` missing from response", field);
            Vec::new()
        }
    }
}

/// Read a body that is itself a JSON array.
pub fn extract_root_list<T: DeserializeOwned>(body: &str) -> Vec<T> {
    parse_body(body)
        .map(|value| list_from_value(value, "<root>"))
        .unwrap_or_default()
}

/// Read `body[field]` (or the whole body when `field` is `None`) as a `T`.
pub fn extract_object<T: DeserializeOwned>(body: &str, field: Option<&str>) -> Option<T> {
    let mut value = parse_body(body)?;
    let label = field.unwrap_or("<root>");
    let inner = match field {
        Some(field) => value.get_mut(field).map(Value::take),
        None => Some(value),
    };

    match inner {
        Some(inner @ Value::Object(_)) => match serde_json::from_value(inner) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("Schema mismatch: `{}` did not match: {}", label, err);
                None
            }
        },
        Some(other) => {
            warn!(
                "Schema mismatch: expected `{}` to be an object, got {}",
                label,
                describe(&other)
            );
            None
        }
        None => {
            warn!("Schema mismatch: field `{}` missing from response", label);
            None
        }
    }
}
