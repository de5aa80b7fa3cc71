//! Snapshot text encoding
//!
//! Converts document content to plain JSON. Timestamps become RFC 3339
//! strings in UTC with a `Z` suffix and as many sub-second digits as needed
//! (up to nanoseconds). Value kinds without a plain JSON form (bytes,
//! references, geo points, non-finite doubles) are rejected with the path of
//! the offending field.

use crate::domain::{BastionError, FieldValue, Fields, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

/// Format a timestamp the way snapshots carry it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Encode document fields as a JSON object
///
/// `path` is the location of `fields` (usually `collection/id`), used to
/// name the offending field in errors.
///
/// # Errors
///
/// Returns [`BastionError::Encoding`] for values with no JSON encoding.
pub fn encode_fields(path: &str, fields: &Fields) -> Result<Value> {
    let mut object = Map::new();
    for (key, value) in fields {
        let field_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        object.insert(key.clone(), encode_value(&field_path, value)?);
    }
    Ok(Value::Object(object))
}

/// Encode a single value
///
/// # Errors
///
/// Returns [`BastionError::Encoding`] for values with no JSON encoding.
pub fn encode_value(path: &str, value: &FieldValue) -> Result<Value> {
    match value {
        FieldValue::Null => Ok(Value::Null),
        FieldValue::Boolean(b) => Ok(Value::Bool(*b)),
        FieldValue::Integer(n) => Ok(Value::from(*n)),
        FieldValue::Double(d) => Number::from_f64(*d).map(Value::Number).ok_or_else(|| {
            BastionError::Encoding(format!("{path}: non-finite double {d} is not encodable"))
        }),
        FieldValue::String(s) => Ok(Value::String(s.clone())),
        FieldValue::Timestamp(ts) => Ok(Value::String(format_timestamp(ts))),
        FieldValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| encode_value(&format!("{path}[{index}]"), item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        FieldValue::Map(fields) => encode_fields(path, fields),
        FieldValue::Bytes(_) | FieldValue::Reference(_) | FieldValue::GeoPoint { .. } => {
            Err(BastionError::Encoding(format!(
                "{path}: value of type {} is not encodable",
                value.kind()
            )))
        }
    }
}

/// Render a JSON value as 2-space indented text
///
/// # Errors
///
/// Returns [`BastionError::Serialization`] if rendering fails.
pub fn to_pretty_text(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Hex-encoded SHA-256 of `text`
pub fn checksum(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
