//! Firestore typed-value JSON codec
//!
//! The Firestore REST API wraps every value in a single-key object naming its
//! type (`{"integerValue": "3"}`, `{"mapValue": {"fields": {...}}}`). This
//! module converts between that wire form and [`Fields`]. The local file store
//! persists documents in the same form.

use crate::domain::{BastionError, FieldValue, Fields, Result, StoreError};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// Encode document fields into the `fields` object of a Firestore document
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

/// Encode a single value into its typed wire form
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(n) => json!({ "integerValue": n.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": encode_double(*d) }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
        }
        FieldValue::Bytes(bytes) => {
            json!({ "bytesValue": general_purpose::STANDARD.encode(bytes) })
        }
        FieldValue::Reference(name) => json!({ "referenceValue": name }),
        FieldValue::GeoPoint {
            latitude,
            longitude,
        } => json!({ "geoPointValue": { "latitude": latitude, "longitude": longitude } }),
        FieldValue::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

// Proto3 JSON spells non-finite doubles as strings.
fn encode_double(d: f64) -> Value {
    if d.is_nan() {
        Value::String("NaN".to_string())
    } else if d.is_infinite() {
        Value::String(if d > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        json!(d)
    }
}

/// Decode the `fields` object of a Firestore document
///
/// A missing `fields` key (empty document) decodes to empty fields.
///
/// # Errors
///
/// Returns [`StoreError::InvalidResponse`] for malformed or unknown value
/// encodings.
pub fn decode_fields(fields: Option<&Value>) -> Result<Fields> {
    match fields {
        None | Some(Value::Null) => Ok(Fields::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| decode_value(value).map(|v| (key.clone(), v)))
            .collect(),
        Some(other) => Err(invalid(format!("fields must be an object, got {other}"))),
    }
}

/// Decode a single typed wire value
///
/// # Errors
///
/// Returns [`StoreError::InvalidResponse`] for malformed or unknown value
/// encodings.
pub fn decode_value(value: &Value) -> Result<FieldValue> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid(format!("typed value must be an object, got {value}")))?;

    let (kind, inner) = single_entry(object)?;

    match kind {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| invalid(format!("booleanValue is not a boolean: {inner}"))),
        "integerValue" => decode_integer(inner).map(FieldValue::Integer),
        "doubleValue" => decode_double(inner).map(FieldValue::Double),
        "stringValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .ok_or_else(|| invalid(format!("stringValue is not a string: {inner}"))),
        "timestampValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| invalid(format!("timestampValue is not a string: {inner}")))?;
            DateTime::parse_from_rfc3339(raw)
                .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|e| invalid(format!("invalid timestampValue '{raw}': {e}")))
        }
        "bytesValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| invalid(format!("bytesValue is not a string: {inner}")))?;
            general_purpose::STANDARD
                .decode(raw)
                .map(FieldValue::Bytes)
                .map_err(|e| invalid(format!("invalid bytesValue: {e}")))
        }
        "referenceValue" => inner
            .as_str()
            .map(|s| FieldValue::Reference(s.to_string()))
            .ok_or_else(|| invalid(format!("referenceValue is not a string: {inner}"))),
        "geoPointValue" => {
            let latitude = inner.get("latitude").and_then(Value::as_f64).unwrap_or(0.0);
            let longitude = inner.get("longitude").and_then(Value::as_f64).unwrap_or(0.0);
            Ok(FieldValue::GeoPoint {
                latitude,
                longitude,
            })
        }
        "arrayValue" => match inner.get("values") {
            None | Some(Value::Null) => Ok(FieldValue::Array(Vec::new())),
            Some(Value::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::Array),
            Some(other) => Err(invalid(format!("arrayValue.values is not a list: {other}"))),
        },
        "mapValue" => decode_fields(inner.get("fields")).map(FieldValue::Map),
        other => Err(invalid(format!("unsupported value type '{other}'"))),
    }
}

fn single_entry(object: &Map<String, Value>) -> Result<(&str, &Value)> {
    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (Some((kind, inner)), None) => Ok((kind.as_str(), inner)),
        _ => Err(invalid(format!(
            "typed value must have exactly one key, got {}",
            object.len()
        ))),
    }
}

fn decode_integer(inner: &Value) -> Result<i64> {
    match inner {
        Value::String(s) => s
            .parse()
            .map_err(|e| invalid(format!("invalid integerValue '{s}': {e}"))),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| invalid(format!("integerValue out of range: {n}"))),
        other => Err(invalid(format!("integerValue has wrong type: {other}"))),
    }
}

fn decode_double(inner: &Value) -> Result<f64> {
    match inner {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("doubleValue out of range: {n}"))),
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse()
                .map_err(|e| invalid(format!("invalid doubleValue '{other}': {e}"))),
        },
        other => Err(invalid(format!("doubleValue has wrong type: {other}"))),
    }
}

fn invalid(message: String) -> BastionError {
    BastionError::Store(StoreError::InvalidResponse(message))
}
