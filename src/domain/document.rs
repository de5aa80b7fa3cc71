//! Document content model
//!
//! Documents are schemaless: their content is an ordered mapping of field
//! names to [`FieldValue`]s. Ordered maps keep every serialized form (store
//! writes, snapshots) deterministic.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Content of a single document
pub type Fields = BTreeMap<String, FieldValue>;

/// A single value held by a document field
///
/// Mirrors the value kinds of the document store. `Bytes`, `Reference` and
/// `GeoPoint` can be read and written back unchanged but have no snapshot
/// encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null
    Null,
    /// Boolean
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// Double-precision float
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Store timestamp with nanosecond precision, always UTC
    Timestamp(DateTime<Utc>),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Reference to another document (full resource name)
    Reference(String),
    /// Geographic point
    GeoPoint {
        /// Latitude in degrees
        latitude: f64,
        /// Longitude in degrees
        longitude: f64,
    },
    /// Ordered list of values
    Array(Vec<FieldValue>),
    /// Nested map
    Map(Fields),
}

impl FieldValue {
    /// Short name of the value kind, used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Reference(_) => "reference",
            FieldValue::GeoPoint { .. } => "geo_point",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
        }
    }

    /// Returns true for [`FieldValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the nested map, if this is a map
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            FieldValue::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the string, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts plain JSON into a field value
    ///
    /// Integral numbers that fit in an `i64` become [`FieldValue::Integer`],
    /// every other number becomes [`FieldValue::Double`]. JSON has no
    /// timestamp type, so strings stay strings.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from_json).collect())
            }
            Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Fields> for FieldValue {
    fn from(value: Fields) -> Self {
        FieldValue::Map(value)
    }
}

/// Converts a JSON object into document fields
///
/// Non-object input yields empty fields.
///
/// # Examples
///
/// ```
/// use bastion::domain::document::{fields_from_json, FieldValue};
/// use serde_json::json;
///
/// let fields = fields_from_json(json!({"name": "Aria", "level": 3}));
/// assert_eq!(fields["level"], FieldValue::Integer(3));
/// ```
pub fn fields_from_json(value: Value) -> Fields {
    match FieldValue::from_json(value) {
        FieldValue::Map(fields) => fields,
        _ => Fields::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(FieldValue::from_json(json!(7)), FieldValue::Integer(7));
        assert_eq!(FieldValue::from_json(json!(2.5)), FieldValue::Double(2.5));
        assert_eq!(
            FieldValue::from_json(json!(u64::MAX)),
            FieldValue::Double(u64::MAX as f64)
        );
    }

    #[test]
    fn test_from_json_nested() {
        let fields = fields_from_json(json!({
            "stats": {"level": 2, "tags": ["a", null]},
            "active": true
        }));

        let stats = fields["stats"].as_map().unwrap();
        assert_eq!(stats["level"].as_i64(), Some(2));
        assert_eq!(
            stats["tags"],
            FieldValue::Array(vec![FieldValue::from("a"), FieldValue::Null])
        );
        assert_eq!(fields["active"], FieldValue::Boolean(true));
    }

    #[test]
    fn test_fields_from_non_object() {
        assert!(fields_from_json(json!([1, 2])).is_empty());
    }

    #[test]
    fn test_kind_names() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(FieldValue::from(ts).kind(), "timestamp");
        assert_eq!(FieldValue::Bytes(vec![1]).kind(), "bytes");
        assert_eq!(
            FieldValue::GeoPoint {
                latitude: 0.0,
                longitude: 0.0
            }
            .kind(),
            "geo_point"
        );
    }
}
