//! Conversions between query values, SQLite values and JSON rows.

use rusqlite::types::{Value, ValueRef};
use serde_json::Value as JsonValue;

use roster_query::filter::FilterValue;

/// Convert a bound query value to a SQLite value.
pub fn to_sqlite_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::Null,
        FilterValue::Bool(b) => Value::Integer(i64::from(*b)),
        FilterValue::Int(i) => Value::Integer(*i),
        FilterValue::Float(f) => Value::Real(*f),
        FilterValue::String(s) => Value::Text(s.clone()),
        FilterValue::Json(j) => Value::Text(j.to_string()),
    }
}

/// Convert a list of bound values.
pub fn to_sqlite_params(params: &[FilterValue]) -> Vec<Value> {
    params.iter().map(to_sqlite_value).collect()
}

/// Convert a SQLite column value to JSON.
///
/// Text is returned as-is; blobs become arrays of bytes.
pub fn from_sqlite_value(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
        }
    }
}

/// Convert a row to a JSON object keyed by column name.
pub fn row_to_json(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<JsonValue> {
    let mut map = serde_json::Map::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        map.insert(column.clone(), from_sqlite_value(row.get_ref(i)?));
    }
    Ok(JsonValue::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sqlite_value() {
        assert!(matches!(to_sqlite_value(&FilterValue::Null), Value::Null));
        assert!(matches!(to_sqlite_value(&FilterValue::Bool(true)), Value::Integer(1)));
        assert!(matches!(to_sqlite_value(&FilterValue::Int(42)), Value::Integer(42)));
        assert!(matches!(
            to_sqlite_value(&FilterValue::String("member1".into())),
            Value::Text(s) if s == "member1"
        ));
    }

    #[test]
    fn test_json_value_is_stored_as_text() {
        let value = to_sqlite_value(&FilterValue::Json(serde_json::json!({"a": 1})));
        assert!(matches!(value, Value::Text(s) if s == "{\"a\":1}"));
    }

    #[test]
    fn test_from_sqlite_value() {
        assert_eq!(from_sqlite_value(ValueRef::Null), JsonValue::Null);
        assert_eq!(from_sqlite_value(ValueRef::Integer(42)), JsonValue::from(42));
        assert_eq!(from_sqlite_value(ValueRef::Real(2.5)), JsonValue::from(2.5));
        assert_eq!(from_sqlite_value(ValueRef::Text(b"teamA")), JsonValue::from("teamA"));
    }

    #[test]
    fn test_text_that_looks_like_json_stays_text() {
        assert_eq!(
            from_sqlite_value(ValueRef::Text(b"[1,2]")),
            JsonValue::String("[1,2]".to_string())
        );
    }

    #[test]
    fn test_blob_becomes_byte_array() {
        assert_eq!(
            from_sqlite_value(ValueRef::Blob(&[1, 255])),
            serde_json::json!([1, 255])
        );
    }
}
