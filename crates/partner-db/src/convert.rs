//! JSON <-> Postgres value conversion
//!
//! Parameters are converted according to the type the server inferred for
//! each placeholder, so a JSON string bound against a `uuid` column is sent
//! as a UUID rather than as text. Result columns are decoded by their
//! reported type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use partner_store::Row;
use serde_json::{Number, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Column, Postgres, Row as _, TypeInfo, ValueRef};
use tracing::warn;
use uuid::Uuid;

use crate::error::DbError;

pub(crate) type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// A parameter converted to a concrete Postgres type
///
/// `None` inside a variant is a typed SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int2(Option<i16>),
    Int4(Option<i32>),
    Int8(Option<i64>),
    Float4(Option<f32>),
    Float8(Option<f64>),
    Text(Option<String>),
    Uuid(Option<Uuid>),
    Timestamptz(Option<DateTime<Utc>>),
    Timestamp(Option<NaiveDateTime>),
    Date(Option<NaiveDate>),
    Json(Option<Value>),
    BoolArray(Option<Vec<bool>>),
    TextArray(Option<Vec<String>>),
    Int4Array(Option<Vec<i32>>),
    Int8Array(Option<Vec<i64>>),
    UuidArray(Option<Vec<Uuid>>),
}

impl SqlValue {
    /// Convert a JSON value for a placeholder of type `type_name`
    ///
    /// Unknown or missing type names fall back to the JSON value's own
    /// shape, which the server accepts for text-like and enum columns.
    pub fn from_json(value: &Value, type_name: Option<&str>) -> Result<Self, String> {
        let Some(type_name) = type_name else {
            return Ok(Self::from_json_shape(value));
        };

        let converted = match type_name {
            "BOOL" => SqlValue::Bool(nullable(value, as_bool)?),
            "INT2" => SqlValue::Int2(nullable(value, |v| {
                as_i64(v).and_then(|n| i16::try_from(n).map_err(|e| e.to_string()))
            })?),
            "INT4" => SqlValue::Int4(nullable(value, |v| {
                as_i64(v).and_then(|n| i32::try_from(n).map_err(|e| e.to_string()))
            })?),
            "INT8" => SqlValue::Int8(nullable(value, as_i64)?),
            "FLOAT4" => SqlValue::Float4(nullable(value, |v| as_f64(v).map(|f| f as f32))?),
            "FLOAT8" => SqlValue::Float8(nullable(value, as_f64)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
                SqlValue::Text(nullable(value, |v| Ok(as_text(v)))?)
            }
            "UUID" => SqlValue::Uuid(nullable(value, as_uuid)?),
            "TIMESTAMPTZ" => SqlValue::Timestamptz(nullable(value, as_timestamptz)?),
            "TIMESTAMP" => SqlValue::Timestamp(nullable(value, as_timestamp)?),
            "DATE" => SqlValue::Date(nullable(value, as_date)?),
            "JSON" | "JSONB" => SqlValue::Json(nullable(value, |v| Ok(v.clone()))?),
            "BOOL[]" => SqlValue::BoolArray(nullable(value, |v| as_array(v, as_bool))?),
            "TEXT[]" | "VARCHAR[]" => {
                SqlValue::TextArray(nullable(value, |v| as_array(v, |e| Ok(as_text(e))))?)
            }
            "INT4[]" => SqlValue::Int4Array(nullable(value, |v| {
                as_array(v, |e| {
                    as_i64(e).and_then(|n| i32::try_from(n).map_err(|e| e.to_string()))
                })
            })?),
            "INT8[]" => SqlValue::Int8Array(nullable(value, |v| as_array(v, as_i64))?),
            "UUID[]" => SqlValue::UuidArray(nullable(value, |v| as_array(v, as_uuid))?),
            "NUMERIC" => return Err("NUMERIC parameters are not supported".to_string()),
            _ => Self::from_json_shape(value),
        };
        Ok(converted)
    }

    fn from_json_shape(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Text(None),
            Value::Bool(b) => SqlValue::Bool(Some(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int8(Some(i)),
                None => SqlValue::Float8(n.as_f64()),
            },
            Value::String(s) => SqlValue::Text(Some(s.clone())),
            Value::Array(_) | Value::Object(_) => SqlValue::Json(Some(value.clone())),
        }
    }

    /// Append this value to a query's arguments
    pub(crate) fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        match self {
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int2(v) => query.bind(v),
            SqlValue::Int4(v) => query.bind(v),
            SqlValue::Int8(v) => query.bind(v),
            SqlValue::Float4(v) => query.bind(v),
            SqlValue::Float8(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Uuid(v) => query.bind(v),
            SqlValue::Timestamptz(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Json(v) => query.bind(v.map(Json)),
            SqlValue::BoolArray(v) => query.bind(v),
            SqlValue::TextArray(v) => query.bind(v),
            SqlValue::Int4Array(v) => query.bind(v),
            SqlValue::Int8Array(v) => query.bind(v),
            SqlValue::UuidArray(v) => query.bind(v),
        }
    }
}

/// Convert every parameter, reporting the 1-based placeholder on failure
pub fn convert_params(params: &[Value], types: &[Option<String>]) -> Result<Vec<SqlValue>, DbError> {
    params
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let type_name = types.get(i).and_then(|t| t.as_deref());
            SqlValue::from_json(value, type_name).map_err(|message| DbError::Bind {
                index: i + 1,
                type_name: type_name.unwrap_or("unknown").to_string(),
                message,
            })
        })
        .collect()
}

fn nullable<T>(value: &Value, convert: impl Fn(&Value) -> Result<T, String>) -> Result<Option<T>, String> {
    match value {
        Value::Null => Ok(None),
        v => convert(v).map(Some),
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {}, got {}", expected, value)
}

fn as_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        v => Err(mismatch("boolean", v)),
    }
}

fn as_i64(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| mismatch("integer", value)),
        Value::String(s) => s.parse().map_err(|_| mismatch("integer", value)),
        v => Err(mismatch("integer", v)),
    }
}

fn as_f64(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch("number", value)),
        Value::String(s) => s.parse().map_err(|_| mismatch("number", value)),
        v => Err(mismatch("number", v)),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        v => v.to_string(),
    }
}

fn as_uuid(value: &Value) -> Result<Uuid, String> {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| mismatch("uuid", value))
}

fn as_timestamptz(value: &Value) -> Result<DateTime<Utc>, String> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| mismatch("RFC 3339 timestamp", value))
}

fn as_timestamp(value: &Value) -> Result<NaiveDateTime, String> {
    let s = value.as_str().ok_or_else(|| mismatch("timestamp", value))?;
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_utc()))
        .map_err(|_| mismatch("timestamp", value))
}

fn as_date(value: &Value) -> Result<NaiveDate, String> {
    let s = value.as_str().ok_or_else(|| mismatch("date", value))?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| mismatch("date", value))
}

fn as_array<T>(value: &Value, convert: impl Fn(&Value) -> Result<T, String>) -> Result<Vec<T>, String> {
    value
        .as_array()
        .ok_or_else(|| mismatch("array", value))?
        .iter()
        .map(convert)
        .collect()
}

fn timestamp_json(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn float_json(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

/// Decode a result row into a JSON object keyed by column name
pub fn row_to_json(row: &PgRow) -> Result<Row, DbError> {
    let mut out = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        out.insert(column.name().to_string(), column_to_json(row, i, type_name)?);
    }
    Ok(out)
}

fn column_to_json(row: &PgRow, i: usize, type_name: &str) -> Result<Value, DbError> {
    if row.try_get_raw(i)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOL" => Value::Bool(row.try_get::<bool, _>(i)?),
        "INT2" => Value::from(row.try_get::<i16, _>(i)?),
        "INT4" => Value::from(row.try_get::<i32, _>(i)?),
        "INT8" => Value::from(row.try_get::<i64, _>(i)?),
        "FLOAT4" => float_json(row.try_get::<f32, _>(i)? as f64),
        "FLOAT8" => float_json(row.try_get::<f64, _>(i)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::String(row.try_get::<String, _>(i)?),
        "UUID" => Value::String(row.try_get::<Uuid, _>(i)?.to_string()),
        "TIMESTAMPTZ" => timestamp_json(row.try_get::<DateTime<Utc>, _>(i)?),
        "TIMESTAMP" => timestamp_json(row.try_get::<NaiveDateTime, _>(i)?.and_utc()),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(i)?.to_string()),
        "JSON" | "JSONB" => row.try_get::<Value, _>(i)?,
        "BOOL[]" => Value::from(row.try_get::<Vec<bool>, _>(i)?),
        "TEXT[]" | "VARCHAR[]" => Value::from(row.try_get::<Vec<String>, _>(i)?),
        "INT4[]" => Value::from(row.try_get::<Vec<i32>, _>(i)?),
        "INT8[]" => Value::from(row.try_get::<Vec<i64>, _>(i)?),
        "UUID[]" => Value::from(
            row.try_get::<Vec<Uuid>, _>(i)?
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>(),
        ),
        "NUMERIC" => {
            warn!("NUMERIC column {} decoded as null", i);
            Value::Null
        }
        // Enums and other text-encoded types
        _ => row
            .try_get_unchecked::<Option<String>, _>(i)?
            .map_or(Value::Null, Value::String),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_conversion() {
        let id = "6f1c1d52-3d2b-4c8e-9d53-5d5e0f6a1b2c";
        assert_eq!(
            SqlValue::from_json(&json!(id), Some("UUID")).unwrap(),
            SqlValue::Uuid(Some(Uuid::parse_str(id).unwrap()))
        );
        assert_eq!(
            SqlValue::from_json(&json!(5), Some("INT4")).unwrap(),
            SqlValue::Int4(Some(5))
        );
        assert_eq!(
            SqlValue::from_json(&json!("2024-03-01"), Some("DATE")).unwrap(),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1))
        );
        assert_eq!(
            SqlValue::from_json(&json!({"mood": 4}), Some("JSONB")).unwrap(),
            SqlValue::Json(Some(json!({"mood": 4})))
        );
        assert_eq!(
            SqlValue::from_json(&json!(["a", "b"]), Some("TEXT[]")).unwrap(),
            SqlValue::TextArray(Some(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_null_stays_typed() {
        assert_eq!(
            SqlValue::from_json(&Value::Null, Some("TIMESTAMPTZ")).unwrap(),
            SqlValue::Timestamptz(None)
        );
        assert_eq!(
            SqlValue::from_json(&Value::Null, Some("UUID")).unwrap(),
            SqlValue::Uuid(None)
        );
        assert_eq!(SqlValue::from_json(&Value::Null, None).unwrap(), SqlValue::Text(None));
    }

    #[test]
    fn test_timestamps() {
        let parsed = SqlValue::from_json(&json!("2024-03-01T10:00:00.000Z"), Some("TIMESTAMPTZ"))
            .unwrap();
        let SqlValue::Timestamptz(Some(dt)) = parsed else {
            panic!("unexpected {:?}", parsed);
        };
        assert_eq!(timestamp_json(dt), json!("2024-03-01T10:00:00.000Z"));

        assert!(matches!(
            SqlValue::from_json(&json!("2024-03-01 10:00:00"), Some("TIMESTAMP")).unwrap(),
            SqlValue::Timestamp(Some(_))
        ));
    }

    #[test]
    fn test_shape_fallback() {
        assert_eq!(
            SqlValue::from_json(&json!("active"), Some("partner_status")).unwrap(),
            SqlValue::Text(Some("active".into()))
        );
        assert_eq!(SqlValue::from_json(&json!(7), None).unwrap(), SqlValue::Int8(Some(7)));
        assert_eq!(SqlValue::from_json(&json!(2.5), None).unwrap(), SqlValue::Float8(Some(2.5)));
        assert_eq!(
            SqlValue::from_json(&json!([1, 2]), None).unwrap(),
            SqlValue::Json(Some(json!([1, 2])))
        );
    }

    #[test]
    fn test_mismatch_reports_placeholder() {
        let err = convert_params(
            &[json!("u1"), json!("not-a-uuid")],
            &[Some("TEXT".into()), Some("UUID".into())],
        )
        .unwrap_err();

        match err {
            DbError::Bind { index, type_name, .. } => {
                assert_eq!(index, 2);
                assert_eq!(type_name, "UUID");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_integer() {
        assert!(SqlValue::from_json(&json!(70000), Some("INT2")).is_err());
        assert!(SqlValue::from_json(&json!(1.5), Some("INT8")).is_err());
        assert_eq!(
            SqlValue::from_json(&json!("42"), Some("INT8")).unwrap(),
            SqlValue::Int8(Some(42))
        );
    }

    #[test]
    fn test_numeric_parameters_refused() {
        assert!(SqlValue::from_json(&json!(9.99), Some("NUMERIC")).is_err());
    }
}
