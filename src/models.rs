//! Row model for the `users` table.
//!
//! Rows are not mapped onto a fixed struct: every column the table has is
//! kept, in the order the server reports it, as a JSON value keyed by column
//! name. Types without a JSON mapping of their own (enums, `INET`,
//! `INTERVAL`, ...) keep the server's text rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::postgres::{PgColumn, PgRow, PgValueFormat, Postgres};
use sqlx::types::Decimal;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use uuid::Uuid;

use crate::errors::{DbError, DbResult};

/// One row of the `users` table as an ordered column-name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    /// Returns the value of `column`, or `None` if the row has no such column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// The `name` column as a string, if present and textual.
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Column names in result-set order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for UserRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<&PgRow> for UserRecord {
    type Error = DbError;

    fn try_from(row: &PgRow) -> DbResult<Self> {
        let mut map = Map::with_capacity(row.len());
        for column in row.columns() {
            map.insert(column.name().to_string(), column_value(row, column)?);
        }
        Ok(Self(map))
    }
}

fn decode_error(column: &PgColumn, source: sqlx::Error) -> DbError {
    DbError::Decode {
        column: column.name().to_string(),
        source,
    }
}

fn decode<'r, T>(row: &'r PgRow, column: &PgColumn) -> DbResult<Option<T>>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(column.ordinal())
        .map_err(|source| decode_error(column, source))
}

/// One-dimensional arrays become JSON arrays; `NULL` elements become `null`.
fn decode_array<'r, T, F>(row: &'r PgRow, column: &PgColumn, to_json: F) -> DbResult<Option<Value>>
where
    Vec<Option<T>>: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    F: Fn(T) -> Value,
{
    Ok(decode::<Vec<Option<T>>>(row, column)?.map(|items| {
        Value::Array(
            items
                .into_iter()
                .map(|item| item.map_or(Value::Null, &to_json))
                .collect(),
        )
    }))
}

/// Reads the column's text representation as sent by the server.
///
/// Only rows fetched over the simple query protocol carry text values; a
/// binary value of a type without a mapping is [`DbError::UnsupportedType`].
fn text_value(row: &PgRow, column: &PgColumn) -> DbResult<Value> {
    let raw = row
        .try_get_raw(column.ordinal())
        .map_err(|source| decode_error(column, source))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    if matches!(raw.format(), PgValueFormat::Binary) {
        return Err(DbError::UnsupportedType {
            column: column.name().to_string(),
            type_name: column.type_info().name().to_string(),
        });
    }
    let text = row
        .try_get_unchecked::<Option<String>, _>(column.ordinal())
        .map_err(|source| decode_error(column, source))?;
    Ok(text.map_or(Value::Null, Value::from))
}

/// NUMERIC is kept as a string so no precision is lost.
fn numeric_value(row: &PgRow, column: &PgColumn) -> DbResult<Value> {
    let binary = row
        .try_get_raw(column.ordinal())
        .map(|raw| matches!(raw.format(), PgValueFormat::Binary))
        .map_err(|source| decode_error(column, source))?;
    if !binary {
        return text_value(row, column);
    }
    Ok(decode::<Decimal>(row, column)?.map_or(Value::Null, |d| Value::from(d.to_string())))
}

/// Converts a single column of `row` into JSON. SQL `NULL` becomes `Value::Null`.
fn column_value(row: &PgRow, column: &PgColumn) -> DbResult<Value> {
    let value = match column.type_info().name() {
        "BOOL" => decode::<bool>(row, column)?.map(Value::from),
        "INT2" => decode::<i16>(row, column)?.map(Value::from),
        "INT4" => decode::<i32>(row, column)?.map(Value::from),
        "INT8" => decode::<i64>(row, column)?.map(Value::from),
        "FLOAT4" => decode::<f32>(row, column)?.map(Value::from),
        "FLOAT8" => decode::<f64>(row, column)?.map(Value::from),
        "NUMERIC" => return numeric_value(row, column),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            decode::<String>(row, column)?.map(Value::from)
        }
        "UUID" => decode::<Uuid>(row, column)?.map(|id| Value::from(id.to_string())),
        "JSON" | "JSONB" => decode::<Value>(row, column)?,
        "TIMESTAMPTZ" => {
            decode::<DateTime<Utc>>(row, column)?.map(|ts| Value::from(ts.to_rfc3339()))
        }
        "TIMESTAMP" => decode::<NaiveDateTime>(row, column)?.map(|ts| Value::from(ts.to_string())),
        "DATE" => decode::<NaiveDate>(row, column)?.map(|d| Value::from(d.to_string())),
        "TIME" => decode::<NaiveTime>(row, column)?.map(|t| Value::from(t.to_string())),
        "BYTEA" => decode::<Vec<u8>>(row, column)?.map(Value::from),
        "BOOL[]" => decode_array::<bool, _>(row, column, Value::from)?,
        "INT2[]" => decode_array::<i16, _>(row, column, Value::from)?,
        "INT4[]" => decode_array::<i32, _>(row, column, Value::from)?,
        "INT8[]" => decode_array::<i64, _>(row, column, Value::from)?,
        "FLOAT4[]" => decode_array::<f32, _>(row, column, Value::from)?,
        "FLOAT8[]" => decode_array::<f64, _>(row, column, Value::from)?,
        "TEXT[]" | "VARCHAR[]" | "CHAR[]" | "BPCHAR[]" | "NAME[]" => {
            decode_array::<String, _>(row, column, Value::from)?
        }
        "UUID[]" => decode_array::<Uuid, _>(row, column, |id| Value::from(id.to_string()))?,
        _ => return text_value(row, column),
    };
    Ok(value.unwrap_or(Value::Null))
}
