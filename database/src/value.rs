//! Column values and column-name-keyed row maps.
//!
//! Every row read from the store is converted into a [`RowMap`] before it is
//! turned into a record or a report row, so the typed layers never touch
//! driver-specific row types.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Column, Row, ValueRef};
use std::fmt;

use crate::error::{DatabaseError, DbResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single column value as exchanged with the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats; aggregates such as `AVG` may come back as either.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Float(v) => Some(*v),
            SqlValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Text(value.format(DATE_FORMAT).to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// One result row keyed by column name, in select-list order.
pub type RowMap = IndexMap<String, SqlValue>;

/// Typed accessors over a [`RowMap`].
///
/// A missing column and a value of the wrong kind are both decode errors; a
/// SQL `NULL` is only accepted by the `opt_` accessors.
pub trait RowAccess {
    fn value(&self, column: &str) -> DbResult<&SqlValue>;

    fn opt_i64(&self, column: &str) -> DbResult<Option<i64>> {
        match self.value(column)? {
            SqlValue::Null => Ok(None),
            v => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| mismatch(column, "integer", v)),
        }
    }

    fn get_i64(&self, column: &str) -> DbResult<i64> {
        self.opt_i64(column)?
            .ok_or_else(|| DatabaseError::decode(column, "unexpected NULL"))
    }

    fn opt_f64(&self, column: &str) -> DbResult<Option<f64>> {
        match self.value(column)? {
            SqlValue::Null => Ok(None),
            v => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| mismatch(column, "number", v)),
        }
    }

    fn opt_string(&self, column: &str) -> DbResult<Option<String>> {
        match self.value(column)? {
            SqlValue::Null => Ok(None),
            v => v
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| mismatch(column, "text", v)),
        }
    }

    fn get_string(&self, column: &str) -> DbResult<String> {
        self.opt_string(column)?
            .ok_or_else(|| DatabaseError::decode(column, "unexpected NULL"))
    }

    /// Dates travel as `YYYY-MM-DD` text; a trailing time part is ignored.
    fn get_date(&self, column: &str) -> DbResult<NaiveDate> {
        let text = self.get_string(column)?;
        let date_part = text.get(..10).unwrap_or(&text);
        NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map_err(|e| DatabaseError::decode(column, format!("invalid date '{}': {}", text, e)))
    }
}

impl RowAccess for RowMap {
    fn value(&self, column: &str) -> DbResult<&SqlValue> {
        self.get(column)
            .ok_or_else(|| DatabaseError::decode(column, "column missing from row"))
    }
}

fn mismatch(column: &str, expected: &str, found: &SqlValue) -> DatabaseError {
    DatabaseError::decode(
        column,
        format!("expected {}, found {}", expected, found.kind()),
    )
}

/// Converts a driver row into a column-name-keyed map.
pub fn row_to_map(row: &AnyRow) -> DbResult<RowMap> {
    let mut map = RowMap::with_capacity(row.len());
    for column in row.columns() {
        let value = decode_column(row, column.ordinal())
            .map_err(|e| DatabaseError::decode(column.name(), e.to_string()))?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

fn decode_column(row: &AnyRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    // SQLite types NULL aggregates as NULL, which no typed decode accepts
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return Ok(v.map_or(SqlValue::Null, SqlValue::Int));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return Ok(v.map_or(SqlValue::Null, SqlValue::Float));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return Ok(v.map_or(SqlValue::Null, |b| SqlValue::Int(i64::from(b))));
    }
    row.try_get::<Option<String>, _>(index)
        .map(|v| v.map_or(SqlValue::Null, SqlValue::Text))
}

/// Placeholder list for `values`. `NULL` is written inline and never bound.
pub(crate) fn placeholders(values: &[SqlValue]) -> String {
    values
        .iter()
        .map(|v| if v.is_null() { "NULL" } else { "?" })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Binds every non-null value, in order, to `query`.
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    values: Vec<SqlValue>,
) -> Query<'q, Any, AnyArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Null => query,
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
        };
    }
    query
}
