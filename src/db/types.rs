//! Database type definitions
//!
//! Core data structures for representing driver values and materialized
//! query results.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::time::Duration;

/// A single value as returned by the driver, before display normalization
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value
    Null,

    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Text/string value
    Text(String),

    /// Boolean value
    Boolean(bool),

    /// Date/time value without timezone
    Timestamp(NaiveDateTime),

    /// Binary data
    Bytes(Vec<u8>),

    /// Array-of-text column value
    TextArray(Vec<String>),
}

/// Raw rows as produced by a [`Database`](crate::db::Database) backend
#[derive(Debug, Clone, Default)]
pub struct RawResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Position of a display row inside the database result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOrigin {
    /// Index into `QueryResult::values`
    pub source: usize,
    /// Array element index this display row shows (0 for the first row)
    pub offset: usize,
}

/// Materialized output of one select
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Typed values, one entry per database row
    pub values: Vec<Vec<SqlValue>>,
    /// Display strings, one entry per display row
    pub rows: Vec<Vec<String>>,
    /// For each display row, the database row it came from
    pub origins: Vec<RowOrigin>,
    /// Query execution time
    pub execution_time: Duration,
}

/// The zero date used by drivers for time-only values
pub fn zero_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(0, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Render a timestamp the way the table shows it.
///
/// Midnight renders date-only, the zero date renders time-only,
/// anything else renders both.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        return ts.format("%Y-%m-%d").to_string();
    }
    if ts.date() == zero_date() {
        return ts.format("%H:%M:%S").to_string();
    }
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl SqlValue {
    /// Canonical display string for this value
    pub fn display_string(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Boolean(b) => b.to_string(),
            SqlValue::Timestamp(ts) => format_timestamp(ts),
            SqlValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            SqlValue::TextArray(items) => crate::db::params::array_literal(items),
        }
    }

    /// Check if this is a NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Array elements, if this is an array value
    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            SqlValue::TextArray(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl QueryResult {
    /// Number of database rows (before array expansion)
    pub fn source_count(&self) -> usize {
        self.values.len()
    }

    /// Typed values of the database row behind a display row
    pub fn source_values(&self, display_row: usize) -> Option<&[SqlValue]> {
        let origin = self.origins.get(display_row)?;
        self.values.get(origin.source).map(|v| v.as_slice())
    }

    /// Display strings of the first display row of the same database row
    pub fn source_strings(&self, display_row: usize) -> Option<Vec<String>> {
        let values = self.source_values(display_row)?;
        Some(values.iter().map(SqlValue::display_string).collect())
    }
}
