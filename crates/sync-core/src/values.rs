//! Column values carried by change events.
//!
//! A [`ColumnValue`] is the typed, database-agnostic value that a change event
//! holds for each column and for its primary key. Target-specific crates
//! implement `From<ColumnValue>` for their native parameter types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value.
///
/// Deserialization is untagged so that plain JSON scalars map directly:
/// `null`, booleans, integers, floats and strings. Arrays of small integers
/// become [`ColumnValue::Bytes`]. Dates are only produced programmatically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// SQL NULL, also used for an absent primary key
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// Unsigned integer that does not fit in an i64
    UInt(u64),

    /// 64-bit floating point
    Float(f64),

    /// Text value
    String(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Date and time without time zone
    DateTime(NaiveDateTime),
}

impl ColumnValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value is textual and therefore quoted when rendered as a literal.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String(_) | Self::Date(_) | Self::DateTime(_))
    }

    /// Render the value as an SQL literal.
    ///
    /// Textual values are double-quoted with `"` and `\` backslash-escaped,
    /// numbers are rendered bare and null becomes the bare word `null`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Int(i) => i.to_string(),
            Self::UInt(u) => u.to_string(),
            // NaN and infinities have no SQL spelling
            Self::Float(f) if !f.is_finite() => "null".to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => quote(s),
            Self::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Date(d) => quote(&d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => quote(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for ColumnValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<NaiveDate> for ColumnValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for ColumnValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
