//! Forward conversion: ColumnValue → MySQLValue
//!
//! This module implements `From<ColumnValue>` for `MySQLValue`, converting
//! sync-core values into MySQL-compatible values for bound statement parameters.

use chrono::{Datelike, Timelike};
use mysql_async::{Params, Value};
use sync_core::ColumnValue;

/// MySQL value wrapper for type-safe conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct MySQLValue(pub Value);

impl MySQLValue {
    /// Get the inner mysql_async::Value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<ColumnValue> for MySQLValue {
    fn from(value: ColumnValue) -> Self {
        match value {
            ColumnValue::Null => MySQLValue(Value::NULL),

            // Boolean - MySQL uses TINYINT(1)
            ColumnValue::Bool(b) => MySQLValue(Value::Int(if b { 1 } else { 0 })),

            ColumnValue::Int(i) => MySQLValue(Value::Int(i)),
            ColumnValue::UInt(u) => MySQLValue(Value::UInt(u)),
            ColumnValue::Float(f) => MySQLValue(Value::Double(f)),

            ColumnValue::String(s) => MySQLValue(Value::Bytes(s.into_bytes())),
            ColumnValue::Bytes(b) => MySQLValue(Value::Bytes(b)),

            // Date - MySQL DATE
            ColumnValue::Date(d) => MySQLValue(Value::Date(
                d.year() as u16,
                d.month() as u8,
                d.day() as u8,
                0,
                0,
                0,
                0,
            )),

            // DateTime - MySQL DATETIME(6), microsecond precision
            ColumnValue::DateTime(dt) => MySQLValue(Value::Date(
                dt.year() as u16,
                dt.month() as u8,
                dt.day() as u8,
                dt.hour() as u8,
                dt.minute() as u8,
                dt.second() as u8,
                dt.nanosecond() / 1000,
            )),
        }
    }
}

/// Convert an ordered list of values into positional statement parameters.
pub fn to_params(values: &[ColumnValue]) -> Params {
    if values.is_empty() {
        return Params::Empty;
    }
    Params::Positional(
        values
            .iter()
            .map(|v| MySQLValue::from(v.clone()).into_inner())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_bool_conversion() {
        let mysql_val: MySQLValue = ColumnValue::Bool(true).into();
        assert!(matches!(mysql_val.0, Value::Int(1)));

        let mysql_val: MySQLValue = ColumnValue::Bool(false).into();
        assert!(matches!(mysql_val.0, Value::Int(0)));
    }

    #[test]
    fn test_integer_conversion() {
        let mysql_val: MySQLValue = ColumnValue::Int(-42).into();
        assert!(matches!(mysql_val.0, Value::Int(-42)));

        let mysql_val: MySQLValue = ColumnValue::UInt(u64::MAX).into();
        assert!(matches!(mysql_val.0, Value::UInt(u64::MAX)));
    }

    #[test]
    fn test_string_conversion() {
        let mysql_val: MySQLValue = ColumnValue::from("hello").into();
        assert_eq!(mysql_val.into_inner(), Value::Bytes(b"hello".to_vec()));
    }

    #[test]
    fn test_null_conversion() {
        let mysql_val: MySQLValue = ColumnValue::Null.into();
        assert_eq!(mysql_val.into_inner(), Value::NULL);
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_micro_opt(14, 30, 45, 123_456)
            .unwrap();
        let mysql_val: MySQLValue = ColumnValue::DateTime(dt).into();
        assert_eq!(
            mysql_val.into_inner(),
            Value::Date(2024, 6, 15, 14, 30, 45, 123_456)
        );
    }

    #[test]
    fn test_to_params_keeps_order() {
        let params = to_params(&[ColumnValue::Int(1), ColumnValue::from("a")]);
        match params {
            Params::Positional(values) => {
                assert_eq!(values, vec![Value::Int(1), Value::Bytes(b"a".to_vec())]);
            }
            other => panic!("Expected positional params, got {other:?}"),
        }
        assert!(matches!(to_params(&[]), Params::Empty));
    }
}
