//! MySQL type conversions for sync-core types.
//!
//! This crate converts sync-core's `ColumnValue` into `mysql_async` parameter
//! values, so statements built from change requests can bind them directly.
//!
//! # Example
//!
//! ```rust
//! use mysql_types::MySQLValue;
//! use sync_core::ColumnValue;
//!
//! let mysql_value: MySQLValue = ColumnValue::Bool(true).into();
//! assert_eq!(mysql_value.into_inner(), mysql_async::Value::Int(1));
//! ```

pub mod forward;

pub use forward::{to_params, MySQLValue};
