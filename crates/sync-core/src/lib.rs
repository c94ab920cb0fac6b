//! Core types for the mysql-syncer framework.
//!
//! This crate provides the foundational, database-agnostic types shared by
//! the feeder and the sink:
//!
//! - [`ChangeRequest`] - One row-level insert, update or delete
//! - [`ChangeAction`] - The closed set of mutation kinds
//! - [`ColumnValue`] - Typed column and primary-key values
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── mysql-types   (implements From<ColumnValue> for MySQL values)
//!    └─── mysql-sink    (builds and executes statements from ChangeRequest)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::{ChangeRequest, ColumnValue};
//!
//! let req = ChangeRequest::insert("shop", "users")
//!     .with_column("name", "alice")
//!     .with_pk("id", 1);
//!
//! assert_eq!(req.pk_value, ColumnValue::Int(1));
//! ```

pub mod change;
pub mod error;
pub mod values;

pub use change::{ChangeAction, ChangeRequest};
pub use error::ChangeError;
pub use values::ColumnValue;
