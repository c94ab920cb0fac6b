//! MySQL sink for change requests.
//!
//! This crate turns sync-core [`ChangeRequest`](sync_core::ChangeRequest)s into
//! MySQL statements and applies them in batches:
//!
//! - [`StatementBuilder`] - pure translation of one request into one statement
//! - [`BatchExecutor`] - bounded-concurrency application of a batch, one batch at a time
//! - [`MySqlPool`] / [`PoolConfig`] - the shared target connection pool
//! - [`StatementSink`] - the seam between the executor and the database
//!
//! # Usage Pattern
//!
//! ```ignore
//! let pool = MySqlPool::connect(&config.target).await?;
//! let executor = BatchExecutor::new(pool, config.thread);
//!
//! // Blocks until every request in the batch has been attempted.
//! let summary = executor.bulk(batch).await?;
//! ```

mod error;
mod executor;
mod pool;
mod sink;
mod statement;

pub use error::{BatchFailure, BulkError, UnitFailure};
pub use executor::{BatchExecutor, BatchSummary, UnitEffect};
pub use pool::{MySqlPool, PoolConfig};
pub use sink::{DryRunSink, StatementSink};
pub use statement::{quote_ident, PkBinding, Statement, StatementBuilder};
