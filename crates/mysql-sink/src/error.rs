//! Error types for the MySQL sink.

use std::fmt;
use sync_core::{ChangeAction, ChangeError};
use thiserror::Error;

/// Errors that can occur while connecting to the target or applying a batch.
#[derive(Error, Debug)]
pub enum BulkError {
    /// Pool configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The target server could not be reached or a connection could not be checked out.
    #[error("Failed to connect to MySQL at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: mysql_async::Error,
    },

    /// The change request violates its invariants.
    #[error("Invalid change request: {0}")]
    InvalidRequest(#[from] ChangeError),

    /// The server rejected the statement while preparing it.
    #[error("Failed to prepare statement `{sql}`: {source}")]
    Prepare {
        sql: String,
        #[source]
        source: mysql_async::Error,
    },

    /// The statement failed while executing.
    #[error("Failed to execute statement `{sql}`: {source}")]
    Execute {
        sql: String,
        #[source]
        source: mysql_async::Error,
    },

    /// A unit of work could not be dispatched or did not run to completion.
    #[error("Unit of work did not complete: {0}")]
    Unit(String),

    /// One or more units of a batch failed.
    #[error("{0}")]
    Batch(BatchFailure),
}

/// A single failed unit of work, identified by its position in the batch.
#[derive(Debug)]
pub struct UnitFailure {
    pub index: usize,
    pub action: ChangeAction,
    pub table: String,
    pub error: BulkError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} ({} on {}): {}",
            self.index, self.action, self.table, self.error
        )
    }
}

/// Aggregated failure of a batch: every failed unit, in request order.
#[derive(Debug)]
pub struct BatchFailure {
    total: usize,
    failures: Vec<UnitFailure>,
}

impl BatchFailure {
    pub(crate) fn new(total: usize, mut failures: Vec<UnitFailure>) -> Self {
        failures.sort_by_key(|f| f.index);
        Self { total, failures }
    }

    /// Number of requests in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Every failed unit, ordered by request index.
    pub fn failures(&self) -> &[UnitFailure] {
        &self.failures
    }

    /// The failure with the lowest request index.
    pub fn first(&self) -> Option<&UnitFailure> {
        self.failures.first()
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} change requests failed",
            self.failures.len(),
            self.total
        )?;
        if let Some(first) = self.first() {
            write!(f, "; first failure {first}")?;
        }
        Ok(())
    }
}
