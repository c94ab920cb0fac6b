//! Batched application of change requests.
//!
//! [`BatchExecutor::bulk`] applies one batch at a time per executor. Inside a
//! batch, up to `workers` units of work run concurrently, one per request, and
//! every request is attempted even when others fail. Outcomes are collected
//! per request once all units have finished.

use crate::error::{BatchFailure, BulkError, UnitFailure};
use crate::sink::StatementSink;
use crate::statement::{PkBinding, StatementBuilder};
use std::sync::Arc;
use sync_core::{ChangeAction, ChangeRequest};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// What a successful unit of work did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitEffect {
    Executed { rows_affected: u64 },
    /// Insert or update without column data
    Skipped,
}

/// Outcome of a fully successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub requests: usize,
    pub executed: usize,
    pub skipped: usize,
    pub rows_affected: u64,
}

struct DispatchedUnit {
    index: usize,
    action: ChangeAction,
    table: String,
    handle: JoinHandle<Result<UnitEffect, BulkError>>,
}

/// Applies batches of change requests through a [`StatementSink`].
pub struct BatchExecutor<S> {
    sink: Arc<S>,
    builder: StatementBuilder,
    workers: usize,
    gate: Arc<Mutex<()>>,
}

impl<S> BatchExecutor<S>
where
    S: StatementSink + 'static,
{
    /// Create an executor running at most `workers` units concurrently.
    /// The worker count is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(sink: S, workers: usize) -> Self {
        Self {
            sink: Arc::new(sink),
            builder: StatementBuilder::default(),
            workers: workers.clamp(1, Semaphore::MAX_PERMITS),
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_pk_binding(mut self, pk_binding: PkBinding) -> Self {
        self.builder = StatementBuilder::new(pk_binding);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Apply one batch.
    ///
    /// Waits until no other batch is in flight on this executor. Returns once
    /// every request has been attempted; on failure the error lists every
    /// failed request by its index in `batch`.
    ///
    /// The batch runs on its own task holding the gate, so dropping the
    /// returned future does not let the next batch start while units of this
    /// one are still writing.
    pub async fn bulk(&self, batch: Vec<ChangeRequest>) -> Result<BatchSummary, BulkError> {
        let gate = Arc::clone(&self.gate).lock_owned().await;
        let sink = Arc::clone(&self.sink);
        let builder = self.builder;
        let workers = self.workers;

        let driver = tokio::spawn(async move {
            let _gate = gate;
            run_batch(sink, builder, workers, batch).await
        });
        match driver.await {
            Ok(outcome) => outcome,
            Err(e) => Err(BulkError::Unit(format!("batch did not complete: {e}"))),
        }
    }
}

async fn run_batch<S>(
    sink: Arc<S>,
    builder: StatementBuilder,
    workers: usize,
    batch: Vec<ChangeRequest>,
) -> Result<BatchSummary, BulkError>
where
    S: StatementSink + 'static,
{
    let total = batch.len();
    debug!("Applying batch of {total} change requests with {workers} workers");

    let limiter = Arc::new(Semaphore::new(workers));
    let mut units: Vec<DispatchedUnit> = Vec::with_capacity(total);
    let mut failures: Vec<UnitFailure> = Vec::new();

    for (index, request) in batch.into_iter().enumerate() {
        let action = request.action;
        let table = request.qualified_table();

        let permit = match Arc::clone(&limiter).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                failures.push(UnitFailure {
                    index,
                    action,
                    table,
                    error: BulkError::Unit(format!("failed to acquire worker permit: {e}")),
                });
                continue;
            }
        };

        let sink = Arc::clone(&sink);
        let handle = tokio::spawn(async move {
            let _permit = permit;
            apply_request(sink.as_ref(), &builder, &request).await
        });
        units.push(DispatchedUnit {
            index,
            action,
            table,
            handle,
        });
    }

    let mut summary = BatchSummary {
        requests: total,
        ..Default::default()
    };
    for unit in units {
        let outcome = match unit.handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(BulkError::Unit(e.to_string())),
        };
        match outcome {
            Ok(UnitEffect::Executed { rows_affected }) => {
                summary.executed += 1;
                summary.rows_affected += rows_affected;
            }
            Ok(UnitEffect::Skipped) => summary.skipped += 1,
            Err(error) => {
                warn!(
                    "Change request #{} ({} on {}) failed: {}",
                    unit.index, unit.action, unit.table, error
                );
                failures.push(UnitFailure {
                    index: unit.index,
                    action: unit.action,
                    table: unit.table,
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        info!(
            "Applied batch: {} requests, {} executed, {} skipped, {} rows affected",
            summary.requests, summary.executed, summary.skipped, summary.rows_affected
        );
        Ok(summary)
    } else {
        Err(BulkError::Batch(BatchFailure::new(total, failures)))
    }
}

async fn apply_request<S>(
    sink: &S,
    builder: &StatementBuilder,
    request: &ChangeRequest,
) -> Result<UnitEffect, BulkError>
where
    S: StatementSink + ?Sized,
{
    let Some(statement) = builder.build(request)? else {
        trace!(
            "Skipping {} on {} without column data",
            request.action,
            request.qualified_table()
        );
        return Ok(UnitEffect::Skipped);
    };

    debug!("Executing {statement}");
    let rows_affected = sink.execute(&statement).await?;
    Ok(UnitEffect::Executed { rows_affected })
}
