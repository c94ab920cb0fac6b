//! Change-event feeder.
//!
//! Reads change events as JSON lines, cuts them into batches and hands each
//! batch to [`BatchExecutor::bulk`]. The next batch is only built once the
//! previous call has returned.

use anyhow::{Context, Result};
use mysql_sink::{BatchExecutor, BatchSummary, StatementSink};
use std::time::Duration;
use sync_core::ChangeRequest;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Batching options for the feeder.
#[derive(Debug, Clone)]
pub struct FeedOpts {
    /// Maximum number of change events per batch
    pub batch_size: usize,
    /// Flush a partial batch after this long
    pub flush_interval: Duration,
}

/// Totals across every batch applied by one feeder run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub batches: usize,
    pub requests: usize,
    pub executed: usize,
    pub skipped: usize,
    pub rows_affected: u64,
}

impl FeedStats {
    fn record(&mut self, summary: &BatchSummary) {
        self.batches += 1;
        self.requests += summary.requests;
        self.executed += summary.executed;
        self.skipped += summary.skipped;
        self.rows_affected += summary.rows_affected;
    }
}

/// Feed change events from `reader` into `executor` until end of input or shutdown.
///
/// On shutdown the events already read are applied as a final batch. The first
/// failed batch stops the feeder and is returned as an error.
pub async fn run_feed<R, S>(
    reader: R,
    executor: &BatchExecutor<S>,
    opts: &FeedOpts,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
    S: StatementSink + 'static,
{
    let batch_size = opts.batch_size.max(1);
    let mut lines = reader.lines();
    let mut pending: Vec<ChangeRequest> = Vec::with_capacity(batch_size);
    let mut stats = FeedStats::default();
    let mut line_number = 0usize;
    let mut shutdown_armed = true;

    let mut ticker = tokio::time::interval(opts.flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            signal = shutdown.recv(), if shutdown_armed => {
                if let Err(broadcast::error::RecvError::Closed) = signal {
                    // Nobody can request a shutdown any more
                    shutdown_armed = false;
                    continue;
                }
                info!("Shutdown requested, flushing {} pending change events", pending.len());
                break;
            }
            _ = ticker.tick() => {
                if !pending.is_empty() {
                    debug!("Flush interval elapsed with {} pending change events", pending.len());
                    flush(executor, &mut pending, &mut stats).await?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read change events")? else {
                    debug!("End of change-event input after {line_number} lines");
                    break;
                };
                line_number += 1;
                if line.trim().is_empty() {
                    continue;
                }

                let request = ChangeRequest::from_json(&line)
                    .with_context(|| format!("Invalid change event at line {line_number}"))?;
                pending.push(request);

                if pending.len() >= batch_size {
                    flush(executor, &mut pending, &mut stats).await?;
                    ticker.reset();
                }
            }
        }
    }

    if !pending.is_empty() {
        flush(executor, &mut pending, &mut stats).await?;
    }

    info!(
        "Applied {} change events in {} batches ({} executed, {} skipped, {} rows affected)",
        stats.requests, stats.batches, stats.executed, stats.skipped, stats.rows_affected
    );
    Ok(stats)
}

async fn flush<S>(
    executor: &BatchExecutor<S>,
    pending: &mut Vec<ChangeRequest>,
    stats: &mut FeedStats,
) -> Result<()>
where
    S: StatementSink + 'static,
{
    let batch = std::mem::take(pending);
    let batch_number = stats.batches + 1;
    let summary = executor
        .bulk(batch)
        .await
        .with_context(|| format!("Failed to apply batch {batch_number}"))?;
    stats.record(&summary);
    Ok(())
}
