//! mysql-syncer library
//!
//! Applies row-level change events (insert, update, delete) to a MySQL
//! target in batches, with bounded concurrency inside a batch and at most one
//! batch in flight at a time.
//!
//! # Crates
//!
//! - `sync_core` - change-event types (`ChangeRequest`, `ColumnValue`)
//! - `mysql_types` - conversion of column values into MySQL parameters
//! - `mysql_sink` - statement generation, the connection pool and the batch executor
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply change events from a JSON-lines file
//! mysql-syncer --config ./etc/syncer.toml --thread 4 apply --input changes.jsonl
//!
//! # Stream change events from stdin, printing statements instead of running them
//! producer | mysql-syncer apply --dry-run
//!
//! # Check that the target is reachable
//! mysql-syncer --config ./etc/syncer.toml check
//! ```

use anyhow::Context;
use clap::Args;
use mysql_sink::{BatchExecutor, DryRunSink, MySqlPool, StatementSink};
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::broadcast;
use tracing::info;

pub mod config;
pub mod feed;
pub mod testing;

pub use config::Config;
pub use feed::{run_feed, FeedOpts, FeedStats};

/// Options for the `apply` command.
#[derive(Args, Clone, Debug)]
pub struct ApplyOpts {
    /// JSON-lines file with one change event per line, or "-" for stdin
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Override the configured batch size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Dry run mode - log statements instead of executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyOpts {
    /// Batching options from the config file with command-line overrides applied.
    pub fn feed_opts(&self, config: &Config) -> anyhow::Result<FeedOpts> {
        Ok(FeedOpts {
            batch_size: self.batch_size.unwrap_or(config.batch_size).max(1),
            flush_interval: config.flush_interval()?,
        })
    }
}

/// Open the change-event input named by `input`.
pub async fn open_input(input: &str) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if input == "-" {
        info!("Reading change events from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(input)
        .await
        .with_context(|| format!("Failed to open change-event input {input}"))?;
    info!("Reading change events from {input}");
    Ok(Box::new(BufReader::new(file)))
}

/// Run the `apply` command: feed every change event from the input into the target.
pub async fn run_apply(
    config: &Config,
    opts: &ApplyOpts,
    shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<FeedStats> {
    let feed_opts = opts.feed_opts(config)?;
    let reader = open_input(&opts.input).await?;

    if opts.dry_run {
        info!("Dry run: statements are logged, not executed");
        return apply_with(DryRunSink, config, reader, &feed_opts, shutdown).await;
    }

    let pool = MySqlPool::connect(&config.target)
        .await
        .context("Failed to open target connection pool")?;
    let stats = apply_with(pool.clone(), config, reader, &feed_opts, shutdown).await;
    pool.disconnect()
        .await
        .context("Failed to close target connection pool")?;
    stats
}

async fn apply_with<S, R>(
    sink: S,
    config: &Config,
    reader: R,
    feed_opts: &FeedOpts,
    shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<FeedStats>
where
    S: StatementSink + 'static,
    R: AsyncBufRead + Unpin,
{
    let executor = BatchExecutor::new(sink, config.workers()).with_pk_binding(config.pk_binding);
    info!(
        "Applying change events with {} workers, batch size {}",
        executor.workers(),
        feed_opts.batch_size
    );
    run_feed(reader, &executor, feed_opts, shutdown).await
}

/// Run the `check` command: connect to the target and ping it.
pub async fn run_check(config: &Config) -> anyhow::Result<()> {
    let pool = MySqlPool::connect(&config.target)
        .await
        .context("Target connection check failed")?;
    pool.ping().await.context("Target ping failed")?;
    info!("Target {} is reachable", pool.addr());
    pool.disconnect().await?;
    Ok(())
}
