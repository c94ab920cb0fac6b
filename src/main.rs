//! Command-line interface for mysql-syncer
//!
//! # Usage Examples
//!
//! ```bash
//! # Apply change events from a file with 4 workers
//! mysql-syncer --config ./etc/syncer.toml --thread 4 \
//!   apply --input changes.jsonl
//!
//! # Dry run from stdin with a smaller batch size
//! cat changes.jsonl | mysql-syncer apply --batch-size 50 --dry-run
//!
//! # Check target connectivity
//! mysql-syncer --config ./etc/syncer.toml check
//! ```
//!
//! ## Change Event Format
//! One JSON object per line:
//! `{"action":"insert","schema":"shop","table":"users","data":{"name":"a"},"pk_name":"id","pk_value":1}`

use clap::{Parser, Subcommand};
use mysql_syncer::{run_apply, run_check, ApplyOpts, Config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mysql-syncer")]
#[command(about = "Apply row-level change events to a MySQL target in batches")]
#[command(long_about = None)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "./etc/syncer.toml", env = "MYSQL_SYNCER_CONFIG")]
    config: PathBuf,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "info", env = "MYSQL_SYNCER_LOG_LEVEL")]
    log_level: String,

    /// Number of concurrent writers per batch (overrides the config file when > 1)
    #[arg(long, default_value_t = 1)]
    thread: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply change events from a JSON-lines input to the target
    Apply {
        #[command(flatten)]
        opts: ApplyOpts,
    },

    /// Check that the target database is reachable
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_file(&cli.config)?.with_thread_override(cli.thread);

    match cli.command {
        Commands::Apply { opts } => {
            let shutdown = setup_shutdown_handler();
            let stats = run_apply(&config, &opts, shutdown).await?;
            info!(
                "Done: {} change events in {} batches",
                stats.requests, stats.batches
            );
        }
        Commands::Check => run_check(&config).await?,
    }

    Ok(())
}

/// Sets up a shutdown signal handler
fn setup_shutdown_handler() -> tokio::sync::broadcast::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!("Received {name}, closing");
                let _ = shutdown_tx.send(());
            }
            Err(e) => tracing::error!("Failed to install signal handlers: {e}"),
        }
    });

    shutdown_rx
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut quit = signal(SignalKind::quit())?;

    Ok(tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            "SIGINT"
        }
        _ = terminate.recv() => "SIGTERM",
        _ = hangup.recv() => "SIGHUP",
        _ = quit.recv() => "SIGQUIT",
    })
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
