//! Configuration file loading.
//!
//! The config file is TOML. Every field is optional:
//!
//! ```toml
//! thread = 4
//! batch_size = 500
//! flush_interval = "200ms"
//! pk_binding = "parameter"
//!
//! [target]
//! addr = "127.0.0.1:3306"
//! user = "root"
//! password = ""
//! schema = "test"
//! max_open = 16
//! max_idle = 4
//! ```

pub mod duration;

use anyhow::Context;
use mysql_sink::{PkBinding, PoolConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use duration::parse_duration;

/// Process configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of concurrent units of work per batch
    pub thread: usize,

    /// Maximum number of change events per batch
    pub batch_size: usize,

    /// Flush a partial batch after this long without reaching `batch_size`
    pub flush_interval: String,

    /// How primary keys are placed in WHERE clauses
    pub pk_binding: PkBinding,

    /// Target database connection
    pub target: PoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread: 1,
            batch_size: 128,
            flush_interval: "200ms".to_string(),
            pk_binding: PkBinding::default(),
            target: PoolConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    /// Parse configuration from TOML text and check it.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than zero");
        }
        self.flush_interval()?;
        self.target
            .host_and_port()
            .context("Invalid [target] address")?;
        Ok(())
    }

    /// Apply the command-line worker override. Values of 1 or less keep the file setting.
    pub fn with_thread_override(mut self, thread: usize) -> Self {
        if thread > 1 {
            self.thread = thread;
        }
        self
    }

    /// Effective worker count, never zero.
    pub fn workers(&self) -> usize {
        self.thread.max(1)
    }

    pub fn flush_interval(&self) -> anyhow::Result<Duration> {
        let interval = parse_duration(&self.flush_interval).context("Invalid flush_interval")?;
        if interval.is_zero() {
            anyhow::bail!("flush_interval must be greater than zero");
        }
        Ok(interval)
    }
}
