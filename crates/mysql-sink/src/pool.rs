//! MySQL connection pool configuration.
//!
//! The pool is created once at startup and shared by every unit of work of
//! every batch.

use crate::error::BulkError;
use mysql_async::prelude::Queryable;
use mysql_async::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};
use serde::Deserialize;
use tracing::info;

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Target database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// `host:port`, the port defaults to 3306 when omitted
    pub addr: String,
    pub user: String,
    pub password: String,
    /// Default schema for the connection, empty for none
    pub schema: String,
    /// Maximum number of open connections
    pub max_open: usize,
    /// Number of idle connections the pool keeps around
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3306".to_string(),
            user: "root".to_string(),
            password: String::new(),
            schema: String::new(),
            max_open: 10,
            max_idle: 2,
        }
    }
}

impl PoolConfig {
    /// Split `addr` into host and port.
    pub fn host_and_port(&self) -> Result<(String, u16), BulkError> {
        let addr = self.addr.trim();
        if addr.is_empty() {
            return Err(BulkError::Config("target address is empty".to_string()));
        }
        match addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    BulkError::Config(format!("invalid port in address '{addr}': {e}"))
                })?;
                Ok((host.to_string(), port))
            }
            None => Ok((addr.to_string(), DEFAULT_MYSQL_PORT)),
        }
    }

    /// Pool size limits. Idle connections are capped at `max_open`.
    pub fn constraints(&self) -> Result<PoolConstraints, BulkError> {
        let max = self.max_open.max(1);
        let min = self.max_idle.min(max);
        PoolConstraints::new(min, max).ok_or_else(|| {
            BulkError::Config(format!(
                "invalid pool constraints: max_idle={min}, max_open={max}"
            ))
        })
    }

    /// Build `mysql_async` connection options.
    pub fn to_opts(&self) -> Result<Opts, BulkError> {
        let (host, port) = self.host_and_port()?;
        let pool_opts = PoolOpts::default().with_constraints(self.constraints()?);
        let schema = (!self.schema.is_empty()).then(|| self.schema.clone());

        let builder = OptsBuilder::default()
            .ip_or_hostname(host)
            .tcp_port(port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(schema)
            .pool_opts(pool_opts);
        Ok(Opts::from(builder))
    }
}

/// Shared handle to the target database.
#[derive(Clone, Debug)]
pub struct MySqlPool {
    pool: Pool,
    addr: String,
}

impl MySqlPool {
    /// Create the pool and check that the server answers.
    ///
    /// A failure here is fatal for the caller: nothing can be applied without a target.
    pub async fn connect(config: &PoolConfig) -> Result<Self, BulkError> {
        let pool = Pool::new(config.to_opts()?);
        let this = Self {
            pool,
            addr: config.addr.clone(),
        };
        this.ping().await?;
        info!(
            "Connected to MySQL at {} (max_open={}, max_idle={})",
            config.addr, config.max_open, config.max_idle
        );
        Ok(this)
    }

    /// Check out a connection and ping the server.
    pub async fn ping(&self) -> Result<(), BulkError> {
        let mut conn = self.get_conn().await?;
        conn.ping().await.map_err(|source| self.connect_error(source))
    }

    pub(crate) async fn get_conn(&self) -> Result<mysql_async::Conn, BulkError> {
        self.pool
            .get_conn()
            .await
            .map_err(|source| self.connect_error(source))
    }

    fn connect_error(&self, source: mysql_async::Error) -> BulkError {
        BulkError::Connect {
            addr: self.addr.clone(),
            source,
        }
    }

    /// Get a reference to the underlying pool.
    pub fn inner(&self) -> &Pool {
        &self.pool
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Close all pooled connections.
    pub async fn disconnect(self) -> Result<(), BulkError> {
        let addr = self.addr;
        self.pool
            .disconnect()
            .await
            .map_err(|source| BulkError::Connect { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_and_port() {
        let config = PoolConfig {
            addr: "db.internal:3307".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.host_and_port().unwrap(),
            ("db.internal".to_string(), 3307)
        );

        let config = PoolConfig {
            addr: "db.internal".to_string(),
            ..Default::default()
        };
        assert_eq!(config.host_and_port().unwrap().1, 3306);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let config = PoolConfig {
            addr: "db:not-a-port".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.host_and_port(), Err(BulkError::Config(_))));
    }

    #[test]
    fn test_constraints_clamp_idle_to_open() {
        let config = PoolConfig {
            max_open: 4,
            max_idle: 16,
            ..Default::default()
        };
        let constraints = config.constraints().unwrap();
        assert_eq!(constraints.min(), 4);
        assert_eq!(constraints.max(), 4);

        let config = PoolConfig {
            max_open: 0,
            max_idle: 0,
            ..Default::default()
        };
        assert_eq!(config.constraints().unwrap().max(), 1);
    }

    #[test]
    fn test_to_opts_carries_credentials_and_schema() {
        let config = PoolConfig {
            addr: "10.0.0.5:3306".to_string(),
            user: "syncer".to_string(),
            password: "secret".to_string(),
            schema: "shop".to_string(),
            max_open: 8,
            max_idle: 2,
        };
        let opts = config.to_opts().unwrap();
        assert_eq!(opts.ip_or_hostname(), "10.0.0.5");
        assert_eq!(opts.tcp_port(), 3306);
        assert_eq!(opts.user(), Some("syncer"));
        assert_eq!(opts.db_name(), Some("shop"));
        assert_eq!(opts.pool_opts().constraints().max(), 8);
    }
}
