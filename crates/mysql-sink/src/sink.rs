//! Statement sinks.
//!
//! The executor is generic over [`StatementSink`] so the same batching logic
//! drives the real MySQL pool and the dry-run logger.

use crate::error::BulkError;
use crate::pool::MySqlPool;
use crate::statement::Statement;
use mysql_async::prelude::*;
use mysql_types::to_params;
use tracing::{info, trace};

/// Something that can execute one statement.
///
/// Implementations must be safe to call from many units of work at once.
#[async_trait::async_trait]
pub trait StatementSink: Send + Sync {
    /// Execute the statement and return the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<u64, BulkError>;
}

#[async_trait::async_trait]
impl StatementSink for MySqlPool {
    async fn execute(&self, statement: &Statement) -> Result<u64, BulkError> {
        let mut conn = self.get_conn().await?;
        let sql = statement.sql.as_str();

        if statement.params.is_empty() {
            conn.query_drop(sql)
                .await
                .map_err(|source| BulkError::Execute {
                    sql: sql.to_string(),
                    source,
                })?;
        } else {
            let prepared = conn.prep(sql).await.map_err(|source| BulkError::Prepare {
                sql: sql.to_string(),
                source,
            })?;
            conn.exec_drop(prepared, to_params(&statement.params))
                .await
                .map_err(|source| BulkError::Execute {
                    sql: sql.to_string(),
                    source,
                })?;
        }

        let affected = conn.affected_rows();
        trace!("Statement affected {affected} rows: {sql}");
        Ok(affected)
    }
}

/// Logs statements instead of executing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

#[async_trait::async_trait]
impl StatementSink for DryRunSink {
    async fn execute(&self, statement: &Statement) -> Result<u64, BulkError> {
        info!("[dry-run] {statement}");
        Ok(0)
    }
}
