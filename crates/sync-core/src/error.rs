//! Error types for change-event handling.

use crate::change::ChangeAction;

/// Errors raised while decoding or validating change requests.
#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    /// Action string is not insert, update or delete
    #[error("Unknown change action: {0}")]
    UnknownAction(String),

    /// Update or delete without a primary key column
    #[error("{action} on {table} requires a primary key column")]
    MissingPrimaryKey { action: ChangeAction, table: String },

    /// Request does not name a table
    #[error("Change request has no target table")]
    MissingTable,

    /// Malformed change-event JSON
    #[error("Failed to parse change event: {0}")]
    Json(#[from] serde_json::Error),
}
