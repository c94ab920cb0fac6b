//! Row-level change requests.
//!
//! A [`ChangeRequest`] is one pending mutation observed on the source side,
//! addressed to a single target table. Requests are built once per change
//! event and consumed exactly once by a batch.

use crate::error::ChangeError;
use crate::values::ColumnValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The kind of mutation a change request applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Insert => "insert",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeAction {
    type Err = ChangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Ok(ChangeAction::Insert),
            "update" => Ok(ChangeAction::Update),
            "delete" => Ok(ChangeAction::Delete),
            _ => Err(ChangeError::UnknownAction(s.to_string())),
        }
    }
}

/// One pending insert, update or delete against a target table.
///
/// `data` is an ordered map, so iterating it always yields columns in the
/// same (sorted) order regardless of how the event was decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub action: ChangeAction,

    /// Target schema; empty means the connection's default schema
    #[serde(default)]
    pub schema: String,

    pub table: String,

    /// Column name -> new value
    #[serde(default)]
    pub data: BTreeMap<String, ColumnValue>,

    /// Primary key column name, required for updates and deletes
    #[serde(default)]
    pub pk_name: String,

    /// Primary key value; null when the source did not provide one
    #[serde(default)]
    pub pk_value: ColumnValue,
}

impl ChangeRequest {
    pub fn new(action: ChangeAction, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            action,
            schema: schema.into(),
            table: table.into(),
            data: BTreeMap::new(),
            pk_name: String::new(),
            pk_value: ColumnValue::Null,
        }
    }

    pub fn insert(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(ChangeAction::Insert, schema, table)
    }

    pub fn update(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(ChangeAction::Update, schema, table)
    }

    pub fn delete(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(ChangeAction::Delete, schema, table)
    }

    /// Set a column value, replacing any previous value for that column.
    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Set the primary key column and value.
    pub fn with_pk(mut self, name: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.pk_name = name.into();
        self.pk_value = value.into();
        self
    }

    /// Parse a change request from one line of JSON.
    pub fn from_json(line: &str) -> Result<Self, ChangeError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Check the request invariants.
    ///
    /// Updates and deletes address a row by primary key, so they need a key column.
    pub fn validate(&self) -> Result<(), ChangeError> {
        if self.table.is_empty() {
            return Err(ChangeError::MissingTable);
        }
        match self.action {
            ChangeAction::Update | ChangeAction::Delete if self.pk_name.is_empty() => {
                Err(ChangeError::MissingPrimaryKey {
                    action: self.action,
                    table: self.qualified_table(),
                })
            }
            _ => Ok(()),
        }
    }

    /// `schema.table`, or just `table` when no schema is set. Used for logging.
    pub fn qualified_table(&self) -> String {
        if self.schema.is_empty() {
            self.table.clone()
        } else {
            format!("{}.{}", self.schema, self.table)
        }
    }
}
