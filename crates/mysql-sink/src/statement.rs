//! Statement generation for change requests.
//!
//! Every request becomes at most one statement:
//!
//! - delete: `DELETE FROM t WHERE pk = ?`
//! - update: `UPDATE t SET c1 = ?, c2 = ? WHERE pk = ?`
//! - insert: `INSERT INTO t (c1, c2) VALUES (?, ?) ON DUPLICATE KEY UPDATE c1 = ?, c2 = ?`
//!
//! Inserts and updates with no column data produce no statement.

use serde::Deserialize;
use std::fmt;
use sync_core::{ChangeAction, ChangeError, ChangeRequest, ColumnValue};

/// How primary-key values are placed in WHERE clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PkBinding {
    /// Bind the key as a positional parameter.
    #[default]
    Parameter,
    /// Interpolate the key as an escaped SQL literal.
    Literal,
}

/// An executable statement: SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<ColumnValue>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_sql_literal()).collect();
            write!(f, " -- params: [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

/// Translates change requests into statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder {
    pk_binding: PkBinding,
}

impl StatementBuilder {
    pub fn new(pk_binding: PkBinding) -> Self {
        Self { pk_binding }
    }

    /// Build the statement for one request.
    ///
    /// Returns `Ok(None)` for inserts and updates without column data.
    pub fn build(&self, request: &ChangeRequest) -> Result<Option<Statement>, ChangeError> {
        request.validate()?;
        match request.action {
            ChangeAction::Delete => Ok(Some(self.build_delete(request))),
            ChangeAction::Update => Ok(self.build_update(request)),
            ChangeAction::Insert => Ok(self.build_insert(request)),
        }
    }

    fn build_delete(&self, request: &ChangeRequest) -> Statement {
        let mut params = Vec::new();
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            table_ref(request),
            self.pk_predicate(request, &mut params)
        );
        Statement { sql, params }
    }

    fn build_update(&self, request: &ChangeRequest) -> Option<Statement> {
        if request.data.is_empty() {
            return None;
        }

        let mut params: Vec<ColumnValue> = Vec::with_capacity(request.data.len() + 1);
        let mut assignments: Vec<String> = Vec::with_capacity(request.data.len());
        for (column, value) in &request.data {
            assignments.push(format!("{} = ?", quote_ident(column)));
            params.push(value.clone());
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table_ref(request),
            assignments.join(", "),
            self.pk_predicate(request, &mut params)
        );
        Some(Statement { sql, params })
    }

    fn build_insert(&self, request: &ChangeRequest) -> Option<Statement> {
        if request.data.is_empty() {
            return None;
        }

        // One column list drives both the VALUES and the ON DUPLICATE KEY clause.
        let mut columns: Vec<(&str, &ColumnValue)> = request
            .data
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        if !request.pk_name.is_empty()
            && !request.pk_value.is_null()
            && !request.data.contains_key(&request.pk_name)
        {
            columns.insert(0, (request.pk_name.as_str(), &request.pk_value));
        }

        let names: Vec<String> = columns.iter().map(|(name, _)| quote_ident(name)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let assignments: Vec<String> = names.iter().map(|name| format!("{name} = ?")).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON DUPLICATE KEY UPDATE {}",
            table_ref(request),
            names.join(", "),
            placeholders,
            assignments.join(", ")
        );

        let mut params: Vec<ColumnValue> = Vec::with_capacity(columns.len() * 2);
        params.extend(columns.iter().map(|(_, value)| (*value).clone()));
        params.extend(columns.iter().map(|(_, value)| (*value).clone()));

        Some(Statement { sql, params })
    }

    fn pk_predicate(&self, request: &ChangeRequest, params: &mut Vec<ColumnValue>) -> String {
        let column = quote_ident(&request.pk_name);
        match self.pk_binding {
            PkBinding::Parameter => {
                params.push(request.pk_value.clone());
                format!("{column} = ?")
            }
            PkBinding::Literal => format!("{column} = {}", request.pk_value.to_sql_literal()),
        }
    }
}

/// Backtick-quote an identifier, doubling embedded backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn table_ref(request: &ChangeRequest) -> String {
    if request.schema.is_empty() {
        quote_ident(&request.table)
    } else {
        format!("{}.{}", quote_ident(&request.schema), quote_ident(&request.table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal() -> StatementBuilder {
        StatementBuilder::new(PkBinding::Literal)
    }

    #[test]
    fn test_delete_with_parameter_pk() {
        let req = ChangeRequest::delete("s", "t").with_pk("id", 5);
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `s`.`t` WHERE `id` = ?");
        assert_eq!(stmt.params, vec![ColumnValue::Int(5)]);
    }

    #[test]
    fn test_delete_with_literal_pk() {
        let numeric = ChangeRequest::delete("s", "t").with_pk("id", 5);
        let stmt = literal().build(&numeric).unwrap().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `s`.`t` WHERE `id` = 5");
        assert!(stmt.params.is_empty());

        let textual = ChangeRequest::delete("s", "t").with_pk("id", "5");
        let stmt = literal().build(&textual).unwrap().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `s`.`t` WHERE `id` = \"5\"");

        let absent = ChangeRequest::delete("s", "t").with_pk("id", ColumnValue::Null);
        let stmt = literal().build(&absent).unwrap().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `s`.`t` WHERE `id` = null");
    }

    #[test]
    fn test_literal_pk_is_escaped() {
        let req = ChangeRequest::delete("s", "t").with_pk("id", "x\" OR \"1\"=\"1");
        let stmt = literal().build(&req).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            r#"DELETE FROM `s`.`t` WHERE `id` = "x\" OR \"1\"=\"1""#
        );
    }

    #[test]
    fn test_literal_pk_nan_renders_null() {
        let req = ChangeRequest::delete("s", "t").with_pk("score", f64::NAN);
        let stmt = literal().build(&req).unwrap().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `s`.`t` WHERE `score` = null");
    }

    #[test]
    fn test_update_binds_columns_then_pk() {
        let req = ChangeRequest::update("s", "t")
            .with_column("name", "b")
            .with_column("age", 30)
            .with_pk("id", 7);
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `s`.`t` SET `age` = ?, `name` = ? WHERE `id` = ?"
        );
        assert_eq!(
            stmt.params,
            vec![ColumnValue::Int(30), ColumnValue::from("b"), ColumnValue::Int(7)]
        );
    }

    #[test]
    fn test_update_with_literal_pk() {
        let req = ChangeRequest::update("s", "t")
            .with_column("name", "b")
            .with_pk("code", "k1");
        let stmt = literal().build(&req).unwrap().unwrap();
        assert_eq!(stmt.sql, "UPDATE `s`.`t` SET `name` = ? WHERE `code` = \"k1\"");
        assert_eq!(stmt.params, vec![ColumnValue::from("b")]);
    }

    #[test]
    fn test_empty_data_is_noop() {
        let builder = StatementBuilder::default();
        let insert = ChangeRequest::insert("s", "t").with_pk("id", 1);
        assert_eq!(builder.build(&insert).unwrap(), None);

        let update = ChangeRequest::update("s", "t").with_pk("id", 1);
        assert_eq!(builder.build(&update).unwrap(), None);
    }

    #[test]
    fn test_insert_upsert_uses_one_column_order() {
        let req = ChangeRequest::insert("s", "t")
            .with_column("zeta", 3)
            .with_column("alpha", "a")
            .with_column("id", 1)
            .with_pk("id", 1);
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `s`.`t` (`alpha`, `id`, `zeta`) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE `alpha` = ?, `id` = ?, `zeta` = ?"
        );
        let once = vec![ColumnValue::from("a"), ColumnValue::Int(1), ColumnValue::Int(3)];
        let twice: Vec<ColumnValue> = once.iter().chain(once.iter()).cloned().collect();
        assert_eq!(stmt.params, twice);
    }

    #[test]
    fn test_insert_adds_missing_pk_column() {
        let req = ChangeRequest::insert("s", "t")
            .with_column("name", "a")
            .with_pk("id", 1);
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `s`.`t` (`id`, `name`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `id` = ?, `name` = ?"
        );
        assert_eq!(
            stmt.params,
            vec![
                ColumnValue::Int(1),
                ColumnValue::from("a"),
                ColumnValue::Int(1),
                ColumnValue::from("a"),
            ]
        );
    }

    #[test]
    fn test_insert_without_pk_value_uses_data_only() {
        let req = ChangeRequest::insert("", "t").with_column("name", "a");
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `t` (`name`) VALUES (?) ON DUPLICATE KEY UPDATE `name` = ?"
        );
    }

    #[test]
    fn test_identifiers_are_quoted() {
        let req = ChangeRequest::delete("s", "we`ird").with_pk("id", 1);
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `s`.`we``ird` WHERE `id` = ?");
    }

    #[test]
    fn test_update_without_pk_is_rejected() {
        let req = ChangeRequest::update("s", "t").with_column("name", "a");
        let err = StatementBuilder::default().build(&req).unwrap_err();
        assert!(matches!(err, ChangeError::MissingPrimaryKey { .. }));
    }

    #[test]
    fn test_statement_display_shows_params() {
        let req = ChangeRequest::delete("s", "t").with_pk("id", "k");
        let stmt = StatementBuilder::default().build(&req).unwrap().unwrap();
        assert_eq!(
            stmt.to_string(),
            "DELETE FROM `s`.`t` WHERE `id` = ? -- params: [\"k\"]"
        );
    }
}
