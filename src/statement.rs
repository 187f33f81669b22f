//! Statement building for tables whose schema is only known at runtime.
//!
//! Table and column names come from the catalog and are interpolated as quoted
//! identifiers. Values are never interpolated: they always travel as bound
//! parameters in [`SqlQuery::params`].

use std::collections::HashMap;

/// Column name to new text value, for inserts and updates.
pub type RowValues = HashMap<String, String>;

/// One row as an ordered sequence of text values aligned to its columns.
pub type Row = Vec<String>;

/// A row whose NULL cells are `None`.
pub type NullableRow = Vec<Option<String>>;

/// SQL statement with positional text parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<String>,
}

impl SqlQuery {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

/// Quote an identifier for interpolation, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `SELECT 1 ... LIMIT 1` probe for a single column value.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsOperation {
    pub table: String,
    pub column: String,
    pub value: String,
}

impl ExistsOperation {
    pub fn to_query(&self) -> SqlQuery {
        SqlQuery::new(format!(
            "SELECT 1 FROM {} WHERE {} = ? LIMIT 1",
            quote_identifier(&self.table),
            quote_identifier(&self.column)
        ))
        .with_params(vec![self.value.clone()])
    }
}

/// Full-table read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOperation {
    pub table: String,
}

impl ReadOperation {
    pub fn to_query(&self) -> SqlQuery {
        SqlQuery::new(format!("SELECT * FROM {}", quote_identifier(&self.table)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation {
    pub table: String,
    pub columns: Vec<String>,
    pub data: RowValues,
}

impl CreateOperation {
    /// One placeholder per listed column. A column missing from `data` binds "".
    pub fn to_query(&self) -> SqlQuery {
        let table = quote_identifier(&self.table);
        if self.columns.is_empty() {
            return SqlQuery::new(format!("INSERT INTO {table} DEFAULT VALUES"));
        }
        let names: Vec<String> = self.columns.iter().map(|c| quote_identifier(c)).collect();
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        let params = self
            .columns
            .iter()
            .map(|c| self.data.get(c).cloned().unwrap_or_default())
            .collect();
        SqlQuery::new(format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            names.join(", ")
        ))
        .with_params(params)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOperation {
    pub table: String,
    /// Every column of the table, in schema order
    pub columns: Vec<String>,
    pub key_column: String,
    pub key_value: String,
    pub updates: RowValues,
}

impl UpdateOperation {
    /// Sets every non-key column present in `updates`, in schema order, and
    /// binds the key value last. The key column itself is never assigned.
    /// Returns `None` when there is nothing to set.
    pub fn to_query(&self) -> Option<SqlQuery> {
        let assigned: Vec<&String> = self
            .columns
            .iter()
            .filter(|c| **c != self.key_column && self.updates.contains_key(*c))
            .collect();
        if assigned.is_empty() {
            return None;
        }

        let set_clause: Vec<String> = assigned
            .iter()
            .map(|c| format!("{} = ?", quote_identifier(c)))
            .collect();
        let mut params: Vec<String> = assigned
            .iter()
            .map(|c| self.updates[c.as_str()].clone())
            .collect();
        params.push(self.key_value.clone());

        Some(
            SqlQuery::new(format!(
                "UPDATE {} SET {} WHERE {} = ?",
                quote_identifier(&self.table),
                set_clause.join(", "),
                quote_identifier(&self.key_column)
            ))
            .with_params(params),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> RowValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn exists_binds_value() {
        let query = ExistsOperation {
            table: "users".into(),
            column: "id".into(),
            value: "1".into(),
        }
        .to_query();
        assert_eq!(query.statement, "SELECT 1 FROM \"users\" WHERE \"id\" = ? LIMIT 1");
        assert_eq!(query.params, vec!["1"]);
    }

    #[test]
    fn insert_has_one_placeholder_per_column() {
        let query = CreateOperation {
            table: "users".into(),
            columns: vec!["id".into(), "name".into(), "email".into()],
            data: values(&[("id", "7"), ("name", "Ann")]),
        }
        .to_query();
        assert_eq!(
            query.statement,
            "INSERT INTO \"users\" (\"id\", \"name\", \"email\") VALUES (?, ?, ?)"
        );
        assert_eq!(query.params, vec!["7", "Ann", ""]);
    }

    #[test]
    fn insert_without_columns_uses_defaults() {
        let query = CreateOperation {
            table: "t".into(),
            columns: vec![],
            data: RowValues::new(),
        }
        .to_query();
        assert_eq!(query.statement, "INSERT INTO \"t\" DEFAULT VALUES");
        assert!(query.params.is_empty());
    }

    #[test]
    fn update_skips_key_and_absent_columns() {
        let query = UpdateOperation {
            table: "users".into(),
            columns: vec!["id".into(), "name".into(), "email".into(), "age".into()],
            key_column: "id".into(),
            key_value: "1".into(),
            updates: values(&[("id", "99"), ("age", "31"), ("name", "Bo")]),
        }
        .to_query()
        .unwrap();
        assert_eq!(
            query.statement,
            "UPDATE \"users\" SET \"name\" = ?, \"age\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(query.params, vec!["Bo", "31", "1"]);
    }

    #[test]
    fn update_with_nothing_to_set() {
        let op = UpdateOperation {
            table: "users".into(),
            columns: vec!["id".into(), "name".into()],
            key_column: "id".into(),
            key_value: "1".into(),
            updates: values(&[("id", "2")]),
        };
        assert_eq!(op.to_query(), None);
    }
}
