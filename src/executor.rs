use rusqlite::params_from_iter;
use serde::Serialize;

use crate::connection::Database;
use crate::error::{QueryError, WriteError};
use crate::schema::{sqlite_error, Introspector};
use crate::statement::{
    CreateOperation, ExistsOperation, NullableRow, ReadOperation, Row, RowValues, SqlQuery,
    UpdateOperation,
};
use crate::value::Value;

/// Result rows together with the column names they are aligned to. Cells
/// keep NULL as `None` so an edit can tell it apart from empty text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<NullableRow>,
}

impl TableData {
    /// Rows in the all-text model, NULL rendered as "".
    pub fn into_text_rows(self) -> Vec<Row> {
        self.rows
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect()
    }
}

/// Runs built statements against the database.
///
/// Statements and cursors are scoped to a single call and dropped on every
/// exit path, including errors.
pub struct Executor<'a> {
    db: &'a Database,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// True iff at least one row of `table` has `column = value`.
    pub fn exists(&self, table: &str, column: &str, value: &str) -> Result<bool, QueryError> {
        let query = ExistsOperation {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        }
        .to_query();
        let conn = self.db.handle()?;
        log::debug!("executing: {}", query.statement);
        let mut stmt = conn
            .prepare(&query.statement)
            .map_err(sqlite_error(&query.statement))?;
        stmt.exists(params_from_iter(query.params.iter()))
            .map_err(sqlite_error(&query.statement))
    }

    pub fn fetch_all(&self, table: &str) -> Result<Vec<Row>, QueryError> {
        Ok(self.fetch_table(table)?.into_text_rows())
    }

    /// Every row of `table`, each non-NULL value rendered as text.
    pub fn fetch_table(&self, table: &str) -> Result<TableData, QueryError> {
        let query = ReadOperation {
            table: table.to_string(),
        }
        .to_query();
        self.read(&query)
    }

    fn read(&self, query: &SqlQuery) -> Result<TableData, QueryError> {
        let conn = self.db.handle()?;
        log::debug!("executing: {}", query.statement);
        let mut stmt = conn
            .prepare(&query.statement)
            .map_err(sqlite_error(&query.statement))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(|v| Value::from(v).into_nullable_text()))
                    .collect::<rusqlite::Result<NullableRow>>()
            })
            .map_err(sqlite_error(&query.statement))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlite_error(&query.statement))?;
        Ok(TableData { columns, rows })
    }

    /// Insert one row over `columns`, binding `values[column]` positionally.
    pub fn insert(
        &self,
        table: &str,
        columns: &[String],
        values: &RowValues,
    ) -> Result<usize, WriteError> {
        let query = CreateOperation {
            table: table.to_string(),
            columns: columns.to_vec(),
            data: values.clone(),
        }
        .to_query();
        self.write(&query)
    }

    /// Update the row keyed by `key_column = key_value`. Returns the number of
    /// rows changed; 0 without touching the database when `values` holds no
    /// settable column. Generated columns are never assigned.
    pub fn update(
        &self,
        table: &str,
        key_column: &str,
        key_value: &str,
        values: &RowValues,
    ) -> Result<usize, WriteError> {
        let columns = Introspector::new(self.db)
            .describe_table(table)?
            .writable_column_names();
        let operation = UpdateOperation {
            table: table.to_string(),
            columns,
            key_column: key_column.to_string(),
            key_value: key_value.to_string(),
            updates: values.clone(),
        };
        match operation.to_query() {
            Some(query) => self.write(&query),
            None => {
                log::debug!("nothing to update in {table}");
                Ok(0)
            }
        }
    }

    fn write(&self, query: &SqlQuery) -> Result<usize, WriteError> {
        let conn = self.db.handle()?;
        log::debug!("executing: {}", query.statement);
        conn.execute(&query.statement, params_from_iter(query.params.iter()))
            .map_err(|source| WriteError::Sqlite {
                sql: query.statement.clone(),
                source,
            })
    }
}
