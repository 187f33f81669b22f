//! Runtime schema discovery.
//!
//! Everything here reads the catalog (`sqlite_master` and `pragma_table_xinfo`),
//! never table data. Results are recomputed on every call so they always
//! reflect the current schema.

use rusqlite::params;
use serde::Serialize;

use crate::connection::Database;
use crate::error::QueryError;

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'";

// hidden: 0 ordinary, 1 virtual-table hidden, 2 generated virtual, 3 generated
// stored. `SELECT *` returns everything except 1.
const TABLE_INFO_SQL: &str = "SELECT name, type, \"notnull\", dflt_value, pk, hidden \
     FROM pragma_table_xinfo(?1) WHERE hidden <> 1 ORDER BY cid";

/// Ordered column names of a table.
pub type ColumnSchema = Vec<String>;

/// Primary-key column names, ordered by their position in the key.
pub type PrimaryKeySet = Vec<String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: PrimaryKeySet,
}

impl TableDefinition {
    pub fn column_names(&self) -> ColumnSchema {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Columns a statement may assign, in schema order.
    pub fn writable_column_names(&self) -> ColumnSchema {
        self.columns
            .iter()
            .filter(|c| !c.generated)
            .map(|c| c.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    /// Declared type as written in the DDL, possibly empty
    pub declared_type: String,
    pub not_null: bool,
    /// Default expression as written in the DDL
    pub default_value: Option<String>,
    /// 1-based position within the primary key
    pub primary_key_position: Option<usize>,
    /// Computed by a `GENERATED ALWAYS AS` expression; never written
    pub generated: bool,
}

/// Answers structural questions about tables without prior knowledge of them.
pub struct Introspector<'a> {
    db: &'a Database,
}

impl<'a> Introspector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// User tables in catalog order. Internal `sqlite_*` tables are skipped.
    pub fn list_tables(&self) -> Result<Vec<String>, QueryError> {
        let conn = self.db.handle()?;
        let mut stmt = conn
            .prepare(LIST_TABLES_SQL)
            .map_err(sqlite_error(LIST_TABLES_SQL))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(sqlite_error(LIST_TABLES_SQL))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlite_error(LIST_TABLES_SQL))?;
        Ok(names)
    }

    pub fn list_columns(&self, table: &str) -> Result<ColumnSchema, QueryError> {
        Ok(self.describe_table(table)?.column_names())
    }

    /// Declared primary key of `table`. Empty when the table declares none.
    pub fn primary_key_columns(&self, table: &str) -> Result<PrimaryKeySet, QueryError> {
        Ok(self.describe_table(table)?.primary_key)
    }

    /// Full column description of `table`, failing with
    /// [`QueryError::TableNotFound`] when the catalog does not know it.
    pub fn describe_table(&self, table: &str) -> Result<TableDefinition, QueryError> {
        let conn = self.db.handle()?;
        let mut stmt = conn
            .prepare(TABLE_INFO_SQL)
            .map_err(sqlite_error(TABLE_INFO_SQL))?;
        let columns = stmt
            .query_map(params![table], |row| {
                let pk: i64 = row.get(4)?;
                let hidden: i64 = row.get(5)?;
                Ok(ColumnDefinition {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                    not_null: row.get::<_, i64>(2)? != 0,
                    default_value: row.get(3)?,
                    primary_key_position: usize::try_from(pk).ok().filter(|p| *p > 0),
                    generated: hidden == 2 || hidden == 3,
                })
            })
            .map_err(sqlite_error(TABLE_INFO_SQL))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlite_error(TABLE_INFO_SQL))?;

        // Every real table has at least one column.
        if columns.is_empty() {
            return Err(QueryError::TableNotFound(table.to_string()));
        }

        let mut keyed: Vec<(usize, &str)> = columns
            .iter()
            .filter_map(|c| c.primary_key_position.map(|p| (p, c.name.as_str())))
            .collect();
        keyed.sort_by_key(|(position, _)| *position);
        let primary_key = keyed.into_iter().map(|(_, name)| name.to_string()).collect();

        Ok(TableDefinition {
            name: table.to_string(),
            columns,
            primary_key,
        })
    }
}

pub(crate) fn sqlite_error(sql: &str) -> impl FnOnce(rusqlite::Error) -> QueryError {
    let sql = sql.to_string();
    move |source| QueryError::Sqlite { sql, source }
}
