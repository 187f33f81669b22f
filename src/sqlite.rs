use crate::config::SqliteConfig;
use crate::connection::Database;
use crate::error::{ConnectionError, QueryError, Result};
use crate::executor::{Executor, TableData};
use crate::schema::{ColumnSchema, Introspector, PrimaryKeySet, TableDefinition};
use crate::statement::{Row, RowValues};
use crate::workflow::{InsertOutcome, MutationListener, RowMutator};

/// Table editing service over one SQLite file.
///
/// This is the whole surface a presentation layer needs: list tables and
/// columns, read rows, insert and update through the duplicate-checking
/// workflow, and get told when to refresh.
pub struct SqliteService {
    config: SqliteConfig,
    database: Option<Database>,
    listener: Option<Box<dyn MutationListener>>,
}

impl SqliteService {
    /// Create a new SQLite service with the given config. Nothing is opened
    /// until [`start`](Self::start).
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            database: None,
            listener: None,
        }
    }

    /// Register the callback fired after every committed insert or update.
    pub fn with_listener(mut self, listener: impl MutationListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.database.as_ref().is_some_and(Database::is_open)
    }

    pub fn start(&mut self) -> Result<(), ConnectionError> {
        if self.is_started() {
            return Ok(());
        }
        log::info!("starting sqlite service at path: {}", self.config.db_path);
        self.database = Some(Database::open_with_config(&self.config)?);
        Ok(())
    }

    /// Close the database. Safe to call repeatedly, or before `start`.
    pub fn stop(&mut self) -> Result<(), ConnectionError> {
        let Some(mut database) = self.database.take() else {
            return Ok(());
        };
        if let Err(err) = database.close() {
            self.database = Some(database);
            return Err(err);
        }
        log::info!("sqlite service stopped");
        Ok(())
    }

    pub fn database(&self) -> Result<&Database, ConnectionError> {
        self.database.as_ref().ok_or(ConnectionError::Closed)
    }

    pub fn list_tables(&self) -> Result<Vec<String>, QueryError> {
        Introspector::new(self.database()?).list_tables()
    }

    /// The table to show first, or `None` when the database has no tables.
    pub fn default_table(&self) -> Result<Option<String>, QueryError> {
        Ok(self.list_tables()?.into_iter().next())
    }

    pub fn list_columns(&self, table: &str) -> Result<ColumnSchema, QueryError> {
        Introspector::new(self.database()?).list_columns(table)
    }

    pub fn primary_key_columns(&self, table: &str) -> Result<PrimaryKeySet, QueryError> {
        Introspector::new(self.database()?).primary_key_columns(table)
    }

    pub fn describe_table(&self, table: &str) -> Result<TableDefinition, QueryError> {
        Introspector::new(self.database()?).describe_table(table)
    }

    pub fn fetch_all(&self, table: &str) -> Result<Vec<Row>, QueryError> {
        Executor::new(self.database()?).fetch_all(table)
    }

    pub fn fetch_table(&self, table: &str) -> Result<TableData, QueryError> {
        Executor::new(self.database()?).fetch_table(table)
    }

    pub fn insert_row_safely(&self, table: &str, values: &RowValues) -> Result<InsertOutcome> {
        self.mutator()?.insert_row_safely(table, values)
    }

    pub fn update_row_safely(
        &self,
        table: &str,
        key_column: &str,
        key_value: &str,
        values: &RowValues,
    ) -> Result<usize> {
        self.mutator()?
            .update_row_safely(table, key_column, key_value, values)
    }

    pub fn update_row_from(
        &self,
        table: &str,
        original: &[Option<String>],
        values: &RowValues,
    ) -> Result<usize> {
        self.mutator()?.update_row_from(table, original, values)
    }

    fn mutator(&self) -> Result<RowMutator<'_>, ConnectionError> {
        let mutator = RowMutator::new(self.database()?);
        Ok(match self.listener.as_deref() {
            Some(listener) => mutator.with_listener(listener),
            None => mutator,
        })
    }
}
