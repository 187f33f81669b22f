//! Primary-key-aware insert and update of single rows.
//!
//! Inserts are checked for duplicate keys before anything is written. Both
//! paths notify the [`MutationListener`] once the statement has committed and
//! changed a row, and never before.

use anyhow::anyhow;
use futures::channel::mpsc;
use serde::Serialize;

use crate::connection::Database;
use crate::error::{Result, WriteError};
use crate::executor::Executor;
use crate::schema::{Introspector, TableDefinition};
use crate::statement::RowValues;

/// Receives a signal after every successful insert or update so the
/// presentation layer can re-read and re-render.
pub trait MutationListener {
    fn on_mutated(&self) -> anyhow::Result<()>;
}

impl<F> MutationListener for F
where
    F: Fn(),
{
    fn on_mutated(&self) -> anyhow::Result<()> {
        self();
        Ok(())
    }
}

/// Forwards mutation signals to an async consumer.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<()>,
}

impl ChannelListener {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self { sender }, receiver)
    }
}

impl MutationListener for ChannelListener {
    fn on_mutated(&self) -> anyhow::Result<()> {
        self.sender
            .unbounded_send(())
            .map_err(|err| anyhow!("refresh receiver is gone: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InsertOutcome {
    Inserted,
    Rejected(Rejection),
}

/// A business-rule violation detected before writing. Nothing was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Rejection {
    DuplicateKey { column: String, value: String },
}

pub struct RowMutator<'a> {
    db: &'a Database,
    listener: Option<&'a dyn MutationListener>,
}

impl<'a> RowMutator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db, listener: None }
    }

    pub fn with_listener(mut self, listener: &'a dyn MutationListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Insert `values` unless one of the table's primary-key columns present
    /// in `values` already holds the same value.
    pub fn insert_row_safely(&self, table: &str, values: &RowValues) -> Result<InsertOutcome> {
        let definition = Introspector::new(self.db).describe_table(table)?;
        check_columns(&definition, values)?;

        let executor = Executor::new(self.db);
        for column in &definition.primary_key {
            let Some(value) = values.get(column) else {
                continue;
            };
            if executor.exists(table, column, value)? {
                log::info!("rejected insert into {table}: {column} = {value:?} already exists");
                return Ok(InsertOutcome::Rejected(Rejection::DuplicateKey {
                    column: column.clone(),
                    value: value.clone(),
                }));
            }
        }

        let columns: Vec<String> = definition
            .writable_column_names()
            .into_iter()
            .filter(|c| values.contains_key(c))
            .collect();
        executor.insert(table, &columns, values)?;
        log::info!("inserted row into {table}");
        self.notify();
        Ok(InsertOutcome::Inserted)
    }

    /// Update the row identified by `key_column = key_value`. The key column is
    /// only used to find the row, never assigned. Returns the number of rows
    /// changed; the listener only fires when that is non-zero.
    pub fn update_row_safely(
        &self,
        table: &str,
        key_column: &str,
        key_value: &str,
        values: &RowValues,
    ) -> Result<usize> {
        let definition = Introspector::new(self.db).describe_table(table)?;
        check_columns(&definition, values)?;
        if !definition.has_column(key_column) {
            return Err(WriteError::UnknownColumn {
                table: table.to_string(),
                column: key_column.to_string(),
            }
            .into());
        }

        let changed = Executor::new(self.db).update(table, key_column, key_value, values)?;
        log::info!("updated {changed} row(s) in {table} where {key_column} = {key_value:?}");
        if changed > 0 {
            self.notify();
        }
        Ok(changed)
    }

    /// Column that identifies rows of `table` for an update.
    ///
    /// Uses the declared primary key. Tables without one fall back to their
    /// first column, which only identifies a row if its values happen to be
    /// unique.
    pub fn update_key(&self, table: &str) -> Result<String> {
        let definition = Introspector::new(self.db).describe_table(table)?;
        Ok(resolve_update_key(&definition)?)
    }

    /// Update a row previously read with `fetch_table`, locating it through the
    /// key column's value in `original`. A NULL key cannot locate a row and is
    /// refused with [`WriteError::NullKey`].
    pub fn update_row_from(
        &self,
        table: &str,
        original: &[Option<String>],
        values: &RowValues,
    ) -> Result<usize> {
        let definition = Introspector::new(self.db).describe_table(table)?;
        if original.len() != definition.columns.len() {
            return Err(WriteError::RowShape {
                expected: definition.columns.len(),
                actual: original.len(),
            }
            .into());
        }
        let key_column = resolve_update_key(&definition)?;
        let position = definition
            .columns
            .iter()
            .position(|c| c.name == key_column)
            .ok_or_else(|| WriteError::NoKey {
                table: table.to_string(),
            })?;
        let Some(key_value) = original[position].as_deref() else {
            return Err(WriteError::NullKey {
                table: table.to_string(),
                column: key_column,
            }
            .into());
        };
        self.update_row_safely(table, &key_column, key_value, values)
    }

    fn notify(&self) {
        if let Some(listener) = self.listener {
            if let Err(err) = listener.on_mutated() {
                log::error!("mutation listener failed: {err:#}");
            }
        }
    }
}

fn check_columns(definition: &TableDefinition, values: &RowValues) -> Result<(), WriteError> {
    match values.keys().find(|k| !definition.has_column(k)) {
        Some(column) => Err(WriteError::UnknownColumn {
            table: definition.name.clone(),
            column: column.clone(),
        }),
        None => Ok(()),
    }
}

fn resolve_update_key(definition: &TableDefinition) -> Result<String, WriteError> {
    match definition.primary_key.as_slice() {
        [key] => Ok(key.clone()),
        [] => {
            let first = definition.columns.first().ok_or_else(|| WriteError::NoKey {
                table: definition.name.clone(),
            })?;
            log::warn!(
                "table {} declares no primary key; keying updates on first column {}",
                definition.name,
                first.name
            );
            Ok(first.name.clone())
        }
        keys => Err(WriteError::CompositeKey {
            table: definition.name.clone(),
            columns: keys.to_vec(),
        }),
    }
}
