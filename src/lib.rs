//! Schema-agnostic CRUD over a SQLite file.
//!
//! # Intention
//!
//! - Discover tables, columns and primary keys at runtime from the catalog.
//! - Insert and update rows of any table from a map of text values, always
//!   binding values as statement parameters.
//! - Reject inserts that would duplicate a primary key, and signal the
//!   presentation layer after every committed mutation.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No rendering, dialogs or application bootstrap; no schema migration.
//! - Everything is synchronous and runs on the caller's thread.

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod schema;
pub mod sqlite;
pub mod statement;
pub mod value;
pub mod workflow;

pub use config::SqliteConfig;
pub use connection::Database;
pub use error::{ConnectionError, Error, QueryError, Result, WriteError};
pub use executor::{Executor, TableData};
pub use schema::{ColumnDefinition, ColumnSchema, Introspector, PrimaryKeySet, TableDefinition};
pub use sqlite::SqliteService;
pub use statement::{quote_identifier, NullableRow, Row, RowValues, SqlQuery};
pub use value::Value;
pub use workflow::{ChannelListener, InsertOutcome, MutationListener, Rejection, RowMutator};
