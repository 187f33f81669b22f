use thiserror::Error;

/// Failures opening, configuring or holding the database handle.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to configure connection: {source}")]
    Configure {
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to close connection: {source}")]
    Close {
        #[source]
        source: rusqlite::Error,
    },
    #[error("database connection is closed")]
    Closed,
}

/// Failures of catalog and data reads.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("query failed ({sql}): {source}")]
    Sqlite {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Failures of insert and update statements. The row is never partially written.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("schema resolution failed: {0}")]
    Schema(#[from] QueryError),
    #[error("table {table} has no column named {column}")]
    UnknownColumn { table: String, column: String },
    #[error("table {table} has a composite primary key ({}); a single key column is required", columns.join(", "))]
    CompositeKey { table: String, columns: Vec<String> },
    #[error("table {table} has no columns to key an update on")]
    NoKey { table: String },
    #[error("row of {table} has NULL in key column {column}")]
    NullKey { table: String, column: String },
    #[error("row has {actual} values but the table has {expected} columns")]
    RowShape { expected: usize, actual: usize },
    #[error("write failed ({sql}): {source}")]
    Sqlite {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Umbrella error returned at the workflow and service boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
