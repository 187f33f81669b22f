use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::config::SqliteConfig;
use crate::error::ConnectionError;

const MEMORY_PATH: &str = ":memory:";

/// The single live handle to a database file.
///
/// There is no locking here: the handle is used serially by one caller at a
/// time. Closing is idempotent and every operation on a closed handle fails
/// with [`ConnectionError::Closed`].
#[derive(Debug)]
pub struct Database {
    path: String,
    conn: Option<Connection>,
}

impl Database {
    /// Open (or create) the database file at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConnectionError> {
        let config = SqliteConfig::new(path.as_ref().to_string_lossy());
        Self::open_with_config(&config)
    }

    pub fn open_with_config(config: &SqliteConfig) -> Result<Self, ConnectionError> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if config.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        let conn = Connection::open_with_flags(&config.db_path, flags).map_err(|source| {
            ConnectionError::Open {
                path: config.db_path.clone(),
                source,
            }
        })?;
        configure(&conn, config)?;
        log::info!("opened sqlite database at {}", config.db_path);
        Ok(Self {
            path: config.db_path.clone(),
            conn: Some(conn),
        })
    }

    /// Open a private in-memory database, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self, ConnectionError> {
        let conn = Connection::open_in_memory().map_err(|source| ConnectionError::Open {
            path: MEMORY_PATH.to_string(),
            source,
        })?;
        configure(&conn, &SqliteConfig::new(MEMORY_PATH))?;
        Ok(Self {
            path: MEMORY_PATH.to_string(),
            conn: Some(conn),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Borrow the underlying rusqlite connection.
    pub fn handle(&self) -> Result<&Connection, ConnectionError> {
        self.conn.as_ref().ok_or(ConnectionError::Closed)
    }

    /// Release the handle. Calling this on an already closed database is a no-op.
    pub fn close(&mut self) -> Result<(), ConnectionError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                log::info!("closed sqlite database at {}", self.path);
                Ok(())
            }
            Err((conn, source)) => {
                // Keep the handle so the caller can retry.
                self.conn = Some(conn);
                Err(ConnectionError::Close { source })
            }
        }
    }
}

fn configure(conn: &Connection, config: &SqliteConfig) -> Result<(), ConnectionError> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))
        .map_err(|source| ConnectionError::Configure { source })?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|source| ConnectionError::Configure { source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(db.is_open());
        db.close().unwrap();
        db.close().unwrap();
        assert!(!db.is_open());
        assert!(matches!(db.handle(), Err(ConnectionError::Closed)));
    }

    #[test]
    fn missing_file_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let config = SqliteConfig::new(path.to_string_lossy()).with_create_if_missing(false);
        let err = Database::open_with_config(&config).unwrap_err();
        assert!(matches!(err, ConnectionError::Open { .. }));
        assert!(!path.exists());
    }
}
