#![allow(dead_code)]

use anyhow::Result;
use rust_sqlite_crud::{RowValues, SqliteConfig, SqliteService};
use tempfile::NamedTempFile;

pub const USERS_SCHEMA: &str = r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT
    );
"#;

// Helper function to create a started service over a temporary database file
pub fn create_temp_service(schema: &str) -> Result<(SqliteService, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let mut service = SqliteService::new(SqliteConfig::new(temp_file.path().to_string_lossy()));
    service.start()?;
    service.database()?.handle()?.execute_batch(schema)?;
    Ok((service, temp_file))
}

pub fn values(pairs: &[(&str, &str)]) -> RowValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
