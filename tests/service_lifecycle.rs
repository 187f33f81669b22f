mod common;

use anyhow::Result;
use common::{create_temp_service, values, USERS_SCHEMA};
use rust_sqlite_crud::{ConnectionError, Error, QueryError, SqliteConfig, SqliteService};
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_stop_is_idempotent() {
    test_stop_is_idempotent_impl().unwrap();
}

fn test_stop_is_idempotent_impl() -> Result<()> {
    let (mut service, _file) = create_temp_service(USERS_SCHEMA)?;
    assert!(service.is_started());

    service.stop()?;
    service.stop()?;
    assert!(!service.is_started());
    Ok(())
}

#[test]
fn stop_before_start_is_harmless() -> Result<()> {
    let mut service = SqliteService::new(SqliteConfig::new("never-opened.db"));
    service.stop()?;
    assert!(!service.is_started());
    Ok(())
}

#[test]
fn operations_after_stop_report_closed() -> Result<()> {
    let (mut service, _file) = create_temp_service(USERS_SCHEMA)?;
    service.stop()?;

    assert!(matches!(
        service.list_tables(),
        Err(QueryError::Connection(ConnectionError::Closed))
    ));
    assert!(matches!(
        service.insert_row_safely("users", &values(&[("id", "1"), ("name", "x")])),
        Err(Error::Connection(ConnectionError::Closed))
    ));
    Ok(())
}

#[test]
fn data_survives_restart() -> Result<()> {
    let (mut service, _file) = create_temp_service(USERS_SCHEMA)?;
    service.insert_row_safely("users", &values(&[("id", "1"), ("name", "x")]))?;
    service.stop()?;

    service.start()?;
    service.start()?;
    assert_eq!(service.fetch_all("users")?, vec![vec!["1", "x", ""]]);
    Ok(())
}

#[test]
fn config_defaults_apply_when_deserialized() -> Result<()> {
    let config: SqliteConfig = serde_json::from_str(r#"{ "db_path": "app.db" }"#)?;
    assert_eq!(config, SqliteConfig::new("app.db"));
    assert_eq!(config.busy_timeout_ms, 5_000);
    assert!(config.foreign_keys);
    assert!(config.create_if_missing);

    let config: SqliteConfig = serde_json::from_str(
        r#"{ "db_path": "app.db", "busy_timeout_ms": 50, "foreign_keys": false }"#,
    )?;
    assert_eq!(
        config,
        SqliteConfig::new("app.db")
            .with_busy_timeout_ms(50)
            .with_foreign_keys(false)
    );
    Ok(())
}

#[test]
fn foreign_keys_are_enforced_by_default() -> Result<()> {
    let (service, _file) = create_temp_service(
        r#"
        CREATE TABLE owners (id INTEGER PRIMARY KEY);
        CREATE TABLE pets (id INTEGER PRIMARY KEY, owner_id INTEGER REFERENCES owners(id));
        "#,
    )?;
    let err = service
        .insert_row_safely("pets", &values(&[("id", "1"), ("owner_id", "42")]))
        .unwrap_err();
    assert!(matches!(err, Error::Write(_)));
    Ok(())
}

#[test]
fn start_fails_for_missing_file_without_create() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing.db");
    let mut service = SqliteService::new(
        SqliteConfig::new(path.to_string_lossy()).with_create_if_missing(false),
    );
    assert!(matches!(service.start(), Err(ConnectionError::Open { .. })));
    assert!(!service.is_started());

    // An existing file opens fine with the same settings
    let file = NamedTempFile::new()?;
    let mut service = SqliteService::new(
        SqliteConfig::new(file.path().to_string_lossy()).with_create_if_missing(false),
    );
    service.start()?;
    assert!(service.list_tables()?.is_empty());
    Ok(())
}
