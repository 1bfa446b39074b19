//! Storage layer: SQLite chunk tables and the append-only action log.
//!
//! Holds DB pool setup and migration runner.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;

pub mod action_log;
pub mod chunks;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Normalises a bare filesystem path into a sqlite URL.
fn database_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        return database_url.to_string();
    }
    let path = std::path::PathBuf::from(database_url);
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let norm = path.to_string_lossy().replace('\\', "/");
    if path.is_absolute() {
        format!("sqlite:///{}", norm.trim_start_matches('/'))
    } else {
        format!("sqlite://{}", norm)
    }
}

pub async fn connect(database_url_or_path: &str) -> Result<SqlitePool> {
    let url = database_url(database_url_or_path);
    let opts = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    // Each in-memory connection is its own database.
    let max = if url.contains("memory") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    // Applies SQLx migrations located in crates/storage/migrations.
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
