//! Database initialization
//!
//! Opens (creating if needed) the SQLite catalog and ensures the `songs`
//! table exists. Table creation is idempotent; there is no migration
//! framework.

use crate::config::StoreConfig;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::info;

/// Initialize the connection pool and create the songs table if needed
pub async fn init_database(config: &StoreConfig) -> Result<SqlitePool> {
    let db_path = &config.database_path;
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets readers proceed while a single writer commits; busy_timeout
    // makes concurrent writers wait for the lock instead of failing at once
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_songs_table(&pool).await?;

    info!(
        max_connections = config.max_connections,
        busy_timeout_ms = config.busy_timeout_ms,
        "Song store ready"
    );

    Ok(pool)
}

/// Create the songs table
///
/// `genres` holds a JSON array of text; `length` holds whole minutes.
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            year INTEGER NOT NULL,
            length INTEGER NOT NULL,
            genres TEXT NOT NULL DEFAULT '[]' CHECK (json_valid(genres)),
            version INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs(artist COLLATE NOCASE)")
        .execute(pool)
        .await?;

    Ok(())
}
