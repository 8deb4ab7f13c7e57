//! Shared test utilities for song store integration tests

#![allow(dead_code)]

use songs_data::config::StoreConfig;
use songs_data::{init_database, Length, Song, SongStore};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Route tracing output through the test harness (RUST_LOG controls level)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("songs_data=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Create a temporary database with the songs table
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> anyhow::Result<(TempDir, SqlitePool)> {
    init_test_logging();

    let temp_dir = TempDir::new()?;
    let mut config = StoreConfig::with_database_path(temp_dir.path().join("test_songs.db"));
    config.max_connections = 5;
    config.min_connections = 1;

    let pool = init_database(&config).await?;
    Ok((temp_dir, pool))
}

/// Temporary database wrapped in a store
pub async fn create_test_store() -> (TempDir, SongStore) {
    let (temp_dir, pool) = create_test_db()
        .await
        .expect("Failed to create test database");
    (temp_dir, SongStore::new(pool))
}

pub fn song(title: &str, artist: &str, year: i32, minutes: i32, genres: &[&str]) -> Song {
    Song::new(
        title,
        artist,
        year,
        Length(minutes),
        genres.iter().map(|g| g.to_string()).collect(),
    )
}

pub fn von_dutch() -> Song {
    song("Von Dutch", "Charli XCX", 2024, 3, &["hyperpop"])
}

/// Insert a small fixed catalog, returned in insertion order
pub async fn seed_catalog(store: &SongStore) -> Vec<Song> {
    let fixtures = vec![
        song("Von Dutch", "Charli XCX", 2024, 3, &["hyperpop", "electropop"]),
        song("360", "Charli XCX", 2024, 2, &["hyperpop"]),
        song("Bohemian Rhapsody", "Queen", 1975, 6, &["rock", "progressive rock"]),
        song("Don't Stop Me Now", "Queen", 1978, 4, &["rock"]),
        song("Blue in Green", "Miles Davis", 1959, 5, &["jazz", "modal jazz"]),
        song("So What", "Miles Davis", 1959, 9, &["jazz", "modal jazz"]),
    ];

    let mut inserted = Vec::with_capacity(fixtures.len());
    for s in fixtures {
        inserted.push(store.insert(s).await.expect("Failed to seed song"));
    }
    inserted
}

pub fn titles(songs: &[Song]) -> Vec<&str> {
    songs.iter().map(|s| s.title.as_str()).collect()
}
