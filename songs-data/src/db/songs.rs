//! Song database operations
//!
//! Every operation is a single statement bounded by the store timeout.
//! Updates use optimistic concurrency: the row's `version` is compared and
//! incremented in the same statement, so at most one writer can succeed
//! against a given version.

use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result, StoreFault};
use crate::filters::{calculate_metadata, FilterParams, Metadata, SONG_SORT_SAFELIST};
use crate::models::{validate_song, Song, SongPatch};
use crate::validator::{permitted_value, Validator};

/// Upper bound on any single store operation
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

const SONG_COLUMNS: &str = "id, created_at, title, artist, year, length, genres, version";

/// List filters; binds title, title, artist, artist, genres (JSON array)
const LIST_WHERE: &str = r#"
    (? = '' OR instr(lower(title), lower(?)) > 0)
    AND (? = '' OR artist = ? COLLATE NOCASE)
    AND NOT EXISTS (
        SELECT 1 FROM json_each(?) AS wanted
        WHERE wanted.value NOT IN (SELECT value FROM json_each(songs.genres))
    )
"#;

/// Handle to the songs table
///
/// Holds only a pool handle; clones share the pool.
#[derive(Debug, Clone)]
pub struct SongStore {
    db: SqlitePool,
    timeout: Duration,
}

impl SongStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            timeout: QUERY_TIMEOUT,
        }
    }

    /// Store with a non-default operation timeout
    pub fn with_timeout(db: SqlitePool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Insert a new song
    ///
    /// Any id, created_at or version on `song` is ignored; the returned song
    /// carries the values assigned by the database.
    pub async fn insert(&self, mut song: Song) -> Result<Song> {
        let row = self
            .bounded(
                "insert",
                sqlx::query(
                    r#"
                    INSERT INTO songs (title, artist, year, length, genres)
                    VALUES (?, ?, ?, ?, ?)
                    RETURNING id, created_at, version
                    "#,
                )
                .bind(&song.title)
                .bind(&song.artist)
                .bind(song.year)
                .bind(song.length.minutes())
                .bind(Json(&song.genres))
                .fetch_one(&self.db),
            )
            .await?;

        song.id = row.try_get("id")?;
        song.created_at = row.try_get("created_at")?;
        song.version = row.try_get("version")?;

        debug!(id = song.id, "Inserted song");
        Ok(song)
    }

    /// Load a song by id
    pub async fn get(&self, id: i64) -> Result<Song> {
        if id < 1 {
            return Err(Error::NotFound);
        }

        let sql = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
        let row = self
            .bounded("get", sqlx::query(&sql).bind(id).fetch_optional(&self.db))
            .await?
            .ok_or(Error::NotFound)?;

        song_from_row(&row)
    }

    /// Write every field of `song`, provided the stored version still equals
    /// `song.version`
    ///
    /// On success the incremented version is written back into `song` and
    /// returned. A missing row or a version mismatch is
    /// [`Error::EditConflict`].
    pub async fn update(&self, song: &mut Song) -> Result<i32> {
        let new_version: Option<i32> = self
            .bounded(
                "update",
                sqlx::query_scalar(
                    r#"
                    UPDATE songs
                    SET title = ?, artist = ?, year = ?, length = ?, genres = ?,
                        version = version + 1
                    WHERE id = ? AND version = ?
                    RETURNING version
                    "#,
                )
                .bind(&song.title)
                .bind(&song.artist)
                .bind(song.year)
                .bind(song.length.minutes())
                .bind(Json(&song.genres))
                .bind(song.id)
                .bind(song.version)
                .fetch_optional(&self.db),
            )
            .await?;

        match new_version {
            Some(version) => {
                debug!(id = song.id, version, "Updated song");
                song.version = version;
                Ok(version)
            }
            None => {
                warn!(id = song.id, version = song.version, "Edit conflict on song update");
                Err(Error::EditConflict)
            }
        }
    }

    /// Delete a song by id
    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(Error::NotFound);
        }

        let result = self
            .bounded(
                "delete",
                sqlx::query("DELETE FROM songs WHERE id = ?")
                    .bind(id)
                    .execute(&self.db),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        debug!(id, "Deleted song");
        Ok(())
    }

    /// List songs matching every non-empty filter
    ///
    /// - `title`: case-insensitive substring of the title
    /// - `artist`: case-insensitive equality with the artist
    /// - `genres`: every listed genre is present on the song
    ///
    /// Ordered by the resolved sort column with `id` as tiebreak, then
    /// sliced to the requested page.
    pub async fn list_all(
        &self,
        title: &str,
        artist: &str,
        genres: &[String],
        filters: &FilterParams,
    ) -> Result<Vec<Song>> {
        let (songs, _) = self.query_list(title, artist, genres, filters).await?;
        Ok(songs)
    }

    /// [`list_all`](Self::list_all) plus pagination metadata for the full
    /// match set, computed in the same statement
    pub async fn list_all_with_metadata(
        &self,
        title: &str,
        artist: &str,
        genres: &[String],
        filters: &FilterParams,
    ) -> Result<(Vec<Song>, Metadata)> {
        let (songs, mut total_records) = self.query_list(title, artist, genres, filters).await?;
        // Past the last page the window count has no row to ride on
        if songs.is_empty() && filters.offset() > 0 {
            total_records = self.count_matching(title, artist, genres).await?;
        }
        let metadata = calculate_metadata(total_records, filters.page(), filters.page_size());
        Ok((songs, metadata))
    }

    async fn query_list(
        &self,
        title: &str,
        artist: &str,
        genres: &[String],
        filters: &FilterParams,
    ) -> Result<(Vec<Song>, i64)> {
        let sort_column = filters.sort_column();
        if !permitted_value(sort_column, SONG_SORT_SAFELIST) {
            let mut v = Validator::new();
            v.add_error("sort", "invalid sort value");
            v.into_result()?;
        }

        // Only the safelisted column and the direction keyword are formatted
        // into the statement; everything else is bound
        let sql = format!(
            r#"
            SELECT count(*) OVER() AS total_records, {columns}
            FROM songs
            WHERE {filter}
            ORDER BY {sort_column} {direction}, id ASC
            LIMIT ? OFFSET ?
            "#,
            columns = SONG_COLUMNS,
            filter = LIST_WHERE,
            sort_column = sort_column,
            direction = filters.sort_direction().as_sql(),
        );

        let rows = self
            .bounded(
                "list_all",
                sqlx::query(&sql)
                    .bind(title)
                    .bind(title)
                    .bind(artist)
                    .bind(artist)
                    .bind(Json(genres))
                    .bind(filters.limit())
                    .bind(filters.offset())
                    .fetch_all(&self.db),
            )
            .await?;

        let total_records = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total_records")?,
            None => 0,
        };

        let songs = rows
            .iter()
            .map(song_from_row)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            returned = songs.len(),
            total_records,
            sort = sort_column,
            "Listed songs"
        );
        Ok((songs, total_records))
    }

    async fn count_matching(&self, title: &str, artist: &str, genres: &[String]) -> Result<i64> {
        let sql = format!("SELECT count(*) FROM songs WHERE {}", LIST_WHERE);
        self.bounded(
            "count",
            sqlx::query_scalar::<_, i64>(&sql)
                .bind(title)
                .bind(title)
                .bind(artist)
                .bind(artist)
                .bind(Json(genres))
                .fetch_one(&self.db),
        )
        .await
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Song store operation timed out"
                );
                Err(StoreFault::Timeout(self.timeout).into())
            }
        }
    }
}

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let genres: Json<Vec<String>> = row.try_get("genres")?;
    let length: i32 = row.try_get("length")?;

    Ok(Song {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        year: row.try_get("year")?,
        length: length.into(),
        genres: genres.0,
        version: row.try_get("version")?,
    })
}

/// Apply a partial update to the song with `id`
///
/// Reads the current row (a missing row is [`Error::NotFound`] before any
/// field is touched), overlays the supplied fields, validates the result and
/// writes it back under the version that was read. A concurrent writer in
/// between surfaces as [`Error::EditConflict`].
pub async fn edit_song(store: &SongStore, id: i64, patch: SongPatch) -> Result<Song> {
    let mut song = store.get(id).await?;
    patch.apply_to(&mut song);

    let mut v = Validator::new();
    validate_song(&mut v, &song);
    v.into_result()?;

    store.update(&mut song).await?;
    Ok(song)
}
