//! Song entity, its validation rules and partial-update patches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::length::Length;
use crate::validator::{unique, Validator};

/// Earliest accepted release year
pub const MIN_YEAR: i32 = 1888;

/// Maximum size of `title` and `artist` in bytes
pub const MAX_TEXT_BYTES: usize = 500;

/// Maximum number of genres on one song
pub const MAX_GENRES: usize = 5;

/// A catalog track
///
/// `id`, `created_at` and `version` are owned by the store: they are filled
/// in by `SongStore::insert` and only `version` ever changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub year: i32,
    #[serde(default, skip_serializing_if = "Length::is_zero")]
    pub length: Length,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub version: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl Song {
    /// Candidate song with no store-assigned fields yet
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        year: i32,
        length: Length,
        genres: Vec<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            title: title.into(),
            artist: artist.into(),
            year,
            length,
            genres,
            version: 0,
        }
    }
}

/// Apply the song rules to `v`, using the current calendar year
pub fn validate_song(v: &mut Validator, song: &Song) {
    validate_song_at(v, song, crate::time::current_year());
}

/// Apply the song rules to `v` with an explicit current year
pub fn validate_song_at(v: &mut Validator, song: &Song, current_year: i32) {
    v.check(!song.title.is_empty(), "title", "must be provided");
    v.check(
        song.title.len() <= MAX_TEXT_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(!song.artist.is_empty(), "artist", "must be provided");
    v.check(
        song.artist.len() <= MAX_TEXT_BYTES,
        "artist",
        "must not be more than 500 bytes long",
    );

    v.check(song.year != 0, "year", "must be provided");
    v.check(song.year >= MIN_YEAR, "year", "must be greater than 1888");
    v.check(song.year <= current_year, "year", "must not be in the future");

    v.check(!song.length.is_zero(), "length", "must be provided");
    v.check(song.length.minutes() > 0, "length", "must be a positive integer");

    v.check(!song.genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        song.genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(&song.genres), "genres", "must not contain duplicate values");
}

/// Fields a caller explicitly supplied for a partial update
///
/// Absent fields deserialize to `None` and leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SongPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub length: Option<Length>,
    pub genres: Option<Vec<String>>,
}

impl SongPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.year.is_none()
            && self.length.is_none()
            && self.genres.is_none()
    }

    /// Overwrite the supplied fields of `song`
    pub fn apply_to(self, song: &mut Song) {
        if let Some(title) = self.title {
            song.title = title;
        }
        if let Some(artist) = self.artist {
            song.artist = artist;
        }
        if let Some(year) = self.year {
            song.year = year;
        }
        if let Some(length) = self.length {
            song.length = length;
        }
        if let Some(genres) = self.genres {
            song.genres = genres;
        }
    }
}
