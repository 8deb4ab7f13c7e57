//! # Songs Data Library
//!
//! Record store for the song catalog:
//! - Song entity, validation rules and partial-update patches
//! - Song store with optimistic concurrency control
//! - Safelisted pagination and sorting for list queries
//! - `Length` scalar and its `"<n> mins"` text codec
//! - Generic accumulate-and-report validator
//! - Store configuration and database initialization

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod length;
pub mod models;
pub mod time;
pub mod validator;

pub use db::{edit_song, init_database, SongStore};
pub use error::{Error, Result, StoreFault};
pub use filters::{FilterParams, Filters, Metadata, SortDirection, SONG_SORT_SAFELIST};
pub use length::Length;
pub use models::{validate_song, Song, SongPatch};
pub use validator::{ValidationErrors, Validator};
