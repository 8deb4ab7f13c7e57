//! Error types for the song store
//!
//! Every outcome a caller is expected to branch on is its own variant;
//! lower-level faults are folded into [`Error::StoreFailure`].

use std::time::Duration;
use thiserror::Error;

use crate::validator::ValidationErrors;

/// Result type for song store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds returned by the song store and its helpers
#[derive(Error, Debug)]
pub enum Error {
    /// One or more field rules failed (always fully accumulated)
    #[error("failed validation: {0}")]
    Validation(ValidationErrors),

    /// No song with the requested id
    #[error("record not found")]
    NotFound,

    /// The stored version no longer matches the version presented by the caller
    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    /// A length value did not have the form `<integer> mins`
    #[error("invalid length format")]
    InvalidFormat,

    /// Opaque lower-level fault from the backing store
    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreFault),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Faults from the backing store, surfaced to callers only through
/// [`Error::StoreFailure`]
#[derive(Error, Debug)]
pub enum StoreFault {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Statement did not complete within the store's time bound
    #[error("operation exceeded {0:?} timeout")]
    Timeout(Duration),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::StoreFailure(StoreFault::Database(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StoreFailure(StoreFault::Io(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}
