//! Error types for expensebook-server

use thiserror::Error;

use crate::db::{ConnectionError, DbError};
use crate::models::{RecordKind, ValidationError};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the storage core, one variant per failure class.
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing; no network call was made
    #[error("configuration error: {variable} is not set")]
    Configuration { variable: &'static str },

    /// Handshake with the store failed or timed out
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Candidate violates its schema; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A unique field value is already taken
    #[error("{kind} with {field} '{value}' already exists")]
    Uniqueness {
        kind: RecordKind,
        field: &'static str,
        value: String,
    },

    /// Store read/write failed after a connection was obtained
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

impl Error {
    /// Whether the caller's input caused the failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Uniqueness { .. })
    }
}
