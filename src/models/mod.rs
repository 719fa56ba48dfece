pub mod article;
pub mod media;
pub mod page;
pub mod user;

use std::fmt;

/// Storage-layer error. Routes translate these into API error classes;
/// the variants keep "row missing" and "uniqueness violated" distinct from
/// genuine storage failures so callers can tell them apart.
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Conflict(String),
    Internal(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Internal(msg) => write!(f, "storage failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::Conflict(msg.unwrap_or_else(|| "UNIQUE constraint failed".to_string()))
            }
            other => StoreError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Internal(err.to_string())
    }
}
