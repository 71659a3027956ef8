//! Common error types for ShelfAware

use thiserror::Error;

/// Common result type for ShelfAware operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the inventory store and its callers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced user, list, category or item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller input (negative quantity, malformed argument)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A uniquely named record already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl Error {
    /// True for errors raised because a referenced record is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
