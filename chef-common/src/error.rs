//! Common error types for the chef console

use thiserror::Error;

/// Common result type for chef console operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the chef console crates
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

    /// Result row is missing a required column or holds the wrong type
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Message body could not be decoded as text
    #[error("Decode error: {0}")]
    Decode(String),

    /// Queue store failure outside of sqlx (e.g. a non-database queue backend)
    #[error("Queue error: {0}")]
    Queue(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
