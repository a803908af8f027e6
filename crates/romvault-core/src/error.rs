//! Core error types.

use std::time::Duration;

use thiserror::Error;

/// Core save-persistence errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport payload is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// The surrogate id is not a well-formed integer.
    #[error("invalid id: {0:?}")]
    InvalidIdentifier(String),

    /// The slot is not a well-formed integer.
    #[error("invalid slot: {0:?}")]
    InvalidSlot(String),

    /// No save matches the requested identity triple.
    #[error("save not found")]
    NotFound,

    /// Storage layer error.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Schema provisioning failed.
    #[error("schema provisioning failed: {0}")]
    Schema(#[source] sqlx::Error),

    /// The store did not answer within the operation deadline.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid store configuration.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Coarse classification used by boundaries to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input was malformed. Never retried.
    Validation,
    /// The requested save does not exist.
    NotFound,
    /// The store failed or timed out.
    Store,
    /// Schema provisioning failed. Fatal at startup.
    Schema,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidEncoding(_) | Error::InvalidIdentifier(_) | Error::InvalidSlot(_) => {
                ErrorKind::Validation
            }
            Error::NotFound => ErrorKind::NotFound,
            Error::Store(_) | Error::Timeout(_) | Error::Config(_) => ErrorKind::Store,
            Error::Schema(_) => ErrorKind::Schema,
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
