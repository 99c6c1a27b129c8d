//! Core error types for the kiosk feed.
//!
//! Normalization never fails: malformed payloads degrade to the fallback
//! path. The errors here cover configuration mistakes and internal faults
//! that must surface as a generic server error.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    #[error("Result store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl Error {
    /// Creates an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::StoreUnavailable(err.to_string())
    }
}
