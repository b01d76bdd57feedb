//! # BoardError
//!
//! Centralized error handling for board operations.
//! Adapters report failures as `anyhow::Error`; services fold them into `Store`.

use thiserror::Error;

/// The primary error type for all service operations.
#[derive(Error, Debug)]
pub enum BoardError {
    /// A required field was absent or empty. Raised before any store access.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The candidate delete password did not match the stored hash.
    #[error("incorrect password")]
    PasswordMismatch,

    /// Resource not found (thread or reply). Malformed ids land here too.
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// The password hashing primitive failed.
    #[error("hashing error: {0}")]
    Hashing(String),

    /// Infrastructure failure (connection lost, constraint violation, ...)
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl BoardError {
    pub fn thread_not_found(id: impl Into<String>) -> Self {
        Self::NotFound("thread", id.into())
    }

    pub fn reply_not_found(id: impl Into<String>) -> Self {
        Self::NotFound("reply", id.into())
    }
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = BoardError::thread_not_found("abc");
        assert_eq!(err.to_string(), "thread not found with ID abc");
    }

    #[test]
    fn store_errors_convert_from_anyhow() {
        let err: BoardError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, BoardError::Store(_)));
    }
}
