//! API error handling.
//!
//! Every failure reaches the client as a status code plus a short
//! human-readable text body. Store failures are logged here and never
//! described to the caller.

use domains::BoardError;
use thiserror::Error;

use crate::operation::Operation;

/// API error kinds, one per status code the board answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request (400).
    BadRequest,
    /// Forbidden (403), wrong delete password.
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Internal server error (500).
    Internal,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps a service failure onto the wire for `op`.
    pub fn from_board_error(op: Operation, err: BoardError) -> Self {
        match err {
            BoardError::MissingParameter(field) => {
                Self::new(ErrorKind::BadRequest, op.missing_message(field))
            }
            BoardError::PasswordMismatch => {
                tracing::info!(operation = ?op, "delete rejected: incorrect password");
                Self::new(ErrorKind::Forbidden, "incorrect password")
            }
            BoardError::NotFound(kind, id) => {
                tracing::debug!(operation = ?op, kind, id, "not found");
                Self::new(ErrorKind::NotFound, format!("{kind} not found"))
            }
            BoardError::Store(e) => {
                tracing::error!(operation = ?op, error = %e, "store failure");
                Self::new(ErrorKind::Internal, op.failure_message())
            }
            BoardError::Hashing(e) => {
                tracing::error!(operation = ?op, error = %e, "password hashing failure");
                Self::new(ErrorKind::Internal, op.failure_message())
            }
        }
    }
}
