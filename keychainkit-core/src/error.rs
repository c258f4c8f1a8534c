//! Error types for keychain operations.

use strum::Display;
use thiserror::Error;

use crate::status::Status;

/// Result type for keychain operations.
pub type KeychainResult<T> = Result<T, KeychainError>;

/// Store primitive that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// `add`
    Add,
    /// `find`
    Find,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

/// Errors raised by typed keychain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeychainError {
    /// A value cannot be represented in the encoding the store requires.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The store could not build an access-control object.
    #[error("access control construction failed: {status}")]
    AccessControl {
        /// Status returned by the store.
        status: Status,
    },

    /// A store primitive returned a non-success status.
    #[error("keychain {operation} failed: {status}")]
    Store {
        /// The primitive that failed.
        operation: Operation,
        /// Status returned by the store.
        status: Status,
    },

    /// The store's result is not valid text or not the expected shape.
    #[error("decoding error: {0}")]
    Decoding(String),
}

impl KeychainError {
    /// Creates a store failure.
    #[must_use]
    pub const fn store(operation: Operation, status: Status) -> Self {
        Self::Store { operation, status }
    }

    /// Creates a decoding failure.
    pub fn decoding<S: Into<String>>(message: S) -> Self {
        Self::Decoding(message.into())
    }

    /// The store status behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<Status> {
        match self {
            Self::AccessControl { status } | Self::Store { status, .. } => Some(*status),
            Self::Encoding(_) | Self::Decoding(_) => None,
        }
    }

    /// Whether the store reported that no item matched.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(Status::ITEM_NOT_FOUND))
    }

    /// Whether the store reported a duplicate item.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self.status(), Some(Status::DUPLICATE_ITEM))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeychainError::store(Operation::Add, Status::DUPLICATE_ITEM);
        assert_eq!(err.to_string(), "keychain add failed: duplicate item (-25299)");
        assert!(err.is_duplicate());
        assert!(!err.is_not_found());

        let err = KeychainError::decoding("invalid utf-8");
        assert!(err.to_string().contains("decoding error"));
        assert_eq!(err.status(), None);
    }
}
