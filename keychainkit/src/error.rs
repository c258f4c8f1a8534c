use keychainkit_core::{KeychainError, Status};
use thiserror::Error;

/// Error outputs from `KeychainKit`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum KeychainKitError {
    /// No item is stored under the requested key
    #[error("item_not_found")]
    ItemNotFound,
    /// An item is already stored under the requested key
    #[error("duplicate_item")]
    DuplicateItem,
    /// The requested access control could not be set up on this device
    #[error("access_control_unavailable: {status}")]
    AccessControlUnavailable {
        /// Raw keychain status code
        status: i32,
    },
    /// The user dismissed the authentication prompt or failed to authenticate
    #[error("authentication_failed: {status}")]
    AuthenticationFailed {
        /// Raw keychain status code
        status: i32,
    },
    /// Any other keychain failure
    #[error("keychain_error: {operation} returned {status}")]
    Keychain {
        /// Store primitive that failed
        operation: String,
        /// Raw keychain status code
        status: i32,
    },
    /// The stored value could not be read back as the requested type
    #[error("invalid_value: {0}")]
    InvalidValue(String),
}

impl From<KeychainError> for KeychainKitError {
    fn from(error: KeychainError) -> Self {
        match error {
            KeychainError::AccessControl { status } => Self::AccessControlUnavailable {
                status: status.code(),
            },
            KeychainError::Store {
                status: Status::ITEM_NOT_FOUND,
                ..
            } => Self::ItemNotFound,
            KeychainError::Store {
                status: Status::DUPLICATE_ITEM,
                ..
            } => Self::DuplicateItem,
            KeychainError::Store {
                status: status @ (Status::USER_CANCELED | Status::AUTH_FAILED),
                ..
            } => Self::AuthenticationFailed {
                status: status.code(),
            },
            KeychainError::Store { operation, status } => Self::Keychain {
                operation: operation.to_string(),
                status: status.code(),
            },
            KeychainError::Encoding(message) | KeychainError::Decoding(message) => {
                Self::InvalidValue(message)
            }
        }
    }
}
