//! Status codes returned by keychain store primitives.

use std::fmt;

/// Outcome code returned by every [`KeychainStore`](crate::KeychainStore) primitive.
///
/// Exactly one value, [`Status::SUCCESS`], denotes success. The named constants
/// mirror the Security framework `OSStatus` values so the in-memory store and
/// the native store report the same codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    /// The operation completed.
    pub const SUCCESS: Self = Self(0);
    /// The operation or an argument is not supported by the store.
    pub const UNIMPLEMENTED: Self = Self(-4);
    /// One or more parameters were invalid.
    pub const PARAM: Self = Self(-50);
    /// The user canceled an authentication prompt.
    pub const USER_CANCELED: Self = Self(-128);
    /// Authentication of the user failed.
    pub const AUTH_FAILED: Self = Self(-25293);
    /// An item with the same primary key already exists.
    pub const DUPLICATE_ITEM: Self = Self(-25299);
    /// No item matched the query.
    pub const ITEM_NOT_FOUND: Self = Self(-25300);
    /// User interaction is required but not allowed in the current context.
    pub const INTERACTION_NOT_ALLOWED: Self = Self(-25308);

    /// Returns the raw status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Returns `true` if this is [`Status::SUCCESS`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Short description of well-known codes.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self.0 {
            0 => "success",
            -4 => "not implemented",
            -50 => "invalid parameter",
            -128 => "user canceled",
            -25293 => "authentication failed",
            -25299 => "duplicate item",
            -25300 => "item not found",
            -25308 => "interaction not allowed",
            _ => "unknown status",
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}
