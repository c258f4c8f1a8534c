//! Native store implementations.
//!
//! Each platform provides a [`KeychainStore`](crate::KeychainStore) backed by
//! its secure-credential primitive. Hosts without one can use
//! [`MemoryStore`](crate::MemoryStore).
//!
//! ## Apple (macOS, iOS)
//! - `AppleKeychainStore`: Keychain Services `SecItemAdd`,
//!   `SecItemCopyMatching`, `SecItemUpdate` and `SecItemDelete`, with
//!   `SecAccessControlCreateWithFlags` for access-control objects.

/// Apple Keychain Services store.
#[cfg(all(
    feature = "platform-apple",
    any(target_os = "macos", target_os = "ios")
))]
pub mod apple;

#[cfg(all(
    feature = "platform-apple",
    any(target_os = "macos", target_os = "ios")
))]
pub use apple::AppleKeychainStore;
