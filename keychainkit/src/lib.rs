#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! `KeychainKit` stores small text secrets, such as tokens and PINs, in the
//! platform keychain.
//!
//! ```
//! use std::sync::Arc;
//! use keychainkit::KeychainManager;
//! use keychainkit_core::MemoryStore;
//!
//! let keychain = KeychainManager::builder()
//!     .service_name("com.example.app")
//!     .store(Arc::new(MemoryStore::new()))
//!     .build();
//!
//! keychain.save("token", "abc123");
//! assert_eq!(keychain.get("token").as_deref(), Some("abc123"));
//! keychain.delete("token");
//! assert_eq!(keychain.get("token"), None);
//! ```

mod error;
pub use error::*;

mod manager;
pub use manager::*;

pub mod logger;

pub use keychainkit_core::{AccessControlPolicy, Accessibility, KeychainConfig};

/// Result type of the typed `try_` operations.
pub type KeychainKitResult<T, E = KeychainKitError> = std::result::Result<T, E>;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("keychainkit");
