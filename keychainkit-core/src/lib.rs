#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Typed access layer over a platform secure-credential store.
//!
//! Callers describe an operation as an [`ItemClass`] plus an ordered list of
//! [`KeychainOption`]s. [`KeychainService`] merges them into the store's untyped
//! [`Query`], runs one of the four [`KeychainStore`] primitives and decodes the
//! result.
//!
//! ```
//! use std::sync::Arc;
//! use keychainkit_core::{ItemClass, KeychainOption, KeychainService, MatchLimit, MemoryStore};
//!
//! let service = KeychainService::new(Arc::new(MemoryStore::new()));
//! service.save(
//!     ItemClass::GenericPassword,
//!     &[
//!         KeychainOption::Account("token".to_string()),
//!         KeychainOption::ValueData(b"abc123".to_vec()),
//!     ],
//! );
//! let token = service.get_string(
//!     ItemClass::GenericPassword,
//!     &[
//!         KeychainOption::Account("token".to_string()),
//!         KeychainOption::MatchLimit(MatchLimit::One),
//!     ],
//! );
//! assert_eq!(token.as_deref(), Some("abc123"));
//! ```

mod config;
pub use config::*;

mod error;
pub use error::*;

mod option;
pub use option::*;

mod query;
pub use query::*;

mod service;
pub use service::*;

mod status;
pub use status::*;

mod store;
pub use store::*;

mod value;
pub use value::*;

pub mod memory;
pub use memory::MemoryStore;

pub mod platform;
