//! Store capability interface.
//!
//! The executor never talks to a platform keychain directly. Everything goes
//! through [`KeychainStore`], so hosts can inject the native store, the
//! in-memory store, or a test double.
//!
//! # Implementations
//!
//! - [`MemoryStore`](crate::MemoryStore): process-local, for tests and hosts
//!   without a keychain.
//! - `AppleKeychainStore` (feature `platform-apple`): Security.framework
//!   `SecItem*` calls.

use crate::option::AccessControl;
use crate::query::Query;
use crate::status::Status;
use crate::value::{AccessControlObject, Value};

/// The four primitives of a secure-credential store, plus construction of
/// access-control objects.
///
/// Each call must be atomic on its own; callers get no ordering guarantees
/// between concurrent calls beyond that.
pub trait KeychainStore: Send + Sync {
    /// Adds an item described by `query`.
    fn add(&self, query: &Query) -> Status;

    /// Searches for items matching `query`.
    ///
    /// The shape of the returned value follows the query's return flags and
    /// match limit.
    fn find(&self, query: &Query) -> (Status, Option<Value>);

    /// Applies `attributes` to every item matching `query`.
    fn update(&self, query: &Query, attributes: &Query) -> Status;

    /// Deletes every item matching `query`.
    fn delete(&self, query: &Query) -> Status;

    /// Builds an access-control object from `access_control`.
    ///
    /// # Errors
    ///
    /// Returns the store's status code if the object cannot be built.
    fn create_access_control(
        &self,
        access_control: &AccessControl,
    ) -> Result<AccessControlObject, Status>;
}
