//! Text secrets keyed by account name.
//!
//! [`KeychainManager`] stores UTF-8 values as generic passwords. The key is the
//! account attribute; the configured service and access group, when set, are
//! added to every query so that items of different applications stay apart.
//!
//! Each operation comes in two forms. The plain form never fails: it logs and
//! returns `None`, `false` or nothing. The `try_` form returns a
//! [`KeychainKitResult`].

use std::sync::Arc;

use keychainkit_core::{
    AccessControl, AccessControlFlags, AccessControlPolicy, Accessibility, ItemClass,
    KeychainConfig, KeychainOption, KeychainService, KeychainStore, MatchLimit,
};

use crate::error::KeychainKitError;
use crate::KeychainKitResult;

const CLASS: ItemClass = ItemClass::GenericPassword;

/// Saves, reads and deletes text secrets.
#[derive(Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Object))]
pub struct KeychainManager {
    service: KeychainService,
}

/// Builds a [`KeychainManager`].
///
/// Without an explicit store the manager uses the platform keychain when the
/// `platform-apple` feature is enabled on macOS or iOS, and an in-memory store
/// otherwise.
#[derive(Default)]
pub struct KeychainManagerBuilder {
    config: KeychainConfig,
    store: Option<Arc<dyn KeychainStore>>,
}

impl KeychainManagerBuilder {
    /// Starts from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: KeychainConfig) -> Self {
        self.config = config;
        self
    }

    /// Service attribute added to every query.
    #[must_use]
    pub fn service_name<S: Into<String>>(mut self, service: S) -> Self {
        self.config = self.config.with_service(service);
        self
    }

    /// Access group added to every query.
    #[must_use]
    pub fn access_group<S: Into<String>>(mut self, access_group: S) -> Self {
        self.config = self.config.with_access_group(access_group);
        self
    }

    /// Handling of access-control failures in [`KeychainManager::save_with_biometry`].
    #[must_use]
    pub fn access_control_policy(mut self, policy: AccessControlPolicy) -> Self {
        self.config = self.config.with_access_control_policy(policy);
        self
    }

    /// Accessibility of items written by [`KeychainManager::save`].
    #[must_use]
    pub fn default_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.config = self.config.with_default_accessibility(accessibility);
        self
    }

    /// Store backing the manager.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeychainStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the manager.
    #[must_use]
    pub fn build(self) -> KeychainManager {
        let store = self.store.unwrap_or_else(default_store);
        KeychainManager {
            service: KeychainService::with_config(store, self.config),
        }
    }
}

#[cfg(all(
    feature = "platform-apple",
    any(target_os = "macos", target_os = "ios")
))]
fn default_store() -> Arc<dyn KeychainStore> {
    Arc::new(keychainkit_core::platform::AppleKeychainStore::new())
}

#[cfg(not(all(
    feature = "platform-apple",
    any(target_os = "macos", target_os = "ios")
)))]
fn default_store() -> Arc<dyn KeychainStore> {
    log::warn!("no platform keychain available, secrets are kept in memory");
    Arc::new(keychainkit_core::MemoryStore::new())
}

impl KeychainManager {
    /// Starts a [`KeychainManagerBuilder`].
    #[must_use]
    pub fn builder() -> KeychainManagerBuilder {
        KeychainManagerBuilder::new()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &KeychainConfig {
        self.service.config()
    }

    /// Options identifying the item stored under `key`.
    fn item_options(&self, key: &str) -> Vec<KeychainOption> {
        let config = self.service.config();
        let mut options = vec![KeychainOption::Account(key.to_string())];
        if let Some(service) = &config.service {
            options.push(KeychainOption::Service(service.clone()));
        }
        if let Some(access_group) = &config.access_group {
            options.push(KeychainOption::AccessGroup(access_group.clone()));
        }
        options
    }

    fn save_options(&self, key: &str, value: &str) -> Vec<KeychainOption> {
        let mut options = self.item_options(key);
        options.push(KeychainOption::ValueData(value.as_bytes().to_vec()));
        if let Some(accessibility) = self.service.config().default_accessibility {
            options.push(KeychainOption::Accessible(accessibility));
        }
        options
    }

    fn biometry_options(&self, key: &str, value: &str) -> Vec<KeychainOption> {
        let mut options = self.item_options(key);
        options.push(KeychainOption::ValueData(value.as_bytes().to_vec()));
        options.push(KeychainOption::AccessControl(
            AccessControl::when_passcode_set_this_device_only(AccessControlFlags::USER_PRESENCE),
        ));
        options
    }

    fn get_options(&self, key: &str, prompt: Option<&str>) -> Vec<KeychainOption> {
        let mut options = self.item_options(key);
        options.push(KeychainOption::MatchLimit(MatchLimit::One));
        if let Some(prompt) = prompt {
            options.push(KeychainOption::UseOperationPrompt(prompt.to_string()));
        }
        options
    }

    fn update_options(value: &str) -> [KeychainOption; 1] {
        [KeychainOption::ValueData(value.as_bytes().to_vec())]
    }
}

#[cfg_attr(feature = "ffi", uniffi::export)]
impl KeychainManager {
    /// Creates a manager with the default configuration and store.
    #[cfg_attr(feature = "ffi", uniffi::constructor)]
    #[must_use]
    pub fn new() -> Self {
        KeychainManagerBuilder::new().build()
    }

    /// Stores `value` under `key`. Failures, including an existing item, are logged.
    pub fn save(&self, key: &str, value: &str) {
        self.service.save(CLASS, &self.save_options(key, value));
    }

    /// Stores `value` under `key`, readable only after user presence is
    /// confirmed and only while a device passcode is set.
    pub fn save_with_biometry(&self, key: &str, value: &str) {
        self.service.save(CLASS, &self.biometry_options(key, value));
    }

    /// The value stored under `key`, `None` if absent or unreadable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.service.get_string(CLASS, &self.get_options(key, None))
    }

    /// Like [`get`](Self::get), showing `prompt` if the item requires authentication.
    #[must_use]
    pub fn get_with_prompt(&self, key: &str, prompt: &str) -> Option<String> {
        self.service
            .get_string(CLASS, &self.get_options(key, Some(prompt)))
    }

    /// Whether an item is stored under `key`. Never reads the value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.service.exists(CLASS, &self.item_options(key))
    }

    /// Replaces the value of the existing item under `key`.
    pub fn update(&self, key: &str, value: &str) {
        self.service
            .update(CLASS, &self.item_options(key), &Self::update_options(value));
    }

    /// Stores `value` under `key`, replacing any existing value.
    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            log::warn!("keychain set failed: {e}");
        }
    }

    /// Deletes the item under `key`.
    pub fn delete(&self, key: &str) {
        self.service.delete(CLASS, &self.item_options(key));
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainKitError::DuplicateItem`] if `key` is taken, or the
    /// store's failure.
    pub fn try_save(&self, key: &str, value: &str) -> KeychainKitResult<()> {
        Ok(self.service.try_save(CLASS, &self.save_options(key, value))?)
    }

    /// Stores `value` under `key` behind user presence.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainKitError::AccessControlUnavailable`] if the access
    /// control cannot be built and the policy is fail-closed, otherwise as
    /// [`try_save`](Self::try_save).
    pub fn try_save_with_biometry(&self, key: &str, value: &str) -> KeychainKitResult<()> {
        Ok(self
            .service
            .try_save(CLASS, &self.biometry_options(key, value))?)
    }

    /// The value stored under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainKitError::InvalidValue`] if the stored bytes are not
    /// UTF-8, [`KeychainKitError::AuthenticationFailed`] if the user did not
    /// authenticate, or the store's failure.
    pub fn try_get(&self, key: &str) -> KeychainKitResult<Option<String>> {
        Ok(self
            .service
            .try_get_string(CLASS, &self.get_options(key, None))?)
    }

    /// Like [`try_get`](Self::try_get), showing `prompt` if the item requires
    /// authentication.
    ///
    /// # Errors
    ///
    /// As [`try_get`](Self::try_get).
    pub fn try_get_with_prompt(&self, key: &str, prompt: &str) -> KeychainKitResult<Option<String>> {
        Ok(self
            .service
            .try_get_string(CLASS, &self.get_options(key, Some(prompt)))?)
    }

    /// Whether an item is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's failure for any status other than not-found.
    pub fn try_contains(&self, key: &str) -> KeychainKitResult<bool> {
        Ok(self.service.try_exists(CLASS, &self.item_options(key))?)
    }

    /// Replaces the value of the existing item under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainKitError::ItemNotFound`] if nothing is stored under
    /// `key`, or the store's failure.
    pub fn try_update(&self, key: &str, value: &str) -> KeychainKitResult<()> {
        Ok(self.service.try_update(
            CLASS,
            &self.item_options(key),
            &Self::update_options(value),
        )?)
    }

    /// Stores `value` under `key`, updating the item if it already exists.
    ///
    /// # Errors
    ///
    /// Returns the store's failure from the save or the follow-up update.
    pub fn try_set(&self, key: &str, value: &str) -> KeychainKitResult<()> {
        match self.try_save(key, value) {
            Err(KeychainKitError::DuplicateItem) => {
                log::debug!("keychain item exists, updating instead");
                self.try_update(key, value)
            }
            result => result,
        }
    }

    /// Deletes the item under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainKitError::ItemNotFound`] if nothing is stored under
    /// `key`, or the store's failure.
    pub fn try_delete(&self, key: &str) -> KeychainKitResult<()> {
        Ok(self.service.try_delete(CLASS, &self.item_options(key))?)
    }
}

impl Default for KeychainManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use keychainkit_core::{MemoryStore, Status};

    use super::*;

    fn manager(store: &Arc<MemoryStore>) -> KeychainManager {
        KeychainManager::builder()
            .store(Arc::clone(store) as Arc<dyn KeychainStore>)
            .build()
    }

    #[test]
    fn test_item_options_follow_config() {
        let store = Arc::new(MemoryStore::new());
        let plain = manager(&store);
        assert_eq!(
            plain.item_options("k"),
            vec![KeychainOption::Account("k".to_string())]
        );

        let scoped = KeychainManager::builder()
            .store(store)
            .service_name("com.example.app")
            .access_group("TEAM.shared")
            .build();
        assert_eq!(
            scoped.item_options("k"),
            vec![
                KeychainOption::Account("k".to_string()),
                KeychainOption::Service("com.example.app".to_string()),
                KeychainOption::AccessGroup("TEAM.shared".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_options_end_with_match_limit_and_prompt() {
        let manager = manager(&Arc::new(MemoryStore::new()));
        let options = manager.get_options("k", Some("Unlock"));
        assert_eq!(
            &options[1..],
            &[
                KeychainOption::MatchLimit(MatchLimit::One),
                KeychainOption::UseOperationPrompt("Unlock".to_string()),
            ]
        );
    }

    #[test]
    fn test_save_applies_default_accessibility() {
        let manager = KeychainManager::builder()
            .store(Arc::new(MemoryStore::new()))
            .default_accessibility(Accessibility::AfterFirstUnlockThisDeviceOnly)
            .build();
        let options = manager.save_options("k", "v");
        assert_eq!(
            options.last(),
            Some(&KeychainOption::Accessible(
                Accessibility::AfterFirstUnlockThisDeviceOnly
            ))
        );
    }

    #[test]
    fn test_biometry_requires_user_presence() {
        let manager = manager(&Arc::new(MemoryStore::new()));
        let options = manager.biometry_options("pin", "1234");
        assert_eq!(
            options.last(),
            Some(&KeychainOption::AccessControl(
                AccessControl::when_passcode_set_this_device_only(
                    AccessControlFlags::USER_PRESENCE
                )
            ))
        );
    }

    #[test]
    fn test_set_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager(&store);
        manager.try_set("token", "first").unwrap();
        manager.try_set("token", "second").unwrap();
        assert_eq!(manager.try_get("token").unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_try_save_duplicate() {
        let manager = manager(&Arc::new(MemoryStore::new()));
        manager.try_save("token", "a").unwrap();
        assert_eq!(
            manager.try_save("token", "b"),
            Err(KeychainKitError::DuplicateItem)
        );
    }

    #[test]
    fn test_fail_closed_biometry_save() {
        let store =
            Arc::new(MemoryStore::new().with_access_control_failure(Status::UNIMPLEMENTED));
        let manager = KeychainManager::builder()
            .store(Arc::clone(&store) as Arc<dyn KeychainStore>)
            .access_control_policy(AccessControlPolicy::FailClosed)
            .build();
        assert_eq!(
            manager.try_save_with_biometry("pin", "1234"),
            Err(KeychainKitError::AccessControlUnavailable { status: -4 })
        );
        assert!(store.is_empty());
    }
}
