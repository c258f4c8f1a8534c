//! Query executor.
//!
//! [`KeychainService`] turns an [`ItemClass`] and an ordered list of
//! [`KeychainOption`]s into a [`Query`], dispatches it to a [`KeychainStore`]
//! primitive and decodes the result.
//!
//! # Merge order
//!
//! 1. Options are applied in the order given; a later option overwrites an
//!    earlier one with the same key.
//! 2. The class discriminator is written after all options.
//! 3. For finds, `ReturnData = true` is written last.
//!
//! # Failure handling
//!
//! Every operation comes in two flavours. The `try_*` methods return a
//! [`KeychainResult`]. The plain methods never fail: they log the error at
//! `warn` level and return an absent or empty value. Logs name the operation,
//! class, status and query keys, never query values.

use std::sync::Arc;

use crate::config::{AccessControlPolicy, KeychainConfig};
use crate::error::{KeychainError, KeychainResult, Operation};
use crate::option::{ItemClass, KeychainOption, MatchLimit, OptionValue};
use crate::query::{Query, QueryKey};
use crate::status::Status;
use crate::store::KeychainStore;
use crate::value::{Attributes, Value};

/// Executes typed keychain operations against an injected store.
///
/// Holds no mutable state. Each call builds a private [`Query`] and drops it
/// once the store returns.
#[derive(Clone)]
pub struct KeychainService {
    store: Arc<dyn KeychainStore>,
    config: KeychainConfig,
}

impl KeychainService {
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn KeychainStore>) -> Self {
        Self::with_config(store, KeychainConfig::default())
    }

    /// Creates a service with an explicit configuration.
    #[must_use]
    pub fn with_config(store: Arc<dyn KeychainStore>, config: KeychainConfig) -> Self {
        Self { store, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &KeychainConfig {
        &self.config
    }

    /// Merges `options` into a query, writing the class discriminator last
    /// when `class` is given.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::AccessControl`] when an access-control object
    /// cannot be built and the policy is [`AccessControlPolicy::FailClosed`].
    pub fn build_query(
        &self,
        class: Option<ItemClass>,
        options: &[KeychainOption],
    ) -> KeychainResult<Query> {
        let mut query = Query::new();
        for option in options {
            match option.value() {
                OptionValue::Plain(value) => {
                    query.insert(option.key(), value);
                }
                OptionValue::AccessControl(access_control) => {
                    match self.store.create_access_control(&access_control) {
                        Ok(object) => {
                            query.insert(option.key(), Value::AccessControl(object));
                        }
                        Err(status) => match self.config.access_control_policy {
                            AccessControlPolicy::FailOpen => {
                                log::warn!(
                                    "access control unavailable ({status}), continuing without it"
                                );
                                // An earlier option may have set the key already.
                                query.remove(option.key());
                            }
                            AccessControlPolicy::FailClosed => {
                                return Err(KeychainError::AccessControl { status });
                            }
                        },
                    }
                }
            }
        }
        if let Some(class) = class {
            query.insert(QueryKey::Class, class.discriminator());
        }
        Ok(query)
    }

    fn build_find_query(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
    ) -> KeychainResult<Query> {
        let mut query = self.build_query(Some(class), options)?;
        query.insert(QueryKey::ReturnData, Value::Bool(true));
        Ok(query)
    }

    fn check(operation: Operation, status: Status) -> KeychainResult<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(KeychainError::store(operation, status))
        }
    }

    // Typed operations

    /// Adds an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or the store rejects it.
    pub fn try_save(&self, class: ItemClass, options: &[KeychainOption]) -> KeychainResult<()> {
        let query = self.build_query(Some(class), options)?;
        log::debug!("keychain add {class} with keys {:?}", query.key_names());
        Self::check(Operation::Add, self.store.add(&query))
    }

    /// Runs a find with `ReturnData` forced on and returns the raw result.
    ///
    /// A not-found status yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or the store fails with
    /// any status other than not-found.
    pub fn try_find(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
    ) -> KeychainResult<Option<Value>> {
        let query = self.build_find_query(class, options)?;
        log::debug!("keychain find {class} with keys {:?}", query.key_names());
        let (status, result) = self.store.find(&query);
        match status {
            Status::SUCCESS => Ok(result),
            Status::ITEM_NOT_FOUND => {
                log::debug!("keychain find {class}: {}", Status::ITEM_NOT_FOUND);
                Ok(None)
            }
            status => Err(KeychainError::store(Operation::Find, status)),
        }
    }

    /// Finds an item and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::Decoding`] if the result is not a byte value,
    /// or any error from [`try_find`](Self::try_find).
    pub fn try_get_data(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
    ) -> KeychainResult<Option<Vec<u8>>> {
        match self.try_find(class, options)? {
            None => Ok(None),
            Some(Value::Data(data)) => Ok(Some(data)),
            Some(other) => Err(KeychainError::decoding(format!(
                "expected data, found {}",
                other.kind()
            ))),
        }
    }

    /// Finds an item and decodes its bytes as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::Decoding`] if the bytes are not valid UTF-8,
    /// or any error from [`try_get_data`](Self::try_get_data).
    pub fn try_get_string(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
    ) -> KeychainResult<Option<String>> {
        self.try_get_data(class, options)?
            .map(|data| {
                String::from_utf8(data)
                    .map_err(|e| KeychainError::decoding(format!("invalid utf-8: {e}")))
            })
            .transpose()
    }

    /// Finds an item and returns its attribute mapping, empty if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::Decoding`] if the result is not an attribute
    /// mapping, or any error from [`try_find`](Self::try_find).
    pub fn try_get_dictionary(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
    ) -> KeychainResult<Attributes> {
        match self.try_find(class, options)? {
            None => Ok(Attributes::new()),
            Some(Value::Attributes(attributes)) => Ok(attributes),
            Some(other) => Err(KeychainError::decoding(format!(
                "expected attributes, found {}",
                other.kind()
            ))),
        }
    }

    /// Returns the attributes of every matching item.
    ///
    /// Forces `ReturnAttributes` and `MatchLimit::All`; item data is not
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built, the store fails with a
    /// status other than not-found, or the result has an unexpected shape.
    pub fn try_find_all(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
    ) -> KeychainResult<Vec<Attributes>> {
        let mut query = self.build_query(Some(class), options)?;
        query.insert(QueryKey::ReturnAttributes, Value::Bool(true));
        query.insert(QueryKey::MatchLimit, MatchLimit::All.value());
        log::debug!("keychain find all {class} with keys {:?}", query.key_names());
        let (status, result) = self.store.find(&query);
        match status {
            Status::SUCCESS => {}
            Status::ITEM_NOT_FOUND => return Ok(Vec::new()),
            status => return Err(KeychainError::store(Operation::Find, status)),
        }
        match result {
            None => Ok(Vec::new()),
            Some(Value::Attributes(attributes)) => Ok(vec![attributes]),
            Some(Value::Array(values)) => values
                .into_iter()
                .map(|value| match value {
                    Value::Attributes(attributes) => Ok(attributes),
                    other => Err(KeychainError::decoding(format!(
                        "expected attributes in array, found {}",
                        other.kind()
                    ))),
                })
                .collect(),
            Some(other) => Err(KeychainError::decoding(format!(
                "expected array of attributes, found {}",
                other.kind()
            ))),
        }
    }

    /// Whether any item matches, without reading its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or the store fails with
    /// a status other than not-found.
    pub fn try_exists(&self, class: ItemClass, options: &[KeychainOption]) -> KeychainResult<bool> {
        let mut query = self.build_query(Some(class), options)?;
        query.insert(QueryKey::MatchLimit, MatchLimit::One.value());
        let (status, _) = self.store.find(&query);
        match status {
            Status::SUCCESS => Ok(true),
            Status::ITEM_NOT_FOUND => Ok(false),
            status => Err(KeychainError::store(Operation::Find, status)),
        }
    }

    /// Updates matching items.
    ///
    /// `options` select the items (class injected); `update_options` describe
    /// the new attribute values and never carry a class.
    ///
    /// # Errors
    ///
    /// Returns an error if either query cannot be built or the store rejects
    /// the update.
    pub fn try_update(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
        update_options: &[KeychainOption],
    ) -> KeychainResult<()> {
        let query = self.build_query(Some(class), options)?;
        let attributes = self.build_query(None, update_options)?;
        log::debug!(
            "keychain update {class} with keys {:?}, setting {:?}",
            query.key_names(),
            attributes.key_names()
        );
        Self::check(Operation::Update, self.store.update(&query, &attributes))
    }

    /// Deletes matching items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or the store rejects the
    /// delete, including when nothing matched.
    pub fn try_delete(&self, class: ItemClass, options: &[KeychainOption]) -> KeychainResult<()> {
        let query = self.build_query(Some(class), options)?;
        log::debug!("keychain delete {class} with keys {:?}", query.key_names());
        Self::check(Operation::Delete, self.store.delete(&query))
    }

    // Soft-fail operations

    /// Adds an item, logging any failure.
    pub fn save(&self, class: ItemClass, options: &[KeychainOption]) {
        if let Err(e) = self.try_save(class, options) {
            log::warn!("keychain save {class} failed: {e}");
        }
    }

    /// Raw find result, absent on any failure.
    #[must_use]
    pub fn find(&self, class: ItemClass, options: &[KeychainOption]) -> Option<Value> {
        self.try_find(class, options)
            .unwrap_or_else(|e| soft_fail("find", class, &e))
    }

    /// Item bytes, absent on any failure.
    #[must_use]
    pub fn get_data(&self, class: ItemClass, options: &[KeychainOption]) -> Option<Vec<u8>> {
        self.try_get_data(class, options)
            .unwrap_or_else(|e| soft_fail("get data", class, &e))
    }

    /// Item text, absent on any failure including invalid UTF-8.
    #[must_use]
    pub fn get_string(&self, class: ItemClass, options: &[KeychainOption]) -> Option<String> {
        self.try_get_string(class, options)
            .unwrap_or_else(|e| soft_fail("get string", class, &e))
    }

    /// Item attributes, empty on any failure.
    #[must_use]
    pub fn get_dictionary(&self, class: ItemClass, options: &[KeychainOption]) -> Attributes {
        self.try_get_dictionary(class, options)
            .unwrap_or_else(|e| soft_fail("get dictionary", class, &e))
    }

    /// Attributes of every matching item, empty on any failure.
    #[must_use]
    pub fn find_all(&self, class: ItemClass, options: &[KeychainOption]) -> Vec<Attributes> {
        self.try_find_all(class, options)
            .unwrap_or_else(|e| soft_fail("find all", class, &e))
    }

    /// Whether any item matches, `false` on any failure.
    #[must_use]
    pub fn exists(&self, class: ItemClass, options: &[KeychainOption]) -> bool {
        self.try_exists(class, options)
            .unwrap_or_else(|e| soft_fail("exists", class, &e))
    }

    /// Updates matching items, logging any failure.
    pub fn update(
        &self,
        class: ItemClass,
        options: &[KeychainOption],
        update_options: &[KeychainOption],
    ) {
        if let Err(e) = self.try_update(class, options, update_options) {
            log::warn!("keychain update {class} failed: {e}");
        }
    }

    /// Deletes matching items, logging any failure.
    pub fn delete(&self, class: ItemClass, options: &[KeychainOption]) {
        if let Err(e) = self.try_delete(class, options) {
            log::warn!("keychain delete {class} failed: {e}");
        }
    }
}

fn soft_fail<T: Default>(operation: &str, class: ItemClass, error: &KeychainError) -> T {
    log::warn!("keychain {operation} {class} failed: {error}");
    T::default()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::Mutex;

    use test_case::test_case;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::option::{AccessControl, AccessControlFlags, Accessibility};
    use crate::value::{AccessControlObject, Token};

    /// Records every dispatched query and forwards to a [`MemoryStore`].
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<(Operation, Query, Option<Query>)>>,
    }

    impl RecordingStore {
        fn failing_access_control(status: Status) -> Self {
            Self {
                inner: MemoryStore::new().with_access_control_failure(status),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> (Operation, Query, Option<Query>) {
            self.calls.lock().unwrap().last().cloned().expect("no calls")
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, operation: Operation, query: &Query, attributes: Option<&Query>) {
            self.calls
                .lock()
                .unwrap()
                .push((operation, query.clone(), attributes.cloned()));
        }
    }

    impl KeychainStore for RecordingStore {
        fn add(&self, query: &Query) -> Status {
            self.record(Operation::Add, query, None);
            self.inner.add(query)
        }

        fn find(&self, query: &Query) -> (Status, Option<Value>) {
            self.record(Operation::Find, query, None);
            self.inner.find(query)
        }

        fn update(&self, query: &Query, attributes: &Query) -> Status {
            self.record(Operation::Update, query, Some(attributes));
            self.inner.update(query, attributes)
        }

        fn delete(&self, query: &Query) -> Status {
            self.record(Operation::Delete, query, None);
            self.inner.delete(query)
        }

        fn create_access_control(
            &self,
            access_control: &AccessControl,
        ) -> Result<AccessControlObject, Status> {
            self.inner.create_access_control(access_control)
        }
    }

    fn service_with(store: &Arc<RecordingStore>, policy: AccessControlPolicy) -> KeychainService {
        KeychainService::with_config(
            Arc::clone(store) as Arc<dyn KeychainStore>,
            KeychainConfig::default().with_access_control_policy(policy),
        )
    }

    fn account(name: &str) -> KeychainOption {
        KeychainOption::Account(name.to_string())
    }

    fn data(bytes: &[u8]) -> KeychainOption {
        KeychainOption::ValueData(bytes.to_vec())
    }

    fn biometry() -> KeychainOption {
        KeychainOption::AccessControl(AccessControl::when_passcode_set_this_device_only(
            AccessControlFlags::USER_PRESENCE,
        ))
    }

    #[test]
    fn test_merge_is_deterministic() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        let options = vec![
            account("token"),
            KeychainOption::Service("svc".to_string()),
            data(b"abc"),
            KeychainOption::MatchLimit(MatchLimit::One),
            biometry(),
        ];
        let first = service
            .build_query(Some(ItemClass::GenericPassword), &options)
            .unwrap();
        let second = service
            .build_query(Some(ItemClass::GenericPassword), &options)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_last_write_wins() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        let query = service
            .build_query(
                Some(ItemClass::GenericPassword),
                &[account("first"), data(b"x"), account("second")],
            )
            .unwrap();
        assert_eq!(query.get(QueryKey::Account), Some(&Value::from("second")));
        assert_eq!(query.len(), 3);
    }

    #[test_case(ItemClass::GenericPassword ; "generic password")]
    #[test_case(ItemClass::InternetPassword ; "internet password")]
    fn test_class_discriminator_is_injected(class: ItemClass) {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        let query = service.build_query(Some(class), &[account("a")]).unwrap();
        assert_eq!(query.item_class(), Some(class));
        assert_eq!(
            query.get(QueryKey::Class),
            Some(&Value::Token(Token::Class(class)))
        );
    }

    #[test]
    fn test_find_forces_return_data() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(&store, AccessControlPolicy::FailOpen);
        let _ = service.find(
            ItemClass::GenericPassword,
            &[KeychainOption::ReturnData(false), account("a")],
        );
        let (operation, query, _) = store.last();
        assert_eq!(operation, Operation::Find);
        assert_eq!(query.get(QueryKey::ReturnData), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_save_then_get_string() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(&store, AccessControlPolicy::FailOpen);
        service.save(ItemClass::GenericPassword, &[account("token"), data(b"abc123")]);
        let value = service.get_string(
            ItemClass::GenericPassword,
            &[account("token"), KeychainOption::MatchLimit(MatchLimit::One)],
        );
        assert_eq!(value.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_get_string_missing_is_absent() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        assert_eq!(
            service.get_string(ItemClass::GenericPassword, &[account("missing")]),
            None
        );
        assert_eq!(
            service
                .try_get_string(ItemClass::GenericPassword, &[account("missing")])
                .unwrap(),
            None
        );
    }

    /// Collects `log` records emitted on the current thread.
    mod capture {
        use std::cell::RefCell;

        thread_local! {
            static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
        }

        struct CaptureLogger;

        impl log::Log for CaptureLogger {
            fn enabled(&self, _metadata: &log::Metadata) -> bool {
                true
            }

            fn log(&self, record: &log::Record) {
                RECORDS.with(|records| {
                    records
                        .borrow_mut()
                        .push((record.level(), record.args().to_string()));
                });
            }

            fn flush(&self) {}
        }

        static LOGGER: CaptureLogger = CaptureLogger;

        pub fn records(run: impl FnOnce()) -> Vec<(log::Level, String)> {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Trace);
            RECORDS.with(|records| records.borrow_mut().clear());
            run();
            RECORDS.with(RefCell::take)
        }
    }

    #[test]
    fn test_not_found_is_logged_without_values() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        let records = capture::records(|| {
            assert_eq!(
                service.find(ItemClass::GenericPassword, &[account("missing-account")]),
                None
            );
        });
        assert!(records
            .iter()
            .any(|(level, message)| *level == log::Level::Debug
                && message.contains("item not found")));
        assert!(records
            .iter()
            .all(|(_, message)| !message.contains("missing-account")));
    }

    #[test]
    fn test_get_string_invalid_utf8_is_absent() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        service.save(
            ItemClass::GenericPassword,
            &[account("bin"), data(&[0xff, 0xfe, 0xfd])],
        );
        assert_eq!(
            service.get_string(ItemClass::GenericPassword, &[account("bin")]),
            None
        );
        let err = service
            .try_get_string(ItemClass::GenericPassword, &[account("bin")])
            .unwrap_err();
        assert!(matches!(err, KeychainError::Decoding(_)));
        assert_eq!(
            service.get_data(ItemClass::GenericPassword, &[account("bin")]),
            Some(vec![0xff, 0xfe, 0xfd])
        );
    }

    #[test]
    fn test_delete_then_get_is_absent() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        service.save(ItemClass::GenericPassword, &[account("k"), data(b"v")]);
        service.delete(ItemClass::GenericPassword, &[account("k")]);
        assert_eq!(
            service.get_string(ItemClass::GenericPassword, &[account("k")]),
            None
        );
        let err = service
            .try_delete(ItemClass::GenericPassword, &[account("k")])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_save_is_reported() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        service
            .try_save(ItemClass::GenericPassword, &[account("k"), data(b"1")])
            .unwrap();
        let err = service
            .try_save(ItemClass::GenericPassword, &[account("k"), data(b"2")])
            .unwrap_err();
        assert_eq!(err, KeychainError::store(Operation::Add, Status::DUPLICATE_ITEM));
        // soft-fail variant keeps the original value
        service.save(ItemClass::GenericPassword, &[account("k"), data(b"3")]);
        assert_eq!(
            service.get_string(ItemClass::GenericPassword, &[account("k")]).as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_update_never_injects_class() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(&store, AccessControlPolicy::FailOpen);
        service.save(ItemClass::GenericPassword, &[account("k"), data(b"old")]);
        service.update(ItemClass::GenericPassword, &[account("k")], &[data(b"new")]);

        let (operation, query, attributes) = store.last();
        assert_eq!(operation, Operation::Update);
        assert_eq!(query.item_class(), Some(ItemClass::GenericPassword));
        let attributes = attributes.unwrap();
        assert!(!attributes.contains_key(QueryKey::Class));
        assert_eq!(attributes.get(QueryKey::ValueData), Some(&Value::from(b"new".to_vec())));
        assert_eq!(
            service.get_string(ItemClass::GenericPassword, &[account("k")]).as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_access_control_is_built_per_query() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(&store, AccessControlPolicy::FailOpen);
        service.save(ItemClass::GenericPassword, &[account("pin"), data(b"1234"), biometry()]);
        let (_, query, _) = store.last();
        match query.get(QueryKey::AccessControl) {
            Some(Value::AccessControl(object)) => {
                assert!(object
                    .access_control()
                    .flags()
                    .contains(AccessControlFlags::USER_PRESENCE));
                assert_eq!(
                    object.access_control().accessibility(),
                    Accessibility::WhenPasscodeSetThisDeviceOnly
                );
            }
            other => panic!("unexpected access control entry: {other:?}"),
        }
    }

    #[test]
    fn test_access_control_failure_fail_open_omits_key() {
        let store = Arc::new(RecordingStore::failing_access_control(Status::PARAM));
        let service = service_with(&store, AccessControlPolicy::FailOpen);
        service.save(ItemClass::GenericPassword, &[account("pin"), data(b"1234"), biometry()]);

        let (operation, query, _) = store.last();
        assert_eq!(operation, Operation::Add);
        assert!(!query.contains_key(QueryKey::AccessControl));
        assert_eq!(
            service.get_string(ItemClass::GenericPassword, &[account("pin")]).as_deref(),
            Some("1234")
        );
    }

    #[test]
    fn test_access_control_failure_fail_closed_aborts() {
        let store = Arc::new(RecordingStore::failing_access_control(Status::PARAM));
        let service = service_with(&store, AccessControlPolicy::FailClosed);
        let err = service
            .try_save(ItemClass::GenericPassword, &[account("pin"), data(b"1234"), biometry()])
            .unwrap_err();
        assert_eq!(err, KeychainError::AccessControl { status: Status::PARAM });
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_get_dictionary() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        service.save(
            ItemClass::InternetPassword,
            &[
                account("alice"),
                KeychainOption::Server("example.com".to_string()),
                data(b"pw"),
            ],
        );
        let attributes = service.get_dictionary(
            ItemClass::InternetPassword,
            &[account("alice"), KeychainOption::ReturnAttributes(true)],
        );
        assert_eq!(attributes.get("acct"), Some(&Value::from("alice")));
        assert_eq!(attributes.get("srvr"), Some(&Value::from("example.com")));
        assert_eq!(
            attributes.get("v_Data").and_then(Value::as_data),
            Some(b"pw".as_slice())
        );
        assert_eq!(
            attributes.get("srvr").and_then(Value::as_text),
            Some("example.com")
        );

        // data-only result is the wrong shape
        assert!(service
            .get_dictionary(ItemClass::InternetPassword, &[account("alice")])
            .is_empty());
        assert!(service
            .get_dictionary(ItemClass::GenericPassword, &[account("alice")])
            .is_empty());
    }

    #[test_case(MatchLimit::All, 3 ; "all")]
    #[test_case(MatchLimit::Custom(NonZeroU32::new(2).unwrap()), 2 ; "custom")]
    fn test_find_all_and_match_limits(limit: MatchLimit, expected: usize) {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        for name in ["a", "b", "c"] {
            service.save(
                ItemClass::GenericPassword,
                &[
                    account(name),
                    KeychainOption::Service("svc".to_string()),
                    data(name.as_bytes()),
                ],
            );
        }
        let service_option = KeychainOption::Service("svc".to_string());
        assert_eq!(
            service
                .find_all(ItemClass::GenericPassword, &[service_option.clone()])
                .len(),
            3
        );
        let result = service.find(
            ItemClass::GenericPassword,
            &[service_option, KeychainOption::MatchLimit(limit)],
        );
        match result {
            Some(Value::Array(values)) => assert_eq!(values.len(), expected),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_exists() {
        let service = KeychainService::new(Arc::new(MemoryStore::new()));
        assert!(!service.exists(ItemClass::GenericPassword, &[account("k")]));
        service.save(ItemClass::GenericPassword, &[account("k"), data(b"v")]);
        assert!(service.exists(ItemClass::GenericPassword, &[account("k")]));
        assert!(!service.exists(ItemClass::InternetPassword, &[account("k")]));
    }
}
