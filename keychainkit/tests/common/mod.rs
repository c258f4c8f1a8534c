#![allow(dead_code)]

//! Common test utilities shared across integration tests.

use std::sync::{Arc, Mutex};

use keychainkit::KeychainManager;
use keychainkit_core::{
    AccessControl, AccessControlObject, AccessControlPolicy, KeychainStore, MemoryStore, Query,
    Status, Value,
};

/// Routes `log` output of the crates under test to stderr, filtered by `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Which store primitive a [`RecordingStore`] saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Add,
    Find,
    Update,
    Delete,
}

/// Keeps every dispatched query and forwards to a [`MemoryStore`].
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<(Call, Query)>>,
}

impl RecordingStore {
    pub fn with_access_control_failure(status: Status) -> Self {
        Self {
            inner: MemoryStore::new().with_access_control_failure(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Call, Query)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self, call: Call) -> Query {
        self.calls()
            .into_iter()
            .rev()
            .find(|(c, _)| *c == call)
            .map(|(_, query)| query)
            .unwrap_or_else(|| panic!("no {call:?} call recorded"))
    }

    pub fn item_count(&self) -> usize {
        self.inner.len()
    }

    fn record(&self, call: Call, query: &Query) {
        self.calls.lock().unwrap().push((call, query.clone()));
    }
}

impl KeychainStore for RecordingStore {
    fn add(&self, query: &Query) -> Status {
        self.record(Call::Add, query);
        self.inner.add(query)
    }

    fn find(&self, query: &Query) -> (Status, Option<Value>) {
        self.record(Call::Find, query);
        self.inner.find(query)
    }

    fn update(&self, query: &Query, attributes: &Query) -> Status {
        self.record(Call::Update, query);
        self.inner.update(query, attributes)
    }

    fn delete(&self, query: &Query) -> Status {
        self.record(Call::Delete, query);
        self.inner.delete(query)
    }

    fn create_access_control(
        &self,
        access_control: &AccessControl,
    ) -> Result<AccessControlObject, Status> {
        self.inner.create_access_control(access_control)
    }
}

pub fn manager_with(store: &Arc<RecordingStore>, policy: AccessControlPolicy) -> KeychainManager {
    KeychainManager::builder()
        .store(Arc::clone(store) as Arc<dyn KeychainStore>)
        .access_control_policy(policy)
        .build()
}
