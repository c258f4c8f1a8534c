//! Executor configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::option::Accessibility;

/// What to do when the store cannot build an access-control object.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessControlPolicy {
    /// Omit the access-control key and run the operation with the rest of the
    /// query.
    #[default]
    FailOpen,
    /// Abort the operation.
    FailClosed,
}

/// Configuration shared by the executor and the facade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeychainConfig {
    /// Handling of access-control construction failures.
    pub access_control_policy: AccessControlPolicy,
    /// Service attribute added to every facade query.
    pub service: Option<String>,
    /// Access group added to every facade query.
    pub access_group: Option<String>,
    /// Accessibility applied to plain (non-biometric) saves.
    pub default_accessibility: Option<Accessibility>,
}

impl KeychainConfig {
    /// Sets the access-control policy.
    #[must_use]
    pub fn with_access_control_policy(mut self, policy: AccessControlPolicy) -> Self {
        self.access_control_policy = policy;
        self
    }

    /// Sets the service attribute.
    #[must_use]
    pub fn with_service<S: Into<String>>(mut self, service: S) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the access group.
    #[must_use]
    pub fn with_access_group<S: Into<String>>(mut self, access_group: S) -> Self {
        self.access_group = Some(access_group.into());
        self
    }

    /// Sets the accessibility for plain saves.
    #[must_use]
    pub fn with_default_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.default_accessibility = Some(accessibility);
        self
    }
}
