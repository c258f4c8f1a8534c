//! Typed query options.
//!
//! Callers describe a keychain operation as an ordered list of
//! [`KeychainOption`]s plus an [`ItemClass`]. Each option projects to exactly
//! one [`QueryKey`] and a value; the executor merges them into a [`Query`].
//!
//! [`Query`]: crate::Query

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::query::QueryKey;
use crate::value::{Token, Value};

/// Top-level category of a stored secret.
///
/// Every query carries exactly one class discriminator. It is injected by the
/// executor and cannot be supplied as a [`KeychainOption`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// `kSecClassGenericPassword`
    GenericPassword,
    /// `kSecClassInternetPassword`
    InternetPassword,
}

impl ItemClass {
    /// The class discriminator value stored under [`QueryKey::Class`].
    #[must_use]
    pub const fn discriminator(self) -> Value {
        Value::Token(Token::Class(self))
    }
}

/// Cap on the number of entries a find operation may return.
///
/// When no limit is passed the store decides; callers that want a single
/// result must pass [`MatchLimit::One`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchLimit {
    /// Return at most one match.
    One,
    /// Return every match.
    All,
    /// Return at most `n` matches.
    Custom(NonZeroU32),
}

impl MatchLimit {
    /// Resolves to the store's match-limit token, or a raw integer for `Custom`.
    #[must_use]
    pub fn value(self) -> Value {
        match self {
            Self::One => Value::Token(Token::MatchLimitOne),
            Self::All => Value::Token(Token::MatchLimitAll),
            Self::Custom(n) => Value::Integer(i64::from(n.get())),
        }
    }
}

/// When an item's secret is readable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// `kSecAttrAccessibleWhenUnlocked`
    WhenUnlocked,
    /// `kSecAttrAccessibleAfterFirstUnlock`
    AfterFirstUnlock,
    /// `kSecAttrAccessibleWhenUnlockedThisDeviceOnly`
    WhenUnlockedThisDeviceOnly,
    /// `kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly`
    AfterFirstUnlockThisDeviceOnly,
    /// `kSecAttrAccessibleWhenPasscodeSetThisDeviceOnly`
    WhenPasscodeSetThisDeviceOnly,
}

bitflags::bitflags! {
    /// Authentication constraints attached to an access-control object.
    ///
    /// Bit values match `SecAccessControlCreateFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessControlFlags: u32 {
        /// Biometry or device passcode.
        const USER_PRESENCE = 1 << 0;
        /// Any enrolled biometry.
        const BIOMETRY_ANY = 1 << 1;
        /// Biometry as enrolled at the time the item was created.
        const BIOMETRY_CURRENT_SET = 1 << 3;
        /// Device passcode.
        const DEVICE_PASSCODE = 1 << 4;
    }
}

/// An accessibility level paired with creation flags.
///
/// This is only a description. The store turns it into an opaque
/// [`AccessControlObject`](crate::AccessControlObject) once per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessControl {
    accessibility: Accessibility,
    flags: AccessControlFlags,
}

impl AccessControl {
    /// Creates an access-control description.
    #[must_use]
    pub const fn new(accessibility: Accessibility, flags: AccessControlFlags) -> Self {
        Self {
            accessibility,
            flags,
        }
    }

    /// Usable after the first unlock, never migrated to another device.
    #[must_use]
    pub const fn after_first_unlock_this_device_only(flags: AccessControlFlags) -> Self {
        Self::new(Accessibility::AfterFirstUnlockThisDeviceOnly, flags)
    }

    /// Usable only while a passcode is set, never migrated to another device.
    #[must_use]
    pub const fn when_passcode_set_this_device_only(flags: AccessControlFlags) -> Self {
        Self::new(Accessibility::WhenPasscodeSetThisDeviceOnly, flags)
    }

    /// The accessibility level.
    #[must_use]
    pub const fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// The creation flags.
    #[must_use]
    pub const fn flags(&self) -> AccessControlFlags {
        self.flags
    }
}

/// A single typed query option.
#[derive(Clone, PartialEq, Eq)]
pub enum KeychainOption {
    /// Account name the secret is stored under.
    Account(String),
    /// Service the secret belongs to.
    Service(String),
    /// Server of an internet password.
    Server(String),
    /// Keychain access group shared between applications.
    AccessGroup(String),
    /// User visible label.
    Label(String),
    /// Prompt shown when reading the item requires authentication.
    UseOperationPrompt(String),
    /// The secret itself.
    ValueData(Vec<u8>),
    /// Ask the store to return the item's attributes.
    ReturnAttributes(bool),
    /// Ask the store to return the item's data.
    ReturnData(bool),
    /// Cap on the number of matches.
    MatchLimit(MatchLimit),
    /// Accessibility level without an access-control object.
    Accessible(Accessibility),
    /// Access-control policy, built into a store object at query time.
    AccessControl(AccessControl),
}

/// Value projection of a [`KeychainOption`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A value that can be inserted as is.
    Plain(Value),
    /// Must be built by the store, see
    /// [`KeychainStore::create_access_control`](crate::KeychainStore::create_access_control).
    AccessControl(AccessControl),
}

impl KeychainOption {
    /// The query key this option writes.
    #[must_use]
    pub const fn key(&self) -> QueryKey {
        match self {
            Self::Account(_) => QueryKey::Account,
            Self::Service(_) => QueryKey::Service,
            Self::Server(_) => QueryKey::Server,
            Self::AccessGroup(_) => QueryKey::AccessGroup,
            Self::Label(_) => QueryKey::Label,
            Self::UseOperationPrompt(_) => QueryKey::UseOperationPrompt,
            Self::ValueData(_) => QueryKey::ValueData,
            Self::ReturnAttributes(_) => QueryKey::ReturnAttributes,
            Self::ReturnData(_) => QueryKey::ReturnData,
            Self::MatchLimit(_) => QueryKey::MatchLimit,
            Self::Accessible(_) => QueryKey::Accessible,
            Self::AccessControl(_) => QueryKey::AccessControl,
        }
    }

    /// The value this option writes.
    #[must_use]
    pub fn value(&self) -> OptionValue {
        let value = match self {
            Self::Account(s)
            | Self::Service(s)
            | Self::Server(s)
            | Self::AccessGroup(s)
            | Self::Label(s)
            | Self::UseOperationPrompt(s) => Value::Text(s.clone()),
            Self::ValueData(data) => Value::Data(data.clone()),
            Self::ReturnAttributes(flag) | Self::ReturnData(flag) => Value::Bool(*flag),
            Self::MatchLimit(limit) => limit.value(),
            Self::Accessible(accessibility) => Value::Token(Token::Accessible(*accessibility)),
            Self::AccessControl(access_control) => {
                return OptionValue::AccessControl(*access_control)
            }
        };
        OptionValue::Plain(value)
    }
}

impl fmt::Debug for KeychainOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(s) => f.debug_tuple("Account").field(s).finish(),
            Self::Service(s) => f.debug_tuple("Service").field(s).finish(),
            Self::Server(s) => f.debug_tuple("Server").field(s).finish(),
            Self::AccessGroup(s) => f.debug_tuple("AccessGroup").field(s).finish(),
            Self::Label(s) => f.debug_tuple("Label").field(s).finish(),
            Self::UseOperationPrompt(s) => f.debug_tuple("UseOperationPrompt").field(s).finish(),
            Self::ValueData(data) => write!(f, "ValueData(<{} bytes>)", data.len()),
            Self::ReturnAttributes(b) => f.debug_tuple("ReturnAttributes").field(b).finish(),
            Self::ReturnData(b) => f.debug_tuple("ReturnData").field(b).finish(),
            Self::MatchLimit(m) => f.debug_tuple("MatchLimit").field(m).finish(),
            Self::Accessible(a) => f.debug_tuple("Accessible").field(a).finish(),
            Self::AccessControl(a) => f.debug_tuple("AccessControl").field(a).finish(),
        }
    }
}
