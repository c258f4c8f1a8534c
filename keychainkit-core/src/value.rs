//! Untyped values held in a [`Query`](crate::Query) or returned by a find.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::option::{AccessControl, Accessibility, ItemClass};

/// Attribute mapping returned when a find asks for attributes, keyed by the
/// store's attribute names (`acct`, `svce`, `v_Data`, ...).
pub type Attributes = BTreeMap<String, Value>;

/// A symbolic constant defined by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Item class discriminator.
    Class(ItemClass),
    /// `kSecMatchLimitOne`
    MatchLimitOne,
    /// `kSecMatchLimitAll`
    MatchLimitAll,
    /// One of the `kSecAttrAccessible*` levels.
    Accessible(Accessibility),
}

impl Token {
    /// The raw string value of the constant, as defined by the Security framework.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class(ItemClass::GenericPassword) => "genp",
            Self::Class(ItemClass::InternetPassword) => "inet",
            Self::MatchLimitOne => "m_LimitOne",
            Self::MatchLimitAll => "m_LimitAll",
            Self::Accessible(Accessibility::WhenUnlocked) => "ak",
            Self::Accessible(Accessibility::AfterFirstUnlock) => "ck",
            Self::Accessible(Accessibility::WhenUnlockedThisDeviceOnly) => "aku",
            Self::Accessible(Accessibility::AfterFirstUnlockThisDeviceOnly) => "cku",
            Self::Accessible(Accessibility::WhenPasscodeSetThisDeviceOnly) => "akpu",
        }
    }

    /// Parses a raw constant back into a token.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        let token = match raw {
            "genp" => Self::Class(ItemClass::GenericPassword),
            "inet" => Self::Class(ItemClass::InternetPassword),
            "m_LimitOne" => Self::MatchLimitOne,
            "m_LimitAll" => Self::MatchLimitAll,
            "ak" => Self::Accessible(Accessibility::WhenUnlocked),
            "ck" => Self::Accessible(Accessibility::AfterFirstUnlock),
            "aku" => Self::Accessible(Accessibility::WhenUnlockedThisDeviceOnly),
            "cku" => Self::Accessible(Accessibility::AfterFirstUnlockThisDeviceOnly),
            "akpu" => Self::Accessible(Accessibility::WhenPasscodeSetThisDeviceOnly),
            _ => return None,
        };
        Some(token)
    }
}

/// Opaque access-control object constructed by a store.
///
/// Carries the [`AccessControl`] it was built from and, for native stores, the
/// platform handle. Equality only compares the description.
#[derive(Clone)]
pub struct AccessControlObject {
    access_control: AccessControl,
    native: Option<Arc<dyn Any + Send + Sync>>,
}

impl AccessControlObject {
    /// Creates an object without a platform handle.
    #[must_use]
    pub const fn new(access_control: AccessControl) -> Self {
        Self {
            access_control,
            native: None,
        }
    }

    /// Creates an object wrapping a platform handle.
    #[must_use]
    pub fn with_native<T: Any + Send + Sync>(access_control: AccessControl, native: T) -> Self {
        Self {
            access_control,
            native: Some(Arc::new(native)),
        }
    }

    /// The description this object was built from.
    #[must_use]
    pub const fn access_control(&self) -> &AccessControl {
        &self.access_control
    }

    /// The platform handle, if it has type `T`.
    #[must_use]
    pub fn native<T: Any>(&self) -> Option<&T> {
        self.native.as_deref().and_then(|native| native.downcast_ref::<T>())
    }
}

impl PartialEq for AccessControlObject {
    fn eq(&self, other: &Self) -> bool {
        self.access_control == other.access_control
    }
}

impl fmt::Debug for AccessControlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlObject")
            .field("access_control", &self.access_control)
            .field("native", &self.native.is_some())
            .finish()
    }
}

/// A dynamically typed query or result value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Data(Vec<u8>),
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Store constant.
    Token(Token),
    /// Access-control object built by the store.
    AccessControl(AccessControlObject),
    /// Attribute mapping.
    Attributes(Attributes),
    /// List of results.
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Data(_) => "data",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Token(_) => "token",
            Self::AccessControl(_) => "access control",
            Self::Attributes(_) => "attributes",
            Self::Array(_) => "array",
        }
    }

    /// Returns the bytes if this is [`Value::Data`].
    #[must_use]
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the text if this is [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the flag if this is [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

// Secrets travel as `Data`; keep them out of debug output.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Data(data) => write!(f, "Data(<{} bytes>)", data.len()),
            Self::Bool(flag) => f.debug_tuple("Bool").field(flag).finish(),
            Self::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Self::Token(token) => f.debug_tuple("Token").field(token).finish(),
            Self::AccessControl(object) => f.debug_tuple("AccessControl").field(object).finish(),
            Self::Attributes(attributes) => f.debug_tuple("Attributes").field(attributes).finish(),
            Self::Array(values) => f.debug_tuple("Array").field(values).finish(),
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Data(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Data(v.to_vec())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<Token> for Value {
    fn from(v: Token) -> Self {
        Self::Token(v)
    }
}
