//! The merged key→value query handed to a store primitive.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::option::ItemClass;
use crate::value::{Token, Value};

/// The fixed set of query keys recognised by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryKey {
    /// `kSecClass`
    Class,
    /// `kSecAttrAccount`
    Account,
    /// `kSecAttrService`
    Service,
    /// `kSecAttrServer`
    Server,
    /// `kSecAttrAccessGroup`
    AccessGroup,
    /// `kSecAttrLabel`
    Label,
    /// `kSecAttrAccessible`
    Accessible,
    /// `kSecAttrAccessControl`
    AccessControl,
    /// `kSecValueData`
    ValueData,
    /// `kSecReturnAttributes`
    ReturnAttributes,
    /// `kSecReturnData`
    ReturnData,
    /// `kSecMatchLimit`
    MatchLimit,
    /// `kSecUseOperationPrompt`
    UseOperationPrompt,
}

impl QueryKey {
    /// The raw key string, as defined by the Security framework.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Account => "acct",
            Self::Service => "svce",
            Self::Server => "srvr",
            Self::AccessGroup => "agrp",
            Self::Label => "labl",
            Self::Accessible => "pdmn",
            Self::AccessControl => "accc",
            Self::ValueData => "v_Data",
            Self::ReturnAttributes => "r_Attributes",
            Self::ReturnData => "r_Data",
            Self::MatchLimit => "m_Limit",
            Self::UseOperationPrompt => "u_OpPrompt",
        }
    }

    /// `true` for keys persisted on the item itself, as opposed to search
    /// parameters and result-shape flags.
    #[must_use]
    pub const fn is_attribute(self) -> bool {
        matches!(
            self,
            Self::Account
                | Self::Service
                | Self::Server
                | Self::AccessGroup
                | Self::Label
                | Self::Accessible
                | Self::AccessControl
        )
    }

    /// `true` for attributes a find compares against stored items.
    #[must_use]
    pub const fn is_searchable(self) -> bool {
        matches!(
            self,
            Self::Account | Self::Service | Self::Server | Self::AccessGroup | Self::Label
        )
    }
}

/// Merged key→value mapping for a single store call.
///
/// Built fresh per operation by [`KeychainService`](crate::KeychainService),
/// consumed by one primitive, then dropped. Stores only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    entries: BTreeMap<QueryKey, Value>,
}

impl Query {
    pub(crate) const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Sets `key`, returning the previous value.
    pub(crate) fn insert(&mut self, key: QueryKey, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub(crate) fn remove(&mut self, key: QueryKey) -> Option<Value> {
        self.entries.remove(&key)
    }

    /// Value stored at `key`.
    #[must_use]
    pub fn get(&self, key: QueryKey) -> Option<&Value> {
        self.entries.get(&key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: QueryKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the query is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, QueryKey, Value> {
        self.entries.iter()
    }

    /// Keys present in the query. Safe to log, unlike the values.
    #[must_use]
    pub fn key_names(&self) -> Vec<&'static str> {
        self.entries.keys().map(|key| key.as_str()).collect()
    }

    /// The class discriminator, if present.
    #[must_use]
    pub fn item_class(&self) -> Option<ItemClass> {
        match self.get(QueryKey::Class) {
            Some(Value::Token(Token::Class(class))) => Some(*class),
            _ => None,
        }
    }

    /// Whether `key` holds `Bool(true)`.
    #[must_use]
    pub fn flag(&self, key: QueryKey) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = (&'a QueryKey, &'a Value);
    type IntoIter = btree_map::Iter<'a, QueryKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
