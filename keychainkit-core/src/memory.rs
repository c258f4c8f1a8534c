//! In-memory implementation of [`KeychainStore`].
//!
//! This store is NOT secure: items live in process memory and access-control
//! flags are recorded but never enforced. It exists for tests and for hosts
//! that have no platform keychain.
//!
//! It follows the native store's observable behaviour closely enough for the
//! executor to be exercised end to end:
//!
//! - items are unique per class, account, service, server and access group;
//!   a second add reports [`Status::DUPLICATE_ITEM`],
//! - a find without a match limit returns at most one item,
//! - `MatchLimit::One` or no limit yields a single value, a numeric limit or
//!   `MatchLimit::All` an array,
//! - update and delete apply to every matching item and report
//!   [`Status::ITEM_NOT_FOUND`] when nothing matched; an update that would
//!   give an item another item's identity reports [`Status::DUPLICATE_ITEM`]
//!   and changes nothing,
//! - a query without a class discriminator is rejected with [`Status::PARAM`].

#![allow(clippy::significant_drop_tightening)]

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use zeroize::Zeroizing;

use crate::option::{AccessControl, ItemClass};
use crate::query::{Query, QueryKey};
use crate::status::Status;
use crate::store::KeychainStore;
use crate::value::{AccessControlObject, Attributes, Token, Value};

/// Keys that make up an item's primary key.
const IDENTITY_KEYS: [QueryKey; 4] = [
    QueryKey::Account,
    QueryKey::Service,
    QueryKey::Server,
    QueryKey::AccessGroup,
];

fn same_identity_keys(
    left: &BTreeMap<QueryKey, Value>,
    right: &BTreeMap<QueryKey, Value>,
) -> bool {
    IDENTITY_KEYS
        .iter()
        .all(|key| left.get(key) == right.get(key))
}

struct StoredItem {
    class: ItemClass,
    attributes: BTreeMap<QueryKey, Value>,
    data: Zeroizing<Vec<u8>>,
}

impl StoredItem {
    fn matches(&self, class: ItemClass, query: &Query) -> bool {
        self.class == class
            && query
                .iter()
                .filter(|(key, _)| key.is_searchable())
                .all(|(key, value)| self.attributes.get(key) == Some(value))
    }

    fn same_identity(&self, other: &Self) -> bool {
        self.class == other.class && same_identity_keys(&self.attributes, &other.attributes)
    }

    fn to_attributes(&self, include_data: bool) -> Attributes {
        let mut attributes: Attributes = self
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value.clone()))
            .collect();
        attributes.insert(
            QueryKey::Class.as_str().to_string(),
            self.class.discriminator(),
        );
        if include_data {
            attributes.insert(
                QueryKey::ValueData.as_str().to_string(),
                Value::Data(self.data.to_vec()),
            );
        }
        attributes
    }
}

/// Process-local keychain.
pub struct MemoryStore {
    items: RwLock<Vec<StoredItem>>,
    access_control_failure: Option<Status>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            access_control_failure: None,
        }
    }

    /// Makes every access-control construction fail with `status`.
    #[must_use]
    pub fn with_access_control_failure(mut self, status: Status) -> Self {
        self.access_control_failure = Some(status);
        self
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The cap on matches and whether the result is a single value rather
    /// than an array.
    fn match_limit(query: &Query) -> Option<(usize, bool)> {
        match query.get(QueryKey::MatchLimit) {
            None | Some(Value::Token(Token::MatchLimitOne)) => Some((1, true)),
            Some(Value::Token(Token::MatchLimitAll)) => Some((usize::MAX, false)),
            Some(Value::Integer(n)) if *n > 0 => usize::try_from(*n).ok().map(|n| (n, false)),
            Some(_) => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeychainStore for MemoryStore {
    fn add(&self, query: &Query) -> Status {
        let Some(class) = query.item_class() else {
            return Status::PARAM;
        };
        let data = match query.get(QueryKey::ValueData) {
            None => Vec::new(),
            Some(Value::Data(data)) => data.clone(),
            Some(_) => return Status::PARAM,
        };
        let item = StoredItem {
            class,
            attributes: query
                .iter()
                .filter(|(key, _)| key.is_attribute())
                .map(|(key, value)| (*key, value.clone()))
                .collect(),
            data: Zeroizing::new(data),
        };

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.iter().any(|existing| existing.same_identity(&item)) {
            return Status::DUPLICATE_ITEM;
        }
        items.push(item);
        Status::SUCCESS
    }

    fn find(&self, query: &Query) -> (Status, Option<Value>) {
        let Some(class) = query.item_class() else {
            return (Status::PARAM, None);
        };
        let Some((limit, single)) = Self::match_limit(query) else {
            return (Status::PARAM, None);
        };
        let return_data = query.flag(QueryKey::ReturnData);
        let return_attributes = query.flag(QueryKey::ReturnAttributes);

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let matches: Vec<&StoredItem> = items
            .iter()
            .filter(|item| item.matches(class, query))
            .take(limit)
            .collect();
        if matches.is_empty() {
            return (Status::ITEM_NOT_FOUND, None);
        }
        if !return_data && !return_attributes {
            return (Status::SUCCESS, None);
        }

        let mut results: Vec<Value> = matches
            .into_iter()
            .map(|item| {
                if return_attributes {
                    Value::Attributes(item.to_attributes(return_data))
                } else {
                    Value::Data(item.data.to_vec())
                }
            })
            .collect();
        if single {
            (Status::SUCCESS, results.pop())
        } else {
            (Status::SUCCESS, Some(Value::Array(results)))
        }
    }

    fn update(&self, query: &Query, attributes: &Query) -> Status {
        let Some(class) = query.item_class() else {
            return Status::PARAM;
        };
        let mut new_data = None;
        for (key, value) in attributes {
            match (key, value) {
                (QueryKey::ValueData, Value::Data(data)) => new_data = Some(data),
                (key, _) if key.is_attribute() => {}
                _ => return Status::PARAM,
            }
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let targets: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(class, query))
            .map(|(index, _)| index)
            .collect();
        if targets.is_empty() {
            return Status::ITEM_NOT_FOUND;
        }

        let updated: Vec<BTreeMap<QueryKey, Value>> = targets
            .iter()
            .map(|&index| {
                let mut merged = items[index].attributes.clone();
                for (key, value) in attributes {
                    if key.is_attribute() {
                        merged.insert(*key, value.clone());
                    }
                }
                merged
            })
            .collect();

        // Updated items must stay unique among themselves and the rest.
        let clashes = updated.iter().enumerate().any(|(position, merged)| {
            updated[..position]
                .iter()
                .any(|earlier| same_identity_keys(merged, earlier))
                || items.iter().enumerate().any(|(index, other)| {
                    other.class == class
                        && !targets.contains(&index)
                        && same_identity_keys(merged, &other.attributes)
                })
        });
        if clashes {
            return Status::DUPLICATE_ITEM;
        }

        for (index, merged) in targets.into_iter().zip(updated) {
            let item = &mut items[index];
            item.attributes = merged;
            if let Some(data) = new_data {
                // the previous buffer is wiped on drop
                item.data = Zeroizing::new(data.clone());
            }
        }
        Status::SUCCESS
    }

    fn delete(&self, query: &Query) -> Status {
        let Some(class) = query.item_class() else {
            return Status::PARAM;
        };
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|item| !item.matches(class, query));
        if items.len() == before {
            Status::ITEM_NOT_FOUND
        } else {
            Status::SUCCESS
        }
    }

    fn create_access_control(
        &self,
        access_control: &AccessControl,
    ) -> Result<AccessControlObject, Status> {
        self.access_control_failure
            .map_or_else(|| Ok(AccessControlObject::new(*access_control)), Err)
    }
}
