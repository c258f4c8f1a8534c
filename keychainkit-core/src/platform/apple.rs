//! Keychain Services implementation of [`KeychainStore`].
//!
//! Queries are translated key by key into a `CFDictionary`. Keys and store
//! tokens are passed as `CFString`s holding the raw constant values
//! (`"acct"`, `"genp"`, ...), which the Security framework compares by value.
//!
//! # Translation
//!
//! | [`Value`]          | Core Foundation          |
//! |--------------------|--------------------------|
//! | `Text`             | `CFString`               |
//! | `Data`             | `CFData`                 |
//! | `Bool`             | `CFBoolean`              |
//! | `Integer`          | `CFNumber`               |
//! | `Token`            | `CFString` (raw constant)|
//! | `AccessControl`    | `SecAccessControl`       |
//!
//! `Attributes` and `Array` only appear in results; a query holding one is
//! rejected with [`Status::PARAM`].

use std::ffi::c_void;
use std::ptr;

use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{CFType, CFTypeRef, TCFType};
use core_foundation::boolean::{CFBoolean, CFBooleanRef};
use core_foundation::data::{CFData, CFDataRef};
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::error::{CFError, CFErrorRef};
use core_foundation::number::{CFNumber, CFNumberRef};
use core_foundation::string::{CFString, CFStringRef};
use security_framework::access_control::SecAccessControl;
use security_framework_sys::access_control::{
    SecAccessControlCreateFlags, SecAccessControlCreateWithFlags,
};
use security_framework_sys::keychain_item::{
    SecItemAdd, SecItemCopyMatching, SecItemDelete, SecItemUpdate,
};

use crate::option::AccessControl;
use crate::query::{Query, QueryKey};
use crate::status::Status;
use crate::store::KeychainStore;
use crate::value::{AccessControlObject, Attributes, Token, Value};

/// `kSecUseDataProtectionKeychain`. Routes macOS items to the data protection
/// keychain, the only one that honours access groups and access control.
#[cfg(target_os = "macos")]
const USE_DATA_PROTECTION_KEYCHAIN: &str = "nleg";

/// Access-control handle carried inside an [`AccessControlObject`].
struct NativeAccessControl(SecAccessControl);

// SAFETY: `SecAccessControl` is an immutable Core Foundation object; CF
// reference counting is thread-safe.
unsafe impl Send for NativeAccessControl {}
unsafe impl Sync for NativeAccessControl {}

/// Keychain Services store for macOS and iOS.
///
/// Stateless: every call builds its dictionaries, calls the Security
/// framework and releases them.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppleKeychainStore;

impl AppleKeychainStore {
    /// Creates the store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn encode_value(value: &Value) -> Result<CFType, Status> {
    let encoded = match value {
        Value::Text(text) => CFString::new(text).into_CFType(),
        Value::Data(data) => CFData::from_buffer(data).into_CFType(),
        Value::Bool(flag) => CFBoolean::from(*flag).into_CFType(),
        Value::Integer(n) => CFNumber::from(*n).into_CFType(),
        Value::Token(token) => CFString::from_static_string(token.as_str()).into_CFType(),
        Value::AccessControl(object) => object
            .native::<NativeAccessControl>()
            .ok_or(Status::PARAM)?
            .0
            .as_CFType(),
        Value::Attributes(_) | Value::Array(_) => return Err(Status::PARAM),
    };
    Ok(encoded)
}

fn encode_pairs(query: &Query) -> Result<Vec<(CFString, CFType)>, Status> {
    query
        .iter()
        .map(|(key, value)| Ok((CFString::from_static_string(key.as_str()), encode_value(value)?)))
        .collect()
}

fn encode_query(query: &Query) -> Result<CFDictionary<CFString, CFType>, Status> {
    #[cfg_attr(not(target_os = "macos"), allow(unused_mut))]
    let mut pairs = encode_pairs(query)?;
    #[cfg(target_os = "macos")]
    pairs.push((
        CFString::from_static_string(USE_DATA_PROTECTION_KEYCHAIN),
        CFBoolean::true_value().into_CFType(),
    ));
    Ok(CFDictionary::from_CFType_pairs(&pairs))
}

/// Attribute dictionaries for `SecItemUpdate` carry only the new values.
fn encode_attributes(attributes: &Query) -> Result<CFDictionary<CFString, CFType>, Status> {
    Ok(CFDictionary::from_CFType_pairs(&encode_pairs(attributes)?))
}

/// Attributes whose string values are store constants rather than user text.
const TOKEN_KEYS: [QueryKey; 2] = [QueryKey::Class, QueryKey::Accessible];

/// Decodes a result value. Strings become [`Token`]s only when `tokens` is
/// set, so user text that happens to spell a constant stays text.
fn decode_value(value: &CFType, tokens: bool) -> Option<Value> {
    let type_id = value.type_of();
    let raw = value.as_CFTypeRef();
    // Each wrap below follows a type check against the object's runtime type
    // and takes its own retain.
    if type_id == CFData::type_id() {
        let data = unsafe { CFData::wrap_under_get_rule(raw as CFDataRef) };
        Some(Value::Data(data.bytes().to_vec()))
    } else if type_id == CFString::type_id() {
        let text = unsafe { CFString::wrap_under_get_rule(raw as CFStringRef) }.to_string();
        let token = if tokens { Token::from_raw(&text) } else { None };
        Some(token.map_or(Value::Text(text), Value::Token))
    } else if type_id == CFBoolean::type_id() {
        let flag = unsafe { CFBoolean::wrap_under_get_rule(raw as CFBooleanRef) };
        Some(Value::Bool(flag.into()))
    } else if type_id == CFNumber::type_id() {
        let number = unsafe { CFNumber::wrap_under_get_rule(raw as CFNumberRef) };
        number.to_i64().map(Value::Integer)
    } else if type_id == CFDictionary::<*const c_void, *const c_void>::type_id() {
        let dictionary = unsafe {
            CFDictionary::<*const c_void, *const c_void>::wrap_under_get_rule(
                raw as CFDictionaryRef,
            )
        };
        Some(Value::Attributes(decode_attributes(&dictionary)))
    } else if type_id == CFArray::<CFType>::type_id() {
        let array = unsafe { CFArray::<CFType>::wrap_under_get_rule(raw as CFArrayRef) };
        Some(Value::Array(
            array
                .iter()
                .filter_map(|item| decode_value(&item, false))
                .collect(),
        ))
    } else {
        // Dates, access-control objects and other types have no `Value`.
        None
    }
}

fn decode_attributes(dictionary: &CFDictionary<*const c_void, *const c_void>) -> Attributes {
    let (keys, values) = dictionary.get_keys_and_values();
    keys.into_iter()
        .zip(values)
        .filter_map(|(key, value)| {
            let key = unsafe { CFType::wrap_under_get_rule(key) };
            if key.type_of() != CFString::type_id() {
                return None;
            }
            let name =
                unsafe { CFString::wrap_under_get_rule(key.as_CFTypeRef() as CFStringRef) }
                    .to_string();
            let value = unsafe { CFType::wrap_under_get_rule(value) };
            let tokens = TOKEN_KEYS.iter().any(|key| key.as_str() == name);
            decode_value(&value, tokens).map(|value| (name, value))
        })
        .collect()
}

impl KeychainStore for AppleKeychainStore {
    fn add(&self, query: &Query) -> Status {
        let dictionary = match encode_query(query) {
            Ok(dictionary) => dictionary,
            Err(status) => return status,
        };
        Status(unsafe { SecItemAdd(dictionary.as_concrete_TypeRef(), ptr::null_mut()) })
    }

    fn find(&self, query: &Query) -> (Status, Option<Value>) {
        let dictionary = match encode_query(query) {
            Ok(dictionary) => dictionary,
            Err(status) => return (status, None),
        };
        let mut result: CFTypeRef = ptr::null();
        let status =
            Status(unsafe { SecItemCopyMatching(dictionary.as_concrete_TypeRef(), &mut result) });
        if result.is_null() {
            return (status, None);
        }
        // SecItemCopyMatching follows the create rule.
        let result = unsafe { CFType::wrap_under_create_rule(result) };
        (status, decode_value(&result, false))
    }

    fn update(&self, query: &Query, attributes: &Query) -> Status {
        let (query, attributes) = match (encode_query(query), encode_attributes(attributes)) {
            (Ok(query), Ok(attributes)) => (query, attributes),
            (Err(status), _) | (_, Err(status)) => return status,
        };
        Status(unsafe {
            SecItemUpdate(
                query.as_concrete_TypeRef(),
                attributes.as_concrete_TypeRef(),
            )
        })
    }

    fn delete(&self, query: &Query) -> Status {
        let dictionary = match encode_query(query) {
            Ok(dictionary) => dictionary,
            Err(status) => return status,
        };
        Status(unsafe { SecItemDelete(dictionary.as_concrete_TypeRef()) })
    }

    fn create_access_control(
        &self,
        access_control: &AccessControl,
    ) -> Result<AccessControlObject, Status> {
        let protection =
            CFString::from_static_string(Token::Accessible(access_control.accessibility()).as_str());
        let flags = SecAccessControlCreateFlags::from(access_control.flags().bits());
        let mut error: CFErrorRef = ptr::null_mut();
        let raw = unsafe {
            SecAccessControlCreateWithFlags(
                ptr::null(),
                protection.as_CFTypeRef(),
                flags,
                &mut error,
            )
        };
        if raw.is_null() {
            let status = if error.is_null() {
                Status::PARAM
            } else {
                let error = unsafe { CFError::wrap_under_create_rule(error) };
                i32::try_from(error.code()).map_or(Status::PARAM, Status)
            };
            return Err(status);
        }
        let native = unsafe { SecAccessControl::wrap_under_create_rule(raw) };
        Ok(AccessControlObject::with_native(
            *access_control,
            NativeAccessControl(native),
        ))
    }
}
