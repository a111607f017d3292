//! Typed keys and immutable snapshots of a preference group.
//!
//! A [`Preferences`] value is what every read of a [`DataStore`](crate::DataStore)
//! hands out. Edits go through [`MutablePreferences`], which is frozen back into
//! a snapshot when the transaction commits.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A single stored value.
///
/// Serialized untagged, so the TOML file stays a flat `key = value` table.
/// Variant order matters for deserialization: integers must be tried before
/// floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    StringSet(BTreeSet<String>),
}

impl PrefValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "bool",
            PrefValue::Long(_) => "long",
            PrefValue::Double(_) => "double",
            PrefValue::String(_) => "string",
            PrefValue::StringSet(_) => "string set",
        }
    }
}

/// Rust types that can be stored under a [`PrefKey`].
pub trait PrefType: Sized {
    /// Name used in logs when a stored value has the wrong kind.
    const KIND: &'static str;

    fn into_value(self) -> PrefValue;

    fn from_value(value: &PrefValue) -> Option<Self>;
}

impl PrefType for bool {
    const KIND: &'static str = "bool";

    fn into_value(self) -> PrefValue {
        PrefValue::Bool(self)
    }

    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PrefType for i64 {
    const KIND: &'static str = "long";

    fn into_value(self) -> PrefValue {
        PrefValue::Long(self)
    }

    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::Long(n) => Some(*n),
            _ => None,
        }
    }
}

impl PrefType for f64 {
    const KIND: &'static str = "double";

    fn into_value(self) -> PrefValue {
        PrefValue::Double(self)
    }

    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::Double(n) => Some(*n),
            _ => None,
        }
    }
}

impl PrefType for String {
    const KIND: &'static str = "string";

    fn into_value(self) -> PrefValue {
        PrefValue::String(self)
    }

    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl PrefType for BTreeSet<String> {
    const KIND: &'static str = "string set";

    fn into_value(self) -> PrefValue {
        PrefValue::StringSet(self)
    }

    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::StringSet(set) => Some(set.clone()),
            _ => None,
        }
    }
}

/// Name of a preference together with the type stored under it.
pub struct PrefKey<T> {
    name: Cow<'static, str>,
    _type: PhantomData<fn() -> T>,
}

impl<T> PrefKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    pub fn owned(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for PrefKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PrefKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrefKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for PrefKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Immutable snapshot of a preference group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    entries: BTreeMap<String, PrefValue>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed lookup. A value stored with a different type reads as `None`.
    pub fn get<T: PrefType>(&self, key: &PrefKey<T>) -> Option<T> {
        let value = self.entries.get(key.name())?;
        let typed = T::from_value(value);
        if typed.is_none() {
            tracing::warn!(
                key = key.name(),
                expected = T::KIND,
                found = value.kind(),
                "preference stored with a different type; ignoring"
            );
        }
        typed
    }

    pub fn contains<T>(&self, key: &PrefKey<T>) -> bool {
        self.entries.contains_key(key.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrefValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy for editing. The snapshot itself is left untouched.
    pub fn to_mutable(&self) -> MutablePreferences {
        MutablePreferences {
            inner: self.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Working copy handed to [`DataStore::edit`](crate::DataStore::edit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutablePreferences {
    inner: Preferences,
}

impl MutablePreferences {
    pub fn get<T: PrefType>(&self, key: &PrefKey<T>) -> Option<T> {
        self.inner.get(key)
    }

    pub fn set<T: PrefType>(&mut self, key: &PrefKey<T>, value: T) {
        self.inner
            .entries
            .insert(key.name().to_string(), value.into_value());
    }

    /// Removes the key, returning whether it was present.
    pub fn remove<T>(&mut self, key: &PrefKey<T>) -> bool {
        self.inner.entries.remove(key.name()).is_some()
    }

    pub fn clear(&mut self) {
        self.inner.entries.clear();
    }

    pub fn freeze(self) -> Preferences {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: PrefKey<String> = PrefKey::new("key_name");
    const VIP: PrefKey<bool> = PrefKey::new("key_vip");
    const VISITS: PrefKey<i64> = PrefKey::new("visits");
    const RATIO: PrefKey<f64> = PrefKey::new("ratio");
    const TAGS: PrefKey<BTreeSet<String>> = PrefKey::new("tags");

    #[test]
    fn test_missing_keys_read_as_none() {
        let prefs = Preferences::new();
        assert_eq!(prefs.get(&NAME), None);
        assert_eq!(prefs.get(&VIP), None);
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_set_and_freeze() {
        let mut edit = Preferences::new().to_mutable();
        edit.set(&NAME, "Alice".to_string());
        edit.set(&VIP, true);
        let prefs = edit.freeze();

        assert_eq!(prefs.get(&NAME).as_deref(), Some("Alice"));
        assert_eq!(prefs.get(&VIP), Some(true));
        assert_eq!(prefs.len(), 2);
    }

    #[test]
    fn test_editing_a_copy_leaves_snapshot_alone() {
        let mut edit = Preferences::new().to_mutable();
        edit.set(&VIP, true);
        let before = edit.freeze();

        let mut edit = before.to_mutable();
        edit.set(&VIP, false);
        assert!(edit.remove(&VIP));
        assert!(!edit.remove(&VIP));

        assert_eq!(before.get(&VIP), Some(true));
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let mut edit = Preferences::new().to_mutable();
        edit.set(&PrefKey::<String>::new("key_vip"), "yes".to_string());
        let prefs = edit.freeze();

        assert_eq!(prefs.get(&VIP), None);
        assert!(prefs.contains(&VIP));
    }

    #[test]
    fn test_toml_keeps_every_value_kind() {
        let mut edit = Preferences::new().to_mutable();
        edit.set(&NAME, "Bob \"the builder\"".to_string());
        edit.set(&VIP, false);
        edit.set(&VISITS, 12);
        edit.set(&RATIO, 0.5);
        edit.set(
            &TAGS,
            ["a", "b"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        );
        let prefs = edit.freeze();

        let text = prefs.to_toml().expect("serialize");
        assert!(text.contains("key_vip = false"));
        assert!(text.contains("visits = 12"));

        let parsed = Preferences::from_toml(&text).expect("parse");
        assert_eq!(parsed, prefs);
        assert_eq!(parsed.get(&VISITS), Some(12));
        assert_eq!(parsed.get(&RATIO), Some(0.5));
    }

    #[test]
    fn test_unsupported_toml_is_rejected() {
        assert!(Preferences::from_toml("key_name = = 3").is_err());
        assert!(Preferences::from_toml("[section]\nkey = 1").is_err());
    }

    #[test]
    fn test_owned_key_matches_static_key() {
        let mut edit = Preferences::new().to_mutable();
        edit.set(&PrefKey::<bool>::owned(String::from("key_vip")), true);
        assert_eq!(edit.get(&VIP), Some(true));
        assert_eq!(VIP.to_string(), "key_vip");
    }
}
