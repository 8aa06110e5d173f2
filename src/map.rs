//! Ordered map type for mapping-shaped Lua tables.
//!
//! [`LuaMap`] wraps an [`IndexMap`] keyed by [`Key`]. Insertion order carries no meaning
//! for Lua itself, but keeping it makes dumps deterministic: explicitly keyed fields come
//! first in source order, followed by the positional fields that were merged in.
//!
//! ## Examples
//!
//! ```rust
//! use serde_luatable::{Key, LuaMap, LuaValue};
//!
//! let mut map = LuaMap::new();
//! map.insert(Key::from("name"), LuaValue::from("Alice"));
//! map.insert(Key::from(1), LuaValue::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get(&Key::from("name")).and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::{Key, LuaValue};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of table keys to Lua values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LuaMap(IndexMap<Key, LuaValue>);

impl LuaMap {
    #[must_use]
    pub fn new() -> Self {
        LuaMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        LuaMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key if any.
    ///
    /// An existing key keeps its position; only the value is replaced.
    pub fn insert(&mut self, key: Key, value: LuaValue) -> Option<LuaValue> {
        self.0.insert(key, value)
    }

    /// Inserts the pair only if the key is absent. Returns `true` when inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::{Key, LuaMap, LuaValue};
    ///
    /// let mut map = LuaMap::new();
    /// assert!(map.insert_if_absent(Key::from(1), LuaValue::from("first")));
    /// assert!(!map.insert_if_absent(Key::from(1), LuaValue::from("second")));
    /// assert_eq!(map.get(&Key::from(1)).and_then(|v| v.as_str()), Some("first"));
    /// ```
    pub fn insert_if_absent(&mut self, key: Key, value: LuaValue) -> bool {
        match self.0.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&LuaValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, LuaValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Key, LuaValue> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, LuaValue> {
        self.0.iter()
    }
}

impl From<HashMap<Key, LuaValue>> for LuaMap {
    fn from(map: HashMap<Key, LuaValue>) -> Self {
        LuaMap(map.into_iter().collect())
    }
}

impl From<LuaMap> for HashMap<Key, LuaValue> {
    fn from(map: LuaMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for LuaMap {
    type Item = (Key, LuaValue);
    type IntoIter = indexmap::map::IntoIter<Key, LuaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LuaMap {
    type Item = (&'a Key, &'a LuaValue);
    type IntoIter = indexmap::map::Iter<'a, Key, LuaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Key, LuaValue)> for LuaMap {
    fn from_iter<T: IntoIterator<Item = (Key, LuaValue)>>(iter: T) -> Self {
        LuaMap(IndexMap::from_iter(iter))
    }
}
