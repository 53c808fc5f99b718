//! Sparse property bag shared by cards and dialog models.

use std::collections::BTreeMap;

/// An open map from typed keys to typed values.
///
/// Setters report whether the stored value actually changed so callers can
/// notify observers about exactly the keys that moved.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBag<K: Ord, V> {
    values: BTreeMap<K, V>,
}

impl<K: Ord + Copy, V: PartialEq> PropertyBag<K, V> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.values.contains_key(&key)
    }

    /// Store `value`, returning `true` if it differs from the previous value.
    pub fn set(&mut self, key: K, value: V) -> bool {
        match self.values.get(&key) {
            Some(current) if *current == value => false,
            _ => {
                self.values.insert(key, value);
                true
            }
        }
    }

    /// Remove `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: K) -> bool {
        self.values.remove(&key).is_some()
    }

    /// Keys currently holding a value, in key order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Ord + Copy, V: PartialEq> Default for PropertyBag<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
