//! AttributeStore - sparse, insertion-ordered attribute values of one unit

use content_core::AttributeKey;
use std::collections::HashMap;

/// A value change that passed the no-op tolerance
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub key: AttributeKey,
    pub old: f64,
    pub new: f64,
}

/// Per-unit map from attribute key to value
///
/// Entries keep the order they were first written in; lookups go through a
/// key -> position index.
#[derive(Debug, Clone)]
pub struct AttributeStore {
    entries: Vec<(AttributeKey, f64)>,
    index: HashMap<AttributeKey, usize>,
    epsilon: f64,
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

impl AttributeStore {
    /// Create an empty store; writes closer than `epsilon` to the old value are ignored
    pub fn new(epsilon: f64) -> Self {
        AttributeStore {
            entries: Vec::new(),
            index: HashMap::new(),
            epsilon: epsilon.max(0.0),
        }
    }

    /// Set a value. An absent key reads as 0.0 for the purpose of change detection.
    pub fn set(&mut self, key: &AttributeKey, value: f64) -> Option<AttributeChange> {
        match self.index.get(key) {
            Some(&i) => {
                let old = self.entries[i].1;
                if (old - value).abs() <= self.epsilon {
                    return None;
                }
                self.entries[i].1 = value;
                Some(AttributeChange {
                    key: key.clone(),
                    old,
                    new: value,
                })
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key.clone(), value));
                if value.abs() <= self.epsilon {
                    return None;
                }
                Some(AttributeChange {
                    key: key.clone(),
                    old: 0.0,
                    new: value,
                })
            }
        }
    }

    /// Add to a value; an absent key is inserted with `delta` as its value
    pub fn modify(&mut self, key: &AttributeKey, delta: f64) -> Option<AttributeChange> {
        let current = self.try_get(key).unwrap_or(0.0);
        self.set(key, current + delta)
    }

    /// Drop a key; the change reports the removed value going to 0.0
    pub fn remove(&mut self, key: &AttributeKey) -> Option<AttributeChange> {
        let i = self.index.remove(key)?;
        let (key, old) = self.entries.remove(i);
        for (k, _) in &self.entries[i..] {
            if let Some(pos) = self.index.get_mut(k) {
                *pos -= 1;
            }
        }
        Some(AttributeChange { key, old, new: 0.0 })
    }

    pub fn get(&self, key: &AttributeKey, fallback: f64) -> f64 {
        self.try_get(key).unwrap_or(fallback)
    }

    pub fn try_get(&self, key: &AttributeKey) -> Option<f64> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    /// Look up by name without holding a key
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, key: &AttributeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &AttributeKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> AttributeKey {
        AttributeKey::new(name)
    }

    #[test]
    fn test_set_and_get() {
        let mut store = AttributeStore::default();
        let change = store.set(&key("max_health"), 120.0).unwrap();
        assert!((change.old - 0.0).abs() < f64::EPSILON);
        assert!((change.new - 120.0).abs() < f64::EPSILON);
        assert!((store.get(&key("max_health"), 0.0) - 120.0).abs() < f64::EPSILON);
        assert_eq!(store.try_get(&key("armour")), None);
        assert!((store.get(&key("armour"), 7.0) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_noop_write_suppressed() {
        let mut store = AttributeStore::new(1e-3);
        store.set(&key("speed"), 5.0);
        assert!(store.set(&key("speed"), 5.0).is_none());
        assert!(store.set(&key("speed"), 5.0005).is_none());
        assert!(store.set(&key("speed"), 5.01).is_some());
    }

    #[test]
    fn test_modify_inserts_delta() {
        let mut store = AttributeStore::default();
        let change = store.modify(&key("rage_gain"), 3.0).unwrap();
        assert!((change.new - 3.0).abs() < f64::EPSILON);
        let change = store.modify(&key("rage_gain"), -1.0).unwrap();
        assert!((change.old - 3.0).abs() < f64::EPSILON);
        assert!((change.new - 2.0).abs() < f64::EPSILON);
        assert!(store.modify(&key("rage_gain"), 0.0).is_none());
    }

    #[test]
    fn test_insertion_order_and_uniqueness() {
        let mut store = AttributeStore::default();
        store.set(&key("b"), 1.0);
        store.set(&key("a"), 2.0);
        store.set(&key("b"), 3.0);
        let keys: Vec<&str> = store.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_by_name("b"), Some(3.0));
    }

    #[test]
    fn test_zero_insert_is_silent_but_present() {
        let mut store = AttributeStore::default();
        assert!(store.set(&key("threat"), 0.0).is_none());
        assert!(store.contains(&key("threat")));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut store = AttributeStore::default();
        store.set(&key("a"), 1.0);
        store.set(&key("b"), 2.0);
        store.set(&key("c"), 3.0);

        let change = store.remove(&key("a")).unwrap();
        assert!((change.old - 1.0).abs() < f64::EPSILON);
        assert!(change.new.abs() < f64::EPSILON);
        assert!(store.remove(&key("a")).is_none());

        assert_eq!(store.try_get(&key("a")), None);
        assert_eq!(store.try_get(&key("c")), Some(3.0));
        store.set(&key("b"), 4.0);
        let keys: Vec<&str> = store.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(store.get_by_name("b"), Some(4.0));
    }
}
