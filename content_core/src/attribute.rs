//! Attribute keys and the catalog that interns them

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Well-known attribute names used by the combat core
pub mod names {
    pub const MAX_HEALTH: &str = "max_health";
    pub const HEALTH_REGEN: &str = "health_regen";
    pub const MAX_MANA: &str = "max_mana";
    pub const MANA_REGEN: &str = "mana_regen";
    pub const MAX_ENERGY: &str = "max_energy";
    pub const ENERGY_REGEN: &str = "energy_regen";
    pub const ATTACK_POWER: &str = "attack_power";
    pub const MOVE_SPEED: &str = "move_speed";
}

/// Identifier for a named numeric attribute (max health, attack power, ...)
///
/// Cheap to clone. Keys produced by the same [`AttributeCatalog`] share one
/// allocation, so equality usually resolves on the pointer check alone.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AttributeKey(Arc<str>);

impl AttributeKey {
    /// Create a standalone key. Prefer [`AttributeCatalog::intern`] for content.
    pub fn new(name: impl AsRef<str>) -> Self {
        AttributeKey(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both keys point at the same interned allocation
    pub fn same_allocation(&self, other: &AttributeKey) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for AttributeKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for AttributeKey {}

impl Hash for AttributeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for AttributeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Borrow<str> for AttributeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for AttributeKey {
    fn from(s: String) -> Self {
        AttributeKey(Arc::from(s))
    }
}

impl From<&str> for AttributeKey {
    fn from(s: &str) -> Self {
        AttributeKey::new(s)
    }
}

impl From<AttributeKey> for String {
    fn from(key: AttributeKey) -> Self {
        key.0.to_string()
    }
}

impl fmt::Debug for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeKey({})", &*self.0)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interning table for attribute keys
///
/// Owned by the content set; units only ever hold clones of catalog keys.
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    keys: HashMap<Arc<str>, AttributeKey>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the canonical key for a name, creating it on first use
    pub fn intern(&mut self, name: &str) -> AttributeKey {
        if let Some(key) = self.keys.get(name) {
            return key.clone();
        }
        let key = AttributeKey::new(name);
        self.keys.insert(key.0.clone(), key.clone());
        key
    }

    /// Replace a key with its canonical catalog copy
    pub fn canonicalize(&mut self, key: &mut AttributeKey) {
        *key = self.intern(key.as_str());
    }

    /// Look up a key without creating it
    pub fn get(&self, name: &str) -> Option<&AttributeKey> {
        self.keys.get(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All interned keys, sorted by name
    pub fn keys(&self) -> Vec<AttributeKey> {
        let mut keys: Vec<_> = self.keys.values().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_shares_allocation() {
        let mut catalog = AttributeCatalog::new();
        let a = catalog.intern(names::MAX_HEALTH);
        let b = catalog.intern("max_health");
        assert!(a.same_allocation(&b));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_equality_by_name() {
        let a = AttributeKey::new("attack_power");
        let b = AttributeKey::from("attack_power".to_string());
        assert!(!a.same_allocation(&b));
        assert_eq!(a, b);
        assert_ne!(a, AttributeKey::new("move_speed"));
    }

    #[test]
    fn test_canonicalize() {
        let mut catalog = AttributeCatalog::new();
        let canonical = catalog.intern("armour");
        let mut loose = AttributeKey::new("armour");
        catalog.canonicalize(&mut loose);
        assert!(loose.same_allocation(&canonical));
    }

    #[test]
    fn test_serde_as_string() {
        let key = AttributeKey::new("max_mana");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"max_mana\"");
        let back: AttributeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
