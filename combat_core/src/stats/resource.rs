//! Depletable, regenerating resource pools (mana, energy, ...)

use super::attributes::AttributeStore;
use content_core::{AttributeKey, ResourceKind};

const RESOURCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceChange {
    pub kind: ResourceKind,
    pub old: f64,
    pub new: f64,
}

/// One resource pool of one unit; always within `0..=max`
#[derive(Debug, Clone)]
pub struct ResourceState {
    kind: ResourceKind,
    current: f64,
    max: f64,
    max_key: AttributeKey,
    regen_key: Option<AttributeKey>,
}

impl ResourceState {
    /// Create a pool sized from the attribute store
    pub fn from_attributes(
        kind: ResourceKind,
        attributes: &AttributeStore,
        max_key: AttributeKey,
        regen_key: Option<AttributeKey>,
        start_full: bool,
    ) -> Self {
        let max = attributes.get(&max_key, 0.0).max(0.0);
        ResourceState {
            kind,
            current: if start_full { max } else { 0.0 },
            max,
            max_key,
            regen_key,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }

    pub fn max_key(&self) -> &AttributeKey {
        &self.max_key
    }

    pub fn can_spend(&self, amount: f64) -> bool {
        amount <= 0.0 || self.current + RESOURCE_EPSILON >= amount
    }

    /// Spend `amount`; fails without mutation when the pool is short
    ///
    /// Returns whether the spend happened, plus the change to publish.
    pub fn spend(&mut self, amount: f64) -> (bool, Option<ResourceChange>) {
        if !self.can_spend(amount) {
            return (false, None);
        }
        if amount <= 0.0 {
            return (true, None);
        }
        (true, self.commit(self.current - amount))
    }

    pub fn restore(&mut self, amount: f64) -> Option<ResourceChange> {
        if amount <= 0.0 {
            return None;
        }
        self.commit(self.current + amount)
    }

    /// Overwrite the current value (clamped)
    pub fn set_current(&mut self, value: f64) -> Option<ResourceChange> {
        self.commit(value)
    }

    /// Re-read the maximum; `keep_ratio` rescales the current value
    pub fn refresh_max(&mut self, attributes: &AttributeStore, keep_ratio: bool) -> Option<ResourceChange> {
        let new_max = attributes.get(&self.max_key, 0.0).max(0.0);
        if (new_max - self.max).abs() <= RESOURCE_EPSILON {
            return None;
        }
        let old_max = self.max;
        self.max = new_max;
        let target = if keep_ratio && old_max > 0.0 {
            self.current / old_max * new_max
        } else {
            self.current
        };
        self.commit(target)
    }

    pub fn regenerate(&mut self, attributes: &AttributeStore, dt: f64) -> Option<ResourceChange> {
        if dt <= 0.0 {
            return None;
        }
        let rate = self
            .regen_key
            .as_ref()
            .map(|key| attributes.get(key, 0.0))
            .unwrap_or(0.0);
        if rate == 0.0 {
            return None;
        }
        self.commit(self.current + rate * dt)
    }

    fn commit(&mut self, value: f64) -> Option<ResourceChange> {
        let value = value.clamp(0.0, self.max);
        let old = self.current;
        if (value - old).abs() <= RESOURCE_EPSILON {
            return None;
        }
        self.current = value;
        Some(ResourceChange {
            kind: self.kind,
            old,
            new: value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mana(max: f64) -> (AttributeStore, ResourceState) {
        let key = AttributeKey::new("max_mana");
        let mut attrs = AttributeStore::default();
        attrs.set(&key, max);
        let pool = ResourceState::from_attributes(
            ResourceKind::Mana,
            &attrs,
            key,
            Some(AttributeKey::new("mana_regen")),
            true,
        );
        (attrs, pool)
    }

    #[test]
    fn test_spend_insufficient_is_noop() {
        let (_, mut pool) = mana(50.0);
        assert!(pool.can_spend(50.0));
        assert!(!pool.can_spend(50.5));

        let (ok, change) = pool.spend(60.0);
        assert!(!ok);
        assert!(change.is_none());
        assert!((pool.current() - 50.0).abs() < 1e-9);

        let (ok, change) = pool.spend(20.0);
        assert!(ok);
        assert!((change.unwrap().new - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_spend_succeeds_silently() {
        let (_, mut pool) = mana(10.0);
        assert_eq!(pool.spend(0.0), (true, None));
    }

    #[test]
    fn test_restore_clamps() {
        let (_, mut pool) = mana(40.0);
        pool.spend(30.0);
        let change = pool.restore(100.0).unwrap();
        assert!((change.new - 40.0).abs() < 1e-9);
        assert!(pool.restore(1.0).is_none());
    }

    #[test]
    fn test_refresh_max_keeps_ratio() {
        let (mut attrs, mut pool) = mana(100.0);
        pool.spend(75.0);
        attrs.set(&AttributeKey::new("max_mana"), 200.0);
        pool.refresh_max(&attrs, true);
        assert!((pool.current() - 50.0).abs() < 1e-9);
        assert!((pool.ratio() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_regenerate() {
        let (mut attrs, mut pool) = mana(100.0);
        pool.set_current(0.0);
        attrs.set(&AttributeKey::new("mana_regen"), 5.0);
        pool.regenerate(&attrs, 2.0);
        assert!((pool.current() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_empty() {
        let key = AttributeKey::new("max_rage");
        let mut attrs = AttributeStore::default();
        attrs.set(&key, 100.0);
        let pool = ResourceState::from_attributes(ResourceKind::Rage, &attrs, key, None, false);
        assert!((pool.current() - 0.0).abs() < f64::EPSILON);
        assert!((pool.max() - 100.0).abs() < f64::EPSILON);
    }
}
