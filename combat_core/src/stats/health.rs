//! Health and shields
//!
//! Incoming damage drains shields newest-first, then health. Health is clamped
//! to `0..=max` (the upper bound only when clamping is enabled) and the
//! alive -> dead edge is reported exactly once until the unit is revived.

use super::attributes::AttributeStore;
use content_core::AttributeKey;

const HEALTH_EPSILON: f64 = 1e-9;

/// A damage-absorbing barrier
#[derive(Debug, Clone, PartialEq)]
pub struct ShieldInstance {
    pub id: u64,
    pub remaining: f64,
    /// Absolute simulation time; None never expires
    pub expires_at: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChange {
    pub old: f64,
    pub new: f64,
    pub alive: bool,
    /// This change crossed from alive to dead
    pub died: bool,
}

/// Change of total shield absorption
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldChange {
    pub old: f64,
    pub new: f64,
}

/// What a single `apply_damage` call did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Damage soaked by shields
    pub absorbed: f64,
    /// Damage that reached health
    pub dealt: f64,
    pub health: Option<HealthChange>,
    pub shield: Option<ShieldChange>,
}

impl DamageOutcome {
    pub fn died(&self) -> bool {
        self.health.map(|h| h.died).unwrap_or(false)
    }
}

/// Current/max health plus active shields of one unit
#[derive(Debug, Clone)]
pub struct HealthState {
    current: f64,
    max: f64,
    alive: bool,
    clamp_to_max: bool,
    shields: Vec<ShieldInstance>,
    next_shield_id: u64,
    max_key: AttributeKey,
    regen_key: Option<AttributeKey>,
    default_max: f64,
}

impl HealthState {
    /// Full health at `default_max`; call `refresh_max` to read the real maximum
    pub fn new(max_key: AttributeKey, regen_key: Option<AttributeKey>, default_max: f64, clamp_to_max: bool) -> Self {
        let default_max = default_max.max(0.0);
        HealthState {
            current: default_max,
            max: default_max,
            alive: default_max > 0.0,
            clamp_to_max,
            shields: Vec::new(),
            next_shield_id: 0,
            max_key,
            regen_key,
            default_max,
        }
    }

    /// Full health with the maximum read from the attribute store
    pub fn from_attributes(
        attributes: &AttributeStore,
        max_key: AttributeKey,
        regen_key: Option<AttributeKey>,
        default_max: f64,
        clamp_to_max: bool,
    ) -> Self {
        let mut health = Self::new(max_key, regen_key, default_max, clamp_to_max);
        let max = health.max_from(attributes);
        health.max = max;
        health.current = max;
        health.alive = max > 0.0;
        health
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// current / max, 0.0 when max is zero
    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Maximum used while the max attribute is absent
    pub fn default_max(&self) -> f64 {
        self.default_max
    }

    pub fn max_key(&self) -> &AttributeKey {
        &self.max_key
    }

    pub fn shields(&self) -> &[ShieldInstance] {
        &self.shields
    }

    pub fn total_shield(&self) -> f64 {
        self.shields.iter().map(|s| s.remaining).sum()
    }

    /// Absorb with shields (newest first), then reduce health
    ///
    /// Dead units and non-positive amounts are ignored.
    pub fn apply_damage(&mut self, amount: f64) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        if !self.alive || amount <= 0.0 {
            return outcome;
        }

        let shield_before = self.total_shield();
        let mut remaining = amount;
        while remaining > 0.0 {
            let Some(shield) = self.shields.last_mut() else {
                break;
            };
            let soaked = shield.remaining.min(remaining);
            shield.remaining -= soaked;
            remaining -= soaked;
            outcome.absorbed += soaked;
            if shield.remaining <= HEALTH_EPSILON {
                self.shields.pop();
            }
        }
        if outcome.absorbed > 0.0 {
            outcome.shield = Some(ShieldChange {
                old: shield_before,
                new: self.total_shield(),
            });
        }

        if remaining > 0.0 {
            outcome.dealt = remaining.min(self.current);
            outcome.health = self.commit(self.current - remaining);
        }
        outcome
    }

    /// Restore health, clamped at max. Dead units cannot be healed.
    pub fn heal(&mut self, amount: f64) -> Option<HealthChange> {
        if !self.alive || amount <= 0.0 {
            return None;
        }
        self.commit(self.current + amount)
    }

    /// Push a new shield; `duration <= 0` never expires
    pub fn apply_shield(&mut self, amount: f64, duration: f64, now: f64) -> Option<ShieldChange> {
        if amount <= 0.0 {
            return None;
        }
        let old = self.total_shield();
        self.next_shield_id += 1;
        self.shields.push(ShieldInstance {
            id: self.next_shield_id,
            remaining: amount,
            expires_at: (duration > 0.0).then_some(now + duration),
        });
        Some(ShieldChange {
            old,
            new: self.total_shield(),
        })
    }

    /// Drop expired shields; their remaining absorption is lost
    pub fn sweep_shields(&mut self, now: f64) -> Option<ShieldChange> {
        let old = self.total_shield();
        let before = self.shields.len();
        self.shields
            .retain(|s| s.expires_at.map_or(true, |expires_at| expires_at > now));
        if self.shields.len() == before {
            return None;
        }
        Some(ShieldChange {
            old,
            new: self.total_shield(),
        })
    }

    /// Remove every shield at once (dispel)
    pub fn clear_shields(&mut self) -> Option<ShieldChange> {
        if self.shields.is_empty() {
            return None;
        }
        let old = self.total_shield();
        self.shields.clear();
        Some(ShieldChange { old, new: 0.0 })
    }

    /// Re-read the maximum from the attribute store
    ///
    /// With `keep_ratio` the current value scales with the maximum, otherwise
    /// it is only clamped.
    pub fn refresh_max(&mut self, attributes: &AttributeStore, keep_ratio: bool) -> Option<HealthChange> {
        let new_max = self.max_from(attributes);
        if (new_max - self.max).abs() <= HEALTH_EPSILON {
            return None;
        }
        let old_max = self.max;
        self.max = new_max;
        if !self.alive {
            return None;
        }
        let target = if keep_ratio && old_max > 0.0 {
            self.current / old_max * new_max
        } else {
            self.current
        };
        self.commit(target)
    }

    /// Apply per-second regeneration from the regen attribute
    pub fn regenerate(&mut self, attributes: &AttributeStore, dt: f64) -> Option<HealthChange> {
        if !self.alive || dt <= 0.0 {
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

    /// Bring a dead unit back at a fraction of its maximum
    pub fn revive(&mut self, ratio: f64) -> Option<HealthChange> {
        let amount = self.max * ratio.clamp(0.0, 1.0);
        if self.alive || amount <= 0.0 {
            return None;
        }
        self.alive = true;
        let old = self.current;
        self.current = amount;
        Some(HealthChange {
            old,
            new: amount,
            alive: true,
            died: false,
        })
    }

    fn max_from(&self, attributes: &AttributeStore) -> f64 {
        match attributes.try_get(&self.max_key) {
            Some(max) => max.max(0.0),
            None => {
                tracing::trace!(key = %self.max_key, "max health attribute missing, using default");
                self.default_max
            }
        }
    }

    /// Write a new current value, detecting the death edge
    fn commit(&mut self, value: f64) -> Option<HealthChange> {
        let mut value = value.max(0.0);
        if self.clamp_to_max {
            value = value.min(self.max);
        }
        let old = self.current;
        if (value - old).abs() <= HEALTH_EPSILON {
            return None;
        }
        self.current = value;

        let died = self.alive && old > 0.0 && value <= 0.0;
        if died {
            self.alive = false;
        }
        debug_assert!(self.current >= 0.0);
        debug_assert!(!self.clamp_to_max || self.current <= self.max + HEALTH_EPSILON);
        Some(HealthChange {
            old,
            new: value,
            alive: self.alive,
            died,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn health(max: f64) -> HealthState {
        HealthState::new(AttributeKey::new("max_health"), None, max, true)
    }

    #[test]
    fn test_shield_then_lethal_damage() {
        let mut hp = health(100.0);
        hp.apply_shield(30.0, 0.0, 0.0);

        let first = hp.apply_damage(50.0);
        assert!((first.absorbed - 30.0).abs() < 1e-9);
        assert!((hp.current() - 70.0).abs() < 1e-9);
        assert!(!first.died());

        let second = hp.apply_damage(80.0);
        assert!((second.absorbed - 0.0).abs() < 1e-9);
        assert!((hp.current() - 0.0).abs() < 1e-9);
        assert!(second.died());
        assert!(!hp.is_alive());

        // Already dead: nothing happens, no second death
        let third = hp.apply_damage(10.0);
        assert!(!third.died());
        assert!(third.health.is_none());
    }

    #[test]
    fn test_shields_absorb_newest_first() {
        let mut hp = health(100.0);
        hp.apply_shield(20.0, 0.0, 0.0);
        hp.apply_shield(10.0, 0.0, 0.0);

        let outcome = hp.apply_damage(15.0);
        assert!((outcome.absorbed - 15.0).abs() < 1e-9);
        assert_eq!(hp.shields().len(), 1);
        // The newer 10-point shield is gone, the older one took the other 5
        assert_eq!(hp.shields()[0].id, 1);
        assert!((hp.shields()[0].remaining - 15.0).abs() < 1e-9);
        assert!((hp.current() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_shield_expiry_discards_remaining() {
        let mut hp = health(100.0);
        hp.apply_shield(25.0, 2.0, 0.0);
        hp.apply_shield(5.0, 0.0, 0.0);

        assert!(hp.sweep_shields(1.0).is_none());
        let change = hp.sweep_shields(2.0).unwrap();
        assert!((change.old - 30.0).abs() < 1e-9);
        assert!((change.new - 5.0).abs() < 1e-9);
        assert!((hp.current() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_heal_clamps_and_ignores_dead() {
        let mut hp = health(100.0);
        hp.apply_damage(40.0);
        let change = hp.heal(100.0).unwrap();
        assert!((change.new - 100.0).abs() < 1e-9);
        assert!(hp.heal(5.0).is_none());

        hp.apply_damage(1_000.0);
        assert!(hp.heal(50.0).is_none());
    }

    #[test]
    fn test_refresh_max_keep_ratio() {
        let key = AttributeKey::new("max_health");
        let mut attrs = AttributeStore::default();
        attrs.set(&key, 100.0);
        let mut hp = HealthState::from_attributes(&attrs, key.clone(), None, 50.0, true);
        hp.apply_damage(50.0);

        attrs.set(&key, 200.0);
        let change = hp.refresh_max(&attrs, true).unwrap();
        assert!((hp.max() - 200.0).abs() < 1e-9);
        assert!((change.new - 100.0).abs() < 1e-9);

        attrs.set(&key, 80.0);
        hp.refresh_max(&attrs, false);
        assert!((hp.current() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_max_falls_back() {
        let attrs = AttributeStore::default();
        let hp = HealthState::from_attributes(&attrs, AttributeKey::new("max_health"), None, 75.0, true);
        assert!((hp.max() - 75.0).abs() < 1e-9);
        assert!((hp.current() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_revive_allows_second_death() {
        let mut hp = health(100.0);
        assert!(hp.apply_damage(100.0).died());
        assert!(hp.revive(0.0).is_none());
        let change = hp.revive(0.5).unwrap();
        assert!(change.alive);
        assert!((hp.current() - 50.0).abs() < 1e-9);
        assert!(hp.revive(1.0).is_none());
        assert!(hp.apply_damage(60.0).died());
    }

    #[test]
    fn test_regeneration() {
        let regen = AttributeKey::new("health_regen");
        let mut attrs = AttributeStore::default();
        attrs.set(&regen, 4.0);
        let mut hp = HealthState::new(AttributeKey::new("max_health"), Some(regen), 100.0, true);
        hp.apply_damage(10.0);
        hp.regenerate(&attrs, 0.5);
        assert!((hp.current() - 92.0).abs() < 1e-9);
        hp.regenerate(&attrs, 10.0);
        assert!((hp.current() - 100.0).abs() < 1e-9);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Damage(f64),
        Heal(f64),
        Shield(f64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0..200.0f64).prop_map(Op::Damage),
            (0.0..200.0f64).prop_map(Op::Heal),
            (0.0..100.0f64).prop_map(Op::Shield),
        ]
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(ops in prop::collection::vec(op(), 1..50)) {
            let mut hp = health(100.0);
            let mut deaths = 0;
            for op in ops {
                match op {
                    Op::Damage(a) => {
                        if hp.apply_damage(a).died() {
                            deaths += 1;
                        }
                    }
                    Op::Heal(a) => {
                        hp.heal(a);
                    }
                    Op::Shield(a) => {
                        hp.apply_shield(a, 0.0, 0.0);
                    }
                }
                prop_assert!(hp.current() >= 0.0);
                prop_assert!(hp.current() <= hp.max() + 1e-9);
            }
            prop_assert!(deaths <= 1);
        }

        #[test]
        fn prop_overflow_damage_hits_health_exactly(shield in 0.0..100.0f64, extra in 0.0..50.0f64) {
            let mut hp = health(100.0);
            hp.apply_shield(shield, 0.0, 0.0);
            let outcome = hp.apply_damage(shield + extra);
            prop_assert!((outcome.absorbed - shield).abs() < 1e-6);
            prop_assert!((hp.current() - (100.0 - extra)).abs() < 1e-6);
        }
    }
}
