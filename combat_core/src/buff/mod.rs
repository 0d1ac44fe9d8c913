//! Buff engine - timed, stacking status effects with triggers
//!
//! The engine only mutates its own instance list. Trigger passes are handed
//! back to the caller as [`TriggerPass`] values and evaluated by
//! [`trigger::run_pass`] once the owning unit can be borrowed as a whole.

mod active;
pub mod trigger;

pub use active::{BuffInstance, BuffInstanceId};
pub use trigger::run_pass;

use crate::unit::UnitId;
use content_core::{AttributeKey, BuffDefinition, ModifierKind, StackingRule, TriggerKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Upper bound on catch-up ticks fired for one instance in one engine tick
const MAX_TICKS_PER_UPDATE: u32 = 64;

/// Result of applying a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub instance: BuffInstanceId,
    /// A new instance was created (as opposed to re-applying one)
    pub created: bool,
    pub stacks: u32,
}

/// A pending trigger evaluation for one buff instance
#[derive(Debug, Clone)]
pub struct TriggerPass {
    pub kind: TriggerKind,
    pub instance: BuffInstanceId,
    pub definition: Arc<BuffDefinition>,
    pub stacks: u32,
    pub source: Option<UnitId>,
}

impl TriggerPass {
    fn for_instance(instance: &BuffInstance, kind: TriggerKind) -> Self {
        TriggerPass {
            kind,
            instance: instance.id,
            definition: instance.definition.clone(),
            stacks: instance.stacks,
            source: instance.source,
        }
    }
}

/// Summed attribute contributions of all active buffs for one key
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModifierTotals {
    pub flat: f64,
    /// Percent
    pub increased: f64,
}

impl ModifierTotals {
    /// Apply to a base value: (base + flat) * (1 + increased%)
    pub fn apply(&self, base: f64) -> f64 {
        (base + self.flat) * (1.0 + self.increased / 100.0)
    }
}

/// All buff instances on one unit
#[derive(Debug, Clone, Default)]
pub struct BuffEngine {
    instances: Vec<BuffInstance>,
    next_id: u64,
}

impl BuffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, definition: Arc<BuffDefinition>, source: Option<UnitId>, now: f64) -> ApplyOutcome {
        self.next_id += 1;
        let id = BuffInstanceId(self.next_id);
        self.instances.push(BuffInstance::new(id, definition, source, now));
        ApplyOutcome {
            instance: id,
            created: true,
            stacks: 1,
        }
    }

    /// Apply a buff according to its stacking rule
    ///
    /// The caller is responsible for running the on-apply pass
    /// (`pass_for(outcome.instance, TriggerKind::Apply)`).
    pub fn apply(&mut self, definition: Arc<BuffDefinition>, source: Option<UnitId>, now: f64) -> ApplyOutcome {
        if definition.stacking == StackingRule::Independent {
            return self.apply_independent(definition, source, now);
        }

        let Some(instance) = self
            .instances
            .iter_mut()
            .find(|i| i.definition.id == definition.id)
        else {
            return self.create(definition, source, now);
        };

        instance.add_stack();
        instance.source = source.or(instance.source);
        let def = instance.definition.clone();
        match def.stacking {
            StackingRule::Refresh => {
                instance.applied_at = now;
                instance.ends_at = def.is_timed().then(|| now + def.duration);
                instance.next_tick_at = def.ticks().then(|| now + def.tick_interval);
            }
            StackingRule::Extend => {
                if def.is_timed() {
                    instance.ends_at = Some(match instance.ends_at {
                        Some(ends_at) => ends_at + def.duration,
                        None => now + def.duration,
                    });
                }
                if instance.next_tick_at.is_none() && def.ticks() {
                    instance.next_tick_at = Some(now + def.tick_interval);
                }
            }
            StackingRule::Stack | StackingRule::Independent => {
                if instance.ends_at.is_none() && def.is_timed() {
                    instance.ends_at = Some(now + def.duration);
                }
                if instance.next_tick_at.is_none() && def.ticks() {
                    instance.next_tick_at = Some(now + def.tick_interval);
                }
            }
        }
        debug_assert!(instance.stacks >= 1);

        ApplyOutcome {
            instance: instance.id,
            created: false,
            stacks: instance.stacks,
        }
    }

    fn apply_independent(&mut self, definition: Arc<BuffDefinition>, source: Option<UnitId>, now: f64) -> ApplyOutcome {
        let count = self.count_of(&definition.id);
        if (count as u32) < definition.stack_cap() {
            return self.create(definition, source, now);
        }

        // At the cap: recycle the instance closest to expiring
        let same: Vec<usize> = self
            .instances
            .iter()
            .enumerate()
            .filter(|(_, i)| i.definition.id == definition.id)
            .map(|(index, _)| index)
            .collect();
        let soonest = same
            .iter()
            .copied()
            .filter_map(|index| self.instances[index].ends_at.map(|ends_at| (index, ends_at)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        let Some(victim) = soonest.or_else(|| same.first().copied()) else {
            return self.create(definition, source, now);
        };

        let instance = &mut self.instances[victim];
        instance.reset(source, now);
        ApplyOutcome {
            instance: instance.id,
            created: false,
            stacks: instance.stacks,
        }
    }

    pub fn instances(&self) -> &[BuffInstance] {
        &self.instances
    }

    pub fn get(&self, id: BuffInstanceId) -> Option<&BuffInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn has(&self, buff_id: &str) -> bool {
        self.instances.iter().any(|i| i.definition.id == buff_id)
    }

    /// Number of concurrent instances of a definition
    pub fn count_of(&self, buff_id: &str) -> usize {
        self.instances
            .iter()
            .filter(|i| i.definition.id == buff_id)
            .count()
    }

    /// Summed stacks across all instances of a definition
    pub fn stacks_of(&self, buff_id: &str) -> u32 {
        self.instances
            .iter()
            .filter(|i| i.definition.id == buff_id)
            .map(|i| i.stacks)
            .sum()
    }

    pub fn instances_of(&self, buff_id: &str) -> Vec<BuffInstanceId> {
        self.instances
            .iter()
            .filter(|i| i.definition.id == buff_id)
            .map(|i| i.id)
            .collect()
    }

    pub fn blocks_movement(&self) -> bool {
        self.instances.iter().any(|i| i.definition.blocks_movement)
    }

    pub fn blocks_casting(&self) -> bool {
        self.instances.iter().any(|i| i.definition.blocks_casting)
    }

    /// A pass of `kind` for one instance, if it still exists
    pub fn pass_for(&self, id: BuffInstanceId, kind: TriggerKind) -> Option<TriggerPass> {
        self.get(id).map(|i| TriggerPass::for_instance(i, kind))
    }

    /// Passes of `kind` for every instance that has a matching trigger
    pub fn passes(&self, kind: TriggerKind) -> Vec<TriggerPass> {
        self.instances
            .iter()
            .filter(|i| i.definition.has_trigger(kind))
            .map(|i| TriggerPass::for_instance(i, kind))
            .collect()
    }

    /// Fire due ticks and reschedule them
    ///
    /// One pass per elapsed interval, never past the instance's end time.
    pub fn advance_ticks(&mut self, now: f64) -> Vec<TriggerPass> {
        let mut passes = Vec::new();
        for instance in &mut self.instances {
            if fire_due_ticks(instance, now, &mut passes) {
                tracing::warn!(buff = %instance.definition.id, "tick backlog truncated");
            }
        }
        passes
    }

    /// Instances whose end time has passed; nothing is removed
    pub fn expired(&self, now: f64) -> Vec<BuffInstanceId> {
        self.instances
            .iter()
            .filter(|i| i.is_expired(now))
            .map(|i| i.id)
            .collect()
    }

    /// Remove instances by id, returning what was removed
    pub fn remove(&mut self, ids: &[BuffInstanceId]) -> Vec<BuffInstance> {
        let mut removed = Vec::with_capacity(ids.len());
        let mut kept = Vec::with_capacity(self.instances.len());
        for instance in self.instances.drain(..) {
            if ids.contains(&instance.id) {
                removed.push(instance);
            } else {
                kept.push(instance);
            }
        }
        self.instances = kept;
        removed
    }

    /// Attribute contributions of every instance, scaled by stacks
    pub fn modifier_totals(&self) -> BTreeMap<AttributeKey, ModifierTotals> {
        let mut totals: BTreeMap<AttributeKey, ModifierTotals> = BTreeMap::new();
        for instance in &self.instances {
            let stacks = instance.stacks as f64;
            for modifier in &instance.definition.modifiers {
                let entry = totals.entry(modifier.key.clone()).or_default();
                match modifier.kind {
                    ModifierKind::Flat => entry.flat += modifier.value_per_stack * stacks,
                    ModifierKind::Increased => entry.increased += modifier.value_per_stack * stacks,
                }
            }
        }
        totals
    }
}

/// Queue the instance's due ticks, at most `MAX_TICKS_PER_UPDATE` of them
///
/// Returns true when due ticks were left unfired.
fn fire_due_ticks(instance: &mut BuffInstance, now: f64, passes: &mut Vec<TriggerPass>) -> bool {
    let interval = instance.definition.tick_interval;
    if interval <= 0.0 {
        return false;
    }
    let limit = instance.ends_at.map_or(now, |ends_at| ends_at.min(now));
    let mut fired = 0;
    while let Some(next) = instance.next_tick_at {
        if next > limit || fired >= MAX_TICKS_PER_UPDATE {
            break;
        }
        passes.push(TriggerPass::for_instance(instance, TriggerKind::Tick));
        instance.next_tick_at = Some(next + interval);
        fired += 1;
    }
    instance.next_tick_at.map_or(false, |next| next <= limit)
}
