//! A buff applied to a unit

use crate::unit::UnitId;
use content_core::BuffDefinition;
use std::sync::Arc;

/// Per-unit identifier of one buff application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuffInstanceId(pub(crate) u64);

/// One active application of a buff definition
#[derive(Debug, Clone)]
pub struct BuffInstance {
    pub id: BuffInstanceId,
    pub definition: Arc<BuffDefinition>,
    /// Always at least 1
    pub stacks: u32,
    /// Absolute time; None never expires
    pub ends_at: Option<f64>,
    /// Absolute time of the next tick trigger; None never ticks
    pub next_tick_at: Option<f64>,
    pub applied_at: f64,
    /// Unit that applied the buff
    pub source: Option<UnitId>,
}

impl BuffInstance {
    pub(crate) fn new(
        id: BuffInstanceId,
        definition: Arc<BuffDefinition>,
        source: Option<UnitId>,
        now: f64,
    ) -> Self {
        let ends_at = definition.is_timed().then(|| now + definition.duration);
        let next_tick_at = definition.ticks().then(|| now + definition.tick_interval);
        BuffInstance {
            id,
            definition,
            stacks: 1,
            ends_at,
            next_tick_at,
            applied_at: now,
            source,
        }
    }

    pub fn definition_id(&self) -> &str {
        &self.definition.id
    }

    /// Add one stack, capped at the definition's max
    pub(crate) fn add_stack(&mut self) -> bool {
        if self.stacks < self.definition.stack_cap() {
            self.stacks += 1;
            return true;
        }
        false
    }

    /// Start over as if freshly applied (single stack, fresh timers)
    pub(crate) fn reset(&mut self, source: Option<UnitId>, now: f64) {
        self.stacks = 1;
        self.applied_at = now;
        self.source = source;
        self.ends_at = self.definition.is_timed().then(|| now + self.definition.duration);
        self.next_tick_at = self.definition.ticks().then(|| now + self.definition.tick_interval);
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.ends_at.map_or(false, |ends_at| ends_at <= now)
    }

    /// Seconds left, None for permanent buffs
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.ends_at.map(|ends_at| (ends_at - now).max(0.0))
    }
}
