//! Hand-off of fired buff triggers to the skill/effect layer
//!
//! The combat core decides *when* a trigger fires. What its effects do is up
//! to an [`EffectExecutor`] supplied by the embedding game.

use crate::buff::BuffInstanceId;
use crate::unit::UnitId;
use content_core::{EffectSpec, TriggerKind};

/// One fired trigger entry
#[derive(Debug, Clone, PartialEq)]
pub struct EffectRequest {
    /// Unit carrying the buff
    pub owner: UnitId,
    /// Unit that applied the buff
    pub source: Option<UnitId>,
    /// Counterpart of the triggering event (attacker, victim, skill target)
    pub target: Option<UnitId>,
    pub buff: String,
    pub instance: BuffInstanceId,
    pub stacks: u32,
    pub trigger: TriggerKind,
    pub effects: Vec<EffectSpec>,
}

impl EffectRequest {
    /// Effect magnitude scaled by the stack count
    pub fn scaled_magnitude(&self, effect: &EffectSpec) -> f64 {
        effect.magnitude * self.stacks as f64
    }
}

/// Receiver of fired triggers
pub trait EffectExecutor {
    fn execute(&mut self, request: EffectRequest);
}

/// Executor that queues requests for the caller to drain after a tick
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    requests: Vec<EffectRequest>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<EffectRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl EffectExecutor for EffectQueue {
    fn execute(&mut self, request: EffectRequest) {
        self.requests.push(request);
    }
}

impl<F> EffectExecutor for F
where
    F: FnMut(EffectRequest),
{
    fn execute(&mut self, request: EffectRequest) {
        self(request)
    }
}
