//! Trigger pass evaluation

use super::TriggerPass;
use crate::condition;
use crate::effect::EffectRequest;
use crate::unit::Unit;
use rand::Rng;

/// Evaluate every trigger entry of the pass's buff
///
/// An entry fires when its kind matches, a uniform roll lands at or below
/// its chance and its condition holds for (owner, target). Returns one
/// request per fired entry, in definition order.
pub fn run_pass<R: Rng + ?Sized>(
    pass: &TriggerPass,
    owner: &Unit,
    target: Option<&Unit>,
    rng: &mut R,
) -> Vec<EffectRequest> {
    let mut fired = Vec::new();
    for entry in &pass.definition.triggers {
        if entry.trigger != pass.kind || entry.chance <= 0.0 {
            continue;
        }
        // Certain entries don't consume a roll
        if entry.chance < 1.0 && rng.gen::<f64>() > entry.chance {
            continue;
        }
        if let Some(cond) = &entry.condition {
            if !condition::evaluate(cond, owner, target) {
                continue;
            }
        }
        fired.push(EffectRequest {
            owner: owner.id(),
            source: pass.source,
            target: target.map(|t| t.id()),
            buff: pass.definition.id.clone(),
            instance: pass.instance,
            stacks: pass.stacks,
            trigger: pass.kind,
            effects: entry.effects.clone(),
        });
    }
    if !fired.is_empty() {
        tracing::trace!(
            buff = %pass.definition.id,
            kind = ?pass.kind,
            fired = fired.len(),
            "trigger pass"
        );
    }
    fired
}
