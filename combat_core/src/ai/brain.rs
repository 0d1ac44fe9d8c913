//! Decision making and per-state behaviour

use super::selector::select_skill;
use super::target::{self, CombatTarget};
use super::{AiState, SelectedSkill};
use crate::condition;
use crate::config::AiConstants;
use crate::unit::{MovementIntent, Unit, UnitId};
use crate::world::UnitRegistry;
use content_core::{AiProfile, ContentSet};
use rand::Rng;

/// A cast the AI wants the world to attempt
#[derive(Debug, Clone, PartialEq)]
pub struct CastRequest {
    pub skill: String,
    pub target: UnitId,
}

/// The outcome of one AI update, committed to the unit by the world
#[derive(Debug, Clone, PartialEq)]
pub struct AiPlan {
    pub state: AiState,
    pub target: Option<UnitId>,
    pub selected: Option<SelectedSkill>,
    pub next_decision_at: f64,
    pub intent: MovementIntent,
    pub cast: Option<CastRequest>,
}

/// Run one AI update for `unit`
///
/// Re-decides state, target and skill when the think interval has elapsed,
/// then runs the behaviour of the resulting state. Returns None for units
/// without AI.
pub fn think<R: Rng + ?Sized>(
    unit: &Unit,
    units: &UnitRegistry,
    content: &ContentSet,
    constants: &AiConstants,
    now: f64,
    rng: &mut R,
) -> Option<AiPlan> {
    let runtime = unit.ai()?;
    let profile = runtime.profile.clone();
    let mut plan = AiPlan {
        state: runtime.state,
        target: runtime.target,
        selected: runtime.selected.clone(),
        next_decision_at: runtime.next_decision_at,
        intent: unit.intent(),
        cast: None,
    };

    if !unit.is_alive() {
        plan.state = AiState::Idle;
        plan.target = None;
        plan.selected = None;
        plan.intent = MovementIntent::Halt;
        return Some(plan);
    }

    // A movement-locking cast pins the unit until it ends
    if unit.cast().map_or(false, |cast| cast.locks_movement) {
        plan.state = AiState::CastSkill;
        plan.intent = MovementIntent::Halt;
        return Some(plan);
    }

    let decided = now >= runtime.next_decision_at;
    if decided {
        decide(&mut plan, unit, &profile, units, now, rng);
        schedule(&mut plan, &profile, constants, now);
    }
    if behave(&mut plan, unit, &profile, units, content, now) == Fit::TooClose && !decided {
        // The selected skill's window no longer fits; pick again now
        decide(&mut plan, unit, &profile, units, now, rng);
        schedule(&mut plan, &profile, constants, now);
        behave(&mut plan, unit, &profile, units, content, now);
    }
    Some(plan)
}

/// Whether the target still sits inside the selected skill's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fit {
    Ok,
    TooClose,
}

fn schedule(plan: &mut AiPlan, profile: &AiProfile, constants: &AiConstants, now: f64) {
    let interval = if profile.think_interval > 0.0 {
        profile.think_interval
    } else {
        constants.default_think_interval
    };
    plan.next_decision_at = now + interval;
}

fn decide<R: Rng + ?Sized>(
    plan: &mut AiPlan,
    unit: &Unit,
    profile: &AiProfile,
    units: &UnitRegistry,
    now: f64,
    rng: &mut R,
) {
    let target = target::resolve(unit, units, plan.target)
        .or_else(|| target::acquire_nearest(unit, units, profile.aggro_range));
    let Some(target) = target else {
        plan.target = None;
        plan.selected = None;
        plan.state = AiState::Idle;
        return;
    };
    plan.target = Some(target.id);

    if profile.wants_retreat(unit.health().ratio()) {
        plan.selected = None;
        plan.state = AiState::Retreat;
        return;
    }

    let distance = target.distance_from(unit.position());
    if distance > profile.aggro_range {
        plan.target = None;
        plan.selected = None;
        plan.state = AiState::Idle;
        return;
    }

    let target_unit = units.get(target.id);
    let rule = select_skill(
        &profile.skill_rules,
        distance,
        unit.is_moving(),
        |skill| unit.cooldowns().is_ready(skill, now),
        |cond| condition::evaluate(cond, unit, target_unit),
        rng,
    );
    match rule {
        Some(rule) => {
            plan.selected = Some(SelectedSkill {
                skill: Some(rule.skill.clone()),
                min_range: rule.min_range,
                max_range: rule.max_range,
            });
            plan.state = AiState::Attack;
        }
        None => {
            plan.selected = Some(SelectedSkill {
                skill: profile.default_skill.clone(),
                min_range: 0.0,
                max_range: profile.attack_range,
            });
            plan.state = if distance <= profile.attack_range {
                AiState::Attack
            } else {
                AiState::Chase
            };
        }
    }

    tracing::debug!(
        unit = %unit.id(),
        target = %target.id,
        state = %plan.state,
        distance,
        skill = ?plan.selected.as_ref().and_then(|s| s.skill.as_deref()),
        "ai decision"
    );
}

fn behave(
    plan: &mut AiPlan,
    unit: &Unit,
    profile: &AiProfile,
    units: &UnitRegistry,
    content: &ContentSet,
    now: f64,
) -> Fit {
    let target = target::resolve(unit, units, plan.target);
    match plan.state {
        AiState::Idle => plan.intent = MovementIntent::Halt,
        AiState::Chase => return chase(plan, unit, profile, target, content, now),
        AiState::Attack => return attack(plan, unit, profile, target, content, now),
        AiState::CastSkill => {
            if !unit.is_casting() {
                plan.state = AiState::Attack;
                plan.intent = MovementIntent::Halt;
            }
        }
        AiState::Retreat => {
            if !profile.wants_retreat(unit.health().ratio()) {
                plan.state = AiState::Chase;
                return chase(plan, unit, profile, target, content, now);
            }
            plan.intent = match target {
                Some(target) => MovementIntent::MoveAway(target.position),
                None => MovementIntent::Halt,
            };
        }
    }
    Fit::Ok
}

fn window(plan: &AiPlan, profile: &AiProfile) -> SelectedSkill {
    plan.selected.clone().unwrap_or(SelectedSkill {
        skill: None,
        min_range: 0.0,
        max_range: profile.attack_range,
    })
}

fn lose_target(plan: &mut AiPlan) {
    plan.state = AiState::Idle;
    plan.target = None;
    plan.intent = MovementIntent::Halt;
}

fn chase(
    plan: &mut AiPlan,
    unit: &Unit,
    profile: &AiProfile,
    target: Option<CombatTarget>,
    content: &ContentSet,
    now: f64,
) -> Fit {
    let Some(target) = target else {
        lose_target(plan);
        return Fit::Ok;
    };
    if target.distance_from(unit.position()) <= window(plan, profile).max_range {
        plan.state = AiState::Attack;
        return attack(plan, unit, profile, Some(target), content, now);
    }
    plan.intent = MovementIntent::MoveToward(target.position);
    Fit::Ok
}

fn attack(
    plan: &mut AiPlan,
    unit: &Unit,
    profile: &AiProfile,
    target: Option<CombatTarget>,
    content: &ContentSet,
    now: f64,
) -> Fit {
    let Some(target) = target else {
        lose_target(plan);
        return Fit::Ok;
    };
    let distance = target.distance_from(unit.position());
    let selected = window(plan, profile);
    if distance > selected.max_range {
        plan.state = AiState::Chase;
        plan.intent = MovementIntent::MoveToward(target.position);
        return Fit::Ok;
    }
    if !selected.in_range(distance) {
        plan.intent = MovementIntent::Halt;
        return Fit::TooClose;
    }

    let skill = plan.selected.as_ref().and_then(|s| s.skill.clone());
    let mobile = skill
        .as_deref()
        .and_then(|id| content.skill(id))
        .map_or(false, |def| def.move_while_casting);
    if !mobile {
        plan.intent = MovementIntent::Halt;
    }

    if let Some(skill) = skill {
        if !unit.is_casting() && unit.cooldowns().is_ready(&skill, now) {
            plan.cast = Some(CastRequest {
                skill,
                target: target.id,
            });
        }
    }
    Fit::Ok
}
