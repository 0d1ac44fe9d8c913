//! The combat world - units, content, time and randomness in one place
//!
//! All cross-unit interaction goes through [`World`] methods: damage with its
//! hit/kill triggers, buff application, casting, AI and the per-tick pipeline
//! in [`World::tick`].

mod registry;
mod tick;

pub use registry::UnitRegistry;

use crate::ai::{AiRuntime, AiState};
use crate::buff::{run_pass, ApplyOutcome, BuffInstanceId, TriggerPass};
use crate::clock::SimClock;
use crate::config::CombatConstants;
use crate::effect::{EffectExecutor, EffectQueue};
use crate::error::{CastError, SpawnError};
use crate::events::{CombatEvent, EventBus};
use crate::stats::{DamageOutcome, HealthChange, ResourceChange, ShieldChange};
use crate::unit::{Team, Unit, UnitId, UnitSpec};
use content_core::{AiProfile, AttributeKey, BuffDefinition, ContentSet, ResourceKind, TriggerKind};
use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Owner of every unit and the shared simulation services
pub struct World<E: EffectExecutor = EffectQueue> {
    units: UnitRegistry,
    bus: EventBus,
    content: Arc<ContentSet>,
    constants: CombatConstants,
    clock: SimClock,
    rng: ChaCha8Rng,
    executor: E,
}

impl World<EffectQueue> {
    /// A world whose fired triggers are queued for the caller
    pub fn new(content: Arc<ContentSet>, constants: CombatConstants, seed: u64) -> Self {
        Self::with_executor(content, constants, seed, EffectQueue::new())
    }
}

impl<E: EffectExecutor> World<E> {
    pub fn with_executor(content: Arc<ContentSet>, constants: CombatConstants, seed: u64, executor: E) -> Self {
        World {
            units: UnitRegistry::new(),
            bus: EventBus::new(),
            content,
            constants,
            clock: SimClock::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            executor,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn content(&self) -> &Arc<ContentSet> {
        &self.content
    }

    pub fn constants(&self) -> &CombatConstants {
        &self.constants
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id)
    }

    // Lifecycle

    /// Create a unit, apply its innate buffs and attach its AI
    ///
    /// Every content reference is checked first; on error nothing is created.
    pub fn spawn(&mut self, mut spec: UnitSpec) -> Result<UnitId, SpawnError> {
        for skill in &spec.skills {
            if self.content.skill(skill).is_none() {
                return Err(SpawnError::UnknownSkill(skill.clone()));
            }
        }
        let buffs = spec
            .buffs
            .iter()
            .map(|id| {
                self.content
                    .buff(id)
                    .cloned()
                    .ok_or_else(|| SpawnError::UnknownBuff(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let profile = match &spec.ai_profile {
            Some(id) => Some(
                self.content
                    .ai_profile(id)
                    .cloned()
                    .ok_or_else(|| SpawnError::UnknownAiProfile(id.clone()))?,
            ),
            None => None,
        };

        // Share the content set's interned keys
        for (key, _) in &mut spec.attributes {
            if let Some(interned) = self.content.attributes().get(key.as_str()) {
                *key = interned.clone();
            }
        }

        let now = self.clock.now();
        let bus = self.bus.clone();
        let constants = &self.constants;
        let id = self.units.insert_with(|id| Unit::new(id, spec, constants, bus));
        if let Some(unit) = self.units.get(id) {
            tracing::debug!(unit = %id, name = %unit.name(), "unit spawned");
        }
        self.bus.publish(&CombatEvent::UnitSpawned { unit: id });

        for buff in buffs {
            self.apply_buff_definition(id, buff, None);
        }
        if let Some(profile) = profile {
            self.attach_ai(id, profile, now);
        }
        Ok(id)
    }

    /// Spawn a unit from a content template
    pub fn spawn_from_template(&mut self, template: &str, team: Team, position: DVec2) -> Result<UnitId, SpawnError> {
        let template = self
            .content
            .unit(template)
            .ok_or_else(|| SpawnError::UnknownTemplate(template.to_string()))?;
        let spec = UnitSpec::from_template(template).with_team(team).at(position);
        self.spawn(spec)
    }

    /// Remove a unit; its unit-scoped subscriptions go with it
    pub fn despawn(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(id)?;
        tracing::debug!(unit = %id, name = %unit.name(), "unit despawned");
        self.bus.publish(&CombatEvent::UnitDespawned { unit: id });
        self.bus.unsubscribe_unit(id);
        Some(unit)
    }

    // Attributes, health, resources, cooldowns

    pub fn set_attribute(&mut self, id: UnitId, key: &AttributeKey, value: f64) -> bool {
        self.units
            .get_mut(id)
            .map_or(false, |unit| unit.set_attribute(key, value))
    }

    pub fn modify_attribute(&mut self, id: UnitId, key: &AttributeKey, delta: f64) -> bool {
        self.units
            .get_mut(id)
            .map_or(false, |unit| unit.modify_attribute(key, delta))
    }

    /// Damage a unit, firing on-damaged triggers on the victim and on-kill
    /// triggers on the source when the blow is lethal
    pub fn apply_damage(&mut self, target: UnitId, amount: f64, source: Option<UnitId>) -> Option<DamageOutcome> {
        let now = self.clock.now();
        let outcome = self.units.get_mut(target)?.apply_damage(amount, now);
        if outcome.absorbed + outcome.dealt > 0.0 {
            self.fire_triggers(target, TriggerKind::Damaged, source);
        }
        if outcome.died() {
            if let Some(source) = source {
                self.fire_triggers(source, TriggerKind::Kill, Some(target));
            }
        }
        Some(outcome)
    }

    /// Report that `attacker` landed a hit on `victim`; fires on-hit triggers
    pub fn notify_hit(&mut self, attacker: UnitId, victim: UnitId) -> usize {
        self.fire_triggers(attacker, TriggerKind::Hit, Some(victim))
    }

    pub fn heal(&mut self, id: UnitId, amount: f64) -> Option<HealthChange> {
        self.units.get_mut(id)?.heal(amount)
    }

    pub fn apply_shield(&mut self, id: UnitId, amount: f64, duration: f64) -> Option<ShieldChange> {
        let now = self.clock.now();
        self.units.get_mut(id)?.apply_shield(amount, duration, now)
    }

    pub fn revive(&mut self, id: UnitId, ratio: f64) -> Option<HealthChange> {
        self.units.get_mut(id)?.revive(ratio)
    }

    pub fn spend_resource(&mut self, id: UnitId, kind: ResourceKind, amount: f64) -> bool {
        self.units
            .get_mut(id)
            .map_or(false, |unit| unit.spend_resource(kind, amount))
    }

    pub fn restore_resource(&mut self, id: UnitId, kind: ResourceKind, amount: f64) -> Option<ResourceChange> {
        self.units.get_mut(id)?.restore_resource(kind, amount)
    }

    pub fn start_cooldown(&mut self, id: UnitId, skill: &str, duration: f64) -> bool {
        let now = self.clock.now();
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        unit.start_cooldown(skill, duration, now);
        true
    }

    pub fn clear_cooldown(&mut self, id: UnitId, skill: &str) -> bool {
        self.units
            .get_mut(id)
            .map_or(false, |unit| unit.clear_cooldown(skill))
    }

    // Buffs

    /// Apply a buff by content id
    pub fn apply_buff(&mut self, target: UnitId, buff: &str, source: Option<UnitId>) -> Option<ApplyOutcome> {
        let Some(definition) = self.content.buff(buff).cloned() else {
            tracing::warn!(buff, "apply of unknown buff ignored");
            return None;
        };
        self.apply_buff_definition(target, definition, source)
    }

    /// Apply a buff definition and run its on-apply pass; dead units are skipped
    pub fn apply_buff_definition(
        &mut self,
        target: UnitId,
        definition: Arc<BuffDefinition>,
        source: Option<UnitId>,
    ) -> Option<ApplyOutcome> {
        let now = self.clock.now();
        let unit = self.units.get_mut(target)?;
        if !unit.is_alive() {
            return None;
        }
        let outcome = unit.apply_buff(definition, source, now);
        let pass = unit.buffs().pass_for(outcome.instance, TriggerKind::Apply);
        if let Some(pass) = pass {
            self.run_periodic_passes(target, vec![pass]);
        }
        Some(outcome)
    }

    /// Remove every instance of a buff, running on-expire passes first
    pub fn remove_buff(&mut self, target: UnitId, buff: &str) -> usize {
        let Some(unit) = self.units.get(target) else {
            return 0;
        };
        let ids = unit.buffs().instances_of(buff);
        self.expire_instances(target, &ids)
    }

    pub fn remove_buff_instance(&mut self, target: UnitId, instance: BuffInstanceId) -> bool {
        self.expire_instances(target, &[instance]) == 1
    }

    /// Run the on-expire pass of each instance, then remove them together
    fn expire_instances(&mut self, target: UnitId, ids: &[BuffInstanceId]) -> usize {
        let Some(unit) = self.units.get(target) else {
            return 0;
        };
        let passes: Vec<TriggerPass> = ids
            .iter()
            .filter_map(|id| unit.buffs().pass_for(*id, TriggerKind::Expire))
            .collect();
        if passes.is_empty() {
            return 0;
        }
        self.run_periodic_passes(target, passes);
        self.units
            .get_mut(target)
            .map_or(0, |unit| unit.remove_buffs(ids).len())
    }

    /// Run `kind` passes for every buff on `unit` against `counterpart`
    ///
    /// Returns the number of effect requests dispatched.
    pub fn fire_triggers(&mut self, unit: UnitId, kind: TriggerKind, counterpart: Option<UnitId>) -> usize {
        let Some(owner) = self.units.get(unit) else {
            return 0;
        };
        let passes = owner.buffs().passes(kind);
        let target = counterpart.and_then(|id| self.units.get(id));
        let mut dispatched = 0;
        for pass in &passes {
            for request in run_pass(pass, owner, target, &mut self.rng) {
                self.executor.execute(request);
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Apply, tick and expire passes target the unit that applied the buff
    fn run_periodic_passes(&mut self, unit: UnitId, passes: Vec<TriggerPass>) -> usize {
        let Some(owner) = self.units.get(unit) else {
            return 0;
        };
        let mut dispatched = 0;
        for pass in &passes {
            let target = pass.source.and_then(|id| self.units.get(id));
            for request in run_pass(pass, owner, target, &mut self.rng) {
                self.executor.execute(request);
                dispatched += 1;
            }
        }
        dispatched
    }

    // Casting

    /// Start a cast after checking every precondition
    ///
    /// On success the cost is paid, the cooldown started, `CastStarted`
    /// published and the caster's on-skill-cast triggers run. On error nothing
    /// changes.
    pub fn begin_cast(&mut self, caster: UnitId, skill: &str, target: Option<UnitId>) -> Result<(), CastError> {
        let now = self.clock.now();
        let unit = self.units.get(caster).ok_or(CastError::UnknownUnit(caster))?;
        if !unit.is_alive() {
            return Err(CastError::Dead);
        }
        if let Some(cast) = unit.cast() {
            return Err(CastError::AlreadyCasting(cast.skill_id().to_string()));
        }
        let definition = self
            .content
            .skill(skill)
            .cloned()
            .ok_or_else(|| CastError::UnknownSkill(skill.to_string()))?;
        if !unit.knows_skill(skill) {
            return Err(CastError::NotLearned(skill.to_string()));
        }
        if unit.buffs().blocks_casting() {
            return Err(CastError::Silenced);
        }
        if !unit.cooldowns().is_ready(skill, now) {
            return Err(CastError::OnCooldown {
                skill: skill.to_string(),
                remaining: unit.cooldowns().remaining(skill, now),
            });
        }
        if let Some(resource) = definition.resource {
            if !unit.can_spend(resource, definition.cost) {
                return Err(CastError::InsufficientResource {
                    resource,
                    cost: definition.cost,
                });
            }
        }
        if let Some(target_id) = target {
            let target_unit = self
                .units
                .get(target_id)
                .filter(|t| t.is_alive())
                .ok_or(CastError::InvalidTarget)?;
            if definition.range > 0.0 {
                let distance = unit.distance_to(target_unit);
                if distance > definition.range + self.constants.casting.range_tolerance {
                    return Err(CastError::OutOfRange {
                        distance,
                        range: definition.range,
                    });
                }
            }
        }

        if let Some(unit) = self.units.get_mut(caster) {
            unit.start_cast(definition, target, now);
        }
        self.fire_triggers(caster, TriggerKind::SkillCast, target);
        Ok(())
    }

    pub fn interrupt_cast(&mut self, id: UnitId) -> bool {
        let now = self.clock.now();
        self.units
            .get_mut(id)
            .map_or(false, |unit| unit.interrupt_cast(now))
    }

    // AI and movement

    fn attach_ai(&mut self, id: UnitId, profile: Arc<AiProfile>, now: f64) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        for rule in &profile.skill_rules {
            unit.learn_skill(rule.skill.clone());
        }
        if let Some(skill) = &profile.default_skill {
            unit.learn_skill(skill.clone());
        }
        unit.set_ai(Some(AiRuntime::new(profile, now)));
    }

    /// Give a unit AI control (or swap its profile); it starts idle
    pub fn set_ai_profile(&mut self, id: UnitId, profile: &str) -> Result<(), SpawnError> {
        let definition = self
            .content
            .ai_profile(profile)
            .cloned()
            .ok_or_else(|| SpawnError::UnknownAiProfile(profile.to_string()))?;
        if !self.units.contains(id) {
            return Err(SpawnError::UnknownUnit(id));
        }
        let now = self.clock.now();
        self.attach_ai(id, definition, now);
        Ok(())
    }

    /// Return a unit to external control
    pub fn clear_ai(&mut self, id: UnitId) -> bool {
        match self.units.get_mut(id) {
            Some(unit) if unit.ai().is_some() => {
                unit.set_ai(None);
                true
            }
            _ => false,
        }
    }

    pub fn set_position(&mut self, id: UnitId, position: DVec2) -> bool {
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        unit.set_position(position);
        true
    }

    pub fn set_moving(&mut self, id: UnitId, moving: bool) -> bool {
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        unit.set_moving(moving);
        true
    }

    /// Run one AI update and carry out the cast it asks for
    fn update_ai(&mut self, id: UnitId, now: f64) {
        let plan = {
            let Some(unit) = self.units.get(id) else {
                return;
            };
            crate::ai::think(unit, &self.units, &self.content, &self.constants.ai, now, &mut self.rng)
        };
        let Some(plan) = plan else {
            return;
        };
        if let Some(unit) = self.units.get_mut(id) {
            unit.apply_ai_plan(&plan);
        }

        let Some(request) = plan.cast else {
            return;
        };
        match self.begin_cast(id, &request.skill, Some(request.target)) {
            Ok(()) => {
                if let Some(unit) = self.units.get_mut(id) {
                    if unit.is_casting() {
                        unit.set_ai_state(AiState::CastSkill);
                    }
                }
            }
            Err(CastError::OutOfRange { .. }) => {
                if let Some(unit) = self.units.get_mut(id) {
                    unit.set_ai_state(AiState::Chase);
                }
            }
            Err(error) => {
                tracing::debug!(unit = %id, skill = %request.skill, %error, "ai cast rejected");
            }
        }
    }
}
