//! Unit composite - one combatant's complete state
//!
//! A [`Unit`] owns its attribute stores, health, resource pools, cooldowns,
//! buffs, cast and AI memory, and holds a handle to the shared [`EventBus`].
//! Every mutation publishes its change events; cross-subsystem reactions
//! (a max-health attribute change rescaling health, for example) happen here.

use crate::ai::{AiPlan, AiRuntime, AiState};
use crate::buff::{ApplyOutcome, BuffEngine, BuffInstance, BuffInstanceId};
use crate::combat::ActiveCast;
use crate::config::CombatConstants;
use crate::events::{CombatEvent, EventBus};
use crate::stats::{
    AttributeChange, AttributeStore, CooldownChange, CooldownTable, DamageOutcome, HealthChange, HealthState,
    ResourceChange, ResourceState, ShieldChange,
};
use content_core::{AttributeKey, BuffDefinition, ResourceKind, ResourceTemplate, SkillDefinition, UnitTemplate};
use glam::DVec2;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Generation-checked handle to a unit slot
///
/// A handle outlives its unit safely: once the slot is reused the old handle
/// no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId {
    index: u32,
    generation: u32,
}

impl UnitId {
    pub fn new(index: u32, generation: u32) -> Self {
        UnitId { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allegiance; units on different teams are hostile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Team(pub u32);

impl Team {
    pub fn is_hostile_to(&self, other: Team) -> bool {
        self.0 != other.0
    }
}

/// Where the unit wants to go, for the external locomotion layer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "point", rename_all = "snake_case")]
pub enum MovementIntent {
    #[default]
    Halt,
    MoveToward(DVec2),
    MoveAway(DVec2),
}

/// Everything needed to create a unit
#[derive(Debug, Clone, Default)]
pub struct UnitSpec {
    pub name: String,
    pub template: Option<String>,
    pub team: Team,
    pub position: DVec2,
    pub attributes: Vec<(AttributeKey, f64)>,
    pub resources: Vec<ResourceTemplate>,
    pub skills: Vec<String>,
    pub ai_profile: Option<String>,
    /// Applied once on spawn
    pub buffs: Vec<String>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>) -> Self {
        UnitSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_template(template: &UnitTemplate) -> Self {
        UnitSpec {
            name: template.name.clone(),
            template: Some(template.id.clone()),
            team: Team::default(),
            position: DVec2::ZERO,
            attributes: template
                .attributes
                .iter()
                .map(|(key, value)| (key.clone(), *value))
                .collect(),
            resources: template.resources.clone(),
            skills: template.skills.clone(),
            ai_profile: template.ai_profile.clone(),
            buffs: template.innate_buffs.clone(),
        }
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    pub fn at(mut self, position: DVec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_attribute(mut self, key: AttributeKey, value: f64) -> Self {
        self.attributes.push((key, value));
        self
    }

    pub fn with_resource(mut self, resource: ResourceTemplate) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    pub fn with_ai_profile(mut self, profile: impl Into<String>) -> Self {
        self.ai_profile = Some(profile.into());
        self
    }

    pub fn with_buff(mut self, buff: impl Into<String>) -> Self {
        self.buffs.push(buff.into());
        self
    }
}

/// One combatant
pub struct Unit {
    id: UnitId,
    name: String,
    template: Option<String>,
    team: Team,
    position: DVec2,
    moving: bool,
    intent: MovementIntent,
    /// Content values plus external writes
    base: AttributeStore,
    /// Base with buff modifiers applied
    effective: AttributeStore,
    health: HealthState,
    resources: Vec<ResourceState>,
    cooldowns: CooldownTable,
    buffs: BuffEngine,
    skills: HashSet<String>,
    cast: Option<ActiveCast>,
    ai: Option<AiRuntime>,
    bus: EventBus,
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("team", &self.team)
            .field("health", &self.health.current())
            .field("buffs", &self.buffs.len())
            .field("casting", &self.cast.as_ref().map(|c| c.skill_id()))
            .field("ai", &self.ai.as_ref().map(|ai| ai.state()))
            .finish()
    }
}

impl Unit {
    /// Build a unit at full health and full (or empty) resource pools
    ///
    /// Nothing is published; the world announces the spawn.
    pub fn new(id: UnitId, spec: UnitSpec, constants: &CombatConstants, bus: EventBus) -> Self {
        let mut base = AttributeStore::new(constants.attributes.epsilon);
        for (key, value) in &spec.attributes {
            base.set(key, *value);
        }
        let effective = base.clone();

        let health = HealthState::from_attributes(
            &effective,
            AttributeKey::new(&constants.health.max_attribute),
            Some(AttributeKey::new(&constants.health.regen_attribute)),
            constants.health.default_max,
            constants.health.clamp_to_max,
        );
        let resources = spec
            .resources
            .iter()
            .map(|template| {
                ResourceState::from_attributes(
                    template.kind,
                    &effective,
                    template.max_attribute.clone(),
                    template.regen_attribute.clone(),
                    template.start_full,
                )
            })
            .collect();

        Unit {
            id,
            name: spec.name,
            template: spec.template,
            team: spec.team,
            position: spec.position,
            moving: false,
            intent: MovementIntent::Halt,
            base,
            effective,
            health,
            resources,
            cooldowns: CooldownTable::new(),
            buffs: BuffEngine::new(),
            skills: spec.skills.into_iter().collect(),
            cast: None,
            ai: None,
            bus,
        }
    }

    fn emit(&self, event: CombatEvent) {
        self.bus.publish(&event);
    }

    // Identity and placement

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template id the unit was spawned from
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn set_team(&mut self, team: Team) {
        self.team = team;
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }

    pub fn distance_to(&self, other: &Unit) -> f64 {
        self.position.distance(other.position)
    }

    /// Reported by the locomotion layer
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    /// Store a movement intent; units that cannot move always halt
    pub fn set_intent(&mut self, intent: MovementIntent) {
        self.intent = if self.can_move() {
            intent
        } else {
            MovementIntent::Halt
        };
    }

    /// Alive, not rooted by a buff and not locked by a cast
    pub fn can_move(&self) -> bool {
        self.is_alive()
            && !self.buffs.blocks_movement()
            && !self.cast.as_ref().map_or(false, |cast| cast.locks_movement)
    }

    // Attributes

    pub fn base_attributes(&self) -> &AttributeStore {
        &self.base
    }

    /// Attributes after buff modifiers
    pub fn attributes(&self) -> &AttributeStore {
        &self.effective
    }

    /// Effective value, 0.0 when absent
    pub fn attribute(&self, key: &AttributeKey) -> f64 {
        self.effective.get(key, 0.0)
    }

    /// Write a base attribute and refresh effective values
    pub fn set_attribute(&mut self, key: &AttributeKey, value: f64) -> bool {
        if self.base.set(key, value).is_none() {
            return false;
        }
        self.refresh_attributes();
        true
    }

    pub fn modify_attribute(&mut self, key: &AttributeKey, delta: f64) -> bool {
        if self.base.modify(key, delta).is_none() {
            return false;
        }
        self.refresh_attributes();
        true
    }

    /// Recompute effective attributes from base values and buff modifiers
    ///
    /// Returns the number of attributes whose effective value changed.
    pub fn refresh_attributes(&mut self) -> usize {
        let totals = self.buffs.modifier_totals();
        let mut keys: BTreeSet<AttributeKey> = self.base.keys().cloned().collect();
        keys.extend(totals.keys().cloned());
        keys.extend(self.effective.keys().cloned());

        let mut changed = 0;
        for key in keys {
            let base = self.base.try_get(&key);
            let change = match (base, totals.get(&key)) {
                (_, Some(totals)) => {
                    let base = base.unwrap_or_else(|| self.implicit_base(&key));
                    self.effective.set(&key, totals.apply(base))
                }
                (Some(base), None) => self.effective.set(&key, base),
                // Neither written nor modified; readers fall back to their defaults
                (None, None) => self.effective.remove(&key),
            };
            if let Some(change) = change {
                changed += 1;
                self.on_attribute_changed(change);
            }
        }
        changed
    }

    /// What a modifier builds on when the unit never set the attribute
    fn implicit_base(&self, key: &AttributeKey) -> f64 {
        if key == self.health.max_key() {
            self.health.default_max()
        } else {
            0.0
        }
    }

    fn on_attribute_changed(&mut self, change: AttributeChange) {
        let key = change.key.clone();
        self.emit(CombatEvent::AttributeChanged {
            unit: self.id,
            key: change.key,
            old: change.old,
            new: change.new,
        });

        if key == *self.health.max_key() {
            if let Some(health) = self.health.refresh_max(&self.effective, true) {
                self.publish_health(health);
            }
        }
        let mut pools = Vec::new();
        for pool in &mut self.resources {
            if *pool.max_key() == key {
                pools.extend(pool.refresh_max(&self.effective, true));
            }
        }
        for pool in pools {
            self.publish_resource(pool);
        }
    }

    // Health and shields

    pub fn health(&self) -> &HealthState {
        &self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    fn publish_health(&self, change: HealthChange) {
        if change.died {
            tracing::debug!(unit = %self.id, name = %self.name, "unit died");
            self.emit(CombatEvent::UnitDied { unit: self.id });
        }
        self.emit(CombatEvent::HealthChanged {
            unit: self.id,
            old: change.old,
            new: change.new,
            alive: change.alive,
        });
    }

    fn publish_shield(&self, change: ShieldChange) {
        self.emit(CombatEvent::ShieldChanged {
            unit: self.id,
            old: change.old,
            new: change.new,
        });
    }

    /// Shields first, then health. A killing blow interrupts any cast.
    pub fn apply_damage(&mut self, amount: f64, now: f64) -> DamageOutcome {
        let outcome = self.health.apply_damage(amount);
        if let Some(shield) = outcome.shield {
            self.publish_shield(shield);
        }
        if let Some(health) = outcome.health {
            self.publish_health(health);
        }
        if outcome.died() {
            self.interrupt_cast(now);
        }
        outcome
    }

    pub fn heal(&mut self, amount: f64) -> Option<HealthChange> {
        let change = self.health.heal(amount)?;
        self.publish_health(change);
        Some(change)
    }

    pub fn apply_shield(&mut self, amount: f64, duration: f64, now: f64) -> Option<ShieldChange> {
        let change = self.health.apply_shield(amount, duration, now)?;
        self.publish_shield(change);
        Some(change)
    }

    pub fn clear_shields(&mut self) -> Option<ShieldChange> {
        let change = self.health.clear_shields()?;
        self.publish_shield(change);
        Some(change)
    }

    pub fn revive(&mut self, ratio: f64) -> Option<HealthChange> {
        let change = self.health.revive(ratio)?;
        tracing::debug!(unit = %self.id, health = change.new, "unit revived");
        self.publish_health(change);
        Some(change)
    }

    // Resources

    pub fn resources(&self) -> &[ResourceState] {
        &self.resources
    }

    pub fn resource(&self, kind: ResourceKind) -> Option<&ResourceState> {
        self.resources.iter().find(|pool| pool.kind() == kind)
    }

    fn resource_mut(&mut self, kind: ResourceKind) -> Option<&mut ResourceState> {
        self.resources.iter_mut().find(|pool| pool.kind() == kind)
    }

    fn publish_resource(&self, change: ResourceChange) {
        self.emit(CombatEvent::ResourceChanged {
            unit: self.id,
            resource: change.kind,
            old: change.old,
            new: change.new,
        });
    }

    /// Missing pools can only "afford" free costs
    pub fn can_spend(&self, kind: ResourceKind, amount: f64) -> bool {
        self.resource(kind)
            .map_or(amount <= 0.0, |pool| pool.can_spend(amount))
    }

    pub fn spend_resource(&mut self, kind: ResourceKind, amount: f64) -> bool {
        let Some(pool) = self.resource_mut(kind) else {
            return amount <= 0.0;
        };
        let (spent, change) = pool.spend(amount);
        if let Some(change) = change {
            self.publish_resource(change);
        }
        spent
    }

    pub fn restore_resource(&mut self, kind: ResourceKind, amount: f64) -> Option<ResourceChange> {
        let change = self.resource_mut(kind)?.restore(amount)?;
        self.publish_resource(change);
        Some(change)
    }

    // Cooldowns and skills

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    fn publish_cooldown(&self, change: CooldownChange) {
        self.emit(CombatEvent::CooldownChanged {
            unit: self.id,
            skill: change.skill,
            remaining: change.remaining,
            duration: change.duration,
            active: change.active,
        });
    }

    pub fn start_cooldown(&mut self, skill: &str, duration: f64, now: f64) {
        for change in self.cooldowns.start(skill, duration, now) {
            self.publish_cooldown(change);
        }
    }

    pub fn clear_cooldown(&mut self, skill: &str) -> bool {
        match self.cooldowns.clear(skill) {
            Some(change) => {
                self.publish_cooldown(change);
                true
            }
            None => false,
        }
    }

    pub fn knows_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    pub fn learn_skill(&mut self, skill: impl Into<String>) {
        self.skills.insert(skill.into());
    }

    /// Learned skills, sorted
    pub fn skills(&self) -> Vec<&str> {
        let mut skills: Vec<&str> = self.skills.iter().map(String::as_str).collect();
        skills.sort_unstable();
        skills
    }

    // Casting

    pub fn cast(&self) -> Option<&ActiveCast> {
        self.cast.as_ref()
    }

    pub fn is_casting(&self) -> bool {
        self.cast.is_some()
    }

    fn cast_event(&self, skill: &SkillDefinition, phase: CastPhase) -> CombatEvent {
        let unit = self.id;
        let skill_id = skill.id.clone();
        let (cast_time, channel_time) = (skill.cast_time, skill.channel_time);
        match phase {
            CastPhase::Started => CombatEvent::CastStarted {
                unit,
                skill: skill_id,
                cast_time,
                channel_time,
            },
            CastPhase::Completed => CombatEvent::CastCompleted {
                unit,
                skill: skill_id,
                cast_time,
                channel_time,
            },
            CastPhase::Interrupted => CombatEvent::CastInterrupted {
                unit,
                skill: skill_id,
                cast_time,
                channel_time,
            },
        }
    }

    /// Pay for and begin a cast; preconditions are checked by the world
    ///
    /// Zero-time skills complete immediately. Returns whether the unit is now
    /// casting.
    pub(crate) fn start_cast(&mut self, skill: Arc<SkillDefinition>, target: Option<UnitId>, now: f64) -> bool {
        if let Some(kind) = skill.resource {
            let paid = self.spend_resource(kind, skill.cost);
            debug_assert!(paid, "cast of '{}' started without enough {}", skill.id, kind);
        }
        if skill.cooldown > 0.0 {
            self.start_cooldown(&skill.id, skill.cooldown, now);
        }
        tracing::debug!(unit = %self.id, skill = %skill.id, "cast started");
        self.emit(self.cast_event(&skill, CastPhase::Started));

        let cast = ActiveCast::new(skill, target, now);
        if cast.is_due(now) {
            self.emit(self.cast_event(&cast.skill, CastPhase::Completed));
            return false;
        }
        self.cast = Some(cast);
        true
    }

    /// Finish the current cast once its cast and channel time have elapsed
    pub fn complete_cast_if_due(&mut self, now: f64) -> Option<ActiveCast> {
        if !self.cast.as_ref().map_or(false, |cast| cast.is_due(now)) {
            return None;
        }
        let cast = self.cast.take()?;
        tracing::debug!(unit = %self.id, skill = %cast.skill_id(), "cast completed");
        self.emit(self.cast_event(&cast.skill, CastPhase::Completed));
        Some(cast)
    }

    /// Cancel the current cast; an AI stuck in `CastSkill` returns to `Attack`
    /// and re-decides immediately
    pub fn interrupt_cast(&mut self, now: f64) -> bool {
        let Some(cast) = self.cast.take() else {
            return false;
        };
        tracing::debug!(unit = %self.id, skill = %cast.skill_id(), "cast interrupted");
        self.emit(self.cast_event(&cast.skill, CastPhase::Interrupted));
        if self.ai_state() == Some(AiState::CastSkill) {
            self.set_ai_state(AiState::Attack);
            if let Some(ai) = &mut self.ai {
                ai.next_decision_at = now;
            }
        }
        true
    }

    // Buffs

    pub fn buffs(&self) -> &BuffEngine {
        &self.buffs
    }

    pub(crate) fn buffs_mut(&mut self) -> &mut BuffEngine {
        &mut self.buffs
    }

    /// Apply a buff and refresh attributes; trigger passes are the caller's job
    pub fn apply_buff(&mut self, definition: Arc<BuffDefinition>, source: Option<UnitId>, now: f64) -> ApplyOutcome {
        let buff_id = definition.id.clone();
        let outcome = self.buffs.apply(definition, source, now);
        tracing::debug!(
            unit = %self.id,
            buff = %buff_id,
            stacks = outcome.stacks,
            created = outcome.created,
            "buff applied"
        );
        self.refresh_attributes();
        self.notify_buffs_changed();
        outcome
    }

    /// Remove instances and refresh attributes; trigger passes are the caller's job
    pub fn remove_buffs(&mut self, ids: &[BuffInstanceId]) -> Vec<BuffInstance> {
        let removed = self.buffs.remove(ids);
        if removed.is_empty() {
            return removed;
        }
        for instance in &removed {
            tracing::debug!(unit = %self.id, buff = %instance.definition_id(), "buff removed");
        }
        self.refresh_attributes();
        self.notify_buffs_changed();
        removed
    }

    pub fn notify_buffs_changed(&self) {
        self.emit(CombatEvent::BuffsChanged { unit: self.id });
    }

    // Per-tick upkeep

    /// Regeneration and sweeps of shields and cooldowns
    pub fn tick_vitals(&mut self, dt: f64, now: f64) {
        if let Some(shield) = self.health.sweep_shields(now) {
            self.publish_shield(shield);
        }
        if let Some(health) = self.health.regenerate(&self.effective, dt) {
            self.publish_health(health);
        }
        let mut pools = Vec::new();
        for pool in &mut self.resources {
            pools.extend(pool.regenerate(&self.effective, dt));
        }
        for pool in pools {
            self.publish_resource(pool);
        }
        for change in self.cooldowns.sweep(now) {
            self.publish_cooldown(change);
        }
    }

    // AI

    pub fn ai(&self) -> Option<&AiRuntime> {
        self.ai.as_ref()
    }

    pub fn ai_state(&self) -> Option<AiState> {
        self.ai.as_ref().map(|ai| ai.state)
    }

    pub(crate) fn set_ai(&mut self, runtime: Option<AiRuntime>) {
        if let Some(old) = self.ai.as_ref().map(|ai| ai.state) {
            if old != AiState::Idle {
                self.emit(CombatEvent::AiStateChanged {
                    unit: self.id,
                    from: old,
                    to: AiState::Idle,
                });
            }
        }
        self.ai = runtime;
    }

    pub(crate) fn set_ai_state(&mut self, state: AiState) {
        let Some(ai) = &mut self.ai else {
            return;
        };
        let from = ai.state;
        if from == state {
            return;
        }
        ai.state = state;
        tracing::debug!(unit = %self.id, %from, to = %state, "ai state changed");
        self.emit(CombatEvent::AiStateChanged {
            unit: self.id,
            from,
            to: state,
        });
    }

    /// Commit an AI update
    pub(crate) fn apply_ai_plan(&mut self, plan: &AiPlan) {
        if let Some(ai) = &mut self.ai {
            ai.target = plan.target;
            ai.selected = plan.selected.clone();
            ai.next_decision_at = plan.next_decision_at;
        }
        self.set_ai_state(plan.state);
        self.set_intent(plan.intent);
    }
}

#[derive(Clone, Copy)]
enum CastPhase {
    Started,
    Completed,
    Interrupted,
}
