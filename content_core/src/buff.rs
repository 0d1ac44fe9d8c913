//! Buff (status effect) definitions

use crate::attribute::{AttributeCatalog, AttributeKey};
use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a buff behaves when it is applied to a unit that already carries it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StackingRule {
    /// Every application is its own instance, up to `max_stacks` instances
    Independent,
    /// One instance; add a stack and reset the timers
    Refresh,
    /// One instance; add a stack and push the end time out by the full duration
    Extend,
    /// One instance; add a stack, leave the timers alone
    #[default]
    Stack,
}

/// Events that can fire a buff trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Apply,
    Tick,
    Expire,
    Hit,
    Damaged,
    SkillCast,
    Kill,
}

/// How a modifier combines with the base attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Added to the base value
    #[default]
    Flat,
    /// Percentage increase applied after all flat modifiers
    Increased,
}

/// Attribute contribution of a buff, scaled by its stack count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub key: AttributeKey,
    pub value_per_stack: f64,
    #[serde(default)]
    pub kind: ModifierKind,
}

/// An opaque effect reference handed to the effect executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub id: String,
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub params: HashMap<String, f64>,
}

impl EffectSpec {
    pub fn new(id: impl Into<String>, magnitude: f64) -> Self {
        EffectSpec {
            id: id.into(),
            magnitude,
            params: HashMap::new(),
        }
    }
}

/// A chance-gated, conditional hook on a buff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEntry {
    pub trigger: TriggerKind,
    /// Probability in 0.0..=1.0
    #[serde(default = "default_chance")]
    pub chance: f64,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

fn default_chance() -> f64 {
    1.0
}

/// Shared, content-owned description of a status effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stacking: StackingRule,
    /// Seconds; zero or less never expires
    #[serde(default)]
    pub duration: f64,
    /// Seconds between tick triggers; zero or less never ticks
    #[serde(default)]
    pub tick_interval: f64,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
    #[serde(default)]
    pub is_debuff: bool,
    /// Owner cannot move while this buff is active (root, stun)
    #[serde(default)]
    pub blocks_movement: bool,
    /// Owner cannot start casts while this buff is active (silence, stun)
    #[serde(default)]
    pub blocks_casting: bool,
    #[serde(default)]
    pub modifiers: Vec<AttributeModifier>,
    #[serde(default)]
    pub triggers: Vec<TriggerEntry>,
}

fn default_max_stacks() -> u32 {
    1
}

impl BuffDefinition {
    /// Create a definition with defaults for everything but the timing
    pub fn new(id: impl Into<String>, stacking: StackingRule, duration: f64) -> Self {
        let id = id.into();
        BuffDefinition {
            name: id.clone(),
            id,
            stacking,
            duration,
            tick_interval: 0.0,
            max_stacks: 1,
            is_debuff: false,
            blocks_movement: false,
            blocks_casting: false,
            modifiers: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_tick_interval(mut self, interval: f64) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_modifier(mut self, key: AttributeKey, value_per_stack: f64, kind: ModifierKind) -> Self {
        self.modifiers.push(AttributeModifier {
            key,
            value_per_stack,
            kind,
        });
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerEntry) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn is_timed(&self) -> bool {
        self.duration > 0.0
    }

    pub fn ticks(&self) -> bool {
        self.tick_interval > 0.0
    }

    /// Stack cap, never below one
    pub fn stack_cap(&self) -> u32 {
        self.max_stacks.max(1)
    }

    /// Whether any trigger listens for this kind of event
    pub fn has_trigger(&self, kind: TriggerKind) -> bool {
        self.triggers.iter().any(|t| t.trigger == kind)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("buff id is empty".to_string());
        }
        if self.max_stacks == 0 {
            return Err(format!("buff '{}' has max_stacks = 0", self.id));
        }
        for trigger in &self.triggers {
            if !(0.0..=1.0).contains(&trigger.chance) {
                return Err(format!(
                    "buff '{}' trigger {:?} chance {} outside 0.0..=1.0",
                    self.id, trigger.trigger, trigger.chance
                ));
            }
            if let Some(condition) = &trigger.condition {
                condition
                    .validate()
                    .map_err(|e| format!("buff '{}': {}", self.id, e))?;
            }
        }
        Ok(())
    }

    pub(crate) fn intern_keys(&mut self, catalog: &mut AttributeCatalog) {
        for modifier in &mut self.modifiers {
            catalog.canonicalize(&mut modifier.key);
        }
        for trigger in &mut self.triggers {
            if let Some(condition) = &mut trigger.condition {
                condition.intern_keys(catalog);
            }
        }
    }
}
