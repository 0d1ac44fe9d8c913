//! AI profiles - decision tuning and weighted skill rules

use crate::attribute::AttributeCatalog;
use crate::condition::Condition;
use serde::{Deserialize, Serialize};

/// What movement state a skill rule requires of the caster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementRequirement {
    #[default]
    Any,
    /// Only while standing still
    Stationary,
    /// Only while moving
    Moving,
}

impl MovementRequirement {
    pub fn allows(&self, moving: bool) -> bool {
        match self {
            MovementRequirement::Any => true,
            MovementRequirement::Stationary => !moving,
            MovementRequirement::Moving => moving,
        }
    }
}

/// One weighted entry in an AI profile's skill list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRule {
    pub skill: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub min_range: f64,
    #[serde(default = "default_max_range")]
    pub max_range: f64,
    #[serde(default)]
    pub movement: MovementRequirement,
    #[serde(default)]
    pub condition: Option<Condition>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_max_range() -> f64 {
    f64::MAX
}

impl SkillRule {
    pub fn new(skill: impl Into<String>, weight: f64, min_range: f64, max_range: f64) -> Self {
        SkillRule {
            skill: skill.into(),
            weight,
            min_range,
            max_range,
            movement: MovementRequirement::Any,
            condition: None,
        }
    }

    pub fn with_movement(mut self, movement: MovementRequirement) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether the distance falls inside this rule's range window
    pub fn in_range(&self, distance: f64) -> bool {
        distance >= self.min_range && distance <= self.max_range
    }
}

/// Decision tuning for one kind of AI-controlled unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    pub id: String,
    /// Seconds between re-decisions
    #[serde(default = "default_think_interval")]
    pub think_interval: f64,
    #[serde(default = "default_aggro_range")]
    pub aggro_range: f64,
    /// Range of the basic action used when no skill rule qualifies
    #[serde(default = "default_attack_range")]
    pub attack_range: f64,
    /// Health ratio at or below which the unit retreats; None disables retreating
    #[serde(default)]
    pub retreat_threshold: Option<f64>,
    /// Skill cast as the basic action, if any
    #[serde(default)]
    pub default_skill: Option<String>,
    #[serde(default)]
    pub skill_rules: Vec<SkillRule>,
}

fn default_think_interval() -> f64 {
    0.25
}

fn default_aggro_range() -> f64 {
    10.0
}

fn default_attack_range() -> f64 {
    2.0
}

impl AiProfile {
    pub fn new(id: impl Into<String>) -> Self {
        AiProfile {
            id: id.into(),
            think_interval: default_think_interval(),
            aggro_range: default_aggro_range(),
            attack_range: default_attack_range(),
            retreat_threshold: None,
            default_skill: None,
            skill_rules: Vec::new(),
        }
    }

    pub fn with_ranges(mut self, aggro_range: f64, attack_range: f64) -> Self {
        self.aggro_range = aggro_range;
        self.attack_range = attack_range;
        self
    }

    pub fn with_think_interval(mut self, interval: f64) -> Self {
        self.think_interval = interval;
        self
    }

    pub fn with_retreat_threshold(mut self, threshold: f64) -> Self {
        self.retreat_threshold = Some(threshold);
        self
    }

    pub fn with_default_skill(mut self, skill: impl Into<String>) -> Self {
        self.default_skill = Some(skill.into());
        self
    }

    pub fn with_rule(mut self, rule: SkillRule) -> Self {
        self.skill_rules.push(rule);
        self
    }

    /// Whether a unit at this health ratio should be retreating
    pub fn wants_retreat(&self, health_ratio: f64) -> bool {
        self.retreat_threshold
            .map(|threshold| health_ratio <= threshold)
            .unwrap_or(false)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("ai profile id is empty".to_string());
        }
        if self.aggro_range < 0.0 || self.attack_range < 0.0 {
            return Err(format!("ai profile '{}' has a negative range", self.id));
        }
        for rule in &self.skill_rules {
            if rule.min_range > rule.max_range {
                return Err(format!(
                    "ai profile '{}' rule '{}' has min_range > max_range",
                    self.id, rule.skill
                ));
            }
            if let Some(condition) = &rule.condition {
                condition
                    .validate()
                    .map_err(|e| format!("ai profile '{}': {}", self.id, e))?;
            }
        }
        Ok(())
    }

    pub(crate) fn intern_keys(&mut self, catalog: &mut AttributeCatalog) {
        for rule in &mut self.skill_rules {
            if let Some(condition) = &mut rule.condition {
                condition.intern_keys(catalog);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile() {
        let toml = r#"
id = "goblin_shaman"
think_interval = 0.5
aggro_range = 12.0
attack_range = 1.5
retreat_threshold = 0.25
default_skill = "claw"

[[skill_rules]]
skill = "firebolt"
weight = 3.0
min_range = 4.0
max_range = 10.0
movement = "stationary"

[[skill_rules]]
skill = "hex"
condition = { type = "target_health_above", ratio = 0.5 }
"#;
        let profile: AiProfile = toml::from_str(toml).unwrap();
        assert_eq!(profile.skill_rules.len(), 2);
        assert_eq!(profile.skill_rules[0].movement, MovementRequirement::Stationary);
        assert!((profile.skill_rules[1].weight - 1.0).abs() < f64::EPSILON);
        assert!(profile.skill_rules[1].in_range(1_000.0));
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_wants_retreat() {
        let profile = AiProfile::new("coward").with_retreat_threshold(0.3);
        assert!(profile.wants_retreat(0.3));
        assert!(!profile.wants_retreat(0.31));
        assert!(!AiProfile::new("brave").wants_retreat(0.0));
    }

    #[test]
    fn test_movement_requirement() {
        assert!(MovementRequirement::Any.allows(true));
        assert!(MovementRequirement::Stationary.allows(false));
        assert!(!MovementRequirement::Stationary.allows(true));
        assert!(!MovementRequirement::Moving.allows(false));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let profile = AiProfile::new("broken").with_rule(SkillRule::new("zap", 1.0, 5.0, 2.0));
        assert!(profile.validate().is_err());
    }
}
