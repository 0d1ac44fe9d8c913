use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

/// Externally authored skill data the combat core needs to gate a cast
///
/// What a skill actually does is opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Resource spent when the cast starts
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub resource: Option<ResourceKind>,
    /// Seconds
    #[serde(default)]
    pub cooldown: f64,
    /// Maximum distance to the target; zero or less means untargeted
    #[serde(default)]
    pub range: f64,
    #[serde(default)]
    pub cast_time: f64,
    #[serde(default)]
    pub channel_time: f64,
    /// Caster may keep moving while the cast is in progress
    #[serde(default)]
    pub move_while_casting: bool,
}

impl SkillDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        SkillDefinition {
            name: id.clone(),
            id,
            cost: 0.0,
            resource: None,
            cooldown: 0.0,
            range: 0.0,
            cast_time: 0.0,
            channel_time: 0.0,
            move_while_casting: false,
        }
    }

    pub fn with_cost(mut self, resource: ResourceKind, cost: f64) -> Self {
        self.resource = Some(resource);
        self.cost = cost;
        self
    }

    pub fn with_cooldown(mut self, cooldown: f64) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn with_cast_time(mut self, cast_time: f64, channel_time: f64) -> Self {
        self.cast_time = cast_time;
        self.channel_time = channel_time;
        self
    }

    pub fn with_move_while_casting(mut self, allowed: bool) -> Self {
        self.move_while_casting = allowed;
        self
    }

    /// Total time from cast start to completion
    pub fn total_cast_time(&self) -> f64 {
        self.cast_time.max(0.0) + self.channel_time.max(0.0)
    }

    pub fn is_instant(&self) -> bool {
        self.total_cast_time() <= 0.0
    }

    /// Casting this skill pins the caster in place
    pub fn locks_movement(&self) -> bool {
        !self.move_while_casting && !self.is_instant()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("skill id is empty".to_string());
        }
        if self.cost < 0.0 {
            return Err(format!("skill '{}' has negative cost", self.id));
        }
        if self.cost > 0.0 && self.resource.is_none() {
            return Err(format!("skill '{}' has a cost but no resource", self.id));
        }
        Ok(())
    }
}
