//! In-progress skill casts

use crate::unit::UnitId;
use content_core::SkillDefinition;
use std::sync::Arc;

/// A skill being cast or channelled
#[derive(Debug, Clone)]
pub struct ActiveCast {
    pub skill: Arc<SkillDefinition>,
    pub target: Option<UnitId>,
    pub started_at: f64,
    /// End of the cast phase; channelling runs from here to `completes_at`
    pub cast_ends_at: f64,
    pub completes_at: f64,
    pub locks_movement: bool,
}

impl ActiveCast {
    pub fn new(skill: Arc<SkillDefinition>, target: Option<UnitId>, now: f64) -> Self {
        let cast_ends_at = now + skill.cast_time.max(0.0);
        let completes_at = cast_ends_at + skill.channel_time.max(0.0);
        let locks_movement = skill.locks_movement();
        ActiveCast {
            skill,
            target,
            started_at: now,
            cast_ends_at,
            completes_at,
            locks_movement,
        }
    }

    pub fn skill_id(&self) -> &str {
        &self.skill.id
    }

    pub fn is_due(&self, now: f64) -> bool {
        now >= self.completes_at
    }

    pub fn is_channeling(&self, now: f64) -> bool {
        now >= self.cast_ends_at && now < self.completes_at
    }

    /// 0.0 at start, 1.0 when complete
    pub fn progress(&self, now: f64) -> f64 {
        let total = self.completes_at - self.started_at;
        if total <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / total).clamp(0.0, 1.0)
    }
}
