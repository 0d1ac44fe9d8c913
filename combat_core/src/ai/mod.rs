//! AI decision state machine
//!
//! Every AI-controlled unit carries an [`AiRuntime`]. Each tick the world asks
//! [`brain::think`] for an [`AiPlan`] using a read-only view of all units, then
//! commits the plan to the unit and issues any requested cast.

pub mod brain;
pub mod selector;
pub mod target;

pub use brain::{think, AiPlan, CastRequest};
pub use selector::{select_skill, select_weighted};
pub use target::CombatTarget;

use crate::unit::UnitId;
use content_core::AiProfile;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    #[default]
    Idle,
    Chase,
    Attack,
    CastSkill,
    Retreat,
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiState::Idle => "idle",
            AiState::Chase => "chase",
            AiState::Attack => "attack",
            AiState::CastSkill => "cast_skill",
            AiState::Retreat => "retreat",
        };
        f.write_str(name)
    }
}

/// The skill the AI settled on and the distance window it is usable in
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSkill {
    /// None is the external basic action
    pub skill: Option<String>,
    pub min_range: f64,
    pub max_range: f64,
}

impl SelectedSkill {
    pub fn in_range(&self, distance: f64) -> bool {
        distance >= self.min_range && distance <= self.max_range
    }
}

/// Per-unit AI memory
#[derive(Debug, Clone)]
pub struct AiRuntime {
    pub(crate) profile: Arc<AiProfile>,
    pub(crate) state: AiState,
    pub(crate) target: Option<UnitId>,
    pub(crate) selected: Option<SelectedSkill>,
    pub(crate) next_decision_at: f64,
}

impl AiRuntime {
    /// Idle, deciding on the next tick
    pub fn new(profile: Arc<AiProfile>, now: f64) -> Self {
        AiRuntime {
            profile,
            state: AiState::Idle,
            target: None,
            selected: None,
            next_decision_at: now,
        }
    }

    pub fn profile(&self) -> &Arc<AiProfile> {
        &self.profile
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    /// Cached target handle; may be stale
    pub fn target(&self) -> Option<UnitId> {
        self.target
    }

    pub fn selected(&self) -> Option<&SelectedSkill> {
        self.selected.as_ref()
    }

    pub fn next_decision_at(&self) -> f64 {
        self.next_decision_at
    }
}
