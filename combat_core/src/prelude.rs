//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::unit::{MovementIntent, Team, Unit, UnitId, UnitSpec};
pub use crate::world::World;

// Notifications
pub use crate::events::{CombatEvent, EventBus, EventRecorder, Topic};

// Trigger hand-off
pub use crate::effect::{EffectExecutor, EffectQueue, EffectRequest};

// Errors and config
pub use crate::config::{CombatConstants, ConfigError};
pub use crate::error::{CastError, SpawnError};

// AI
pub use crate::ai::AiState;

// Re-exports from content_core
pub use content_core::{AttributeKey, BuffDefinition, ContentSet, ResourceKind, SkillDefinition, TriggerKind};

pub use glam::DVec2;
