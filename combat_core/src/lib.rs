//! combat_core - Real-time combat simulation for game entities
//!
//! This library provides:
//! - Unit: attributes, health and shields, resource pools, cooldowns, buffs and casting for one combatant
//! - BuffEngine: stacking status effects with tick, expire and event triggers
//! - AI: a per-unit decision state machine with weighted skill selection
//! - World: the unit registry, simulation clock and per-tick pipeline
//! - EventBus: typed notifications for every state change
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use combat_core::prelude::*;
//! use content_core::ContentSet;
//! use std::{path::Path, sync::Arc};
//!
//! let content = Arc::new(ContentSet::load(Path::new("config/content"))?);
//! let constants = CombatConstants::load_from_path(Path::new("config/combat.toml"))?;
//! let mut world = World::new(content, constants, 42);
//!
//! let knight = world.spawn_from_template("knight", Team(0), DVec2::ZERO)?;
//! let wolf = world.spawn_from_template("wolf", Team(1), DVec2::new(6.0, 0.0))?;
//! let deaths = EventRecorder::attach_topic(world.bus(), Topic::Health);
//!
//! world.begin_cast(knight, "cleave", Some(wolf))?;
//! for _ in 0..60 {
//!     world.tick(1.0 / 30.0);
//!     for request in world.executor_mut().drain() {
//!         // hand fired buff effects to the skill layer
//!     }
//! }
//! ```

pub mod ai;
pub mod buff;
pub mod clock;
pub mod combat;
pub mod condition;
pub mod config;
pub mod effect;
pub mod error;
pub mod events;
pub mod prelude;
pub mod stats;
pub mod unit;
pub mod world;

// Core API - what most users need
pub use unit::{MovementIntent, Team, Unit, UnitId, UnitSpec};
pub use world::World;
pub use events::{CombatEvent, EventBus, EventRecorder, SubscriptionId, Topic};
pub use effect::{EffectExecutor, EffectQueue, EffectRequest};
pub use error::{CastError, SpawnError};

// Configuration
pub use config::{CombatConstants, ConfigError};

// Subsystems (for advanced use)
pub use ai::{AiRuntime, AiState};
pub use buff::{BuffEngine, BuffInstance, BuffInstanceId};
pub use combat::ActiveCast;
