//! content_core - Static combat content shared by every unit
//!
//! This library provides:
//! - AttributeKey: interned identifiers for numeric unit attributes
//! - BuffDefinition: stacking rule, timing, modifiers and triggers of a status effect
//! - SkillDefinition: cost, cooldown, range and cast timing of a skill
//! - AiProfile: decision tuning and weighted skill rules for AI-controlled units
//! - UnitTemplate: base attributes and resource pools of a combatant
//! - ContentSet: registry of all of the above, loaded from TOML files
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use content_core::ContentSet;
//!
//! let content = ContentSet::load(Path::new("config/content")).unwrap();
//! let burn = content.buff("burning").unwrap();
//! println!("{} stacks up to {}", burn.name, burn.max_stacks);
//! ```

pub mod ai;
pub mod attribute;
pub mod buff;
pub mod condition;
mod registry;
pub mod resource;
pub mod skill;
pub mod unit;

pub use ai::{AiProfile, MovementRequirement, SkillRule};
pub use attribute::{AttributeCatalog, AttributeKey};
pub use buff::{BuffDefinition, EffectSpec, ModifierKind, AttributeModifier, StackingRule, TriggerEntry, TriggerKind};
pub use condition::Condition;
pub use registry::{ContentFile, ContentSet};
pub use resource::ResourceKind;
pub use skill::SkillDefinition;
pub use unit::{ResourceTemplate, UnitTemplate};

use std::path::PathBuf;
use thiserror::Error;

/// Error loading combat content or constants
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}
