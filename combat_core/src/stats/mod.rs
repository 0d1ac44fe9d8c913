//! Numeric unit state: attributes, health, resources and cooldowns

mod attributes;
mod cooldown;
mod health;
mod resource;

pub use attributes::{AttributeChange, AttributeStore};
pub use cooldown::{CooldownChange, CooldownTable};
pub use health::{DamageOutcome, HealthChange, HealthState, ShieldChange, ShieldInstance};
pub use resource::{ResourceChange, ResourceState};
