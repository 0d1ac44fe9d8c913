//! Combat constants configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ConfigError;
use content_core::attribute::names;

/// Tunable combat constants
///
/// Every field has a default so a constants file only needs the values it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CombatConstants {
    #[serde(default)]
    pub health: HealthConstants,
    #[serde(default)]
    pub attributes: AttributeConstants,
    #[serde(default)]
    pub ai: AiConstants,
    #[serde(default)]
    pub casting: CastingConstants,
}

impl CombatConstants {
    /// Load constants from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        super::load_toml(path)
    }

    /// Parse constants from a TOML string
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        super::parse_toml(toml)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConstants {
    /// Attribute the maximum health is read from
    #[serde(default = "default_max_attribute")]
    pub max_attribute: String,
    /// Attribute holding health regenerated per second
    #[serde(default = "default_regen_attribute")]
    pub regen_attribute: String,
    /// Maximum health used when a unit has no max-health attribute
    #[serde(default = "default_max_health")]
    pub default_max: f64,
    /// Keep current health at or below maximum
    #[serde(default = "default_clamp_to_max")]
    pub clamp_to_max: bool,
}

impl Default for HealthConstants {
    fn default() -> Self {
        HealthConstants {
            max_attribute: default_max_attribute(),
            regen_attribute: default_regen_attribute(),
            default_max: default_max_health(),
            clamp_to_max: default_clamp_to_max(),
        }
    }
}

fn default_max_attribute() -> String {
    names::MAX_HEALTH.to_string()
}
fn default_regen_attribute() -> String {
    names::HEALTH_REGEN.to_string()
}
fn default_max_health() -> f64 {
    100.0
}
fn default_clamp_to_max() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeConstants {
    /// Changes smaller than this are treated as no-ops
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for AttributeConstants {
    fn default() -> Self {
        AttributeConstants {
            epsilon: default_epsilon(),
        }
    }
}

fn default_epsilon() -> f64 {
    1e-6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConstants {
    /// Think interval for profiles that declare zero or less
    #[serde(default = "default_think_interval")]
    pub default_think_interval: f64,
}

impl Default for AiConstants {
    fn default() -> Self {
        AiConstants {
            default_think_interval: default_think_interval(),
        }
    }
}

fn default_think_interval() -> f64 {
    0.25
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastingConstants {
    /// Extra distance allowed on top of a skill's range when a cast starts
    #[serde(default = "default_range_tolerance")]
    pub range_tolerance: f64,
}

impl Default for CastingConstants {
    fn default() -> Self {
        CastingConstants {
            range_tolerance: default_range_tolerance(),
        }
    }
}

fn default_range_tolerance() -> f64 {
    0.1
}
