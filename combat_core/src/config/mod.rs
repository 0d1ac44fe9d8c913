//! Configuration loading

mod constants;

pub use constants::{
    AiConstants, AttributeConstants, CastingConstants, CombatConstants, HealthConstants,
};
pub use content_core::ConfigError;

use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a TOML file, tagging errors with the path
pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        error: e,
        path: Some(path.to_path_buf()),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        error: e,
        path: path.to_path_buf(),
    })
}

/// Parse a TOML string
pub(crate) fn parse_toml<T: DeserializeOwned>(toml: &str) -> Result<T, ConfigError> {
    toml::from_str(toml).map_err(|e| ConfigError::Parse {
        error: e,
        path: Path::new("<inline>").to_path_buf(),
    })
}
