use serde::{Deserialize, Serialize};
use std::fmt;

/// Depletable resource pools a unit can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Mana,
    Energy,
    Stamina,
    Rage,
}

impl ResourceKind {
    /// Get all resource kinds
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Mana,
            ResourceKind::Energy,
            ResourceKind::Stamina,
            ResourceKind::Rage,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Mana => write!(f, "Mana"),
            ResourceKind::Energy => write!(f, "Energy"),
            ResourceKind::Stamina => write!(f, "Stamina"),
            ResourceKind::Rage => write!(f, "Rage"),
        }
    }
}
