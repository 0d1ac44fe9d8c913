//! Rejection reasons for world operations

use crate::unit::UnitId;
use content_core::ResourceKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("unknown unit template '{0}'")]
    UnknownTemplate(String),
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),
    #[error("unknown AI profile '{0}'")]
    UnknownAiProfile(String),
    #[error("unknown buff '{0}'")]
    UnknownBuff(String),
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("caster is dead")]
    Dead,
    #[error("already casting '{0}'")]
    AlreadyCasting(String),
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),
    #[error("skill '{0}' has not been learned")]
    NotLearned(String),
    #[error("casting is blocked")]
    Silenced,
    #[error("'{skill}' is on cooldown for {remaining:.2}s")]
    OnCooldown { skill: String, remaining: f64 },
    #[error("not enough {resource} (needs {cost})")]
    InsufficientResource { resource: ResourceKind, cost: f64 },
    #[error("target out of range ({distance:.2} > {range:.2})")]
    OutOfRange { distance: f64, range: f64 },
    #[error("invalid target")]
    InvalidTarget,
}
