//! Data-driven predicates for buff triggers and AI skill rules
//!
//! Conditions are declared in content and evaluated by the runtime against
//! the owning unit ("self") and an optional target.

use crate::attribute::{AttributeCatalog, AttributeKey};
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

/// A predicate over the acting unit and its current target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Always true
    Always,
    /// Self health ratio (0.0-1.0) is at or below the threshold
    HealthBelow { ratio: f64 },
    /// Self health ratio is at or above the threshold
    HealthAbove { ratio: f64 },
    /// Target health ratio is at or below the threshold (false without a target)
    TargetHealthBelow { ratio: f64 },
    /// Target health ratio is at or above the threshold (false without a target)
    TargetHealthAbove { ratio: f64 },
    /// Self has at least this much of a resource
    ResourceAtLeast { resource: ResourceKind, amount: f64 },
    /// Self carries an instance of the buff
    HasBuff { buff: String },
    /// Target carries an instance of the buff
    TargetHasBuff { buff: String },
    /// Self attribute is at least the value
    AttributeAtLeast { key: AttributeKey, value: f64 },
    /// Target is within the distance of self
    TargetWithin { distance: f64 },
    /// Self is casting any skill
    Casting,
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Check numeric fields for values that can never be satisfied sensibly
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Condition::HealthBelow { ratio }
            | Condition::HealthAbove { ratio }
            | Condition::TargetHealthBelow { ratio }
            | Condition::TargetHealthAbove { ratio } => {
                if !(0.0..=1.0).contains(ratio) {
                    return Err(format!("health ratio {} outside 0.0..=1.0", ratio));
                }
            }
            Condition::TargetWithin { distance } if *distance < 0.0 => {
                return Err(format!("negative distance {}", distance));
            }
            Condition::All { conditions } | Condition::Any { conditions } => {
                for c in conditions {
                    c.validate()?;
                }
            }
            Condition::Not { condition } => condition.validate()?,
            _ => {}
        }
        Ok(())
    }

    /// Swap every attribute key for its catalog copy
    pub(crate) fn intern_keys(&mut self, catalog: &mut AttributeCatalog) {
        match self {
            Condition::AttributeAtLeast { key, .. } => catalog.canonicalize(key),
            Condition::All { conditions } | Condition::Any { conditions } => {
                for c in conditions {
                    c.intern_keys(catalog);
                }
            }
            Condition::Not { condition } => condition.intern_keys(catalog),
            _ => {}
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Always
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        condition: Condition,
    }

    #[test]
    fn test_parse_nested() {
        let toml = r#"
[condition]
type = "all"

[[condition.conditions]]
type = "health_below"
ratio = 0.5

[[condition.conditions]]
type = "not"
condition = { type = "target_has_buff", buff = "frozen" }
"#;
        let holder: Holder = toml::from_str(toml).unwrap();
        match &holder.condition {
            Condition::All { conditions } => {
                assert_eq!(conditions.len(), 2);
                assert_eq!(conditions[0], Condition::HealthBelow { ratio: 0.5 });
            }
            other => panic!("Expected All, got {:?}", other),
        }
        assert!(holder.condition.validate().is_ok());
    }

    #[test]
    fn test_validate_ratio() {
        let bad = Condition::Any {
            conditions: vec![Condition::TargetHealthAbove { ratio: 1.5 }],
        };
        assert!(bad.validate().is_err());
    }
}
