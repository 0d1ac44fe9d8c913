//! Evaluation of content conditions against live units

use crate::unit::Unit;
use content_core::Condition;

/// Does `condition` hold for `subject`, optionally relative to `target`?
///
/// Target-relative conditions are false when there is no target.
pub fn evaluate(condition: &Condition, subject: &Unit, target: Option<&Unit>) -> bool {
    match condition {
        Condition::Always => true,
        Condition::HealthBelow { ratio } => subject.health().ratio() < *ratio,
        Condition::HealthAbove { ratio } => subject.health().ratio() > *ratio,
        Condition::TargetHealthBelow { ratio } => {
            target.map_or(false, |t| t.health().ratio() < *ratio)
        }
        Condition::TargetHealthAbove { ratio } => {
            target.map_or(false, |t| t.health().ratio() > *ratio)
        }
        Condition::ResourceAtLeast { resource, amount } => subject
            .resource(*resource)
            .map_or(false, |pool| pool.current() >= *amount),
        Condition::HasBuff { buff } => subject.buffs().has(buff),
        Condition::TargetHasBuff { buff } => target.map_or(false, |t| t.buffs().has(buff)),
        Condition::AttributeAtLeast { key, value } => subject.attribute(key) >= *value,
        Condition::TargetWithin { distance } => {
            target.map_or(false, |t| subject.distance_to(t) <= *distance)
        }
        Condition::Casting => subject.is_casting(),
        Condition::All { conditions } => conditions.iter().all(|c| evaluate(c, subject, target)),
        Condition::Any { conditions } => conditions.iter().any(|c| evaluate(c, subject, target)),
        Condition::Not { condition } => !evaluate(condition, subject, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::unit::{UnitId, UnitSpec};
    use content_core::attribute::names;
    use content_core::AttributeKey;
    use glam::DVec2;

    fn unit(index: u32, position: DVec2) -> Unit {
        let spec = UnitSpec::new("dummy")
            .with_attribute(AttributeKey::new(names::MAX_HEALTH), 100.0)
            .with_attribute(AttributeKey::new(names::ATTACK_POWER), 12.0)
            .at(position);
        Unit::new(UnitId::new(index, 0), spec, &Default::default(), EventBus::new())
    }

    #[test]
    fn test_health_conditions() {
        let mut subject = unit(0, DVec2::ZERO);
        subject.apply_damage(60.0, 0.0);
        assert!(evaluate(&Condition::HealthBelow { ratio: 0.5 }, &subject, None));
        assert!(!evaluate(&Condition::HealthAbove { ratio: 0.5 }, &subject, None));
    }

    #[test]
    fn test_target_conditions_need_target() {
        let subject = unit(0, DVec2::ZERO);
        let target = unit(1, DVec2::new(3.0, 4.0));
        let within = Condition::TargetWithin { distance: 5.0 };
        assert!(evaluate(&within, &subject, Some(&target)));
        assert!(!evaluate(&within, &subject, None));
        assert!(!evaluate(&Condition::TargetWithin { distance: 4.9 }, &subject, Some(&target)));
    }

    #[test]
    fn test_combinators() {
        let subject = unit(0, DVec2::ZERO);
        let strong = Condition::AttributeAtLeast {
            key: AttributeKey::new(names::ATTACK_POWER),
            value: 10.0,
        };
        let all = Condition::All {
            conditions: vec![Condition::Always, strong.clone()],
        };
        let any = Condition::Any {
            conditions: vec![Condition::Casting, strong.clone()],
        };
        let not = Condition::Not {
            condition: Box::new(strong),
        };
        assert!(evaluate(&all, &subject, None));
        assert!(evaluate(&any, &subject, None));
        assert!(!evaluate(&not, &subject, None));
    }
}
