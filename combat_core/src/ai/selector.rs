//! Weighted random skill selection

use content_core::{Condition, SkillRule};
use rand::Rng;

/// Roulette-wheel pick
///
/// Negative weights count as zero. When every weight is zero the first
/// candidate wins, so an all-zero list behaves like a priority list.
pub fn select_weighted<'a, T, R, W>(candidates: &[&'a T], weight: W, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    W: Fn(&T) -> f64,
{
    let first = *candidates.first()?;
    let total: f64 = candidates.iter().map(|c| weight(*c).max(0.0)).sum();
    if total <= 0.0 {
        return Some(first);
    }

    let draw = rng.gen_range(0.0..=total);
    let mut cumulative = 0.0;
    for candidate in candidates {
        cumulative += weight(*candidate).max(0.0);
        if cumulative >= draw {
            return Some(*candidate);
        }
    }
    // Float rounding left the draw just above the final sum
    candidates.last().copied()
}

/// Pick a skill rule usable right now
///
/// A rule qualifies when its range window contains `distance`, its movement
/// requirement accepts `moving`, its skill is ready and its condition holds.
pub fn select_skill<'a, R, F, C>(
    rules: &'a [SkillRule],
    distance: f64,
    moving: bool,
    is_ready: F,
    condition_holds: C,
    rng: &mut R,
) -> Option<&'a SkillRule>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
    C: Fn(&Condition) -> bool,
{
    let candidates: Vec<&SkillRule> = rules
        .iter()
        .filter(|rule| rule.in_range(distance))
        .filter(|rule| rule.movement.allows(moving))
        .filter(|rule| is_ready(&rule.skill))
        .filter(|rule| rule.condition.as_ref().map_or(true, &condition_holds))
        .collect();
    select_weighted(&candidates, |rule| rule.weight, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_core::MovementRequirement;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rules() -> Vec<SkillRule> {
        vec![
            SkillRule::new("bite", 1.0, 0.0, 2.0),
            SkillRule::new("spit", 1.0, 3.0, 8.0),
            SkillRule::new("pounce", 1.0, 2.0, 6.0).with_movement(MovementRequirement::Moving),
        ]
    }

    #[test]
    fn test_range_filter() {
        let rules = rules();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let pick = select_skill(&rules, 1.0, false, |_| true, |_| true, &mut rng).unwrap();
        assert_eq!(pick.skill, "bite");
        let pick = select_skill(&rules, 5.0, false, |_| true, |_| true, &mut rng).unwrap();
        assert_eq!(pick.skill, "spit");
        assert!(select_skill(&rules, 9.0, false, |_| true, |_| true, &mut rng).is_none());
    }

    #[test]
    fn test_movement_and_cooldown_filter() {
        let rules = rules();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let pick = select_skill(&rules, 5.0, true, |s| s != "spit", |_| true, &mut rng).unwrap();
        assert_eq!(pick.skill, "pounce");
        assert!(select_skill(&rules, 5.0, false, |s| s != "spit", |_| true, &mut rng).is_none());
    }

    #[test]
    fn test_condition_filter() {
        let rules = vec![
            SkillRule::new("heal", 5.0, 0.0, 10.0).with_condition(Condition::HealthBelow { ratio: 0.5 }),
            SkillRule::new("zap", 1.0, 0.0, 10.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..20 {
            let pick = select_skill(&rules, 1.0, false, |_| true, |_| false, &mut rng).unwrap();
            assert_eq!(pick.skill, "zap");
        }
    }

    #[test]
    fn test_weights_bias_selection() {
        let rules = vec![
            SkillRule::new("rare", 1.0, 0.0, 10.0),
            SkillRule::new("common", 9.0, 0.0, 10.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let common = (0..1000)
            .filter(|_| {
                select_skill(&rules, 1.0, false, |_| true, |_| true, &mut rng).unwrap().skill == "common"
            })
            .count();
        assert!(common > 820 && common < 970, "common picked {common} times");
    }

    #[test]
    fn test_empty_is_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let empty: Vec<&SkillRule> = Vec::new();
        assert!(select_weighted(&empty, |r| r.weight, &mut rng).is_none());
    }

    proptest! {
        #[test]
        fn prop_zero_weights_pick_first(seed in any::<u64>(), n in 1usize..8) {
            let rules: Vec<SkillRule> = (0..n)
                .map(|i| SkillRule::new(format!("skill_{i}"), 0.0, 0.0, 10.0))
                .collect();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let pick = select_skill(&rules, 1.0, false, |_| true, |_| true, &mut rng).unwrap();
            prop_assert_eq!(pick.skill.as_str(), "skill_0");
        }
    }
}
