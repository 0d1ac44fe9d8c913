//! Target snapshots and acquisition

use crate::unit::{Team, Unit, UnitId};
use crate::world::UnitRegistry;
use glam::DVec2;

/// What the AI knows about a target at decision time
///
/// Rebuilt from the registry on every use; never stored across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatTarget {
    pub id: UnitId,
    pub position: DVec2,
    pub health_ratio: Option<f64>,
    pub alive: bool,
    pub team: Option<Team>,
}

impl CombatTarget {
    pub fn from_unit(unit: &Unit) -> Self {
        CombatTarget {
            id: unit.id(),
            position: unit.position(),
            health_ratio: Some(unit.health().ratio()),
            alive: unit.is_alive(),
            team: Some(unit.team()),
        }
    }

    /// Alive and on a hostile team (unknown team counts as hostile)
    pub fn is_valid_for(&self, observer: &Unit) -> bool {
        self.id != observer.id()
            && self.alive
            && self.team.map_or(true, |team| observer.team().is_hostile_to(team))
    }

    pub fn distance_from(&self, position: DVec2) -> f64 {
        self.position.distance(position)
    }
}

/// Resolve a cached handle; stale, dead or friendly targets yield None
pub fn resolve(observer: &Unit, units: &UnitRegistry, target: Option<UnitId>) -> Option<CombatTarget> {
    let unit = units.get(target?)?;
    let snapshot = CombatTarget::from_unit(unit);
    snapshot.is_valid_for(observer).then_some(snapshot)
}

/// Nearest valid hostile within `radius`
///
/// Ties keep the unit with the lowest slot.
pub fn acquire_nearest(observer: &Unit, units: &UnitRegistry, radius: f64) -> Option<CombatTarget> {
    let origin = observer.position();
    units
        .iter()
        .map(CombatTarget::from_unit)
        .filter(|candidate| candidate.is_valid_for(observer))
        .map(|candidate| (candidate.distance_from(origin), candidate))
        .filter(|(distance, _)| *distance <= radius)
        .fold(None, |best: Option<(f64, CombatTarget)>, (distance, candidate)| match best {
            Some((best_distance, _)) if best_distance <= distance => best,
            _ => Some((distance, candidate)),
        })
        .map(|(_, candidate)| candidate)
}
