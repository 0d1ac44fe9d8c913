//! The per-tick pipeline

use super::World;
use crate::effect::EffectExecutor;
use crate::unit::UnitId;

impl<E: EffectExecutor> World<E> {
    /// Advance the simulation by `dt` seconds
    ///
    /// Phases run for every unit (in slot order) before the next phase starts:
    ///
    /// 1. advance the clock
    /// 2. recompute effective attributes
    /// 3. regeneration, shield and cooldown sweeps, cast completion
    /// 4. buff ticks and expiry
    /// 5. AI decisions and behaviour
    ///
    /// Units spawned by event handlers during a tick join on the next one.
    pub fn tick(&mut self, dt: f64) {
        let now = self.clock.advance(dt);
        let dt = dt.max(0.0);
        let ids = self.units.ids();
        tracing::trace!(now, units = ids.len(), "tick");

        for id in &ids {
            if let Some(unit) = self.units.get_mut(*id) {
                unit.refresh_attributes();
            }
        }

        for id in &ids {
            if let Some(unit) = self.units.get_mut(*id) {
                unit.tick_vitals(dt, now);
                unit.complete_cast_if_due(now);
            }
        }

        for id in &ids {
            self.tick_buffs(*id, now);
        }

        for id in &ids {
            self.update_ai(*id, now);
        }
    }

    /// Fire due buff ticks, then expire finished instances
    ///
    /// Dead units keep their timers running but their ticks do not fire.
    fn tick_buffs(&mut self, id: UnitId, now: f64) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        let alive = unit.is_alive();
        let passes = unit.buffs_mut().advance_ticks(now);
        let expired = unit.buffs().expired(now);
        if alive && !passes.is_empty() {
            self.run_periodic_passes(id, passes);
        }
        if !expired.is_empty() {
            self.expire_instances(id, &expired);
        }
    }
}
