//! Per-skill cooldown timers as absolute expiry times

use std::collections::BTreeMap;

/// Notification payload for a cooldown starting or ending
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownChange {
    pub skill: String,
    pub remaining: f64,
    pub duration: f64,
    pub active: bool,
}

impl CooldownChange {
    fn started(skill: &str, duration: f64) -> Self {
        CooldownChange {
            skill: skill.to_string(),
            remaining: duration.max(0.0),
            duration: duration.max(0.0),
            active: true,
        }
    }

    fn ended(skill: &str, duration: f64) -> Self {
        CooldownChange {
            skill: skill.to_string(),
            remaining: 0.0,
            duration,
            active: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CooldownEntry {
    expires_at: f64,
    duration: f64,
}

/// Skill id -> expiry; a missing entry means the skill is ready
///
/// Ordered by skill id so sweeps report expiries deterministically.
#[derive(Debug, Clone, Default)]
pub struct CooldownTable {
    entries: BTreeMap<String, CooldownEntry>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a cooldown
    ///
    /// A non-positive duration leaves the skill ready but still reports a
    /// started/ended pair so listeners see a consistent sequence.
    pub fn start(&mut self, skill: &str, duration: f64, now: f64) -> Vec<CooldownChange> {
        if duration <= 0.0 {
            self.entries.remove(skill);
            return vec![
                CooldownChange::started(skill, 0.0),
                CooldownChange::ended(skill, 0.0),
            ];
        }
        self.entries.insert(
            skill.to_string(),
            CooldownEntry {
                expires_at: now + duration,
                duration,
            },
        );
        vec![CooldownChange::started(skill, duration)]
    }

    /// End a cooldown early
    pub fn clear(&mut self, skill: &str) -> Option<CooldownChange> {
        self.entries
            .remove(skill)
            .map(|entry| CooldownChange::ended(skill, entry.duration))
    }

    pub fn is_ready(&self, skill: &str, now: f64) -> bool {
        self.entries
            .get(skill)
            .map_or(true, |entry| entry.expires_at <= now)
    }

    /// Seconds until ready, never negative
    pub fn remaining(&self, skill: &str, now: f64) -> f64 {
        self.entries
            .get(skill)
            .map_or(0.0, |entry| (entry.expires_at - now).max(0.0))
    }

    /// Total duration of a running cooldown
    pub fn duration(&self, skill: &str) -> Option<f64> {
        self.entries.get(skill).map(|entry| entry.duration)
    }

    /// Remove expired entries, one change per expiry
    pub fn sweep(&mut self, now: f64) -> Vec<CooldownChange> {
        // Collect first: the table is not touched while iterating it
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(skill, _)| skill.clone())
            .collect();

        let mut changes = Vec::with_capacity(expired.len());
        for skill in expired {
            if let Some(entry) = self.entries.remove(&skill) {
                debug_assert!(entry.duration > 0.0);
                changes.push(CooldownChange::ended(&skill, entry.duration));
            }
        }
        if !changes.is_empty() {
            tracing::trace!(count = changes.len(), "cooldowns expired");
        }
        changes
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Running cooldowns as (skill, remaining)
    pub fn active(&self, now: f64) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries
            .iter()
            .map(move |(skill, entry)| (skill.as_str(), (entry.expires_at - now).max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_after_duration() {
        let mut table = CooldownTable::new();
        table.start("fireball", 3.0, 10.0);
        assert!(!table.is_ready("fireball", 10.0));
        assert!((table.remaining("fireball", 11.0) - 2.0).abs() < 1e-9);
        assert!(!table.is_ready("fireball", 12.9));
        assert!(table.is_ready("fireball", 13.0));
        assert!((table.remaining("fireball", 20.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_skill_is_ready() {
        let table = CooldownTable::new();
        assert!(table.is_ready("anything", 0.0));
        assert!((table.remaining("anything", 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_duration_emits_pair() {
        let mut table = CooldownTable::new();
        let changes = table.start("jab", 0.0, 1.0);
        assert_eq!(changes.len(), 2);
        assert!(changes[0].active);
        assert!(!changes[1].active);
        assert!(table.is_ready("jab", 1.0));
        assert_eq!(table.active_count(), 0);
    }

    #[test]
    fn test_sweep_removes_expired_in_order() {
        let mut table = CooldownTable::new();
        table.start("zap", 1.0, 0.0);
        table.start("bash", 1.0, 0.0);
        table.start("nova", 5.0, 0.0);

        let changes = table.sweep(1.5);
        let skills: Vec<&str> = changes.iter().map(|c| c.skill.as_str()).collect();
        assert_eq!(skills, vec!["bash", "zap"]);
        assert!(changes.iter().all(|c| !c.active));
        assert_eq!(table.active_count(), 1);
        assert!(table.sweep(1.5).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut table = CooldownTable::new();
        table.start("ult", 60.0, 0.0);
        let change = table.clear("ult").unwrap();
        assert!(!change.active);
        assert!((change.duration - 60.0).abs() < f64::EPSILON);
        assert!(table.clear("ult").is_none());
        assert!(table.is_ready("ult", 0.0));
    }
}
