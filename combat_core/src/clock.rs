//! Monotonic simulation time

/// Seconds since the simulation started; only moves forward
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    now: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Advance by `dt`; negative or non-finite steps are ignored
    pub fn advance(&mut self, dt: f64) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_goes_back() {
        let mut clock = SimClock::new();
        assert!((clock.advance(0.5) - 0.5).abs() < f64::EPSILON);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert!((clock.now() - 0.5).abs() < f64::EPSILON);
    }
}
