//! Think-rate throttling.

use std::time::Duration;

/// Accumulates elapsed time and fires once it reaches the interval.
///
/// This decouples how often an agent *decides* from how often the host ticks.
/// It is a pure function of the deltas fed to it: no clocks are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cadence {
    interval: Duration,
    accumulated: Duration,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Adds `delta`; returns true (and resets) when the interval is reached.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.accumulated = self.accumulated.saturating_add(delta);
        if self.accumulated >= self.interval {
            self.accumulated = Duration::ZERO;
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Time left until the next firing.
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.accumulated)
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_when_interval_is_reached() {
        let mut cadence = Cadence::new(Duration::from_millis(100));
        assert!(!cadence.advance(Duration::from_millis(40)));
        assert!(!cadence.advance(Duration::from_millis(40)));
        assert_eq!(cadence.remaining(), Duration::from_millis(20));
        assert!(cadence.advance(Duration::from_millis(40)));
        assert_eq!(cadence.accumulated(), Duration::ZERO);
    }

    #[test]
    fn zero_interval_fires_every_tick() {
        let mut cadence = Cadence::new(Duration::ZERO);
        assert!(cadence.advance(Duration::ZERO));
        assert!(cadence.advance(Duration::from_millis(1)));
    }
}
