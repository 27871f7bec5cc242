//! Path request statistics.
//!
//! Tracks request volume, cache effectiveness, and calculation cost for
//! monitoring and debugging. The manager is driven from a single thread, so
//! these are plain counters rather than atomics.

use std::collections::VecDeque;
use std::time::Duration;

use nav_core::Position;

/// One uncached search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationRecord {
    pub start: Position,
    pub goal: Position,
    pub found: bool,
    pub nodes_explored: u32,
    pub elapsed: Duration,
    /// Manager clock reading when the search ran.
    pub at_ms: u64,
}

/// Running statistics kept by the [`PathManager`](super::PathManager).
#[derive(Debug)]
pub struct PathStats {
    /// Total calls to `find_path` (including batch-resolved requests)
    requested: u64,

    /// Searches actually run (cache misses)
    calculated: u64,

    cache_hits: u64,
    cache_misses: u64,

    /// Searches that returned `found == false`
    failed: u64,

    /// Sum of all calculation times
    total_calc_time: Duration,

    recent: VecDeque<CalculationRecord>,
    recent_capacity: usize,
}

impl PathStats {
    /// Creates an empty tracker keeping the last `recent_capacity` calculations.
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            requested: 0,
            calculated: 0,
            cache_hits: 0,
            cache_misses: 0,
            failed: 0,
            total_calc_time: Duration::ZERO,
            recent: VecDeque::with_capacity(recent_capacity),
            recent_capacity,
        }
    }

    pub fn record_request(&mut self) {
        self.requested += 1;
    }

    pub fn record_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.cache_misses += 1;
    }

    /// Records a finished search and pushes it onto the recent log.
    pub fn record_calculation(&mut self, record: CalculationRecord) {
        self.calculated += 1;
        if !record.found {
            self.failed += 1;
        }
        self.total_calc_time += record.elapsed;

        if self.recent_capacity == 0 {
            return;
        }
        if self.recent.len() == self.recent_capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(record);
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn calculated(&self) -> u64 {
        self.calculated
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Calculates average search time over all calculations.
    pub fn average_calc_time(&self) -> Duration {
        if self.calculated == 0 {
            Duration::ZERO
        } else {
            self.total_calc_time / self.calculated as u32
        }
    }

    /// Returns hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / lookups as f64) * 100.0
        }
    }

    /// Most recent calculations, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &CalculationRecord> {
        self.recent.iter()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.recent_capacity);
    }

    /// Creates a snapshot of all statistics for display/logging.
    pub fn snapshot(&self) -> PathStatsSnapshot {
        PathStatsSnapshot {
            requested: self.requested,
            calculated: self.calculated,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            failed: self.failed,
            average_calc_time: self.average_calc_time(),
            hit_rate: self.hit_rate(),
            recent: self.recent.iter().copied().collect(),
        }
    }
}

impl Default for PathStats {
    fn default() -> Self {
        Self::new(crate::config::CacheConfig::DEFAULT_RECENT_LOG_LEN)
    }
}

/// Snapshot of statistics at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStatsSnapshot {
    pub requested: u64,
    pub calculated: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub failed: u64,
    pub average_calc_time: Duration,
    pub hit_rate: f64,
    pub recent: Vec<CalculationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(found: bool, micros: u64) -> CalculationRecord {
        CalculationRecord {
            start: Position::new(0, 0),
            goal: Position::new(1, 1),
            found,
            nodes_explored: 1,
            elapsed: Duration::from_micros(micros),
            at_ms: 0,
        }
    }

    #[test]
    fn recent_log_is_bounded() {
        let mut stats = PathStats::new(2);
        for micros in [10, 20, 30] {
            stats.record_calculation(record(true, micros));
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.calculated, 3);
        assert_eq!(snapshot.recent.len(), 2);
        assert_eq!(snapshot.recent[0].elapsed, Duration::from_micros(20));
        assert_eq!(snapshot.average_calc_time, Duration::from_micros(20));
    }

    #[test]
    fn failures_and_hit_rate() {
        let mut stats = PathStats::default();
        stats.record_miss();
        stats.record_calculation(record(false, 5));
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();

        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.hit_rate(), 75.0);

        stats.reset();
        assert_eq!(stats.snapshot().cache_hits, 0);
    }
}
