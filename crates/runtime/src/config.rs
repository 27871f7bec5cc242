//! Engine configuration and per-archetype tuning.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! has to name the values it overrides. Durations are stored as whole
//! milliseconds and exposed through `Duration` accessors.
use std::time::Duration;

use nav_core::SearchOptions;
use serde::{Deserialize, Serialize};

/// Top-level configuration for one simulation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchOptions,
    pub cache: CacheConfig,
    /// Run line-of-sight smoothing on every path handed to an entity.
    pub smooth_paths: bool,
    /// How far (in cells) to look for a walkable substitute when a path
    /// request starts or ends on a blocked cell.
    pub fallback_radius: u32,
    /// Broadcast channel capacity per event topic.
    pub event_buffer_size: usize,
    /// Seed for the controller's random source (wander targets etc.).
    pub seed: u64,
    pub guard: GuardConfig,
    pub hunter: HunterConfig,
    pub survivor: SurvivorConfig,
    pub preserver: PreserverConfig,
    pub merchant: MerchantConfig,
}

impl EngineConfig {
    pub const DEFAULT_FALLBACK_RADIUS: u32 = 5;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;
    pub const DEFAULT_SEED: u64 = 0x5EED;

    pub fn new() -> Self {
        Self {
            search: SearchOptions::default(),
            cache: CacheConfig::default(),
            smooth_paths: true,
            fallback_radius: Self::DEFAULT_FALLBACK_RADIUS,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            seed: Self::DEFAULT_SEED,
            guard: GuardConfig::default(),
            hunter: HunterConfig::default(),
            survivor: SurvivorConfig::default(),
            preserver: PreserverConfig::default(),
            merchant: MerchantConfig::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Path cache bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries older than this are treated as misses.
    pub ttl_ms: u64,
    /// Maximum cached routes; the oldest entry is evicted when full.
    pub max_entries: usize,
    /// Length of the recent-calculation log kept by the statistics.
    pub recent_log_len: usize,
}

impl CacheConfig {
    pub const DEFAULT_TTL_MS: u64 = 5_000;
    pub const DEFAULT_MAX_ENTRIES: usize = 256;
    pub const DEFAULT_RECENT_LOG_LEN: usize = 32;

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: Self::DEFAULT_TTL_MS,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            recent_log_len: Self::DEFAULT_RECENT_LOG_LEN,
        }
    }
}

// ============================================================================
// Archetype tuning
// ============================================================================

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub think_interval_ms: u64,
    /// Cells per second.
    pub speed: f32,
    pub detection_radius: f32,
    /// A lone guard this close to the subject strikes and falls back.
    pub attack_radius: f32,
    /// Half-width of the square patrol generated when no route is given.
    pub patrol_radius: i32,
    pub retreat_distance: f32,
    /// Distance from the subject at which coordinated guards take position.
    pub flank_distance: f32,
    pub lose_sight_timeout_ms: u64,
    pub investigate_duration_ms: u64,
    pub retreat_duration_ms: u64,
    pub coordination_interval_ms: u64,
}

impl GuardConfig {
    pub fn think_interval(&self) -> Duration {
        millis(self.think_interval_ms)
    }

    pub fn lose_sight_timeout(&self) -> Duration {
        millis(self.lose_sight_timeout_ms)
    }

    pub fn investigate_duration(&self) -> Duration {
        millis(self.investigate_duration_ms)
    }

    pub fn retreat_duration(&self) -> Duration {
        millis(self.retreat_duration_ms)
    }

    pub fn coordination_interval(&self) -> Duration {
        millis(self.coordination_interval_ms)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 200,
            speed: 2.0,
            detection_radius: 8.0,
            attack_radius: 1.5,
            patrol_radius: 4,
            retreat_distance: 4.0,
            flank_distance: 2.0,
            lose_sight_timeout_ms: 3_000,
            investigate_duration_ms: 5_000,
            retreat_duration_ms: 1_500,
            coordination_interval_ms: 2_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    pub think_interval_ms: u64,
    pub speed: f32,
    pub detection_radius: f32,
    pub attack_radius: f32,
    pub retreat_distance: f32,
    /// Radius of the random hunting ground used when no waypoints are given.
    pub roam_radius: i32,
    pub retreat_duration_ms: u64,
    pub wait_duration_ms: u64,
}

impl HunterConfig {
    pub fn think_interval(&self) -> Duration {
        millis(self.think_interval_ms)
    }

    pub fn retreat_duration(&self) -> Duration {
        millis(self.retreat_duration_ms)
    }

    pub fn wait_duration(&self) -> Duration {
        millis(self.wait_duration_ms)
    }
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 150,
            speed: 2.5,
            detection_radius: 10.0,
            attack_radius: 1.5,
            retreat_distance: 5.0,
            roam_radius: 6,
            retreat_duration_ms: 1_500,
            wait_duration_ms: 2_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivorConfig {
    pub think_interval_ms: u64,
    pub speed: f32,
    pub detection_radius: f32,
    /// Fleeing stops once the subject is at least this far away.
    pub safe_distance: f32,
    pub flee_distance: f32,
    pub wander_radius: i32,
    pub hide_duration_ms: u64,
}

impl SurvivorConfig {
    pub fn think_interval(&self) -> Duration {
        millis(self.think_interval_ms)
    }

    pub fn hide_duration(&self) -> Duration {
        millis(self.hide_duration_ms)
    }
}

impl Default for SurvivorConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 250,
            speed: 2.2,
            detection_radius: 7.0,
            safe_distance: 10.0,
            flee_distance: 6.0,
            wander_radius: 4,
            hide_duration_ms: 3_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreserverConfig {
    pub think_interval_ms: u64,
    pub speed: f32,
    pub detection_radius: f32,
    /// Stand-off distance held while waiting to strike.
    pub ideal_distance: f32,
    /// Accepted deviation from `ideal_distance`.
    pub distance_tolerance: f32,
    pub attack_radius: f32,
    pub orbit_radius: f32,
    /// Radians advanced per patrol leg.
    pub orbit_step: f32,
    /// Radians added to the attack angle after each strike.
    pub reposition_angle: f32,
    pub retreat_distance: f32,
    pub attack_cooldown_ms: u64,
    /// Longest dash before a strike is abandoned.
    pub attack_window_ms: u64,
    pub retreat_duration_ms: u64,
}

impl PreserverConfig {
    pub fn think_interval(&self) -> Duration {
        millis(self.think_interval_ms)
    }

    pub fn attack_cooldown(&self) -> Duration {
        millis(self.attack_cooldown_ms)
    }

    pub fn attack_window(&self) -> Duration {
        millis(self.attack_window_ms)
    }

    pub fn retreat_duration(&self) -> Duration {
        millis(self.retreat_duration_ms)
    }
}

impl Default for PreserverConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 200,
            speed: 2.0,
            detection_radius: 9.0,
            ideal_distance: 4.0,
            distance_tolerance: 1.0,
            attack_radius: 1.5,
            orbit_radius: 4.0,
            orbit_step: 0.6,
            reposition_angle: 1.2,
            retreat_distance: 5.0,
            attack_cooldown_ms: 2_500,
            attack_window_ms: 1_500,
            retreat_duration_ms: 1_500,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    pub think_interval_ms: u64,
    pub speed: f32,
    pub detection_radius: f32,
    pub safe_distance: f32,
    pub flee_distance: f32,
    pub wander_radius: i32,
    /// Distance at which a guard counts as reached and gets alerted.
    pub alert_reach: f32,
    pub trade_duration_ms: u64,
    pub wander_duration_ms: u64,
    /// Minimum time between two alerts raised by the same merchant.
    pub alert_cooldown_ms: u64,
}

impl MerchantConfig {
    pub fn think_interval(&self) -> Duration {
        millis(self.think_interval_ms)
    }

    pub fn trade_duration(&self) -> Duration {
        millis(self.trade_duration_ms)
    }

    pub fn wander_duration(&self) -> Duration {
        millis(self.wander_duration_ms)
    }

    pub fn alert_cooldown(&self) -> Duration {
        millis(self.alert_cooldown_ms)
    }
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 250,
            speed: 1.8,
            detection_radius: 6.0,
            safe_distance: 10.0,
            flee_distance: 6.0,
            wander_radius: 3,
            alert_reach: 1.5,
            trade_duration_ms: 4_000,
            wander_duration_ms: 3_000,
            alert_cooldown_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "seed": 7, "guard": { "detection_radius": 5.0 } }"#)
                .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.guard.detection_radius, 5.0);
        assert_eq!(config.guard.speed, GuardConfig::default().speed);
        assert_eq!(config.cache, CacheConfig::default());
        assert!(config.smooth_paths);
    }

    #[test]
    fn cache_defaults() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl(), Duration::from_millis(5_000));
        assert_eq!(cache.max_entries, 256);
    }
}
