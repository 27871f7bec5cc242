//! Cached, batched access to the A* pathfinder.

use std::collections::VecDeque;

use nav_core::{
    Grid, GridError, PathResult, Pathfinder, Position, SearchOptions, path_length, smooth_path,
};
use tokio::sync::oneshot;
use tracing::debug;

use super::cache::{PathCache, PathKey};
use super::stats::{CalculationRecord, PathStats, PathStatsSnapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::events::{BusObserver, EventBus, PathEvent};

struct PendingRequest {
    start: Position,
    goal: Position,
    smooth: bool,
    reply: oneshot::Sender<PathResult>,
}

/// Wraps [`Pathfinder`] and the smoother with a TTL cache, statistics, and a
/// sequential batch queue.
///
/// The manager owns the grid. Any change to the grid or to the search
/// options drops the entire cache, so a result computed against old geometry
/// is never served.
pub struct PathManager {
    grid: Grid,
    pathfinder: Pathfinder,
    cache: PathCache,
    stats: PathStats,
    clock: Box<dyn Clock>,
    bus: EventBus,
    queue: VecDeque<PendingRequest>,
    fallback_radius: u32,
}

impl PathManager {
    pub const DEFAULT_FALLBACK_RADIUS: u32 = 5;

    /// Creates a manager.
    ///
    /// # Arguments
    ///
    /// * `grid` - Walkability map; owned from here on
    /// * `options` - Search options for every request
    /// * `cache` - TTL, capacity, and recent-log length
    /// * `clock` - Time source for cache expiry
    /// * `bus` - Receives search progress and cache events
    pub fn new(
        grid: Grid,
        options: SearchOptions,
        cache: CacheConfig,
        clock: Box<dyn Clock>,
        bus: EventBus,
    ) -> Self {
        Self {
            grid,
            pathfinder: Pathfinder::new(options),
            cache: PathCache::new(cache.ttl_ms, cache.max_entries),
            stats: PathStats::new(cache.recent_log_len),
            clock,
            bus,
            queue: VecDeque::new(),
            fallback_radius: Self::DEFAULT_FALLBACK_RADIUS,
        }
    }

    /// Default options, default cache, wall clock, and a private bus.
    pub fn with_grid(grid: Grid) -> Self {
        Self::new(
            grid,
            SearchOptions::default(),
            CacheConfig::default(),
            Box::new(SystemClock::new()),
            EventBus::new(),
        )
    }

    pub fn with_fallback_radius(mut self, radius: u32) -> Self {
        self.fallback_radius = radius;
        self
    }

    // ========================================================================
    // Geometry and options
    // ========================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Replaces the grid and invalidates the cache.
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.invalidate();
    }

    /// Edits one cell and invalidates the cache.
    ///
    /// Out-of-bounds edits fail without touching the grid or the cache.
    pub fn set_walkable(&mut self, position: Position, walkable: bool) -> Result<(), GridError> {
        self.grid.set_walkable(position, walkable)?;
        self.invalidate();
        Ok(())
    }

    pub fn options(&self) -> &SearchOptions {
        self.pathfinder.options()
    }

    /// Replaces the search options and invalidates the cache.
    pub fn set_options(&mut self, options: SearchOptions) {
        self.pathfinder.set_options(options);
        self.invalidate();
    }

    /// Drops every cached route and returns how many there were.
    pub fn invalidate(&mut self) -> usize {
        let entries = self.cache.clear();
        debug!(entries, "path cache invalidated");
        self.bus.publish(PathEvent::CacheInvalidated { entries });
        entries
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns a route from `start` to `goal`, served from cache when possible.
    ///
    /// On a miss the search runs, the path is smoothed when `smooth` is set
    /// and it was found, and the result is stored (failures included).
    pub fn find_path(&mut self, start: Position, goal: Position, smooth: bool) -> PathResult {
        self.stats.record_request();
        let key = PathKey::new(start, goal, smooth);
        let now = self.clock.now_ms();

        if let Some(hit) = self.cache.get(&key, now) {
            self.stats.record_hit();
            self.bus.publish(PathEvent::CacheHit { start, goal });
            return hit;
        }
        self.stats.record_miss();
        self.bus.publish(PathEvent::CacheMiss { start, goal });

        let mut observer = BusObserver::new(&self.bus);
        let mut result = self
            .pathfinder
            .find_path_observed(&self.grid, start, goal, &mut observer);

        if smooth && result.found {
            result.path = smooth_path(&self.grid, &result.path);
            result.length = path_length(&result.path);
        }

        self.stats.record_calculation(CalculationRecord {
            start,
            goal,
            found: result.found,
            nodes_explored: result.nodes_explored,
            elapsed: result.elapsed,
            at_ms: now,
        });
        debug!(
            %start,
            %goal,
            found = result.found,
            explored = result.nodes_explored,
            waypoints = result.path.len(),
            "path calculated"
        );

        self.cache.insert(key, result.clone(), now);
        result
    }

    /// Like [`find_path`](Self::find_path), but first snaps an unwalkable
    /// start or goal to the nearest walkable cell within the fallback radius.
    ///
    /// If nothing walkable is near, the original endpoint is searched and the
    /// result reports `found == false`.
    pub fn find_path_with_fallback(
        &mut self,
        start: Position,
        goal: Position,
        smooth: bool,
    ) -> PathResult {
        let start = self.snap(start);
        let goal = self.snap(goal);
        self.find_path(start, goal, smooth)
    }

    fn snap(&self, position: Position) -> Position {
        self.grid
            .find_nearest_walkable(position, self.fallback_radius)
            .unwrap_or(position)
    }

    // ========================================================================
    // Batch queue
    // ========================================================================

    /// Queues a request for the next [`process_batch`](Self::process_batch).
    ///
    /// The receiver resolves once the batch runs. Dropping it is fine; the
    /// request is still processed.
    pub fn request_path(
        &mut self,
        start: Position,
        goal: Position,
        smooth: bool,
    ) -> oneshot::Receiver<PathResult> {
        let (reply, receiver) = oneshot::channel();
        self.queue.push_back(PendingRequest {
            start,
            goal,
            smooth,
            reply,
        });
        receiver
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    /// Resolves every queued request, one after another in submission order.
    ///
    /// Returns the number of requests processed.
    pub fn process_batch(&mut self) -> usize {
        let mut count = 0;
        while let Some(request) = self.queue.pop_front() {
            let result = self.find_path(request.start, request.goal, request.smooth);
            // The caller may have dropped its receiver; that is not an error.
            let _ = request.reply.send(result);
            count += 1;
        }

        if count > 0 {
            self.bus.publish(PathEvent::BatchProcessed { count });
        }
        count
    }

    // ========================================================================
    // Observability
    // ========================================================================

    pub fn stats(&self) -> &PathStats {
        &self.stats
    }

    pub fn snapshot(&self) -> PathStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for PathManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathManager")
            .field("grid", &(self.grid.width(), self.grid.height()))
            .field("options", self.pathfinder.options())
            .field("cached", &self.cache.len())
            .field("pending", &self.queue.len())
            .finish()
    }
}
