//! Route computation with caching, batching, and statistics.
//!
//! [`PathManager`] is the only thing in the runtime that calls the A*
//! pathfinder. It owns the [`Grid`](nav_core::Grid) so that every geometry
//! change goes through it and invalidates the cache.

mod cache;
mod manager;
mod stats;

pub use cache::{PathCache, PathKey};
pub use manager::PathManager;
pub use stats::{CalculationRecord, PathStats, PathStatsSnapshot};
