//! Grid navigation primitives shared by the agent runtime and offline tools.
//!
//! `nav-core` owns the pure, side-effect-free half of pathfinding:
//! - [`grid`] holds the walkability map and its text format
//! - [`frontier`] is the priority-ordered open set used by A*
//! - [`search`] runs A* and reports progress through [`events`]
//! - [`smoothing`] turns cell paths into line-of-sight waypoints
//!
//! Nothing in here logs, caches, or keeps state between calls; caching and
//! scheduling live in `agent-runtime`.
pub mod config;
pub mod error;
pub mod events;
pub mod frontier;
pub mod geometry;
pub mod grid;
pub mod search;
pub mod smoothing;

pub use config::{Heuristic, SearchOptions};
pub use error::{ErrorSeverity, NavError};
pub use events::{NullObserver, RecordingObserver, SearchEvent, SearchObserver, VisitedNode};
pub use frontier::PriorityFrontier;
pub use geometry::{Line, Position, Vec2, swept_cells};
pub use grid::{Grid, GridError};
pub use search::{PathResult, Pathfinder, SearchNode, neighbors};
pub use smoothing::{interpolate_path, path_length, smooth_path};
