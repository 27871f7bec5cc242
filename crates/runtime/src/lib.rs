//! Tick-driven agent runtime on top of `nav-core`.
//!
//! This crate owns everything that keeps state between ticks: the path cache,
//! the entity table, and the per-archetype state machines that decide where
//! each agent wants to go. Hosts construct one [`EntityController`] per
//! session and call [`EntityController::update`] once per frame.
//!
//! Modules are organized by responsibility:
//! - [`paths`] wraps the pathfinder with a TTL cache, statistics, and a batch queue
//! - [`entity`] hosts the entity table, perception helpers, and the controller
//! - [`behaviors`] defines the built-in archetypes and the [`BehaviorRegistry`]
//! - [`events`] provides the topic-based event bus for debug tooling
//! - [`config`] holds serde-friendly tuning for all of the above
pub mod behaviors;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod paths;

pub use behaviors::{ArchetypeBehavior, Behavior, BehaviorRegistry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CacheConfig, EngineConfig, GuardConfig, HunterConfig, MerchantConfig, PreserverConfig,
    SurvivorConfig,
};
pub use entity::{
    Archetype, ArchetypeData, Entity, EntityController, EntityControllerBuilder, EntityId,
    GroupId, SpawnOptions, TrackedSubject, World,
};
pub use error::{Result, RuntimeError};
pub use events::{EntityEvent, Event, EventBus, PathEvent, Topic};
pub use paths::{CalculationRecord, PathKey, PathManager, PathStats, PathStatsSnapshot};
