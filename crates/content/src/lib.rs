//! Data-driven content for the agent runtime.
//!
//! Loaders read plain files into runtime types:
//! - grid maps, as `.`/`#` text or RON (dimensions + blocked cells)
//! - engine tuning (`EngineConfig`) from TOML
//! - scenarios (who spawns where, plus an optional tracked subject) from RON
//!
//! [`ContentFactory`] ties them together into a ready [`EntityController`].
//!
//! [`EntityController`]: agent_runtime::EntityController

pub mod loaders;

pub use loaders::{
    ConfigLoader, ContentFactory, GridLoader, LoadResult, Scenario, ScenarioLoader, SpawnSpec,
    SubjectSpec,
};
