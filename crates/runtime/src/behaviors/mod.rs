//! Built-in archetype behaviors and the registry that maps archetypes to them.
//!
//! Each behavior is a [`BehaviorDefinition`] value whose states are unit
//! structs implementing [`State<Entity, World>`](state_machine::State). States read
//! their tuning from [`World::config`] on every call, so a registry built
//! once keeps following the controller's configuration.

pub mod guard;
pub mod hunter;
pub mod merchant;
pub mod preserver;
pub mod survivor;

use std::collections::HashMap;
use std::time::Duration;

use nav_core::{Grid, Position};
use state_machine::BehaviorDefinition;

use crate::config::EngineConfig;
use crate::entity::{Archetype, ArchetypeData, Entity, SpawnOptions, World};
use crate::error::Result;

pub use guard::GuardData;
pub use hunter::HunterData;
pub use merchant::MerchantData;
pub use preserver::PreserverData;
pub use survivor::SurvivorData;

/// A state machine over runtime entities.
pub type Behavior = BehaviorDefinition<Entity, World>;

/// Builds an entity's working data at spawn time.
pub type DataFactory =
    Box<dyn Fn(Position, &SpawnOptions, &Grid) -> ArchetypeData + Send + Sync + 'static>;

/// Everything the controller needs to spawn and drive one archetype.
pub struct ArchetypeBehavior {
    pub definition: Behavior,
    /// Default speed in cells per second.
    pub speed: f32,
    init: DataFactory,
}

impl ArchetypeBehavior {
    /// A behavior whose entities carry no working data.
    pub fn new(definition: Behavior, speed: f32) -> Self {
        Self {
            definition,
            speed,
            init: Box::new(|_, _, _| ArchetypeData::None),
        }
    }

    pub fn with_data<F>(mut self, init: F) -> Self
    where
        F: Fn(Position, &SpawnOptions, &Grid) -> ArchetypeData + Send + Sync + 'static,
    {
        self.init = Box::new(init);
        self
    }

    pub fn initial_data(&self, spawn: Position, options: &SpawnOptions, grid: &Grid) -> ArchetypeData {
        (self.init)(spawn, options, grid)
    }
}

impl std::fmt::Debug for ArchetypeBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchetypeBehavior")
            .field("definition", &self.definition)
            .field("speed", &self.speed)
            .finish()
    }
}

/// Archetype → behavior lookup used by the controller.
///
/// The controller itself is archetype-agnostic; new archetypes are added by
/// registering a definition here.
#[derive(Debug, Default)]
pub struct BehaviorRegistry {
    behaviors: HashMap<Archetype, ArchetypeBehavior>,
}

impl BehaviorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the five built-in behaviors.
    pub fn default_behaviors(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        registry.insert(Archetype::Guard, guard::behavior(&config.guard));
        registry.insert(Archetype::Hunter, hunter::behavior(&config.hunter));
        registry.insert(Archetype::Survivor, survivor::behavior(&config.survivor));
        registry.insert(Archetype::Preserver, preserver::behavior(&config.preserver));
        registry.insert(Archetype::Merchant, merchant::behavior(&config.merchant));
        registry
    }

    /// Validates and registers a behavior, returning the one it replaced.
    pub fn register(
        &mut self,
        archetype: Archetype,
        behavior: ArchetypeBehavior,
    ) -> Result<Option<ArchetypeBehavior>> {
        behavior.definition.validate()?;
        Ok(self.insert(archetype, behavior))
    }

    fn insert(
        &mut self,
        archetype: Archetype,
        behavior: ArchetypeBehavior,
    ) -> Option<ArchetypeBehavior> {
        self.behaviors.insert(archetype, behavior)
    }

    pub fn get(&self, archetype: Archetype) -> Option<&ArchetypeBehavior> {
        self.behaviors.get(&archetype)
    }

    pub fn contains(&self, archetype: Archetype) -> bool {
        self.behaviors.contains_key(&archetype)
    }

    /// Registered archetypes in a stable order.
    pub fn archetypes(&self) -> Vec<Archetype> {
        let mut archetypes: Vec<_> = self.behaviors.keys().copied().collect();
        archetypes.sort();
        archetypes
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// True once `span` has passed since `at` (or when `at` was never set).
pub(crate) fn elapsed_since(now: Duration, at: Option<Duration>, span: Duration) -> bool {
    at.is_none_or(|at| now.saturating_sub(at) >= span)
}

/// Next index in a cyclic route.
pub(crate) fn next_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}

/// Snaps every route point onto a walkable cell, dropping the hopeless ones.
pub(crate) fn walkable_route(grid: &Grid, route: &[Position], radius: u32) -> Vec<Position> {
    route
        .iter()
        .filter_map(|&point| grid.find_nearest_walkable(grid.clamp(point), radius))
        .collect()
}

/// Square loop of half-width `radius` around `center`, snapped to walkable cells.
pub(crate) fn square_route(grid: &Grid, center: Position, radius: i32) -> Vec<Position> {
    let corners = [
        center.offset(-radius, -radius),
        center.offset(radius, -radius),
        center.offset(radius, radius),
        center.offset(-radius, radius),
    ];
    let mut route = walkable_route(grid, &corners, radius.unsigned_abs().max(1));
    route.dedup();
    route
}
