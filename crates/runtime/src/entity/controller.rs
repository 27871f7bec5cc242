//! The tick driver and public entity API.

use std::collections::BTreeMap;
use std::time::Duration;

use nav_core::{Grid, Position, Vec2};
use state_machine::{StateId, Step};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::movement::MovementOutcome;
use super::types::{Archetype, Entity, EntityId, SpawnOptions};
use super::world::{TrackedSubject, World};
use crate::behaviors::BehaviorRegistry;
use crate::clock::ManualClock;
use crate::config::EngineConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{EntityEvent, Event, EventBus, Topic};
use crate::paths::{PathManager, PathStatsSnapshot};

/// Owns the entity table and drives every entity once per tick.
///
/// Each [`update`](Self::update) runs two passes in insertion order:
/// 1. think: entities whose cadence fired evaluate their current state
/// 2. move: every entity advances along its path
pub struct EntityController {
    world: World,
    registry: BehaviorRegistry,
    clock: ManualClock,
    next_id: u32,
}

impl EntityController {
    /// Controller with the built-in behaviors.
    pub fn new(grid: Grid, config: EngineConfig) -> Self {
        let registry = BehaviorRegistry::default_behaviors(&config);
        Self::with_registry(grid, config, registry)
    }

    pub fn with_registry(grid: Grid, config: EngineConfig, registry: BehaviorRegistry) -> Self {
        let clock = ManualClock::new();
        let bus = EventBus::with_capacity(config.event_buffer_size);
        let paths = PathManager::new(
            grid,
            config.search.clone(),
            config.cache,
            Box::new(clock.clone()),
            bus.clone(),
        )
        .with_fallback_radius(config.fallback_radius);

        Self {
            world: World::new(paths, config, bus),
            registry,
            clock,
            next_id: 0,
        }
    }

    pub fn builder() -> EntityControllerBuilder {
        EntityControllerBuilder::new()
    }

    // ========================================================================
    // Entity lifecycle
    // ========================================================================

    /// Spawns an entity and enters its behavior's initial state.
    ///
    /// An unwalkable spawn cell is snapped to the nearest walkable one.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::UnknownArchetype`] if no behavior is registered.
    pub fn spawn(
        &mut self,
        archetype: Archetype,
        position: Position,
        options: SpawnOptions,
    ) -> Result<EntityId> {
        let behavior = self
            .registry
            .get(archetype)
            .ok_or(RuntimeError::UnknownArchetype(archetype))?;

        let grid = self.world.grid();
        let cell = grid
            .find_nearest_walkable(grid.clamp(position), grid.width().max(grid.height()))
            .unwrap_or_else(|| grid.clamp(position));

        self.next_id += 1;
        let id = EntityId(self.next_id);
        let speed = options.speed.unwrap_or(behavior.speed);

        let mut entity = Entity::new(id, archetype, cell, speed);
        entity.group = options.group;
        entity.cadence = state_machine::Cadence::new(behavior.definition.think_interval());
        entity.data = behavior.initial_data(cell, &options, grid);
        entity.state_entered_at = self.world.now();

        behavior.definition.enter_initial(&mut entity, &mut self.world);
        let state = entity.state;
        self.world.insert_entity(entity);

        debug!(%id, %archetype, %cell, state, "entity spawned");
        self.world.publish(EntityEvent::Spawned {
            entity: id,
            archetype,
            position: cell,
        });
        Ok(id)
    }

    /// Removes an entity from the table and returns it.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity> {
        let entity = self
            .world
            .take_entity(id)
            .ok_or(RuntimeError::EntityNotFound(id))?;
        debug!(%id, "entity removed");
        self.world.publish(EntityEvent::Removed { entity: id });
        Ok(entity)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.world.entity(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.world.entity_mut(id)
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.world.entities()
    }

    pub fn len(&self) -> usize {
        self.world.entity_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entities in each state.
    pub fn state_counts(&self) -> BTreeMap<StateId, usize> {
        let mut counts = BTreeMap::new();
        for entity in self.world.entities() {
            *counts.entry(entity.state).or_insert(0) += 1;
        }
        counts
    }

    // ========================================================================
    // Host inputs
    // ========================================================================

    pub fn set_subject(&mut self, position: Vec2, dangerous: bool) {
        self.world
            .set_subject(Some(TrackedSubject::new(position, dangerous)));
    }

    pub fn clear_subject(&mut self) {
        self.world.set_subject(None);
    }

    pub fn subject(&self) -> Option<TrackedSubject> {
        self.world.subject()
    }

    /// Edits one grid cell; the path cache is invalidated.
    pub fn set_walkable(&mut self, position: Position, walkable: bool) -> Result<()> {
        self.world.paths_mut().set_walkable(position, walkable)?;
        Ok(())
    }

    /// Replaces the grid; the path cache is invalidated.
    pub fn set_grid(&mut self, grid: Grid) {
        self.world.paths_mut().set_grid(grid);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the simulation by `delta`.
    pub fn update(&mut self, delta: Duration) {
        self.world.advance_time(delta);
        self.clock.advance(delta);

        let ids = self.world.entity_ids();
        for &id in &ids {
            self.think(id, delta);
        }
        for id in ids {
            self.advance(id, delta);
        }
    }

    fn think(&mut self, id: EntityId, delta: Duration) {
        let Some(mut entity) = self.world.take_entity(id) else {
            return;
        };

        if entity.cadence.advance(delta)
            && let Some(behavior) = self.registry.get(entity.archetype)
        {
            let step = behavior.definition.evaluate(&mut entity, &mut self.world);
            self.apply_step(&mut entity, step);
        }

        self.world.insert_entity(entity);
    }

    fn apply_step(&mut self, entity: &mut Entity, step: Step) {
        match step {
            Step::Unchanged => {}
            Step::Changed { from, to } => {
                entity.state_entered_at = self.world.now();
                debug!(entity = %entity.id, from, to, "state changed");
                self.world.publish(EntityEvent::StateChanged {
                    entity: entity.id,
                    from,
                    to,
                });
            }
            Step::Rejected { current, requested } => {
                warn!(
                    entity = %entity.id,
                    archetype = %entity.archetype,
                    current,
                    requested,
                    "behavior requested an unknown state; staying"
                );
                self.world.publish(EntityEvent::UnknownState {
                    entity: entity.id,
                    current,
                    requested,
                });
            }
            Step::MissingCurrent { current } => {
                warn!(
                    entity = %entity.id,
                    archetype = %entity.archetype,
                    current,
                    "entity is in a state its behavior does not define"
                );
                self.world.publish(EntityEvent::UnknownState {
                    entity: entity.id,
                    current,
                    requested: current,
                });
            }
        }
    }

    fn advance(&mut self, id: EntityId, delta: Duration) {
        match self.world.advance_entity(id, delta) {
            Some(MovementOutcome::Arrived(position)) => {
                self.world.publish(EntityEvent::Arrived {
                    entity: id,
                    position,
                });
            }
            Some(MovementOutcome::Blocked(at)) => {
                warn!(entity = %id, %at, "path blocked; dropping it");
                self.world
                    .publish(EntityEvent::PathBlocked { entity: id, at });
            }
            None => {}
        }
    }

    // ========================================================================
    // Observability
    // ========================================================================

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.world.bus().subscribe(topic)
    }

    pub fn path_stats(&self) -> PathStatsSnapshot {
        self.world.paths().snapshot()
    }

    pub fn now(&self) -> Duration {
        self.world.now()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        self.world.config()
    }
}

impl std::fmt::Debug for EntityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityController")
            .field("world", &self.world)
            .field("archetypes", &self.registry.archetypes())
            .finish()
    }
}

/// Builder for [`EntityController`].
#[derive(Default)]
pub struct EntityControllerBuilder {
    grid: Option<Grid>,
    config: EngineConfig,
    registry: Option<BehaviorRegistry>,
}

impl EntityControllerBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Set the required walkability grid
    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Override engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a custom behavior registry.
    ///
    /// If not provided, [`BehaviorRegistry::default_behaviors`] is built from
    /// the configuration.
    pub fn registry(mut self, registry: BehaviorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<EntityController> {
        let grid = self.grid.ok_or(RuntimeError::MissingGrid)?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => BehaviorRegistry::default_behaviors(&self.config),
        };
        Ok(EntityController::with_registry(grid, self.config, registry))
    }
}
