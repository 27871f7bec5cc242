//! Shared context handed to behaviors: entities, paths, subject, clock.

use std::collections::BTreeMap;
use std::time::Duration;

use nav_core::{Grid, Position, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::movement::{self, MovementOutcome};
use super::types::{Archetype, Entity, EntityId};
use crate::config::EngineConfig;
use crate::events::{Event, EventBus};
use crate::paths::PathManager;

/// The host-provided tracked subject (usually the player).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedSubject {
    pub position: Vec2,
    /// Whether agents should react to the subject defensively or aggressively.
    pub dangerous: bool,
}

impl TrackedSubject {
    pub fn new(position: Vec2, dangerous: bool) -> Self {
        Self {
            position,
            dangerous,
        }
    }

    pub fn cell(&self) -> Position {
        self.position.to_cell()
    }
}

/// Everything a behavior may observe or change besides its own entity.
///
/// While a behavior runs, its own entity is *not* in the table, so entity
/// queries never return the caller.
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    paths: PathManager,
    subject: Option<TrackedSubject>,
    rng: StdRng,
    elapsed: Duration,
    config: EngineConfig,
    bus: EventBus,
}

impl World {
    pub(crate) fn new(paths: PathManager, config: EngineConfig, bus: EventBus) -> Self {
        Self {
            entities: BTreeMap::new(),
            paths,
            subject: None,
            rng: StdRng::seed_from_u64(config.seed),
            elapsed: Duration::ZERO,
            config,
            bus,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Simulation time since the controller was created.
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn advance_time(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        self.paths.grid()
    }

    pub fn paths(&self) -> &PathManager {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut PathManager {
        &mut self.paths
    }

    pub fn subject(&self) -> Option<TrackedSubject> {
        self.subject
    }

    pub fn set_subject(&mut self, subject: Option<TrackedSubject>) {
        self.subject = subject;
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn publish(&self, event: impl Into<Event>) {
        self.bus.publish(event);
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ========================================================================
    // Entity table
    // ========================================================================

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub(crate) fn insert_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    pub(crate) fn take_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub(crate) fn advance_entity(
        &mut self,
        id: EntityId,
        delta: Duration,
    ) -> Option<MovementOutcome> {
        let entity = self.entities.get_mut(&id)?;
        movement::advance(entity, self.paths.grid(), delta)
    }

    // ========================================================================
    // Movement requests
    // ========================================================================

    /// Routes `agent` toward `goal` (clamped into the grid).
    ///
    /// Keeps the current path when it already leads to the same goal.
    /// Unwalkable endpoints snap to the nearest walkable cell. Returns false
    /// when no route exists; the agent is then stopped.
    pub fn move_to(&mut self, agent: &mut Entity, goal: Position) -> bool {
        let goal = self.grid().clamp(goal);
        if agent.has_path() && agent.target == Some(goal) {
            return true;
        }

        let smooth = self.config.smooth_paths;
        let result = self
            .paths
            .find_path_with_fallback(agent.cell(), goal, smooth);
        if result.found {
            agent.set_path(result.path);
            true
        } else {
            agent.clear_path();
            false
        }
    }

    /// Moves `agent` toward a continuous point.
    pub fn move_toward(&mut self, agent: &mut Entity, point: Vec2) -> bool {
        self.move_to(agent, point.to_cell())
    }

    /// Moves `agent` `distance` cells directly away from `threat`.
    pub fn move_away_from(&mut self, agent: &mut Entity, threat: Vec2, distance: f32) -> bool {
        let goal = self.point_away_from(agent.position, threat, distance);
        self.move_to(agent, goal)
    }

    pub fn stop(&self, agent: &mut Entity) {
        agent.clear_path();
    }

    // ========================================================================
    // Perception
    // ========================================================================

    /// Bresenham line of sight; only intermediate cells must be walkable.
    pub fn has_line_of_sight(&self, from: Position, to: Position) -> bool {
        self.grid().has_line_of_sight(from, to)
    }

    /// Nearest walkable cell to `position` (clamped into the grid first).
    pub fn find_walkable_position_near(&self, position: Position, radius: u32) -> Option<Position> {
        let grid = self.grid();
        grid.find_nearest_walkable(grid.clamp(position), radius)
    }

    /// Uniformly random walkable cell anywhere on the grid.
    pub fn find_random_walkable_position(&mut self) -> Option<Position> {
        let count = self.paths.grid().walkable_count();
        if count == 0 {
            return None;
        }
        let pick = self.rng.gen_range(0..count);
        self.paths.grid().walkable_cells().nth(pick)
    }

    /// Random walkable cell within `radius` of `center`.
    ///
    /// Falls back to the nearest walkable cell when sampling keeps missing.
    pub fn find_random_walkable_near(&mut self, center: Position, radius: i32) -> Option<Position> {
        const ATTEMPTS: usize = 12;
        let radius = radius.max(0);
        for _ in 0..ATTEMPTS {
            let dx = self.rng.gen_range(-radius..=radius);
            let dy = self.rng.gen_range(-radius..=radius);
            let candidate = center.offset(dx, dy);
            if self.grid().is_walkable(candidate) {
                return Some(candidate);
            }
        }
        self.find_walkable_position_near(center, radius.unsigned_abs())
    }

    /// Entities within `radius` of `position`, in insertion order.
    pub fn find_entities_near(
        &self,
        position: Vec2,
        radius: f32,
        filter: Option<Archetype>,
    ) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| filter.is_none_or(|archetype| entity.archetype == archetype))
            .filter(|entity| entity.position.distance(position) <= radius)
            .map(|entity| entity.id)
            .collect()
    }

    /// Closest entity to `position`; ties go to the earliest spawned.
    pub fn find_nearest_entity(&self, position: Vec2, filter: Option<Archetype>) -> Option<EntityId> {
        self.entities
            .values()
            .filter(|entity| filter.is_none_or(|archetype| entity.archetype == archetype))
            .map(|entity| (entity.id, entity.position.distance(position)))
            .fold(None, |best: Option<(EntityId, f32)>, (id, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((id, distance)),
            })
            .map(|(id, _)| id)
    }

    pub fn distance_to_subject(&self, from: Vec2) -> Option<f32> {
        self.subject.map(|subject| subject.position.distance(from))
    }

    /// Subject within `radius` of `agent` with clear line of sight.
    pub fn can_see_subject(&self, agent: &Entity, radius: f32) -> bool {
        self.subject.is_some_and(|subject| {
            subject.position.distance(agent.position) <= radius
                && self.has_line_of_sight(agent.cell(), subject.cell())
        })
    }

    /// Dangerous subject that `agent` can see within `radius`.
    pub fn sees_danger(&self, agent: &Entity, radius: f32) -> bool {
        self.subject.is_some_and(|subject| subject.dangerous) && self.can_see_subject(agent, radius)
    }

    /// Dangerous subject within `radius`, walls ignored.
    pub fn senses_danger(&self, agent: &Entity, radius: f32) -> bool {
        self.subject.is_some_and(|subject| {
            subject.dangerous && subject.position.distance(agent.position) <= radius
        })
    }

    /// Cell `distance` away from `threat`, on the far side of `from`,
    /// clamped into the grid.
    pub fn point_away_from(&self, from: Vec2, threat: Vec2, distance: f32) -> Position {
        let direction = (from - threat).normalized().unwrap_or(Vec2::new(1.0, 0.0));
        self.grid()
            .clamp((from + direction.scale(distance)).to_cell())
    }

    /// Clamps and snaps a point to a walkable cell near it.
    pub fn walkable_near_point(&self, point: Vec2, radius: u32) -> Position {
        let cell = self.grid().clamp(point.to_cell());
        self.grid().find_nearest_walkable(cell, radius).unwrap_or(cell)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("paths", &self.paths)
            .field("subject", &self.subject)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}
