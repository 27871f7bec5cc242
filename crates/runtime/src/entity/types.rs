//! Entity records and archetype tags.

use std::fmt;
use std::time::Duration;

use nav_core::{Position, Vec2};
use serde::{Deserialize, Serialize};
use state_machine::{Cadence, StateId, Stateful};

use super::movement::ARRIVAL_EPSILON;
use crate::behaviors::{GuardData, HunterData, MerchantData, PreserverData, SurvivorData};

/// Stable entity identifier. Ids increase monotonically, so ordering by id
/// is insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coordination group shared by cooperating entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Behavior category of an entity.
///
/// The five built-ins ship with the runtime; `Custom` ids are free for hosts
/// to register their own definitions under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Guard,
    Hunter,
    Survivor,
    Preserver,
    Merchant,
    Custom(u16),
}

impl Archetype {
    pub const BUILT_IN: [Archetype; 5] = [
        Archetype::Guard,
        Archetype::Hunter,
        Archetype::Survivor,
        Archetype::Preserver,
        Archetype::Merchant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Guard => "guard",
            Archetype::Hunter => "hunter",
            Archetype::Survivor => "survivor",
            Archetype::Preserver => "preserver",
            Archetype::Merchant => "merchant",
            Archetype::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::Custom(id) => write!(f, "custom:{id}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Per-archetype working data.
///
/// Replaces an untyped scratch map: each built-in behavior keeps its timers
/// and remembered positions in its own struct.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ArchetypeData {
    #[default]
    None,
    Guard(GuardData),
    Hunter(HunterData),
    Survivor(SurvivorData),
    Preserver(PreserverData),
    Merchant(MerchantData),
}

impl ArchetypeData {
    pub fn guard(&self) -> Option<&GuardData> {
        match self {
            ArchetypeData::Guard(data) => Some(data),
            _ => None,
        }
    }

    pub fn guard_mut(&mut self) -> Option<&mut GuardData> {
        match self {
            ArchetypeData::Guard(data) => Some(data),
            _ => None,
        }
    }

    pub fn hunter_mut(&mut self) -> Option<&mut HunterData> {
        match self {
            ArchetypeData::Hunter(data) => Some(data),
            _ => None,
        }
    }

    pub fn survivor_mut(&mut self) -> Option<&mut SurvivorData> {
        match self {
            ArchetypeData::Survivor(data) => Some(data),
            _ => None,
        }
    }

    pub fn preserver_mut(&mut self) -> Option<&mut PreserverData> {
        match self {
            ArchetypeData::Preserver(data) => Some(data),
            _ => None,
        }
    }

    pub fn merchant(&self) -> Option<&MerchantData> {
        match self {
            ArchetypeData::Merchant(data) => Some(data),
            _ => None,
        }
    }

    pub fn merchant_mut(&mut self) -> Option<&mut MerchantData> {
        match self {
            ArchetypeData::Merchant(data) => Some(data),
            _ => None,
        }
    }
}

/// Spawn-time overrides. Everything is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnOptions {
    /// Overrides the archetype's configured speed (cells per second).
    pub speed: Option<f32>,
    pub group: Option<GroupId>,
    /// Patrol points (guard), hunting waypoints (hunter), or trade hotspots
    /// (merchant).
    pub route: Vec<Position>,
    /// Orbit centre (preserver) or home cell (survivor). Defaults to the
    /// spawn cell.
    pub anchor: Option<Position>,
}

impl SpawnOptions {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_route(mut self, route: Vec<Position>) -> Self {
        self.route = route;
        self
    }

    pub fn with_anchor(mut self, anchor: Position) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// One agent in the entity table.
#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub archetype: Archetype,
    /// Continuous position; grid queries use [`cell`](Self::cell).
    pub position: Vec2,
    /// Goal of the current path, if any.
    pub target: Option<Position>,
    /// Cells per second.
    pub speed: f32,
    pub state: StateId,
    pub previous_state: Option<StateId>,
    /// Simulation time at which `state` was entered.
    pub state_entered_at: Duration,
    /// Waypoints including the start cell; `path_index` is the next one.
    pub path: Vec<Position>,
    pub path_index: usize,
    pub is_moving: bool,
    pub group: Option<GroupId>,
    pub cadence: Cadence,
    pub data: ArchetypeData,
}

impl Entity {
    pub fn new(id: EntityId, archetype: Archetype, cell: Position, speed: f32) -> Self {
        Self {
            id,
            archetype,
            position: cell.center(),
            target: None,
            speed,
            state: "",
            previous_state: None,
            state_entered_at: Duration::ZERO,
            path: Vec::new(),
            path_index: 0,
            is_moving: false,
            group: None,
            cadence: Cadence::default(),
            data: ArchetypeData::None,
        }
    }

    /// Grid cell under the entity.
    #[inline]
    pub fn cell(&self) -> Position {
        self.position.to_cell()
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    pub fn time_in_state(&self, now: Duration) -> Duration {
        now.saturating_sub(self.state_entered_at)
    }

    /// Installs a path and starts following it.
    ///
    /// An entity already centered on the start cell heads straight for the
    /// second waypoint; one stopped part-way across its cell first returns to
    /// the start cell's center so every leg it walks is one the path covers.
    pub fn set_path(&mut self, path: Vec<Position>) {
        self.target = path.last().copied();
        let centered = path
            .first()
            .is_some_and(|start| self.position.distance(start.center()) <= ARRIVAL_EPSILON);
        self.path_index = if centered { 1.min(path.len()) } else { 0 };
        self.is_moving = path.len() > 1;
        self.path = path;
        if !self.is_moving {
            self.path.clear();
            self.path_index = 0;
        }
    }

    /// Drops the current path and stops.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.is_moving = false;
    }

    pub fn next_waypoint(&self) -> Option<Position> {
        self.path.get(self.path_index).copied()
    }

    pub fn has_path(&self) -> bool {
        self.is_moving && self.path_index < self.path.len()
    }

    pub fn is_in_group(&self, group: GroupId) -> bool {
        self.group == Some(group)
    }
}

impl Stateful for Entity {
    fn current_state(&self) -> StateId {
        self.state
    }

    fn switch_state(&mut self, to: StateId) {
        if !self.state.is_empty() {
            self.previous_state = Some(self.state);
        }
        self.state = to;
        self.clear_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_path_skips_start_cell() {
        let mut entity = Entity::new(EntityId(1), Archetype::Guard, Position::new(0, 0), 1.0);
        entity.set_path(vec![Position::new(0, 0), Position::new(3, 0)]);

        assert!(entity.is_moving);
        assert_eq!(entity.next_waypoint(), Some(Position::new(3, 0)));
        assert_eq!(entity.target, Some(Position::new(3, 0)));

        entity.set_path(vec![Position::new(0, 0)]);
        assert!(!entity.is_moving);
        assert!(!entity.has_path());
    }

    #[test]
    fn off_center_entity_rejoins_start_cell_first() {
        let mut entity = Entity::new(EntityId(1), Archetype::Guard, Position::new(0, 0), 1.0);
        entity.position = Vec2::new(0.3, 0.2);
        entity.set_path(vec![Position::new(0, 0), Position::new(3, 0)]);

        assert!(entity.is_moving);
        assert_eq!(entity.next_waypoint(), Some(Position::new(0, 0)));
    }

    #[test]
    fn switching_state_records_previous_and_clears_path() {
        let mut entity = Entity::new(EntityId(1), Archetype::Guard, Position::new(0, 0), 1.0);
        entity.switch_state("patrol");
        assert_eq!(entity.previous_state, None);

        entity.set_path(vec![Position::new(0, 0), Position::new(1, 0)]);
        entity.switch_state("attack");

        assert_eq!(entity.previous_state, Some("patrol"));
        assert!(entity.path.is_empty());
        assert!(!entity.is_moving);
    }

    #[test]
    fn archetype_display() {
        assert_eq!(Archetype::Merchant.to_string(), "merchant");
        assert_eq!(Archetype::Custom(3).to_string(), "custom:3");
    }
}
