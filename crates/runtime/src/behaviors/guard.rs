//! Guard: patrols a route and engages a dangerous subject, coordinating
//! flanking positions with other guards in its group.
//!
//! ```text
//! patrol ──sees danger──▶ attack ──lost sight > timeout──▶ investigate ──timeout──▶ patrol
//!   │                      │  ▲                                 ▲
//!   └──alerted────────────────────────────────────────────────┘
//!                          │  └── coordinate (grouped, on interval)
//!                          └── retreat (alone, in strike range; timed)
//! ```

use std::f32::consts::TAU;
use std::time::Duration;

use nav_core::Position;
use state_machine::{State, StateId, Transition};
use tracing::debug;

use super::{ArchetypeBehavior, Behavior, elapsed_since, next_index, square_route, walkable_route};
use crate::config::GuardConfig;
use crate::entity::{Archetype, ArchetypeData, Entity, EntityId, World};

pub const PATROL: StateId = "patrol";
pub const INVESTIGATE: StateId = "investigate";
pub const ATTACK: StateId = "attack";
pub const RETREAT: StateId = "retreat";
pub const COORDINATE: StateId = "coordinate";

const SNAP_RADIUS: u32 = 3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuardData {
    pub patrol_points: Vec<Position>,
    pub patrol_index: usize,
    /// Last cell the subject was seen on.
    pub last_seen: Option<Position>,
    pub last_seen_at: Option<Duration>,
    /// Shared by the whole group once anyone coordinates.
    pub last_coordinated_at: Option<Duration>,
    /// Position assigned by a coordinating group member.
    pub flank_target: Option<Position>,
    /// Set by other entities (guards, merchants) to send this guard somewhere.
    pub alerted_to: Option<Position>,
}

pub fn behavior(config: &GuardConfig) -> ArchetypeBehavior {
    let patrol_radius = config.patrol_radius;
    let definition = Behavior::new("guard", PATROL, config.think_interval())
        .with_state(PATROL, Patrol)
        .with_state(INVESTIGATE, Investigate)
        .with_state(ATTACK, Attack)
        .with_state(RETREAT, Retreat)
        .with_state(COORDINATE, Coordinate);

    ArchetypeBehavior::new(definition, config.speed).with_data(move |spawn, options, grid| {
        let mut patrol_points = walkable_route(grid, &options.route, SNAP_RADIUS);
        if patrol_points.is_empty() {
            patrol_points = square_route(grid, options.anchor.unwrap_or(spawn), patrol_radius);
        }
        ArchetypeData::Guard(GuardData {
            patrol_points,
            ..GuardData::default()
        })
    })
}

fn remember_subject(agent: &mut Entity, world: &World) {
    if let Some(subject) = world.subject()
        && let Some(data) = agent.data.guard_mut()
    {
        data.last_seen = Some(subject.cell());
        data.last_seen_at = Some(world.now());
    }
}

fn patrol_step(agent: &mut Entity, world: &mut World) {
    let cell = agent.cell();
    let Some(data) = agent.data.guard_mut() else {
        return;
    };
    let len = data.patrol_points.len();
    if len == 0 {
        return;
    }
    data.patrol_index %= len;
    if data.patrol_points[data.patrol_index] == cell {
        data.patrol_index = next_index(data.patrol_index, len);
    }
    let point = data.patrol_points[data.patrol_index];

    if !world.move_to(agent, point)
        && let Some(data) = agent.data.guard_mut()
    {
        // Unreachable point: try the next one on the following think.
        data.patrol_index = next_index(data.patrol_index, len);
    }
}

struct Patrol;

impl State<Entity, World> for Patrol {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        patrol_step(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().guard;
        if world.sees_danger(agent, cfg.detection_radius) {
            remember_subject(agent, world);
            return Transition::To(ATTACK);
        }

        let now = world.now();
        if let Some(data) = agent.data.guard_mut()
            && let Some(spot) = data.alerted_to.take()
        {
            data.last_seen = Some(spot);
            data.last_seen_at = Some(now);
            return Transition::To(INVESTIGATE);
        }

        if !agent.is_moving {
            patrol_step(agent, world);
        }
        Transition::Stay
    }
}

struct Investigate;

impl State<Entity, World> for Investigate {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let goal = agent
            .data
            .guard_mut()
            .and_then(|data| data.flank_target.take().or(data.last_seen));
        if let Some(goal) = goal {
            world.move_to(agent, goal);
        }
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().guard;
        if world.sees_danger(agent, cfg.detection_radius) {
            remember_subject(agent, world);
            return Transition::To(ATTACK);
        }
        if agent.time_in_state(world.now()) >= cfg.investigate_duration() {
            return Transition::To(PATROL);
        }
        Transition::Stay
    }
}

/// Heads for the flank slot if one is assigned, else the last sighting.
fn chase(agent: &mut Entity, world: &mut World) {
    let cell = agent.cell();
    let goal = agent.data.guard_mut().and_then(|data| {
        if data.flank_target == Some(cell) {
            data.flank_target = None;
        }
        data.flank_target.or(data.last_seen)
    });
    if let Some(goal) = goal {
        world.move_to(agent, goal);
    }
}

struct Attack;

impl State<Entity, World> for Attack {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        chase(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().guard;
        let now = world.now();
        let Some(subject) = world.subject().filter(|subject| subject.dangerous) else {
            return Transition::To(PATROL);
        };

        if world.can_see_subject(agent, cfg.detection_radius) {
            remember_subject(agent, world);
        } else {
            let last_seen_at = agent.data.guard().and_then(|data| data.last_seen_at);
            if elapsed_since(now, last_seen_at, cfg.lose_sight_timeout()) {
                return Transition::To(INVESTIGATE);
            }
        }

        let last_coordinated_at = agent.data.guard().and_then(|data| data.last_coordinated_at);
        if agent.group.is_some()
            && elapsed_since(now, last_coordinated_at, cfg.coordination_interval())
        {
            return Transition::To(COORDINATE);
        }

        if agent.group.is_none() && agent.distance_to(subject.position) <= cfg.attack_radius {
            return Transition::To(RETREAT);
        }

        chase(agent, world);
        Transition::Stay
    }
}

struct Retreat;

impl State<Entity, World> for Retreat {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let cfg = world.config().guard;
        if let Some(subject) = world.subject() {
            world.move_away_from(agent, subject.position, cfg.retreat_distance);
        }
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().guard;
        if agent.time_in_state(world.now()) < cfg.retreat_duration() {
            return Transition::Stay;
        }
        if world.sees_danger(agent, cfg.detection_radius) {
            Transition::To(ATTACK)
        } else {
            Transition::To(PATROL)
        }
    }
}

/// Spreads the group evenly around the subject.
///
/// Siblings get their slot written straight into their data; they act on it
/// at their own next think.
struct Coordinate;

impl State<Entity, World> for Coordinate {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let cfg = world.config().guard;
        let now = world.now();
        let (Some(group), Some(subject)) = (agent.group, world.subject()) else {
            return;
        };

        let siblings: Vec<EntityId> = world
            .entities()
            .filter(|other| other.archetype == Archetype::Guard && other.is_in_group(group))
            .map(|other| other.id)
            .collect();
        let slots = siblings.len() + 1;
        let base = subject.position.angle_to(agent.position);
        let slot = |index: usize| {
            let angle = base + TAU * index as f32 / slots as f32;
            world.walkable_near_point(
                subject.position.polar_offset(angle, cfg.flank_distance),
                SNAP_RADIUS,
            )
        };
        let own_slot = slot(0);
        let assignments: Vec<(EntityId, Position)> = siblings
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, slot(index + 1)))
            .collect();

        for &(id, flank) in &assignments {
            let Some(sibling) = world.entity_mut(id) else {
                continue;
            };
            let engaged = sibling.state == ATTACK;
            if let Some(data) = sibling.data.guard_mut() {
                data.flank_target = Some(flank);
                data.last_seen = Some(subject.cell());
                data.last_seen_at = Some(now);
                data.last_coordinated_at = Some(now);
                if !engaged {
                    data.alerted_to = Some(flank);
                }
            }
        }

        if let Some(data) = agent.data.guard_mut() {
            data.flank_target = Some(own_slot);
            data.last_coordinated_at = Some(now);
        }
        world.move_to(agent, own_slot);
        debug!(
            entity = %agent.id,
            group = group.0,
            members = slots,
            "guard group coordinated"
        );
    }

    fn update(&self, _agent: &mut Entity, _world: &mut World) -> Transition {
        Transition::To(ATTACK)
    }
}
