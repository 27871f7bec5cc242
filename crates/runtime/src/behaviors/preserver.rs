//! Preserver: orbits a centre point and fights a dangerous subject with a
//! hit-and-run cycle.
//!
//! `patrol → approach → attack → retreat → reposition → approach → ...`
//!
//! While approaching it holds an ideal stand-off distance at its current
//! attack angle; after each strike the angle rotates so the next pass comes
//! from a different side.

use std::time::Duration;

use nav_core::{Position, Vec2};
use state_machine::{State, StateId, Transition};

use super::{ArchetypeBehavior, Behavior, elapsed_since};
use crate::config::PreserverConfig;
use crate::entity::{ArchetypeData, Entity, World};

pub const PATROL: StateId = "patrol";
pub const APPROACH: StateId = "approach";
pub const ATTACK: StateId = "attack";
pub const RETREAT: StateId = "retreat";
pub const REPOSITION: StateId = "reposition";

const SNAP_RADIUS: u32 = 3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreserverData {
    pub center: Position,
    /// Current angle on the patrol orbit (radians).
    pub orbit_angle: f32,
    /// Side of the subject to attack from (radians, subject → preserver).
    pub attack_angle: f32,
    pub last_attack_at: Option<Duration>,
}

pub fn behavior(config: &PreserverConfig) -> ArchetypeBehavior {
    let definition = Behavior::new("preserver", PATROL, config.think_interval())
        .with_state(PATROL, Patrol)
        .with_state(APPROACH, Approach)
        .with_state(ATTACK, Attack)
        .with_state(RETREAT, Retreat)
        .with_state(REPOSITION, Reposition);

    ArchetypeBehavior::new(definition, config.speed).with_data(|spawn, options, _grid| {
        ArchetypeData::Preserver(PreserverData {
            center: options.anchor.unwrap_or(spawn),
            ..PreserverData::default()
        })
    })
}

fn engaged_subject(agent: &Entity, world: &World) -> Option<Vec2> {
    let radius = world.config().preserver.detection_radius;
    if world.sees_danger(agent, radius) {
        world.subject().map(|subject| subject.position)
    } else {
        None
    }
}

fn stand_off_point(world: &World, subject: Vec2, angle: f32) -> Position {
    let distance = world.config().preserver.ideal_distance;
    world.walkable_near_point(subject.polar_offset(angle, distance), SNAP_RADIUS)
}

fn orbit_step(agent: &mut Entity, world: &mut World) {
    let cfg = world.config().preserver;
    let Some(data) = agent.data.preserver_mut() else {
        return;
    };
    data.orbit_angle = (data.orbit_angle + cfg.orbit_step) % std::f32::consts::TAU;
    let point = data.center.center().polar_offset(data.orbit_angle, cfg.orbit_radius);
    let goal = world.walkable_near_point(point, SNAP_RADIUS);
    world.move_to(agent, goal);
}

struct Patrol;

impl State<Entity, World> for Patrol {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        orbit_step(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if let Some(subject) = engaged_subject(agent, world) {
            let angle = subject.angle_to(agent.position);
            if let Some(data) = agent.data.preserver_mut() {
                data.attack_angle = angle;
            }
            return Transition::To(APPROACH);
        }
        if !agent.is_moving {
            orbit_step(agent, world);
        }
        Transition::Stay
    }
}

struct Approach;

impl State<Entity, World> for Approach {
    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().preserver;
        let now = world.now();
        let Some(subject) = engaged_subject(agent, world) else {
            return Transition::To(PATROL);
        };
        let Some(data) = agent.data.preserver_mut() else {
            return Transition::To(PATROL);
        };
        let (angle, last_attack_at) = (data.attack_angle, data.last_attack_at);

        let distance = agent.distance_to(subject);
        if (distance - cfg.ideal_distance).abs() <= cfg.distance_tolerance
            && elapsed_since(now, last_attack_at, cfg.attack_cooldown())
        {
            return Transition::To(ATTACK);
        }

        let goal = stand_off_point(world, subject, angle);
        world.move_to(agent, goal);
        Transition::Stay
    }
}

struct Attack;

impl State<Entity, World> for Attack {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        if let Some(subject) = world.subject() {
            world.move_to(agent, subject.cell());
        }
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().preserver;
        let now = world.now();
        let Some(subject) = world.subject().filter(|subject| subject.dangerous) else {
            return Transition::To(PATROL);
        };

        if agent.distance_to(subject.position) <= cfg.attack_radius
            || agent.time_in_state(now) >= cfg.attack_window()
        {
            if let Some(data) = agent.data.preserver_mut() {
                data.last_attack_at = Some(now);
            }
            return Transition::To(RETREAT);
        }

        world.move_to(agent, subject.cell());
        Transition::Stay
    }
}

struct Retreat;

impl State<Entity, World> for Retreat {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let distance = world.config().preserver.retreat_distance;
        if let Some(subject) = world.subject() {
            world.move_away_from(agent, subject.position, distance);
        }
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().preserver;
        if !agent.is_moving || agent.time_in_state(world.now()) >= cfg.retreat_duration() {
            Transition::To(REPOSITION)
        } else {
            Transition::Stay
        }
    }
}

struct Reposition;

impl State<Entity, World> for Reposition {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let offset = world.config().preserver.reposition_angle;
        let Some(subject) = world.subject() else {
            return;
        };
        let angle = subject.position.angle_to(agent.position) + offset;
        if let Some(data) = agent.data.preserver_mut() {
            data.attack_angle = angle;
        }
        let goal = stand_off_point(world, subject.position, angle);
        world.move_to(agent, goal);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().preserver;
        if world.subject().is_none_or(|subject| !subject.dangerous) {
            return Transition::To(PATROL);
        }
        if !agent.is_moving || agent.time_in_state(world.now()) >= cfg.retreat_duration() {
            return Transition::To(APPROACH);
        }
        Transition::Stay
    }
}
