//! Hunter: roams its hunting ground and strikes a dangerous subject, then
//! backs off and waits before hunting again. A subject that is not
//! dangerous is ignored entirely.

use std::time::Duration;

use nav_core::Position;
use state_machine::{State, StateId, Transition};

use super::{ArchetypeBehavior, Behavior, next_index, walkable_route};
use crate::config::HunterConfig;
use crate::entity::{ArchetypeData, Entity, World};

pub const HUNT: StateId = "hunt";
pub const ATTACK: StateId = "attack";
pub const RETREAT: StateId = "retreat";
pub const WAIT: StateId = "wait";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HunterData {
    pub waypoints: Vec<Position>,
    pub waypoint_index: usize,
    /// Centre of random roaming when there are no waypoints.
    pub home: Position,
    pub strikes: u32,
    pub last_strike_at: Option<Duration>,
}

pub fn behavior(config: &HunterConfig) -> ArchetypeBehavior {
    let definition = Behavior::new("hunter", HUNT, config.think_interval())
        .with_state(HUNT, Hunt)
        .with_state(ATTACK, Attack)
        .with_state(RETREAT, Retreat)
        .with_state(WAIT, Wait);

    ArchetypeBehavior::new(definition, config.speed).with_data(|spawn, options, grid| {
        ArchetypeData::Hunter(HunterData {
            waypoints: walkable_route(grid, &options.route, 3),
            home: options.anchor.unwrap_or(spawn),
            ..HunterData::default()
        })
    })
}

fn hunt_step(agent: &mut Entity, world: &mut World) {
    let roam_radius = world.config().hunter.roam_radius;
    let cell = agent.cell();
    let Some(data) = agent.data.hunter_mut() else {
        return;
    };

    let goal = if data.waypoints.is_empty() {
        let home = data.home;
        world.find_random_walkable_near(home, roam_radius)
    } else {
        let len = data.waypoints.len();
        data.waypoint_index %= len;
        if data.waypoints[data.waypoint_index] == cell {
            data.waypoint_index = next_index(data.waypoint_index, len);
        }
        Some(data.waypoints[data.waypoint_index])
    };

    if let Some(goal) = goal {
        world.move_to(agent, goal);
    }
}

struct Hunt;

impl State<Entity, World> for Hunt {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        hunt_step(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().hunter;
        if world.sees_danger(agent, cfg.detection_radius) {
            return Transition::To(ATTACK);
        }
        if !agent.is_moving {
            hunt_step(agent, world);
        }
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
        let cfg = world.config().hunter;
        let now = world.now();
        let Some(subject) = world.subject() else {
            return Transition::To(HUNT);
        };
        if !world.sees_danger(agent, cfg.detection_radius) {
            return Transition::To(HUNT);
        }

        if agent.distance_to(subject.position) <= cfg.attack_radius {
            if let Some(data) = agent.data.hunter_mut() {
                data.strikes += 1;
                data.last_strike_at = Some(now);
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
        let distance = world.config().hunter.retreat_distance;
        if let Some(subject) = world.subject() {
            world.move_away_from(agent, subject.position, distance);
        }
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().hunter;
        if !agent.is_moving || agent.time_in_state(world.now()) >= cfg.retreat_duration() {
            Transition::To(WAIT)
        } else {
            Transition::Stay
        }
    }
}

struct Wait;

impl State<Entity, World> for Wait {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        world.stop(agent);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if agent.time_in_state(world.now()) >= world.config().hunter.wait_duration() {
            Transition::To(HUNT)
        } else {
            Transition::Stay
        }
    }
}
