//! Survivor: wanders near home, flees a dangerous subject, hides for a
//! while, then relocates to the quarter of the map farthest from the threat.

use nav_core::{Position, Vec2};
use state_machine::{State, StateId, Transition};

use super::{ArchetypeBehavior, Behavior};
use crate::config::SurvivorConfig;
use crate::entity::{ArchetypeData, Entity, World};

pub const WANDER: StateId = "wander";
pub const FLEE: StateId = "flee";
pub const HIDE: StateId = "hide";
pub const SEEK_SAFETY: StateId = "seek_safety";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurvivorData {
    /// Centre of wandering; moved to the safe spot after each escape.
    pub home: Position,
    pub last_threat: Option<Vec2>,
}

pub fn behavior(config: &SurvivorConfig) -> ArchetypeBehavior {
    let definition = Behavior::new("survivor", WANDER, config.think_interval())
        .with_state(WANDER, Wander)
        .with_state(FLEE, Flee)
        .with_state(HIDE, Hide)
        .with_state(SEEK_SAFETY, SeekSafety);

    ArchetypeBehavior::new(definition, config.speed).with_data(|spawn, options, _grid| {
        ArchetypeData::Survivor(SurvivorData {
            home: options.anchor.unwrap_or(spawn),
            last_threat: None,
        })
    })
}

/// Records the subject as the current threat when it is dangerous and near.
fn detect(agent: &mut Entity, world: &World) -> bool {
    let radius = world.config().survivor.detection_radius;
    if !world.senses_danger(agent, radius) {
        return false;
    }
    let threat = world.subject().map(|subject| subject.position);
    if let Some(data) = agent.data.survivor_mut() {
        data.last_threat = threat;
    }
    true
}

fn flee_step(agent: &mut Entity, world: &mut World) {
    let distance = world.config().survivor.flee_distance;
    let Some(threat) = world.subject().map(|subject| subject.position) else {
        return;
    };
    if world.move_away_from(agent, threat, distance) {
        return;
    }
    // Cornered: any reachable cell nearby is better than standing still.
    let cell = agent.cell();
    if let Some(escape) = world.find_random_walkable_near(cell, distance.ceil() as i32) {
        world.move_to(agent, escape);
    }
}

/// Centre of the grid quadrant farthest from `threat`.
pub fn safest_quadrant(world: &World, threat: Vec2) -> Position {
    let grid = world.grid();
    let (w, h) = (grid.width() as f32, grid.height() as f32);
    let centres = [
        Vec2::new(w * 0.25, h * 0.25),
        Vec2::new(w * 0.75, h * 0.25),
        Vec2::new(w * 0.25, h * 0.75),
        Vec2::new(w * 0.75, h * 0.75),
    ];
    let farthest = centres
        .into_iter()
        .max_by(|a, b| a.distance(threat).total_cmp(&b.distance(threat)))
        .unwrap_or(Vec2::new(w * 0.5, h * 0.5));
    world.walkable_near_point(farthest, grid.width().max(grid.height()) / 2)
}

struct Wander;

impl State<Entity, World> for Wander {
    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if detect(agent, world) {
            return Transition::To(FLEE);
        }
        if !agent.is_moving {
            let radius = world.config().survivor.wander_radius;
            let home = agent.data.survivor_mut().map(|data| data.home);
            let centre = home.unwrap_or(agent.cell());
            if let Some(goal) = world.find_random_walkable_near(centre, radius) {
                world.move_to(agent, goal);
            }
        }
        Transition::Stay
    }
}

struct Flee;

impl State<Entity, World> for Flee {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        flee_step(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().survivor;
        let threat = world.subject().filter(|subject| subject.dangerous);
        match threat {
            Some(subject) if agent.distance_to(subject.position) < cfg.safe_distance => {
                detect(agent, world);
                if !agent.is_moving {
                    flee_step(agent, world);
                }
                Transition::Stay
            }
            _ => Transition::To(HIDE),
        }
    }
}

struct Hide;

impl State<Entity, World> for Hide {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        world.stop(agent);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if detect(agent, world) {
            return Transition::To(FLEE);
        }
        if agent.time_in_state(world.now()) >= world.config().survivor.hide_duration() {
            return Transition::To(SEEK_SAFETY);
        }
        Transition::Stay
    }
}

struct SeekSafety;

impl State<Entity, World> for SeekSafety {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let current = world.subject().map(|subject| subject.position);
        let remembered = agent.data.survivor_mut().and_then(|data| data.last_threat);
        let Some(threat) = current.or(remembered) else {
            return;
        };

        let spot = safest_quadrant(world, threat);
        if let Some(data) = agent.data.survivor_mut() {
            data.home = spot;
        }
        world.move_to(agent, spot);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if detect(agent, world) {
            return Transition::To(FLEE);
        }
        if !agent.is_moving {
            return Transition::To(WANDER);
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::entity::EntityController;
    use nav_core::Grid;

    #[test]
    fn safest_quadrant_is_opposite_the_threat() {
        let controller = EntityController::new(Grid::new(20, 20).unwrap(), EngineConfig::default());
        let spot = safest_quadrant(controller.world(), Vec2::new(2.0, 2.0));
        assert_eq!(spot, Position::new(15, 15));
    }
}
