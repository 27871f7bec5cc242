//! Merchant: travels between trade hotspots and runs for help when danger
//! shows up.
//!
//! On detecting a dangerous subject a merchant paths to the nearest guard
//! and raises an alert there, then flees. Alerts have a cooldown: while it
//! is running, a merchant that spots danger again goes straight to `flee`.

use std::time::Duration;

use nav_core::Position;
use state_machine::{State, StateId, Transition};
use tracing::debug;

use super::{ArchetypeBehavior, Behavior, elapsed_since, next_index, walkable_route};
use crate::config::MerchantConfig;
use crate::entity::{Archetype, ArchetypeData, Entity, EntityId, World};

pub const TRAVEL: StateId = "travel";
pub const TRADE: StateId = "trade";
pub const WANDER: StateId = "wander";
pub const ALERT_GUARDS: StateId = "alert_guards";
pub const FLEE: StateId = "flee";
pub const RETURNING: StateId = "returning";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MerchantData {
    pub hotspots: Vec<Position>,
    pub hotspot_index: usize,
    pub last_alert_at: Option<Duration>,
    /// Guard currently being run to.
    pub alert_target: Option<EntityId>,
    /// Where the danger was last detected.
    pub threat: Option<Position>,
}

impl MerchantData {
    pub fn current_hotspot(&self) -> Option<Position> {
        if self.hotspots.is_empty() {
            None
        } else {
            Some(self.hotspots[self.hotspot_index % self.hotspots.len()])
        }
    }
}

pub fn behavior(config: &MerchantConfig) -> ArchetypeBehavior {
    let definition = Behavior::new("merchant", TRAVEL, config.think_interval())
        .with_state(TRAVEL, Travel)
        .with_state(TRADE, Trade)
        .with_state(WANDER, Wander)
        .with_state(ALERT_GUARDS, AlertGuards)
        .with_state(FLEE, Flee)
        .with_state(RETURNING, Returning);

    ArchetypeBehavior::new(definition, config.speed).with_data(|spawn, options, grid| {
        let mut hotspots = walkable_route(grid, &options.route, 3);
        if hotspots.is_empty() {
            hotspots.push(spawn);
        }
        ArchetypeData::Merchant(MerchantData {
            hotspots,
            ..MerchantData::default()
        })
    })
}

/// Where to go when danger is detected, if it is.
fn danger_response(agent: &mut Entity, world: &World) -> Option<StateId> {
    let cfg = world.config().merchant;
    if !world.sees_danger(agent, cfg.detection_radius) {
        return None;
    }

    let threat = world.subject().map(|subject| subject.cell());
    let data = agent.data.merchant_mut()?;
    data.threat = threat;

    let alert_ready = elapsed_since(world.now(), data.last_alert_at, cfg.alert_cooldown());
    let guard_known = world
        .find_nearest_entity(agent.position, Some(Archetype::Guard))
        .is_some();
    if alert_ready && guard_known {
        Some(ALERT_GUARDS)
    } else {
        Some(FLEE)
    }
}

/// Paths to the current hotspot. False when there is none or it is unreachable.
fn go_to_hotspot(agent: &mut Entity, world: &mut World) -> bool {
    let Some(hotspot) = agent.data.merchant().and_then(MerchantData::current_hotspot) else {
        return false;
    };
    world.move_to(agent, hotspot)
}

fn at_hotspot(agent: &Entity) -> bool {
    agent
        .data
        .merchant()
        .and_then(MerchantData::current_hotspot)
        .is_some_and(|hotspot| hotspot.chebyshev(agent.cell()) <= 1)
}

fn flee_step(agent: &mut Entity, world: &mut World) {
    let distance = world.config().merchant.flee_distance;
    let threat = world
        .subject()
        .map(|subject| subject.position)
        .or_else(|| {
            agent
                .data
                .merchant()
                .and_then(|data| data.threat)
                .map(|cell| cell.center())
        });
    if let Some(threat) = threat {
        world.move_away_from(agent, threat, distance);
    }
}

struct Travel;

impl State<Entity, World> for Travel {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        go_to_hotspot(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if let Some(next) = danger_response(agent, world) {
            return Transition::To(next);
        }
        if agent.is_moving {
            return Transition::Stay;
        }
        if at_hotspot(agent) {
            return Transition::To(TRADE);
        }
        if !go_to_hotspot(agent, world) {
            return Transition::To(WANDER);
        }
        Transition::Stay
    }
}

struct Trade;

impl State<Entity, World> for Trade {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        world.stop(agent);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if let Some(next) = danger_response(agent, world) {
            return Transition::To(next);
        }
        if agent.time_in_state(world.now()) < world.config().merchant.trade_duration() {
            return Transition::Stay;
        }
        if let Some(data) = agent.data.merchant_mut() {
            data.hotspot_index = next_index(data.hotspot_index, data.hotspots.len());
        }
        Transition::To(WANDER)
    }
}

struct Wander;

impl State<Entity, World> for Wander {
    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().merchant;
        if let Some(next) = danger_response(agent, world) {
            return Transition::To(next);
        }
        if agent.time_in_state(world.now()) >= cfg.wander_duration() {
            return Transition::To(TRAVEL);
        }
        if !agent.is_moving {
            let cell = agent.cell();
            if let Some(goal) = world.find_random_walkable_near(cell, cfg.wander_radius) {
                world.move_to(agent, goal);
            }
        }
        Transition::Stay
    }
}

struct AlertGuards;

impl State<Entity, World> for AlertGuards {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        let guard = world.find_nearest_entity(agent.position, Some(Archetype::Guard));
        let guard_cell = guard.and_then(|id| world.entity(id)).map(Entity::cell);
        // Cooldown counts attempts, not successful alerts.
        let now = world.now();
        if let Some(data) = agent.data.merchant_mut() {
            data.alert_target = guard;
            data.last_alert_at = Some(now);
        }
        if let Some(cell) = guard_cell {
            world.move_to(agent, cell);
        }
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        let cfg = world.config().merchant;
        let Some(data) = agent.data.merchant() else {
            return Transition::To(FLEE);
        };
        let (target, threat) = (data.alert_target, data.threat);
        let Some((guard_id, guard_position)) =
            target.and_then(|id| world.entity(id).map(|guard| (id, guard.position)))
        else {
            return Transition::To(FLEE);
        };

        if agent.distance_to(guard_position) <= cfg.alert_reach {
            let spot = threat.or_else(|| world.subject().map(|subject| subject.cell()));
            if let Some(guard) = world.entity_mut(guard_id).and_then(|e| e.data.guard_mut()) {
                guard.alerted_to = spot;
            }
            if let Some(data) = agent.data.merchant_mut() {
                data.alert_target = None;
            }
            debug!(entity = %agent.id, guard = %guard_id, "merchant alerted guard");
            return Transition::To(FLEE);
        }

        if !world.move_to(agent, guard_position.to_cell()) {
            return Transition::To(FLEE);
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
        let cfg = world.config().merchant;
        let close = world
            .subject()
            .filter(|subject| subject.dangerous)
            .is_some_and(|subject| agent.distance_to(subject.position) < cfg.safe_distance);
        if !close {
            return Transition::To(RETURNING);
        }
        if !agent.is_moving {
            flee_step(agent, world);
        }
        Transition::Stay
    }
}

struct Returning;

impl State<Entity, World> for Returning {
    fn on_enter(&self, agent: &mut Entity, world: &mut World) {
        go_to_hotspot(agent, world);
    }

    fn update(&self, agent: &mut Entity, world: &mut World) -> Transition {
        if let Some(next) = danger_response(agent, world) {
            return Transition::To(next);
        }
        if agent.is_moving {
            return Transition::Stay;
        }
        if at_hotspot(agent) {
            return Transition::To(TRADE);
        }
        if !go_to_hotspot(agent, world) {
            return Transition::To(WANDER);
        }
        Transition::Stay
    }
}
