//! Path following.
//!
//! Runs every tick for every entity, independent of the think cadence.

use std::time::Duration;

use nav_core::{Grid, Position};

use super::types::Entity;

/// Distance (in cells) at which a waypoint counts as reached.
pub const ARRIVAL_EPSILON: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementOutcome {
    /// The last waypoint was reached.
    Arrived(Position),
    /// The next waypoint or the cell about to be entered is unwalkable.
    Blocked(Position),
}

/// Moves `entity` up to `speed * delta` cells along its path.
///
/// Leftover distance after reaching a waypoint carries on toward the next
/// one. A blocked step drops the path and stops the entity so its behavior
/// requests a fresh route on the next think.
pub fn advance(entity: &mut Entity, grid: &Grid, delta: Duration) -> Option<MovementOutcome> {
    if !entity.has_path() {
        return None;
    }

    let mut budget = entity.speed.max(0.0) * delta.as_secs_f32();

    while let Some(waypoint) = entity.next_waypoint() {
        if !grid.is_walkable(waypoint) {
            entity.clear_path();
            return Some(MovementOutcome::Blocked(waypoint));
        }

        let target = waypoint.center();
        let distance = entity.position.distance(target);

        if distance <= ARRIVAL_EPSILON || distance <= budget {
            budget = (budget - distance).max(0.0);
            entity.position = target;
            entity.path_index += 1;
            if entity.path_index >= entity.path.len() {
                entity.clear_path();
                return Some(MovementOutcome::Arrived(waypoint));
            }
            if budget <= 0.0 {
                break;
            }
            continue;
        }

        if budget <= 0.0 {
            break;
        }

        let Some(direction) = (target - entity.position).normalized() else {
            break;
        };
        let next = entity.position + direction.scale(budget);
        let landing = next.to_cell();
        if !grid.is_walkable(landing) {
            entity.clear_path();
            return Some(MovementOutcome::Blocked(landing));
        }
        entity.position = next;
        break;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Archetype, EntityId};
    use nav_core::Vec2;

    fn walker(speed: f32) -> Entity {
        Entity::new(EntityId(1), Archetype::Survivor, Position::new(0, 0), speed)
    }

    #[test]
    fn moves_at_speed_and_arrives() {
        let grid = Grid::new(5, 1).unwrap();
        let mut entity = walker(2.0);
        entity.set_path(vec![Position::new(0, 0), Position::new(4, 0)]);

        assert_eq!(advance(&mut entity, &grid, Duration::from_millis(500)), None);
        assert!((entity.position.x - 1.0).abs() < 1e-4);

        assert_eq!(advance(&mut entity, &grid, Duration::from_secs(1)), None);
        assert_eq!(
            advance(&mut entity, &grid, Duration::from_secs(1)),
            Some(MovementOutcome::Arrived(Position::new(4, 0)))
        );
        assert_eq!(entity.position, Vec2::new(4.0, 0.0));
        assert!(!entity.is_moving);
    }

    #[test]
    fn carries_leftover_distance_past_waypoints() {
        let grid = Grid::new(3, 3).unwrap();
        let mut entity = walker(3.0);
        entity.set_path(vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(1, 2),
        ]);

        assert_eq!(
            advance(&mut entity, &grid, Duration::from_secs(1)),
            Some(MovementOutcome::Arrived(Position::new(1, 2)))
        );
        assert_eq!(entity.position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn blocked_waypoint_drops_path() {
        let mut grid = Grid::new(4, 1).unwrap();
        let mut entity = walker(1.0);
        entity.set_path(vec![Position::new(0, 0), Position::new(3, 0)]);
        grid.set_walkable(Position::new(3, 0), false).unwrap();

        assert_eq!(
            advance(&mut entity, &grid, Duration::from_millis(100)),
            Some(MovementOutcome::Blocked(Position::new(3, 0)))
        );
        assert!(!entity.is_moving);
        assert!(entity.path.is_empty());
    }

    #[test]
    fn blocked_intermediate_cell_stops_before_entering() {
        let mut grid = Grid::new(4, 1).unwrap();
        let mut entity = walker(1.0);
        entity.set_path(vec![Position::new(0, 0), Position::new(3, 0)]);
        grid.set_walkable(Position::new(1, 0), false).unwrap();

        assert_eq!(
            advance(&mut entity, &grid, Duration::from_millis(600)),
            Some(MovementOutcome::Blocked(Position::new(1, 0)))
        );
        assert_eq!(entity.position, Vec2::new(0.0, 0.0));
    }
}
