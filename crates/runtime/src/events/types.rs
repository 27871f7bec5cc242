//! Event types for the entity and path topics.
//!
//! Search events come straight from `nav-core` ([`nav_core::SearchEvent`]).

use nav_core::Position;
use state_machine::StateId;

use crate::entity::{Archetype, EntityId};

/// Entity lifecycle and state-machine events.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Spawned {
        entity: EntityId,
        archetype: Archetype,
        position: Position,
    },

    Removed {
        entity: EntityId,
    },

    /// The entity switched state; exit and enter callbacks already ran.
    StateChanged {
        entity: EntityId,
        from: StateId,
        to: StateId,
    },

    /// A state asked for a name its behavior does not define.
    ///
    /// The entity stays in `current`.
    UnknownState {
        entity: EntityId,
        current: StateId,
        requested: StateId,
    },

    /// The next waypoint (or the cell about to be entered) became unwalkable.
    /// The path was dropped and the entity stopped.
    PathBlocked {
        entity: EntityId,
        at: Position,
    },

    /// The entity reached the last waypoint of its path.
    Arrived {
        entity: EntityId,
        position: Position,
    },
}

/// Path cache and batch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
    CacheHit { start: Position, goal: Position },
    CacheMiss { start: Position, goal: Position },
    /// The whole cache was dropped after a grid or option change.
    CacheInvalidated { entries: usize },
    BatchProcessed { count: usize },
}
