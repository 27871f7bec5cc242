//! Entity table, perception, movement, and the tick driver.
//!
//! [`EntityController`] is the only owner of entities. During a think update
//! the focused entity is lifted out of the table and handed to its behavior
//! together with the [`World`], so a behavior can read and mutate every other
//! entity while holding `&mut` to its own.

mod controller;
mod movement;
mod types;
mod world;

pub use controller::{EntityController, EntityControllerBuilder};
pub use movement::{ARRIVAL_EPSILON, MovementOutcome};
pub use types::{Archetype, ArchetypeData, Entity, EntityId, GroupId, SpawnOptions};
pub use world::{TrackedSubject, World};
