//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Nothing in the runtime depends on a subscriber being
//! attached; with no listeners, publishing is a cheap no-op.

mod bus;
mod types;

pub use bus::{BusObserver, Event, EventBus, Topic};
pub use types::{EntityEvent, PathEvent};

pub use nav_core::SearchEvent;
