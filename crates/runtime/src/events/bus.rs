//! Topic-based event bus implementation.

use std::collections::HashMap;

use nav_core::{SearchEvent, SearchObserver};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{EntityEvent, PathEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// A* progress (start, visited nodes, outcome)
    Search,
    /// Entity lifecycle and state transitions
    Entity,
    /// Path cache and batch activity
    Paths,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Search(SearchEvent),
    Entity(EntityEvent),
    Path(PathEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Search(_) => Topic::Search,
            Event::Entity(_) => Topic::Entity,
            Event::Path(_) => Topic::Paths,
        }
    }
}

impl From<SearchEvent> for Event {
    fn from(event: SearchEvent) -> Self {
        Event::Search(event)
    }
}

impl From<EntityEvent> for Event {
    fn from(event: EntityEvent) -> Self {
        Event::Entity(event)
    }
}

impl From<PathEvent> for Event {
    fn from(event: PathEvent) -> Self {
        Event::Path(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Clones share the same channels.
#[derive(Debug, Clone)]
pub struct EventBus {
    search: broadcast::Sender<Event>,
    entity: broadcast::Sender<Event>,
    paths: broadcast::Sender<Event>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            search: broadcast::channel(capacity).0,
            entity: broadcast::channel(capacity).0,
            paths: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Search => &self.search,
            Topic::Entity => &self.entity,
            Topic::Paths => &self.paths,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {}", topic);
        }
    }

    /// Whether anyone is subscribed to `topic`.
    pub fn is_listening(&self, topic: Topic) -> bool {
        self.sender(topic).receiver_count() > 0
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards pathfinder progress onto [`Topic::Search`].
///
/// Reports itself as not listening while the topic has no subscribers, so
/// the search skips building event payloads entirely.
#[derive(Debug)]
pub struct BusObserver<'a> {
    bus: &'a EventBus,
}

impl<'a> BusObserver<'a> {
    pub fn new(bus: &'a EventBus) -> Self {
        Self { bus }
    }
}

impl SearchObserver for BusObserver<'_> {
    fn is_listening(&self) -> bool {
        self.bus.is_listening(Topic::Search)
    }

    fn on_event(&mut self, event: SearchEvent) {
        self.bus.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_core::Position;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut paths = bus.subscribe(Topic::Paths);
        let mut entities = bus.subscribe(Topic::Entity);

        bus.publish(PathEvent::BatchProcessed { count: 3 });

        assert_eq!(
            paths.try_recv().unwrap(),
            Event::Path(PathEvent::BatchProcessed { count: 3 })
        );
        assert!(matches!(entities.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn observer_follows_subscription_state() {
        let bus = EventBus::new();
        assert!(!BusObserver::new(&bus).is_listening());

        let mut search = bus.subscribe(Topic::Search);
        let mut observer = BusObserver::new(&bus);
        assert!(observer.is_listening());

        observer.on_event(SearchEvent::PathStart {
            start: Position::new(0, 0),
            goal: Position::new(1, 0),
        });
        assert_eq!(search.try_recv().unwrap().topic(), Topic::Search);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(PathEvent::CacheInvalidated { entries: 0 });
        let receivers = bus.subscribe_multiple(&[Topic::Search, Topic::Paths]);
        assert_eq!(receivers.len(), 2);
    }
}
