//! Search progress events.
//!
//! The pathfinder reports every dequeue and its final outcome to a
//! [`SearchObserver`] so a visualizer can replay a search without the search
//! depending on it. [`NullObserver`] is used when nobody is listening.
use crate::geometry::Position;

/// Snapshot of a node at the moment it was taken off the frontier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitedNode {
    pub position: Position,
    /// Cost from start.
    pub g: f64,
    /// Unweighted heuristic estimate to the goal.
    pub h: f64,
    /// Priority the node was expanded with (`g + weight * h`).
    pub f: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchEvent {
    PathStart { start: Position, goal: Position },
    NodeVisited { node: VisitedNode },
    PathFound { path: Vec<Position> },
    PathNotFound,
    Error { message: String },
}

impl SearchEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchEvent::PathStart { .. } => "path_start",
            SearchEvent::NodeVisited { .. } => "node_visited",
            SearchEvent::PathFound { .. } => "path_found",
            SearchEvent::PathNotFound => "path_not_found",
            SearchEvent::Error { .. } => "error",
        }
    }
}

/// Receives search events as they happen.
pub trait SearchObserver {
    /// Whether events should be built at all.
    ///
    /// Returning false lets the search skip allocating event payloads
    /// (e.g. cloning the final path).
    fn is_listening(&self) -> bool {
        true
    }

    fn on_event(&mut self, event: SearchEvent);
}

/// Observer that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SearchObserver for NullObserver {
    fn is_listening(&self) -> bool {
        false
    }

    fn on_event(&mut self, _event: SearchEvent) {}
}

/// Observer that keeps every event, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<SearchEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions of all `NodeVisited` events, in dequeue order.
    pub fn visited(&self) -> Vec<Position> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SearchEvent::NodeVisited { node } => Some(node.position),
                _ => None,
            })
            .collect()
    }
}

impl SearchObserver for RecordingObserver {
    fn on_event(&mut self, event: SearchEvent) {
        self.events.push(event);
    }
}

impl<F> SearchObserver for F
where
    F: FnMut(SearchEvent),
{
    fn on_event(&mut self, event: SearchEvent) {
        self(event)
    }
}
