//! Lightweight finite state machine library for tick-driven agents.
//!
//! This library provides the generic contract an agent runtime needs to drive
//! per-entity behaviors without knowing what the behaviors are:
//!
//! - **Named states**: Each state is an [`State`] with `on_enter`, `update`
//!   and `on_exit` callbacks
//! - **Declarative definitions**: A [`BehaviorDefinition`] maps state names to
//!   callbacks, plus an initial state and a think interval
//! - **Validated transitions**: A transition to an unregistered state is
//!   rejected and the agent stays where it is
//! - **Minimal dependencies**: Only `thiserror` for the definition error type
//!
//! # Architecture
//!
//! - [`State`]: Core trait for all states
//! - [`Transition`]: What `update` asks for (stay or switch)
//! - [`Stateful`]: Implemented by the agent type that records its current state
//! - [`Cadence`]: Accumulating timer that throttles how often `update` runs

pub mod builder;
pub mod cadence;
pub mod definition;
pub mod state;
pub mod transition;

pub use cadence::Cadence;
pub use definition::{BehaviorDefinition, DefinitionError, Step};
pub use state::{State, Stateful};
pub use transition::{StateId, Transition};
