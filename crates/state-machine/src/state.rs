//! Core state traits.
//!
//! This module defines the [`State`] trait, the unit every behavior is built
//! from. The trait is generic over the agent type `A` (the record being
//! driven) and a context type `C` (everything else the agent may look at or
//! touch), so the agent can be borrowed mutably alongside the context.

use crate::{StateId, Transition};

/// A single named state of a behavior.
pub trait State<A, C>: Send + Sync {
    /// Runs once when the agent switches into this state.
    fn on_enter(&self, _agent: &mut A, _ctx: &mut C) {}

    /// Evaluates the state.
    ///
    /// # Returns
    ///
    /// - `Transition::Stay` to keep the current state
    /// - `Transition::To(name)` to request a switch
    fn update(&self, agent: &mut A, ctx: &mut C) -> Transition;

    /// Runs once when the agent leaves this state.
    fn on_exit(&self, _agent: &mut A, _ctx: &mut C) {}
}

/// Blanket implementation for boxed states.
impl<A, C> State<A, C> for Box<dyn State<A, C>> {
    #[inline]
    fn on_enter(&self, agent: &mut A, ctx: &mut C) {
        (**self).on_enter(agent, ctx)
    }

    #[inline]
    fn update(&self, agent: &mut A, ctx: &mut C) -> Transition {
        (**self).update(agent, ctx)
    }

    #[inline]
    fn on_exit(&self, agent: &mut A, ctx: &mut C) {
        (**self).on_exit(agent, ctx)
    }
}

/// An agent that records which state it is in.
pub trait Stateful {
    fn current_state(&self) -> StateId;

    /// Records the switch.
    ///
    /// Called after the old state's `on_exit` and before the new state's
    /// `on_enter`, so anything reset here is already reset when `on_enter` runs.
    fn switch_state(&mut self, to: StateId);
}
