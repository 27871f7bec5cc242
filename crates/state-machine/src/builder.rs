//! Builder utilities for ergonomic state construction.
//!
//! Most behaviors implement [`State`] on a unit struct per state. For small
//! or ad-hoc states a closure is enough: [`from_fn`] wraps one as a state
//! with no enter/exit callbacks.

use crate::{State, Transition};

/// A state backed by an update closure.
pub struct FnState<F> {
    update: F,
}

impl<A, C, F> State<A, C> for FnState<F>
where
    F: Fn(&mut A, &mut C) -> Transition + Send + Sync,
{
    #[inline]
    fn update(&self, agent: &mut A, ctx: &mut C) -> Transition {
        (self.update)(agent, ctx)
    }
}

/// Creates a state from an update closure.
#[inline]
pub fn from_fn<A, C, F>(update: F) -> FnState<F>
where
    F: Fn(&mut A, &mut C) -> Transition + Send + Sync,
{
    FnState { update }
}
