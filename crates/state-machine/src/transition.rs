//! Result returned by a state's `update` callback.

/// Name of a state within a [`BehaviorDefinition`](crate::BehaviorDefinition).
pub type StateId = &'static str;

/// What a state asks the machine to do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Remain in the current state.
    Stay,

    /// Switch to the named state.
    ///
    /// Naming the current state is equivalent to [`Transition::Stay`];
    /// callbacks are not re-run.
    To(StateId),
}

impl Transition {
    /// Returns `true` if this transition keeps the current state.
    #[inline]
    pub fn is_stay(self) -> bool {
        matches!(self, Transition::Stay)
    }

    /// Target state, if any.
    #[inline]
    pub fn target(self) -> Option<StateId> {
        match self {
            Transition::Stay => None,
            Transition::To(id) => Some(id),
        }
    }
}

impl From<Option<StateId>> for Transition {
    fn from(target: Option<StateId>) -> Self {
        target.map_or(Transition::Stay, Transition::To)
    }
}
