//! Declarative behavior definitions.
//!
//! A [`BehaviorDefinition`] is a value, not a type: it names an initial state,
//! a think interval, and the callbacks for each state. Runtimes keep one
//! definition per archetype and drive any number of agents with it.

use std::fmt;
use std::time::Duration;

use crate::{State, StateId, Stateful, Transition};

/// Outcome of one evaluation of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The state asked to stay (or named itself).
    Unchanged,

    /// The agent moved from `from` to `to`; exit and enter callbacks ran.
    Changed { from: StateId, to: StateId },

    /// The state asked for a name this definition does not contain.
    ///
    /// No callbacks ran and the agent is still in its current state.
    Rejected { current: StateId, requested: StateId },

    /// The agent's current state is not part of this definition.
    MissingCurrent { current: StateId },
}

impl Step {
    #[inline]
    pub fn is_changed(self) -> bool {
        matches!(self, Step::Changed { .. })
    }
}

/// Structural problems in a definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The initial state has no callbacks registered.
    #[error("behavior '{behavior}' has no initial state '{initial}'")]
    MissingInitial { behavior: &'static str, initial: StateId },
    /// Two states share a name.
    #[error("behavior '{behavior}' registers state '{state}' twice")]
    DuplicateState { behavior: &'static str, state: StateId },
}

/// Named initial state, think interval, and per-state callbacks.
pub struct BehaviorDefinition<A, C> {
    name: &'static str,
    initial: StateId,
    interval: Duration,
    states: Vec<(StateId, Box<dyn State<A, C>>)>,
}

impl<A, C> BehaviorDefinition<A, C> {
    /// Creates an empty definition. Add states with [`with_state`](Self::with_state).
    pub fn new(name: &'static str, initial: StateId, interval: Duration) -> Self {
        Self {
            name,
            initial,
            interval,
            states: Vec::new(),
        }
    }

    /// Registers a state (builder pattern).
    pub fn with_state(mut self, id: StateId, state: impl State<A, C> + 'static) -> Self {
        self.states.push((id, Box::new(state)));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    /// Minimum spacing between two `update` calls for one agent.
    pub fn think_interval(&self) -> Duration {
        self.interval
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.state(id).is_some()
    }

    pub fn state(&self, id: StateId) -> Option<&dyn State<A, C>> {
        self.states
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, state)| state.as_ref() as &dyn State<A, C>)
    }

    /// State names in registration order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().map(|(name, _)| *name)
    }

    /// Checks that the initial state exists and names are unique.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (index, (name, _)) in self.states.iter().enumerate() {
            if self.states[..index].iter().any(|(other, _)| other == name) {
                return Err(DefinitionError::DuplicateState {
                    behavior: self.name,
                    state: name,
                });
            }
        }
        if !self.contains(self.initial) {
            return Err(DefinitionError::MissingInitial {
                behavior: self.name,
                initial: self.initial,
            });
        }
        Ok(())
    }
}

impl<A: Stateful, C> BehaviorDefinition<A, C> {
    /// Puts a fresh agent into the initial state and runs its `on_enter`.
    pub fn enter_initial(&self, agent: &mut A, ctx: &mut C) -> Step {
        agent.switch_state(self.initial);
        match self.state(self.initial) {
            Some(state) => {
                state.on_enter(agent, ctx);
                Step::Unchanged
            }
            None => Step::MissingCurrent {
                current: self.initial,
            },
        }
    }

    /// Runs the current state's `update` and applies the requested transition.
    pub fn evaluate(&self, agent: &mut A, ctx: &mut C) -> Step {
        let current = agent.current_state();
        let Some(state) = self.state(current) else {
            return Step::MissingCurrent { current };
        };

        match state.update(agent, ctx) {
            Transition::Stay => Step::Unchanged,
            Transition::To(next) => self.transition(agent, ctx, next),
        }
    }

    /// Switches the agent to `next`, running exit and enter callbacks.
    ///
    /// Unknown targets are rejected without touching the agent.
    pub fn transition(&self, agent: &mut A, ctx: &mut C, next: StateId) -> Step {
        let current = agent.current_state();
        if next == current {
            return Step::Unchanged;
        }
        let Some(next_state) = self.state(next) else {
            return Step::Rejected {
                current,
                requested: next,
            };
        };

        if let Some(state) = self.state(current) {
            state.on_exit(agent, ctx);
        }
        agent.switch_state(next);
        next_state.on_enter(agent, ctx);

        Step::Changed {
            from: current,
            to: next,
        }
    }
}

impl<A, C> fmt::Debug for BehaviorDefinition<A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorDefinition")
            .field("name", &self.name)
            .field("initial", &self.initial)
            .field("interval", &self.interval)
            .field("states", &self.state_ids().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::from_fn;

    #[derive(Default)]
    struct Lamp {
        state: StateId,
        log: Vec<String>,
    }

    impl Stateful for Lamp {
        fn current_state(&self) -> StateId {
            self.state
        }

        fn switch_state(&mut self, to: StateId) {
            self.log.push(format!("switch:{to}"));
            self.state = to;
        }
    }

    struct Logged(&'static str, Transition);

    impl State<Lamp, u32> for Logged {
        fn on_enter(&self, agent: &mut Lamp, _ctx: &mut u32) {
            agent.log.push(format!("enter:{}", self.0));
        }

        fn update(&self, _agent: &mut Lamp, ctx: &mut u32) -> Transition {
            *ctx += 1;
            self.1
        }

        fn on_exit(&self, agent: &mut Lamp, _ctx: &mut u32) {
            agent.log.push(format!("exit:{}", self.0));
        }
    }

    fn lamp() -> BehaviorDefinition<Lamp, u32> {
        BehaviorDefinition::new("lamp", "off", Duration::from_millis(100))
            .with_state("off", Logged("off", Transition::To("on")))
            .with_state("on", Logged("on", Transition::To("broken")))
    }

    #[test]
    fn transition_runs_exit_switch_enter_in_order() {
        let definition = lamp();
        let mut agent = Lamp::default();
        let mut ticks = 0;
        definition.enter_initial(&mut agent, &mut ticks);
        agent.log.clear();

        let step = definition.evaluate(&mut agent, &mut ticks);

        assert_eq!(step, Step::Changed { from: "off", to: "on" });
        assert_eq!(agent.log, vec!["exit:off", "switch:on", "enter:on"]);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn unknown_target_is_rejected_and_agent_stays() {
        let definition = lamp();
        let mut agent = Lamp::default();
        let mut ticks = 0;
        definition.enter_initial(&mut agent, &mut ticks);
        definition.evaluate(&mut agent, &mut ticks);
        agent.log.clear();

        let step = definition.evaluate(&mut agent, &mut ticks);

        assert_eq!(
            step,
            Step::Rejected {
                current: "on",
                requested: "broken"
            }
        );
        assert_eq!(agent.state, "on");
        assert!(agent.log.is_empty(), "no callbacks on rejection");
    }

    #[test]
    fn naming_the_current_state_is_a_no_op() {
        let definition = BehaviorDefinition::<Lamp, u32>::new("idle", "idle", Duration::ZERO)
            .with_state("idle", from_fn(|_: &mut Lamp, _: &mut u32| Transition::To("idle")));
        let mut agent = Lamp::default();
        let mut ctx = 0;
        definition.enter_initial(&mut agent, &mut ctx);
        assert_eq!(definition.evaluate(&mut agent, &mut ctx), Step::Unchanged);
    }

    #[test]
    fn missing_current_state_is_reported() {
        let definition = lamp();
        let mut agent = Lamp {
            state: "exploded",
            log: Vec::new(),
        };
        let mut ctx = 0;
        assert_eq!(
            definition.evaluate(&mut agent, &mut ctx),
            Step::MissingCurrent { current: "exploded" }
        );
    }

    #[test]
    fn validate_catches_structural_mistakes() {
        assert!(lamp().validate().is_ok());

        let no_initial = BehaviorDefinition::<Lamp, u32>::new("x", "start", Duration::ZERO)
            .with_state("other", Logged("other", Transition::Stay));
        assert!(matches!(
            no_initial.validate(),
            Err(DefinitionError::MissingInitial { .. })
        ));

        let duplicate = lamp().with_state("on", Logged("on", Transition::Stay));
        assert_eq!(
            duplicate.validate(),
            Err(DefinitionError::DuplicateState {
                behavior: "lamp",
                state: "on"
            })
        );
    }

    #[test]
    fn definition_errors_name_the_behavior() {
        let missing = DefinitionError::MissingInitial {
            behavior: "lamp",
            initial: "start",
        };
        assert_eq!(missing.to_string(), "behavior 'lamp' has no initial state 'start'");

        let duplicate = DefinitionError::DuplicateState {
            behavior: "lamp",
            state: "on",
        };
        assert_eq!(duplicate.to_string(), "behavior 'lamp' registers state 'on' twice");
    }
}
