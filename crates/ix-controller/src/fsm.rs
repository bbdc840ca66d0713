//! Pure state machines for interaction sessions.
//!
//! A session's progress is a tagged state enum.  All decisions about what
//! happens next live in one pure function, so the whole flow can be unit
//! tested without a world, a scheduler, or input:
//!
//! ```text
//! (state, event) ──transition──► (next state, [commands])
//! ```
//!
//! The controller owning the machine executes the commands against its
//! `TickContext`; executing a command may in turn yield a follow-up event.

use std::fmt::Debug;

use tracing::trace;

pub trait StateMachine {
    type State: Clone + Debug + PartialEq;
    type Event: Debug;
    type Command: Debug;

    /// Next state and the side effects to perform.  Must not have side
    /// effects of its own.  Events that do not apply in `state` return
    /// `(state.clone(), vec![])`.
    fn transition(&self, state: &Self::State, event: &Self::Event) -> (Self::State, Vec<Self::Command>);

    /// Terminal states accept no further events.
    fn is_terminal(&self, state: &Self::State) -> bool;
}

/// Holds a machine and its current state, and applies events to it.
#[derive(Clone, Debug)]
pub struct FsmDriver<M: StateMachine> {
    machine:     M,
    state:       M::State,
    transitions: u32,
}

impl<M: StateMachine> FsmDriver<M> {
    pub fn new(machine: M, initial: M::State) -> Self {
        Self { machine, state: initial, transitions: 0 }
    }

    pub fn state(&self) -> &M::State {
        &self.state
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn is_terminal(&self) -> bool {
        self.machine.is_terminal(&self.state)
    }

    /// Number of state changes so far.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Apply `event` and return the commands to execute.  Ignored once the
    /// machine is terminal.
    pub fn fire(&mut self, event: M::Event) -> Vec<M::Command> {
        if self.is_terminal() {
            trace!(state = ?self.state, ?event, "event after terminal state ignored");
            return Vec::new();
        }
        let (next, commands) = self.machine.transition(&self.state, &event);
        if next != self.state {
            trace!(from = ?self.state, to = ?next, ?event, "transition");
            self.transitions += 1;
            self.state = next;
        }
        commands
    }
}
