//! The custody-handoff state machine shared by arrest and trunk search.
//!
//! ```text
//! Init ─Begin─► Claiming ─Claimed─► Approaching ─Arrived─► Performing ─PerformDone─► AwaitingDecision
//!                  │                    │    ▲                  ▲                        │        │
//!             ClaimDenied          Resisted  │             Disarmed{cooperates}     Choose(A) Choose(B)
//!                  │                    ▼    │                  │                        ▼        ▼
//!                  │                 Escalated ─────────────────┘                      PathA    PathB
//!                  │                                                                     └─PathDone─┘
//!                  ▼                                                                          ▼
//!              Releasing(outcome) ◄──────────── Abort(reason) from any live state ─── Releasing(Resolved)
//!                  │
//!               Released
//!                  ▼
//!              Terminal(outcome)
//! ```
//!
//! `Escalated` runs its own timeout: `EscalationTimedOut` aborts with
//! `Escaped`, and every `Disarmed` cancels it.
//!
//! The machine is pure: `transition` decides, the session executes the
//! returned commands.

use ix_controller::{AbortReason, Resolution, StateMachine};

/// How a session ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Resolved(Resolution),
    Aborted(AbortReason),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CustodyState {
    Init,
    Claiming,
    Approaching,
    Performing,
    AwaitingDecision,
    PathA,
    PathB,
    Escalated,
    Releasing(Outcome),
    Terminal(Outcome),
}

impl CustodyState {
    /// `true` once the session is winding down; abort is no longer accepted.
    pub fn is_closing(self) -> bool {
        matches!(self, CustodyState::Releasing(_) | CustodyState::Terminal(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CustodyEvent {
    Begin,
    Claimed,
    ClaimDenied,
    Arrived,
    ApproachTimedOut,
    Resisted,
    EscalationTimedOut,
    /// The player disarmed a resisting target, whose disposition was then
    /// rolled again.
    Disarmed { cooperates: bool },
    PerformDone,
    Choose(Resolution),
    PathDone,
    Released,
    Abort(AbortReason),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CustodyCommand {
    RequestOwnership,
    Approach,
    StartApproachTimeout,
    CancelApproachTimeout,
    BeginPerform,
    Escalate,
    StartEscalationTimeout,
    CancelEscalationTimeout,
    PromptDecision,
    Execute(Resolution),
    CancelTimers,
    ReleaseAll,
    Finish(Outcome),
}

/// Transition table for one custody handoff.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CustodyMachine {
    /// Whether `Resisted` is honoured.  Vehicles never resist.
    pub allow_escalation: bool,
}

impl CustodyMachine {
    pub fn new(allow_escalation: bool) -> Self {
        Self { allow_escalation }
    }
}

impl StateMachine for CustodyMachine {
    type State = CustodyState;
    type Event = CustodyEvent;
    type Command = CustodyCommand;

    fn transition(&self, state: &CustodyState, event: &CustodyEvent) -> (CustodyState, Vec<CustodyCommand>) {
        use CustodyCommand as C;
        use CustodyEvent as E;
        use CustodyState as S;

        match (*state, *event) {
            (S::Init, E::Begin) => (S::Claiming, vec![C::RequestOwnership]),

            (S::Claiming, E::Claimed) => (S::Approaching, vec![C::Approach, C::StartApproachTimeout]),
            (S::Claiming, E::ClaimDenied) => abort(AbortReason::OwnershipDenied),

            (S::Approaching, E::Arrived) => (S::Performing, vec![C::CancelApproachTimeout, C::BeginPerform]),
            (S::Approaching, E::Resisted) if self.allow_escalation => {
                (S::Escalated, vec![C::CancelApproachTimeout, C::Escalate, C::StartEscalationTimeout])
            }
            (S::Approaching, E::ApproachTimedOut) => abort(AbortReason::TimedOut),

            (S::Escalated, E::Disarmed { cooperates: true }) => {
                (S::Performing, vec![C::CancelEscalationTimeout, C::BeginPerform])
            }
            (S::Escalated, E::Disarmed { cooperates: false }) => {
                (S::Escalated, vec![C::CancelEscalationTimeout, C::Escalate, C::StartEscalationTimeout])
            }
            (S::Escalated, E::EscalationTimedOut) => abort(AbortReason::Escaped),

            (S::Performing, E::PerformDone) => (S::AwaitingDecision, vec![C::PromptDecision]),

            (S::AwaitingDecision, E::Choose(Resolution::PathA)) => {
                (S::PathA, vec![C::Execute(Resolution::PathA)])
            }
            (S::AwaitingDecision, E::Choose(Resolution::PathB)) => {
                (S::PathB, vec![C::Execute(Resolution::PathB)])
            }

            (S::PathA, E::PathDone) => release(Outcome::Resolved(Resolution::PathA)),
            (S::PathB, E::PathDone) => release(Outcome::Resolved(Resolution::PathB)),

            (S::Releasing(outcome), E::Released) => (S::Terminal(outcome), vec![C::Finish(outcome)]),

            (s, E::Abort(reason)) if !s.is_closing() => abort(reason),

            (s, _) => (s, Vec::new()),
        }
    }

    fn is_terminal(&self, state: &CustodyState) -> bool {
        matches!(state, CustodyState::Terminal(_))
    }
}

fn abort(reason: AbortReason) -> (CustodyState, Vec<CustodyCommand>) {
    release(Outcome::Aborted(reason))
}

/// Every exit, normal or not, cancels timers and releases before finishing.
fn release(outcome: Outcome) -> (CustodyState, Vec<CustodyCommand>) {
    (CustodyState::Releasing(outcome), vec![CustodyCommand::CancelTimers, CustodyCommand::ReleaseAll])
}
