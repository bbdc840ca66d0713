//! `ix-controller` — the controller extension point and everything a
//! controller can touch during one tick.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                          |
//! |----------------|-------------------------------------------------------------------|
//! | [`controller`] | `Controller` trait, `TimerCallback` trait, `NoopController`       |
//! | [`context`]    | `TickContext<'a>`, `Caller`, `Runtime`, `Registry`                |
//! | [`event`]      | `InteractionEvent`, `EventKind`, `EventBus`                       |
//! | [`shared`]     | `SharedState`, `SharedCell<T>` (single-writer flags)              |
//! | [`fsm`]        | `StateMachine` trait, `FsmDriver`                                 |
//! | [`session`]    | `Session<M>`, `Disposition`                                       |
//!
//! # Design notes
//!
//! Controllers never hold references into the scheduler.  Each hook receives
//! a `TickContext` that borrows the world, the arbiter, the timer service,
//! the event bus and the shared flags for exactly the duration of the call.
//! Anything a controller needs later (an entity, a timer) it keeps as a
//! handle and re-validates on the next call.
//!
//! Behavior commands go through `TickContext::command`, which refuses
//! entities the caller does not own; the arbiter is the only gate.

pub mod context;
pub mod controller;
pub mod event;
pub mod fsm;
pub mod session;
pub mod shared;


pub use context::{Caller, Registry, Runtime, TickContext, Timers};
pub use controller::{Controller, NoopController, TimerCallback};
pub use event::{AbortReason, EventBus, EventKind, InteractionEvent, Resolution};
pub use fsm::{FsmDriver, StateMachine};
pub use session::{Disposition, Session};
pub use shared::{SharedCell, SharedState};
