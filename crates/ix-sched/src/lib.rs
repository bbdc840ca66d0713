//! `ix-sched` — the cooperative frame scheduler for the rust_ix framework.
//!
//! # Tick loop
//!
//! ```text
//! every host frame:
//!   ⓪ Input      : clock.advance(); capture one InputFrame for all bound keys
//!   ① Activate   : queued controllers run on_start (registration order)
//!   ② Timers     : due timers fire; failures are isolated and reported
//!   ③ Sweep      : expired / dead-entity claims revoked, owners notified
//!   ④ Controllers: process() once each, ascending ControllerId
//!   ⑤ Events     : queued events delivered to subscribers
//!   ⑥ Audit      : claims held by unregistered controllers released
//! ```
//!
//! Nothing in the loop blocks and nothing halts it: a controller whose hook
//! fails or panics is finalized (its claims released, timers cancelled,
//! subscriptions dropped) and the tick carries on.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ix_core::SchedulerConfig;
//! use ix_sched::{Host, NoopObserver, SchedulerBuilder};
//!
//! let mut sched = SchedulerBuilder::new(SchedulerConfig::default())
//!     .controller(Box::new(my_controller))
//!     .build()?;
//! let mut host = Host::new(&mut world, &mut input, &mut presentation);
//! sched.run_ticks(600, &mut host, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod host;
pub mod observer;
pub mod report;
pub mod scheduler;


pub use builder::SchedulerBuilder;
pub use error::{SchedError, SchedResult};
pub use host::Host;
pub use observer::{NoopObserver, SchedulerObserver};
pub use report::{ControllerEnd, EndReason, RunSummary, TickReport};
pub use scheduler::FrameScheduler;
