//! `ix-timer` — deferred and periodic callbacks fired from the scheduler tick.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`spec`]     | `Delay`, `TimerParams`, `TimerSpec`                          |
//! | [`service`]  | `TimerService<C>`, `TimerHandle`, `TimerTarget<C>`, `Firing` |
//!
//! # Firing protocol
//!
//! The service owns no threads and never calls anything itself.  The frame
//! scheduler drives it in three steps per tick so that callbacks may freely
//! schedule and cancel timers (including themselves) while they run:
//!
//! ```text
//! let due = timers.collect_due(now);          // snapshot, ordered
//! for id in due {
//!     let Some(firing) = timers.begin_fire(id) else { continue };  // cancelled?
//!     dispatch(&firing, &mut timers, …);      // callback may re-enter
//!     timers.finish_fire(firing, now);        // re-arm periodic unless cancelled
//! }
//! ```
//!
//! Timers scheduled during the phase are not in the snapshot, so nothing
//! fires twice in one tick and a zero-delay timer scheduled by a callback
//! fires on the next tick.

pub mod service;
pub mod spec;


pub use service::{Firing, TimerHandle, TimerService, TimerTarget};
pub use spec::{Delay, TimerParams, TimerSpec};
