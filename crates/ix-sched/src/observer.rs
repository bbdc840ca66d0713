//! Scheduler observer trait for progress reporting and diagnostics.

use ix_core::{IxError, Tick};

use crate::{ControllerEnd, TickReport};

/// Callbacks invoked by [`FrameScheduler::run_ticks`][crate::FrameScheduler::run_ticks]
/// and [`run_until_idle`][crate::FrameScheduler::run_until_idle] around each tick.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: fault counter
///
/// ```rust,ignore
/// struct FaultCounter(usize);
///
/// impl SchedulerObserver for FaultCounter {
///     fn on_fault(&mut self, _tick: Tick, _fault: &IxError) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SchedulerObserver {
    /// Called before the tick starts; `tick` is the tick about to run.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per controller that left the scheduler this tick.
    fn on_controller_end(&mut self, _tick: Tick, _end: &ControllerEnd) {}

    /// Called once per isolated fault (failed timer callback, orphaned claim).
    fn on_fault(&mut self, _tick: Tick, _fault: &IxError) {}

    /// Called after all phases of the tick completed.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called once when a run call returns.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`SchedulerObserver`] that does nothing.
pub struct NoopObserver;

impl SchedulerObserver for NoopObserver {}
