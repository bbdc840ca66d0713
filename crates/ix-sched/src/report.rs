//! What happened during a tick, for observers and tests.

use ix_arbiter::Revocation;
use ix_core::{ControllerId, EntityHandle, IxError, Tick};

/// Why a controller left the scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The controller called `TickContext::end`.
    Completed,
    /// Stopped by the host or by another controller.
    Deregistered,
    /// A hook returned an error or panicked.
    Faulted(IxError),
}

impl EndReason {
    pub fn is_fault(&self) -> bool {
        matches!(self, EndReason::Faulted(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerEnd {
    pub id:       ControllerId,
    pub name:     String,
    pub reason:   EndReason,
    /// Claims the scheduler released on the controller's behalf.
    pub released: Vec<EntityHandle>,
}

/// Summary of one `FrameScheduler::tick`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick:             Tick,
    pub activated:        Vec<ControllerId>,
    pub timers_fired:     usize,
    /// Claims removed by the ownership sweep.
    pub revocations:      Vec<Revocation>,
    /// Controllers whose `process` ran.
    pub processed:        usize,
    pub events_delivered: usize,
    pub ended:            Vec<ControllerEnd>,
    /// Timer callback faults and ownership invariant violations.
    pub faults:           Vec<IxError>,
}

impl TickReport {
    pub fn new(tick: Tick) -> Self {
        Self { tick, ..Self::default() }
    }

    /// The end record for `id`, if it ended this tick.
    pub fn ended(&self, id: ControllerId) -> Option<&ControllerEnd> {
        self.ended.iter().find(|e| e.id == id)
    }
}

/// Totals over a `run_ticks` / `run_until_idle` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks:  u64,
    pub ended:  Vec<ControllerEnd>,
    pub faults: usize,
}

impl RunSummary {
    pub(crate) fn absorb(&mut self, report: TickReport) {
        self.ticks += 1;
        self.faults += report.faults.len();
        self.ended.extend(report.ended);
    }
}
