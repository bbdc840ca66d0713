//! Bookkeeping for one running interaction.

use ix_core::{EntityHandle, IxResult, Tick};
use ix_timer::{TimerHandle, TimerSpec};

use crate::{FsmDriver, StateMachine, TickContext};

/// How the target responds, rolled when the session starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    Cooperate,
    Escalate,
}

/// An interaction in progress: its state machine, its target, and every
/// entity and timer it has to clean up when it ends.
#[derive(Debug)]
pub struct Session<M: StateMachine> {
    pub fsm:         FsmDriver<M>,
    pub target:      EntityHandle,
    pub disposition: Disposition,
    pub started_at:  Tick,
    owned:           Vec<EntityHandle>,
    timers:          Vec<TimerHandle>,
}

impl<M: StateMachine> Session<M> {
    pub fn new(machine: M, initial: M::State, target: EntityHandle, now: Tick) -> Self {
        Self {
            fsm:         FsmDriver::new(machine, initial),
            target,
            disposition: Disposition::Cooperate,
            started_at:  now,
            owned:       Vec::new(),
            timers:      Vec::new(),
        }
    }

    pub fn state(&self) -> &M::State {
        self.fsm.state()
    }

    pub fn is_terminal(&self) -> bool {
        self.fsm.is_terminal()
    }

    /// Ticks since the session started.
    pub fn age(&self, now: Tick) -> u64 {
        now.since(self.started_at)
    }

    // ── Ownership ─────────────────────────────────────────────────────────

    /// Request `entity` and remember it for cleanup on success.
    pub fn claim(&mut self, ctx: &mut TickContext<'_>, entity: EntityHandle) -> IxResult<()> {
        ctx.request_ownership(entity)?;
        if !self.owned.contains(&entity) {
            self.owned.push(entity);
        }
        Ok(())
    }

    pub fn owned(&self) -> &[EntityHandle] {
        &self.owned
    }

    /// Forget an entity whose claim was taken away by the arbiter.
    pub fn forget(&mut self, entity: EntityHandle) {
        self.owned.retain(|&e| e != entity);
    }

    /// Release every entity the session still holds.  Returns those that
    /// were actually released.
    pub fn release_all(&mut self, ctx: &mut TickContext<'_>) -> Vec<EntityHandle> {
        std::mem::take(&mut self.owned)
            .into_iter()
            .filter(|&e| ctx.release_ownership(e))
            .collect()
    }

    // ── Timers ────────────────────────────────────────────────────────────

    /// Schedule a timer for this session and track it for cleanup.
    pub fn start_timer(&mut self, ctx: &mut TickContext<'_>, spec: TimerSpec) -> IxResult<TimerHandle> {
        let handle = ctx.schedule(spec)?;
        self.timers.push(handle);
        Ok(handle)
    }

    /// Cancel a tracked timer.  `false` if it was not tracked.
    pub fn cancel_timer(&mut self, ctx: &mut TickContext<'_>, handle: TimerHandle) -> bool {
        let tracked = self.timers.contains(&handle);
        self.timers.retain(|&h| h != handle);
        tracked && ctx.cancel(handle)
    }

    /// A one-shot timer fired; stop tracking it.
    pub fn timer_fired(&mut self, handle: TimerHandle) {
        self.timers.retain(|&h| h != handle);
    }

    pub fn cancel_timers(&mut self, ctx: &mut TickContext<'_>) {
        for handle in std::mem::take(&mut self.timers) {
            ctx.cancel(handle);
        }
    }

    pub fn timers(&self) -> &[TimerHandle] {
        &self.timers
    }
}
