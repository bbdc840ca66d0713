//! The `FrameScheduler` and its tick loop.

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};

use ix_arbiter::{OwnershipArbiter, Revocation};
use ix_controller::{Caller, Controller, InteractionEvent, Runtime, SharedState, TickContext, TimerCallback};
use ix_core::{ControllerId, IxError, IxResult, SchedulerConfig, SessionRng, Tick, TickClock};
use ix_input::{InputFrame, InputTracker};
use ix_timer::{TimerHandle, TimerParams, TimerTarget};
use ix_world::WorldCommand;
use tracing::{debug, error, info, warn};

use crate::{
    ControllerEnd, EndReason, Host, NoopObserver, RunSummary, SchedError, SchedResult,
    SchedulerObserver, TickReport,
};

// ── Slots ─────────────────────────────────────────────────────────────────────

/// One active controller plus the state the scheduler keeps on its behalf.
struct Slot {
    controller: Box<dyn Controller>,
    name:       String,
    rng:        SessionRng,
    started_at: Tick,
}

/// Which controller hook to run.
enum Hook<'e> {
    Start,
    Process,
    Timer(TimerHandle, &'e TimerParams),
    Event(&'e InteractionEvent),
    OwnershipLost(&'e Revocation),
}

// ── FrameScheduler ────────────────────────────────────────────────────────────

/// Cooperative, single-threaded driver for interaction controllers.
///
/// The host calls [`tick`][Self::tick] once per frame.  Each tick runs these
/// phases in order:
///
/// 0. **Input**: advance the clock; poll input once into an `InputFrame`.
/// 1. **Activation**: registrations queued before this tick run `on_start`.
/// 2. **Timers**: every due timer fires, in (due tick, schedule order).
/// 3. **Sweep**: expired claims (and, if enabled, claims on dead
///    entities) are revoked; owners get `on_ownership_lost`.
/// 4. **Controllers**: `process` once per active controller, ascending id.
/// 5. **Events**: events queued so far are delivered to subscribers.
/// 6. **Audit**: claims held by unregistered controllers are released.
///
/// A hook that returns `Err` or panics ends only its own controller.
///
/// Create via [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct FrameScheduler {
    config:       SchedulerConfig,
    clock:        TickClock,
    rt:           Runtime,
    slots:        BTreeMap<ControllerId, Slot>,
    /// Registrations taken for this tick's activation phase, not yet started.
    activating:   VecDeque<(ControllerId, Box<dyn Controller>)>,
    tracker:      InputTracker,
    /// RNG lent to detached timer callbacks.
    detached_rng: SessionRng,
}

impl FrameScheduler {
    pub(crate) fn new(config: SchedulerConfig, shared: SharedState) -> Self {
        let rt = Runtime { shared, ..Runtime::default() };
        Self {
            clock:        config.make_clock(),
            detached_rng: SessionRng::new(config.seed, ControllerId::INVALID),
            config,
            rt,
            slots:        BTreeMap::new(),
            activating:   VecDeque::new(),
            tracker:      InputTracker::new(),
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Queue `controller`; it runs `on_start` at the start of the next tick.
    pub fn register_controller(&mut self, controller: Box<dyn Controller>) -> ControllerId {
        self.rt.registry.register(controller)
    }

    /// End `id` now: `on_end` runs, then its claims, timers, subscriptions
    /// and shared-flag writer slots are dropped.  A controller that is still
    /// pending is discarded without ever starting.
    pub fn deregister_controller(&mut self, id: ControllerId, host: &mut Host<'_>) -> SchedResult<()> {
        if self.rt.registry.cancel_pending(id) {
            debug!(controller = %id, "pending registration cancelled");
            return Ok(());
        }
        if !self.slots.contains_key(&id) {
            return Err(SchedError::UnknownController(id));
        }
        let frame = InputFrame::empty(self.clock.current_tick, self.clock.elapsed_ms());
        let mut report = TickReport::new(self.clock.current_tick);
        self.finalize(id, EndReason::Deregistered, host, &frame, &mut report);
        self.apply_stops(host, &frame, &mut report);
        Ok(())
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run one tick.  See the type-level docs for the phase order.
    pub fn tick(&mut self, host: &mut Host<'_>) -> TickReport {
        // ── Phase 0: clock and input ──────────────────────────────────────
        //
        // Keys of controllers about to start are bound before the capture so
        // they see this tick's input.
        let now = self.clock.advance();
        for key in self.rt.registry.pending_keys() {
            self.tracker.bind(key);
        }
        let frame = self.tracker.capture(&mut *host.input, now, self.clock.elapsed_ms());
        let mut report = TickReport::new(now);

        // ── Phase 1: activate pending registrations ───────────────────────
        //
        // An `on_start` may stop a controller later in the same batch; that
        // one is dropped from `activating` and never starts.
        self.activating = self.rt.registry.take_pending().into();
        while let Some((id, controller)) = self.activating.pop_front() {
            let name = controller.name().to_owned();
            info!(tick = now.0, controller = %id, %name, "controller started");
            self.slots.insert(id, Slot {
                controller,
                name,
                rng: SessionRng::new(self.config.seed, id),
                started_at: now,
            });
            report.activated.push(id);
            self.dispatch(id, Hook::Start, host, &frame, &mut report);
        }

        // ── Phase 2: timers ───────────────────────────────────────────────
        //
        // The due set is fixed here; anything scheduled while it fires waits
        // for a later tick.
        for timer in self.rt.timers.collect_due(now) {
            let Some(mut firing) = self.rt.timers.begin_fire(timer) else { continue };
            report.timers_fired += 1;
            match &mut firing.target {
                TimerTarget::Controller(id) => {
                    let id = *id;
                    self.dispatch(id, Hook::Timer(firing.handle, &firing.params), host, &frame, &mut report);
                }
                TimerTarget::Callback(callback) => {
                    self.fire_detached(firing.handle, callback.as_mut(), &firing.params, host, &frame, &mut report);
                }
            }
            self.rt.timers.finish_fire(firing, now);
        }

        // ── Phase 3: ownership sweep ──────────────────────────────────────
        let revoked = self.rt.arbiter.sweep(now, &*host.world, self.config.auto_release_dead);
        for revocation in &revoked {
            self.rt.bus.publish(InteractionEvent::OwnershipRevoked {
                entity: revocation.entity,
                owner:  revocation.owner,
                reason: revocation.reason,
            });
            self.dispatch(revocation.owner, Hook::OwnershipLost(revocation), host, &frame, &mut report);
        }
        report.revocations = revoked;

        // ── Phase 4: controllers, in registration order ───────────────────
        let order: Vec<ControllerId> = self.slots.keys().copied().collect();
        for id in order {
            // Ended or stopped earlier in this tick.
            if !self.slots.contains_key(&id) {
                continue;
            }
            report.processed += 1;
            self.dispatch(id, Hook::Process, host, &frame, &mut report);
        }

        // ── Phase 5: events ───────────────────────────────────────────────
        for event in self.rt.bus.take_pending() {
            for id in self.rt.bus.subscribers(event.kind()) {
                if !self.slots.contains_key(&id) {
                    continue;
                }
                report.events_delivered += 1;
                self.dispatch(id, Hook::Event(&event), host, &frame, &mut report);
            }
        }

        // ── Phase 6: ownership audit ──────────────────────────────────────
        let slots = &self.slots;
        let orphaned = self.rt.arbiter.audit(|id| slots.contains_key(&id));
        for claim in orphaned {
            let fault = IxError::InvariantViolation(format!(
                "{} was still owned by unregistered {}",
                claim.entity, claim.owner
            ));
            error!(tick = now.0, entity = %claim.entity, owner = %claim.owner, "orphaned claim released");
            report.faults.push(fault);
        }

        report
    }

    /// Run exactly `n` ticks.
    pub fn run_ticks<O: SchedulerObserver>(
        &mut self,
        n:        u64,
        host:     &mut Host<'_>,
        observer: &mut O,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..n {
            let report = self.observed_tick(host, observer);
            summary.absorb(report);
        }
        observer.on_run_end(self.clock.current_tick);
        summary
    }

    /// Run until no controller, pending registration or timer remains, or
    /// until `max` ticks have run.
    pub fn run_until_idle<O: SchedulerObserver>(
        &mut self,
        max:      u64,
        host:     &mut Host<'_>,
        observer: &mut O,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        while summary.ticks < max && !self.is_idle() {
            let report = self.observed_tick(host, observer);
            summary.absorb(report);
        }
        observer.on_run_end(self.clock.current_tick);
        summary
    }

    /// `run_until_idle` bounded by `config.max_ticks` (unbounded when 0).
    pub fn run(&mut self, host: &mut Host<'_>) -> RunSummary {
        let max = match self.config.max_ticks {
            0 => u64::MAX,
            n => n,
        };
        self.run_until_idle(max, host, &mut NoopObserver)
    }

    fn observed_tick<O: SchedulerObserver>(&mut self, host: &mut Host<'_>, observer: &mut O) -> TickReport {
        observer.on_tick_start(self.clock.current_tick.offset(1));
        let report = self.tick(host);
        for end in &report.ended {
            observer.on_controller_end(report.tick, end);
        }
        for fault in &report.faults {
            observer.on_fault(report.tick, fault);
        }
        observer.on_tick_end(&report);
        report
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// The most recently processed tick (`Tick(0)` before the first).
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn arbiter(&self) -> &OwnershipArbiter {
        &self.rt.arbiter
    }

    pub fn shared(&self) -> &SharedState {
        &self.rt.shared
    }

    /// Direct access to the services, for hosts that seed state between ticks.
    pub fn runtime(&self) -> &Runtime {
        &self.rt
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.rt
    }

    /// `true` once `id` has started and has not ended.
    pub fn is_active(&self, id: ControllerId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn is_pending(&self, id: ControllerId) -> bool {
        self.rt.registry.is_pending(id)
    }

    pub fn controller_name(&self, id: ControllerId) -> Option<&str> {
        self.slots.get(&id).map(|s| s.name.as_str())
    }

    /// Tick on which `id` started.
    pub fn started_at(&self, id: ControllerId) -> Option<Tick> {
        self.slots.get(&id).map(|s| s.started_at)
    }

    /// Active controllers, in registration order.
    pub fn active_controllers(&self) -> Vec<ControllerId> {
        self.slots.keys().copied().collect()
    }

    pub fn is_idle(&self) -> bool {
        self.slots.is_empty() && self.rt.registry.pending_len() == 0 && self.rt.timers.is_empty()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Run one hook of `id`, isolating errors and panics, then apply any
    /// end or stop requests it produced.
    fn dispatch(
        &mut self,
        id:     ControllerId,
        hook:   Hook<'_>,
        host:   &mut Host<'_>,
        frame:  &InputFrame,
        report: &mut TickReport,
    ) {
        let Some(slot) = self.slots.get_mut(&id) else { return };
        let timer = match hook {
            Hook::Timer(handle, _) => Some(handle),
            _ => None,
        };

        let mut ctx = TickContext::new(
            self.clock,
            frame,
            &mut *host.world,
            &mut *host.presentation,
            &mut self.rt,
            &mut slot.rng,
            Caller::Controller(id),
        );
        let controller = &mut slot.controller;
        let outcome = catch_unwind(AssertUnwindSafe(|| match hook {
            Hook::Start => controller.on_start(&mut ctx),
            Hook::Process => controller.process(&mut ctx),
            Hook::Timer(handle, params) => controller.on_timer(&mut ctx, handle, params),
            Hook::Event(event) => controller.on_event(&mut ctx, event),
            Hook::OwnershipLost(revocation) => controller.on_ownership_lost(&mut ctx, revocation),
        }));
        let end_requested = ctx.end_requested();
        drop(ctx);

        let tick = self.clock.current_tick.0;
        let verdict = match flatten(outcome) {
            Ok(()) if end_requested => Some(EndReason::Completed),
            Ok(()) => None,
            Err(err) => {
                if err.is_recoverable() {
                    warn!(tick, controller = %id, name = %slot.name, %err, "controller failed");
                } else {
                    error!(tick, controller = %id, name = %slot.name, %err, "controller failed");
                }
                if let Some(handle) = timer {
                    report.faults.push(IxError::TimerCallbackFault {
                        timer:   handle.id(),
                        message: err.to_string(),
                    });
                }
                Some(EndReason::Faulted(err))
            }
        };

        if let Some(reason) = verdict {
            self.finalize(id, reason, host, frame, report);
        }
        self.apply_stops(host, frame, report);
    }

    fn fire_detached(
        &mut self,
        handle:   TimerHandle,
        callback: &mut dyn TimerCallback,
        params:   &TimerParams,
        host:     &mut Host<'_>,
        frame:    &InputFrame,
        report:   &mut TickReport,
    ) {
        let mut ctx = TickContext::new(
            self.clock,
            frame,
            &mut *host.world,
            &mut *host.presentation,
            &mut self.rt,
            &mut self.detached_rng,
            Caller::Callback(handle),
        );
        let outcome = catch_unwind(AssertUnwindSafe(|| callback.fire(&mut ctx, params)));
        drop(ctx);

        if let Err(err) = flatten(outcome) {
            let fault = IxError::TimerCallbackFault { timer: handle.id(), message: err.to_string() };
            warn!(tick = self.clock.current_tick.0, timer = %handle, %fault, "timer callback failed");
            report.faults.push(fault);
        }
        self.apply_stops(host, frame, report);
    }

    /// Remove `id` and clean up everything it held.
    fn finalize(
        &mut self,
        id:     ControllerId,
        reason: EndReason,
        host:   &mut Host<'_>,
        frame:  &InputFrame,
        report: &mut TickReport,
    ) {
        let Some(mut slot) = self.slots.remove(&id) else { return };

        let mut ctx = TickContext::new(
            self.clock,
            frame,
            &mut *host.world,
            &mut *host.presentation,
            &mut self.rt,
            &mut slot.rng,
            Caller::Controller(id),
        );
        let controller = &mut slot.controller;
        let outcome = catch_unwind(AssertUnwindSafe(|| controller.on_end(&mut ctx)));
        drop(ctx);
        if let Err(err) = flatten(outcome) {
            warn!(controller = %id, name = %slot.name, %err, "on_end failed; cleaning up anyway");
        }

        // Entities still held at this point have nobody left to drive them.
        let released = self.rt.arbiter.release_all(id);
        for &entity in &released {
            if host.world.exists(entity) {
                if let Err(err) = host.world.apply(entity, WorldCommand::ResumeAmbient) {
                    warn!(%entity, %err, "could not hand entity back to ambient behavior");
                }
            }
        }
        let timers = self.rt.timers.cancel_owned_by(id);
        let subscriptions = self.rt.bus.unsubscribe_all(id);
        self.rt.shared.release_writer(id);

        info!(
            tick = self.clock.current_tick.0,
            controller = %id,
            name = %slot.name,
            ?reason,
            released = released.len(),
            timers,
            subscriptions,
            "controller ended"
        );
        report.ended.push(ControllerEnd { id, name: slot.name, reason, released });
    }

    /// Finalize every controller stopped via `TickContext::stop`.  Stopping
    /// can cascade (an `on_end` may stop others), so drain until quiet.
    fn apply_stops(&mut self, host: &mut Host<'_>, frame: &InputFrame, report: &mut TickReport) {
        loop {
            let stops = self.rt.registry.take_stops();
            if stops.is_empty() {
                break;
            }
            for id in stops {
                if self.rt.registry.cancel_pending(id) {
                    continue;
                }
                if let Some(at) = self.activating.iter().position(|(queued, _)| *queued == id) {
                    if let Some((_, controller)) = self.activating.remove(at) {
                        debug!(controller = %id, name = controller.name(), "stopped before it started");
                        report.ended.push(ControllerEnd {
                            id,
                            name: controller.name().to_owned(),
                            reason: EndReason::Deregistered,
                            released: Vec::new(),
                        });
                    }
                    continue;
                }
                self.finalize(id, EndReason::Deregistered, host, frame, report);
            }
        }
    }
}

// ── Panic isolation helpers ───────────────────────────────────────────────────

/// Collapse "returned an error" and "panicked" into one `IxError`.
fn flatten(outcome: Result<IxResult<()>, Box<dyn Any + Send>>) -> IxResult<()> {
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(IxError::InvariantViolation(format!(
            "panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
