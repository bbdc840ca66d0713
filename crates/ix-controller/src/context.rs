//! `TickContext` — everything a controller hook may touch during one call.

use ix_arbiter::{ClaimOptions, Grant, OwnershipArbiter};
use ix_core::{ControllerId, EntityHandle, IxError, IxResult, SessionRng, SubscriptionId, Tick, TickClock};
use ix_input::{ActionKey, InputFrame};
use ix_timer::{TimerHandle, TimerService, TimerSpec, TimerTarget};
use ix_world::{Cue, EntityStatus, Presentation, World, WorldCommand};
use tracing::trace;

use crate::{Controller, EventBus, EventKind, InteractionEvent, SharedState, TimerCallback};

/// The timer service as used by controllers: detached callbacks are boxed
/// trait objects.
pub type Timers = TimerService<Box<dyn TimerCallback>>;

// ── Registry ──────────────────────────────────────────────────────────────────

/// Controllers waiting for activation, plus stop requests raised mid-tick.
///
/// Ids are handed out at registration, in ascending order, so a controller
/// spawned by another one can be referred to (e.g. in events) immediately.
pub struct Registry {
    next_id: ControllerId,
    pending: Vec<(ControllerId, Box<dyn Controller>)>,
    stops:   Vec<ControllerId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self { next_id: ControllerId(0), pending: Vec::new(), stops: Vec::new() }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `controller` for activation at the start of the next tick.
    pub fn register(&mut self, controller: Box<dyn Controller>) -> ControllerId {
        let id = self.next_id;
        self.next_id = id.next();
        trace!(controller = %id, name = controller.name(), "registered");
        self.pending.push((id, controller));
        id
    }

    /// Take every queued registration, in registration order.
    pub fn take_pending(&mut self) -> Vec<(ControllerId, Box<dyn Controller>)> {
        std::mem::take(&mut self.pending)
    }

    /// Drop a registration that has not been activated yet.
    pub fn cancel_pending(&mut self, id: ControllerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != id);
        before != self.pending.len()
    }

    pub fn is_pending(&self, id: ControllerId) -> bool {
        self.pending.iter().any(|(pending, _)| *pending == id)
    }

    /// Input keys wanted by queued controllers.
    pub fn pending_keys(&self) -> Vec<ActionKey> {
        self.pending.iter().flat_map(|(_, c)| c.input_keys()).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ask the scheduler to end `id` as soon as the current hook returns.
    pub fn request_stop(&mut self, id: ControllerId) {
        if !self.stops.contains(&id) {
            self.stops.push(id);
        }
    }

    pub fn take_stops(&mut self) -> Vec<ControllerId> {
        std::mem::take(&mut self.stops)
    }
}

// ── Runtime ───────────────────────────────────────────────────────────────────

/// Scheduler-owned services shared by every controller.
#[derive(Default)]
pub struct Runtime {
    pub arbiter:  OwnershipArbiter,
    pub timers:   Timers,
    pub bus:      EventBus,
    pub shared:   SharedState,
    pub registry: Registry,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }
}

// ── TickContext ───────────────────────────────────────────────────────────────

/// Who is running the current hook.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Caller {
    Controller(ControllerId),
    /// A detached timer callback.  It has no controller identity, so it can
    /// neither own entities nor schedule controller timers.
    Callback(TimerHandle),
}

/// Mutable view of the scheduler for the duration of one hook call.
pub struct TickContext<'a> {
    /// The tick being processed.
    pub now:   Tick,
    pub clock: TickClock,
    /// This tick's input, captured once before any controller ran.
    pub input: &'a InputFrame,
    /// The caller's own deterministic RNG.
    pub rng:   &'a mut SessionRng,

    world:         &'a mut dyn World,
    presentation:  &'a mut dyn Presentation,
    rt:            &'a mut Runtime,
    caller:        Caller,
    end_requested: bool,
}

impl<'a> TickContext<'a> {
    pub fn new(
        clock:        TickClock,
        input:        &'a InputFrame,
        world:        &'a mut dyn World,
        presentation: &'a mut dyn Presentation,
        rt:           &'a mut Runtime,
        rng:          &'a mut SessionRng,
        caller:       Caller,
    ) -> Self {
        Self {
            now: clock.current_tick,
            clock,
            input,
            rng,
            world,
            presentation,
            rt,
            caller,
            end_requested: false,
        }
    }

    // ── Identity ──────────────────────────────────────────────────────────

    pub fn caller(&self) -> Caller {
        self.caller
    }

    /// The calling controller's id.  Fails for detached callbacks.
    pub fn me(&self) -> IxResult<ControllerId> {
        match self.caller {
            Caller::Controller(id) => Ok(id),
            Caller::Callback(timer) => Err(IxError::InvariantViolation(format!(
                "detached callback {timer} has no controller identity"
            ))),
        }
    }

    // ── World ─────────────────────────────────────────────────────────────

    /// Read-only world queries.  Use [`command`][Self::command] to act.
    pub fn world(&self) -> &dyn World {
        &*self.world
    }

    /// Status of `entity`, or `StaleReference` if it no longer exists.
    pub fn status(&self, entity: EntityHandle) -> IxResult<EntityStatus> {
        self.world.status(entity).ok_or(IxError::StaleReference(entity))
    }

    /// Issue a behavior command to an entity the caller owns.
    ///
    /// Refused with `StaleReference` when the entity is gone, with
    /// `OwnershipConflict` when someone else owns it, and with
    /// `InvariantViolation` when nobody does.
    pub fn command(&mut self, entity: EntityHandle, command: WorldCommand) -> IxResult<()> {
        let me = self.me()?;
        if !self.world.exists(entity) {
            return Err(IxError::StaleReference(entity));
        }
        match self.rt.arbiter.current_owner(entity) {
            Some(owner) if owner == me => {}
            Some(holder) => {
                return Err(IxError::OwnershipConflict { entity, holder, requester: me });
            }
            None => {
                return Err(IxError::InvariantViolation(format!(
                    "{me} issued {} to {entity} without owning it",
                    command.name()
                )));
            }
        }
        trace!(controller = %me, %entity, command = command.name(), "command");
        self.world.apply(entity, command)?;
        Ok(())
    }

    // ── Ownership ─────────────────────────────────────────────────────────

    pub fn request_ownership(&mut self, entity: EntityHandle) -> IxResult<Grant> {
        self.request_ownership_with(entity, ClaimOptions::default())
    }

    pub fn request_ownership_with(
        &mut self,
        entity:  EntityHandle,
        options: ClaimOptions,
    ) -> IxResult<Grant> {
        let me = self.me()?;
        Ok(self.rt.arbiter.request(entity, me, options, self.now, &mut *self.world)?)
    }

    /// Release the caller's claim on `entity`.  `false` if it held none.
    pub fn release_ownership(&mut self, entity: EntityHandle) -> bool {
        match self.caller {
            Caller::Controller(me) => self.rt.arbiter.release(entity, me),
            Caller::Callback(_) => false,
        }
    }

    /// Hand one of the caller's entities to another controller.
    pub fn transfer_ownership(&mut self, entity: EntityHandle, to: ControllerId) -> IxResult<Grant> {
        let me = self.me()?;
        let now = self.now;
        Ok(self.rt.arbiter.transfer(entity, me, to, ClaimOptions::default(), now, &mut *self.world)?)
    }

    pub fn owner_of(&self, entity: EntityHandle) -> Option<ControllerId> {
        self.rt.arbiter.current_owner(entity)
    }

    pub fn owns(&self, entity: EntityHandle) -> bool {
        matches!(self.caller, Caller::Controller(me) if self.rt.arbiter.is_owned_by(entity, me))
    }

    /// Entities the caller currently owns, sorted.
    pub fn owned(&self) -> Vec<EntityHandle> {
        match self.caller {
            Caller::Controller(me) => self.rt.arbiter.owned_by(me),
            Caller::Callback(_) => Vec::new(),
        }
    }

    // ── Timers ────────────────────────────────────────────────────────────

    /// Schedule a timer delivered to the caller's `on_timer`.
    pub fn schedule(&mut self, spec: TimerSpec) -> IxResult<TimerHandle> {
        let me = self.me()?;
        Ok(self.rt.timers.schedule(&self.clock, spec, TimerTarget::Controller(me)))
    }

    /// Schedule a detached callback.
    pub fn schedule_callback(
        &mut self,
        spec:     TimerSpec,
        callback: Box<dyn TimerCallback>,
    ) -> TimerHandle {
        self.rt.timers.schedule(&self.clock, spec, TimerTarget::Callback(callback))
    }

    /// Idempotent; see `TimerService::cancel`.
    pub fn cancel(&mut self, timer: TimerHandle) -> bool {
        self.rt.timers.cancel(timer)
    }

    pub fn timer_pending(&self, timer: TimerHandle) -> bool {
        self.rt.timers.is_pending(timer)
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Queue an event.  Subscribers see it in this tick's event phase.
    pub fn publish(&mut self, event: InteractionEvent) {
        self.rt.bus.publish(event);
    }

    pub fn subscribe(&mut self, kind: EventKind) -> IxResult<SubscriptionId> {
        let me = self.me()?;
        Ok(self.rt.bus.subscribe(me, kind))
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.rt.bus.unsubscribe(subscription)
    }

    // ── Shared flags ──────────────────────────────────────────────────────

    pub fn shared(&self) -> &SharedState {
        &self.rt.shared
    }

    /// Mutable access for binding and writing cells; each write still checks
    /// the caller against the cell's writer.
    pub fn shared_mut(&mut self) -> &mut SharedState {
        &mut self.rt.shared
    }

    // ── Presentation ──────────────────────────────────────────────────────

    pub fn present(&mut self) -> &mut dyn Presentation {
        &mut *self.presentation
    }

    pub fn notify(&mut self, text: &str) {
        self.presentation.notify(text);
    }

    pub fn help_text(&mut self, text: &str) {
        self.presentation.help_text(text);
    }

    pub fn cue(&mut self, cue: Cue) {
        self.presentation.cue(cue);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Register another controller; it starts at the beginning of next tick.
    pub fn spawn(&mut self, controller: Box<dyn Controller>) -> ControllerId {
        self.rt.registry.register(controller)
    }

    /// Ask the scheduler to end `controller` once this hook returns.  It is
    /// skipped for the rest of the tick.
    pub fn stop(&mut self, controller: ControllerId) {
        self.rt.registry.request_stop(controller);
    }

    /// End the caller normally once this hook returns.
    pub fn end(&mut self) {
        self.end_requested = true;
    }

    pub fn end_requested(&self) -> bool {
        self.end_requested
    }
}
