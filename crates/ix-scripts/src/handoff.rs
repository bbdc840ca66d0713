//! `CustodySession`: one running custody handoff, generic over what is being
//! handed off.
//!
//! The session owns a [`CustodyMachine`] wrapped in a [`Session`], and turns
//! the machine's commands into world commands, timers and events.  Everything
//! that differs between an arrest and a trunk search lives behind
//! [`CustodyKind`].

use std::collections::VecDeque;

use ix_arbiter::Revocation;
use ix_controller::{
    AbortReason, Controller, Disposition, InteractionEvent, Resolution, Session, TickContext,
};
use ix_core::{EntityHandle, IxError, IxResult, Tick};
use ix_input::{ActionKey, PressDisambiguator, PressKind};
use ix_timer::{Delay, TimerHandle, TimerParams, TimerSpec};
use ix_world::{EntityKind, EntityStatus, WorldCommand};
use tracing::{debug, info, warn};

use crate::custody::{CustodyCommand, CustodyEvent, CustodyMachine, CustodyState, Outcome};
use crate::{KeyBindings, ScriptTuning};

/// Timer tag: the target was not reached in time.
pub const TAG_APPROACH: u32 = 1;
/// Timer tag: the timed action finished.
pub const TAG_PERFORM: u32 = 2;
/// Timer tag: a resisting target was not disarmed in time.
pub const TAG_ESCALATION: u32 = 3;

// ── CustodyKind ───────────────────────────────────────────────────────────────

/// Who is involved in a session.
#[derive(Copy, Clone, Debug)]
pub struct Scene<'t> {
    pub target: EntityHandle,
    pub player: EntityHandle,
    pub tuning: &'t ScriptTuning,
}

/// The feature-specific half of a custody handoff.
///
/// Hooks run while the session owns `scene.target`, so they may command it
/// directly.  Hooks with a default do nothing.
pub trait CustodyKind: Clone + 'static {
    /// Session name, used in logs and events.
    const FEATURE: &'static str;
    /// Name of the always-on watcher that starts sessions of this kind.
    const WATCHER: &'static str;
    const TARGET_KIND: EntityKind;

    fn trigger_key(keys: &KeyBindings) -> ActionKey;

    /// Whether an unowned entity of `TARGET_KIND` may be picked as a target.
    fn eligible(status: &EntityStatus) -> bool;

    fn perform_ms(tuning: &ScriptTuning) -> u64;

    fn decision_help(&self) -> &'static str;

    fn allow_escalation(&self) -> bool {
        false
    }

    fn approach(&mut self, _ctx: &mut TickContext<'_>, _scene: &Scene<'_>) -> IxResult<()> {
        Ok(())
    }

    fn begin_perform(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()>;

    fn perform_done(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()>;

    fn escalate(&mut self, _ctx: &mut TickContext<'_>, _scene: &Scene<'_>) -> IxResult<()> {
        Ok(())
    }

    fn disarm(&mut self, _ctx: &mut TickContext<'_>, _scene: &Scene<'_>) -> IxResult<()> {
        Ok(())
    }

    fn execute(
        &mut self,
        ctx:        &mut TickContext<'_>,
        scene:      &Scene<'_>,
        resolution: Resolution,
    ) -> IxResult<()>;

    /// Whether the target goes back to ambient behavior when released.
    fn resumes_ambient(&self, _outcome: Outcome) -> bool {
        true
    }
}

// ── CustodySession ────────────────────────────────────────────────────────────

pub struct CustodySession<K: CustodyKind> {
    kind:             K,
    session:          Session<CustodyMachine>,
    player:           EntityHandle,
    tuning:           ScriptTuning,
    press:            PressDisambiguator,
    approach_timer:   Option<TimerHandle>,
    escalation_timer: Option<TimerHandle>,
}

impl<K: CustodyKind> CustodySession<K> {
    pub fn new(kind: K, target: EntityHandle, player: EntityHandle, tuning: ScriptTuning) -> Self {
        let machine = CustodyMachine::new(kind.allow_escalation());
        let press = PressDisambiguator::new(K::trigger_key(&tuning.keys), tuning.hold_threshold_ms);
        Self {
            kind,
            // Replaced by the real start tick in `on_start`.
            session: Session::new(machine, CustodyState::Init, target, Tick::ZERO),
            player,
            tuning,
            press,
            approach_timer: None,
            escalation_timer: None,
        }
    }

    pub fn state(&self) -> CustodyState {
        *self.session.state()
    }

    pub fn target(&self) -> EntityHandle {
        self.session.target
    }

    pub fn disposition(&self) -> Disposition {
        self.session.disposition
    }

    // ── Driving the machine ───────────────────────────────────────────────

    /// Fire `event` and execute commands until no follow-up event remains.
    fn drive(&mut self, ctx: &mut TickContext<'_>, event: CustodyEvent) -> IxResult<()> {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for command in self.session.fsm.fire(event) {
                if let Some(next) = self.execute(ctx, command)? {
                    queue.push_back(next);
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>, command: CustodyCommand) -> IxResult<Option<CustodyEvent>> {
        let target = self.session.target;
        let scene = Scene { target, player: self.player, tuning: &self.tuning };

        match command {
            CustodyCommand::RequestOwnership => match self.session.claim(ctx, target) {
                Ok(()) => Ok(Some(CustodyEvent::Claimed)),
                Err(IxError::OwnershipConflict { holder, .. }) => {
                    debug!(feature = K::FEATURE, %target, %holder, "target already owned");
                    Ok(Some(CustodyEvent::ClaimDenied))
                }
                Err(IxError::StaleReference(_)) => Ok(Some(CustodyEvent::Abort(AbortReason::TargetGone))),
                Err(err) => Err(err),
            },
            CustodyCommand::Approach => gone(self.kind.approach(ctx, &scene)),
            CustodyCommand::StartApproachTimeout => {
                let spec = TimerSpec::once(Delay::Millis(self.tuning.approach_timeout_ms))
                    .tag(TAG_APPROACH)
                    .entity(target);
                self.approach_timer = Some(self.session.start_timer(ctx, spec)?);
                Ok(None)
            }
            CustodyCommand::CancelApproachTimeout => {
                if let Some(timer) = self.approach_timer.take() {
                    self.session.cancel_timer(ctx, timer);
                }
                Ok(None)
            }
            CustodyCommand::BeginPerform => {
                if let Some(abort) = gone(self.kind.begin_perform(ctx, &scene))? {
                    return Ok(Some(abort));
                }
                let spec = TimerSpec::once(Delay::Millis(K::perform_ms(&self.tuning)))
                    .tag(TAG_PERFORM)
                    .entity(target);
                self.session.start_timer(ctx, spec)?;
                Ok(None)
            }
            CustodyCommand::Escalate => {
                if let Some(abort) = gone(self.kind.escalate(ctx, &scene))? {
                    return Ok(Some(abort));
                }
                let session = ctx.me()?;
                ctx.publish(InteractionEvent::TargetResisted { session, target });
                self.press.reset();
                Ok(None)
            }
            CustodyCommand::StartEscalationTimeout => {
                let spec = TimerSpec::once(Delay::Millis(self.tuning.escalation_timeout_ms))
                    .tag(TAG_ESCALATION)
                    .entity(target);
                self.escalation_timer = Some(self.session.start_timer(ctx, spec)?);
                Ok(None)
            }
            CustodyCommand::CancelEscalationTimeout => {
                if let Some(timer) = self.escalation_timer.take() {
                    self.session.cancel_timer(ctx, timer);
                }
                Ok(None)
            }
            CustodyCommand::PromptDecision => {
                if let Some(abort) = gone(self.kind.perform_done(ctx, &scene))? {
                    return Ok(Some(abort));
                }
                ctx.help_text(self.kind.decision_help());
                self.press.reset();
                Ok(None)
            }
            CustodyCommand::Execute(resolution) => {
                debug!(feature = K::FEATURE, %target, ?resolution, "decision");
                match gone(self.kind.execute(ctx, &scene, resolution))? {
                    Some(abort) => Ok(Some(abort)),
                    None => Ok(Some(CustodyEvent::PathDone)),
                }
            }
            CustodyCommand::CancelTimers => {
                self.session.cancel_timers(ctx);
                self.approach_timer = None;
                self.escalation_timer = None;
                Ok(None)
            }
            CustodyCommand::ReleaseAll => {
                let resume = match self.session.state() {
                    CustodyState::Releasing(outcome) => self.kind.resumes_ambient(*outcome),
                    _ => true,
                };
                if resume {
                    for &entity in self.session.owned() {
                        if !ctx.world().exists(entity) {
                            continue;
                        }
                        if let Err(err) = ctx.command(entity, WorldCommand::ResumeAmbient) {
                            warn!(feature = K::FEATURE, %entity, %err, "could not resume ambient behavior");
                        }
                    }
                }
                self.session.release_all(ctx);
                Ok(Some(CustodyEvent::Released))
            }
            CustodyCommand::Finish(outcome) => {
                self.finish(ctx, outcome)?;
                Ok(None)
            }
        }
    }

    fn finish(&mut self, ctx: &mut TickContext<'_>, outcome: Outcome) -> IxResult<()> {
        let session = ctx.me()?;
        let target = self.session.target;
        let age = self.session.age(ctx.now);
        ctx.publish(match outcome {
            Outcome::Resolved(resolution) => {
                info!(feature = K::FEATURE, %session, %target, ?resolution, ticks = age, "session resolved");
                InteractionEvent::SessionResolved { session, feature: K::FEATURE, target, resolution }
            }
            Outcome::Aborted(reason) => {
                info!(feature = K::FEATURE, %session, %target, ?reason, ticks = age, "session aborted");
                InteractionEvent::SessionAborted { session, feature: K::FEATURE, target, reason }
            }
        });
        ctx.help_text("");
        ctx.end();
        Ok(())
    }

    // ── Per-tick checks ───────────────────────────────────────────────────

    fn target_present(&self, ctx: &TickContext<'_>) -> bool {
        ctx.world().status(self.session.target).is_some_and(|s| s.alive)
    }

    fn in_contact(&self, ctx: &TickContext<'_>) -> bool {
        let world = ctx.world();
        match (world.position(self.player), world.position(self.session.target)) {
            (Some(player), Some(target)) => player.within(target, self.tuning.contact_radius),
            _ => false,
        }
    }

    /// The player disarmed a resisting target; roll its disposition again.
    fn disarm(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        let target = self.session.target;
        let scene = Scene { target, player: self.player, tuning: &self.tuning };
        if let Some(abort) = gone(self.kind.disarm(ctx, &scene))? {
            return self.drive(ctx, abort);
        }
        let session = ctx.me()?;
        ctx.publish(InteractionEvent::TargetDisarmed { session, target });

        let cooperates = !ctx.rng.gen_bool(self.tuning.resist_probability);
        self.session.disposition = if cooperates { Disposition::Cooperate } else { Disposition::Escalate };
        debug!(feature = K::FEATURE, %target, cooperates, "disarmed");
        self.drive(ctx, CustodyEvent::Disarmed { cooperates })
    }
}

impl<K: CustodyKind> Controller for CustodySession<K> {
    fn name(&self) -> &str {
        K::FEATURE
    }

    fn input_keys(&self) -> Vec<ActionKey> {
        vec![self.press.key()]
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        self.session.started_at = ctx.now;
        let resists = self.kind.allow_escalation() && ctx.rng.gen_bool(self.tuning.resist_probability);
        self.session.disposition = if resists { Disposition::Escalate } else { Disposition::Cooperate };

        let session = ctx.me()?;
        let target = self.session.target;
        info!(feature = K::FEATURE, %session, %target, disposition = ?self.session.disposition, "session started");
        ctx.publish(InteractionEvent::SessionStarted { session, feature: K::FEATURE, target });
        self.drive(ctx, CustodyEvent::Begin)
    }

    fn process(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        let state = self.state();
        if state.is_closing() {
            return Ok(());
        }
        if !self.target_present(ctx) {
            return self.drive(ctx, CustodyEvent::Abort(AbortReason::TargetGone));
        }

        match state {
            CustodyState::Approaching if self.in_contact(ctx) => {
                let event = match self.session.disposition {
                    Disposition::Escalate if self.kind.allow_escalation() => CustodyEvent::Resisted,
                    _ => CustodyEvent::Arrived,
                };
                self.drive(ctx, event)
            }
            // Out of reach, the press is still consumed but does nothing.
            CustodyState::Escalated => match self.press.update(ctx.input) {
                Some(PressKind::Tap) if self.in_contact(ctx) => self.disarm(ctx),
                _ => Ok(()),
            },
            CustodyState::AwaitingDecision => match self.press.update(ctx.input) {
                Some(PressKind::Tap) => self.drive(ctx, CustodyEvent::Choose(Resolution::PathA)),
                Some(PressKind::Hold) => self.drive(ctx, CustodyEvent::Choose(Resolution::PathB)),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn on_timer(&mut self, ctx: &mut TickContext<'_>, timer: TimerHandle, params: &TimerParams) -> IxResult<()> {
        self.session.timer_fired(timer);
        if self.state().is_closing() {
            return Ok(());
        }
        // Timers fire before the per-tick presence check in `process`.
        if !self.target_present(ctx) {
            return self.drive(ctx, CustodyEvent::Abort(AbortReason::TargetGone));
        }
        match params.tag {
            TAG_APPROACH => {
                self.approach_timer = None;
                self.drive(ctx, CustodyEvent::ApproachTimedOut)
            }
            TAG_PERFORM => self.drive(ctx, CustodyEvent::PerformDone),
            TAG_ESCALATION => {
                self.escalation_timer = None;
                self.drive(ctx, CustodyEvent::EscalationTimedOut)
            }
            _ => Ok(()),
        }
    }

    fn on_ownership_lost(&mut self, ctx: &mut TickContext<'_>, revocation: &Revocation) -> IxResult<()> {
        self.session.forget(revocation.entity);
        if revocation.entity == self.session.target {
            return self.drive(ctx, CustodyEvent::Abort(AbortReason::OwnershipLost));
        }
        Ok(())
    }

    /// Covers sessions stopped from outside: watchers still need to hear
    /// that the session is over.
    fn on_end(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        if self.session.is_terminal() {
            return Ok(());
        }
        self.session.cancel_timers(ctx);
        let session = ctx.me()?;
        ctx.publish(InteractionEvent::SessionAborted {
            session,
            feature: K::FEATURE,
            target: self.session.target,
            reason: AbortReason::Cancelled,
        });
        Ok(())
    }
}

/// A hook that hit a vanished entity aborts the session instead of faulting
/// the controller.
fn gone(result: IxResult<()>) -> IxResult<Option<CustodyEvent>> {
    match result {
        Ok(()) => Ok(None),
        Err(IxError::StaleReference(entity)) => {
            debug!(%entity, "entity vanished during a hook");
            Ok(Some(CustodyEvent::Abort(AbortReason::TargetGone)))
        }
        Err(err) => Err(err),
    }
}
