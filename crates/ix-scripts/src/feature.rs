//! Always-on trigger watchers that start custody sessions.

use ix_controller::{Controller, EventKind, InteractionEvent, TickContext};
use ix_core::{ControllerId, EntityHandle, IxResult};
use ix_input::{ActionKey, PressDisambiguator, PressKind};
use ix_world::Cue;
use tracing::{debug, info};

use crate::ScriptTuning;
use crate::arrest::Arrest;
use crate::handoff::{CustodyKind, CustodySession};
use crate::trunk::TrunkSearch;

pub type ArrestFeature = SessionFeature<Arrest>;
pub type TrunkSearchFeature = SessionFeature<TrunkSearch>;

/// Watches the trigger key and spawns one session of kind `K` at a time.
///
/// A tap while on duty (and not injured) picks the nearest eligible entity
/// within the interaction radius that nobody owns.  Taps are ignored while
/// the spawned session is still running; the watcher learns that it ended
/// from `SessionResolved` / `SessionAborted`.
pub struct SessionFeature<K: CustodyKind> {
    kind:    K,
    player:  EntityHandle,
    tuning:  ScriptTuning,
    press:   PressDisambiguator,
    active:  Option<ControllerId>,
    started: u32,
}

impl<K: CustodyKind> SessionFeature<K> {
    pub fn new(kind: K, player: EntityHandle, tuning: ScriptTuning) -> Self {
        let press = PressDisambiguator::new(K::trigger_key(&tuning.keys), tuning.hold_threshold_ms);
        Self { kind, player, tuning, press, active: None, started: 0 }
    }

    /// The running session, if any.
    pub fn active(&self) -> Option<ControllerId> {
        self.active
    }

    /// Sessions started so far.
    pub fn started(&self) -> u32 {
        self.started
    }

    fn pick_target(&self, ctx: &TickContext<'_>) -> Option<EntityHandle> {
        let world = ctx.world();
        let at = world.position(self.player)?;
        world
            .entities_near(at, self.tuning.interaction_radius, K::TARGET_KIND)
            .into_iter()
            .filter(|&e| e != self.player && ctx.owner_of(e).is_none())
            .find(|&e| world.status(e).is_some_and(|s| K::eligible(&s)))
    }
}

impl<K: CustodyKind> Controller for SessionFeature<K> {
    fn name(&self) -> &str {
        K::WATCHER
    }

    fn input_keys(&self) -> Vec<ActionKey> {
        vec![self.press.key()]
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        ctx.subscribe(EventKind::SessionResolved)?;
        ctx.subscribe(EventKind::SessionAborted)?;
        Ok(())
    }

    fn process(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        // Fed every tick so a press that spans a session's end is still
        // classified correctly.
        if self.press.update(ctx.input) != Some(PressKind::Tap) {
            return Ok(());
        }
        if let Some(session) = self.active {
            debug!(feature = K::FEATURE, %session, "trigger ignored; session running");
            return Ok(());
        }
        let (on_duty, injured) = (ctx.shared().on_duty.get(), ctx.shared().player_injured.get());
        if !on_duty {
            ctx.notify("You are off duty");
            ctx.cue(Cue::Deny);
            return Ok(());
        }
        if injured {
            return Ok(());
        }

        match self.pick_target(ctx) {
            Some(target) => {
                let session = CustodySession::new(self.kind.clone(), target, self.player, self.tuning.clone());
                let id = ctx.spawn(Box::new(session));
                self.active = Some(id);
                self.started += 1;
                info!(tick = ctx.now.0, feature = K::FEATURE, session = %id, %target, "session spawned");
            }
            None => {
                ctx.notify("Nobody nearby");
                ctx.cue(Cue::Deny);
            }
        }
        Ok(())
    }

    fn on_event(&mut self, _ctx: &mut TickContext<'_>, event: &InteractionEvent) -> IxResult<()> {
        match event {
            InteractionEvent::SessionResolved { session, .. } | InteractionEvent::SessionAborted { session, .. }
                if self.active == Some(*session) =>
            {
                self.active = None;
            }
            _ => {}
        }
        Ok(())
    }
}
