//! Duty state: the single writer of `on_duty` and `player_injured`.

use ix_controller::{Controller, InteractionEvent, TickContext};
use ix_core::{ControllerId, EntityHandle, IxResult};
use ix_input::{ActionKey, PressDisambiguator, PressKind};
use ix_world::Cue;
use tracing::{info, warn};

use crate::ScriptTuning;

/// Toggles duty on a tap of the duty key and takes the player off duty when
/// they go down.
pub struct DutyController {
    player: EntityHandle,
    press:  PressDisambiguator,
}

impl DutyController {
    pub fn new(player: EntityHandle, tuning: &ScriptTuning) -> Self {
        Self { player, press: PressDisambiguator::new(tuning.keys.duty, tuning.hold_threshold_ms) }
    }

    fn set_duty(&self, ctx: &mut TickContext<'_>, me: ControllerId, on_duty: bool) -> IxResult<()> {
        if !ctx.shared_mut().on_duty.set(me, on_duty)? {
            return Ok(());
        }
        info!(tick = ctx.now.0, on_duty, "duty changed");
        ctx.publish(InteractionEvent::DutyChanged { on_duty });
        if on_duty {
            ctx.notify("You are now on duty");
            ctx.cue(Cue::Radio("duty_on".into()));
        } else {
            ctx.notify("You are now off duty");
            ctx.cue(Cue::Radio("duty_off".into()));
        }
        Ok(())
    }
}

impl Controller for DutyController {
    fn name(&self) -> &str {
        "duty"
    }

    fn input_keys(&self) -> Vec<ActionKey> {
        vec![self.press.key()]
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        let me = ctx.me()?;
        let shared = ctx.shared_mut();
        shared.on_duty.bind_writer(me)?;
        shared.player_injured.bind_writer(me)?;
        Ok(())
    }

    fn process(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        let me = ctx.me()?;
        let alive = ctx.world().status(self.player).is_some_and(|s| s.alive);
        let injured = ctx.shared().player_injured.get();

        if !alive {
            if !injured {
                warn!(tick = ctx.now.0, player = %self.player, "player down");
                ctx.shared_mut().player_injured.set(me, true)?;
                self.set_duty(ctx, me, false)?;
                ctx.notify("Officer down");
                ctx.cue(Cue::Radio("officer_down".into()));
            }
            self.press.reset();
            return Ok(());
        }
        if injured {
            ctx.shared_mut().player_injured.set(me, false)?;
        }

        if self.press.update(ctx.input) == Some(PressKind::Tap) {
            let next = !ctx.shared().on_duty.get();
            self.set_duty(ctx, me, next)?;
        }
        Ok(())
    }
}
