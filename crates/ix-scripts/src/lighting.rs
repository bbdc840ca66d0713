//! Emergency lights and siren on the player's current vehicle.

use ix_arbiter::Grant;
use ix_controller::{Controller, InteractionEvent, TickContext};
use ix_core::{EntityHandle, IxError, IxResult};
use ix_input::{ActionKey, PressDisambiguator, PressKind};
use ix_world::{Cue, WorldCommand};
use tracing::{debug, warn};

use crate::ScriptTuning;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Switch {
    Lights,
    Siren,
}

/// Tap toggles the lights, hold toggles the siren.  Writer of `lights_on`.
///
/// The vehicle is only owned for the duration of the command: it is claimed,
/// switched, handed back to ambient behavior and released in the same tick.
/// A vehicle owned by someone else (e.g. during a trunk search) is refused.
pub struct LightingController {
    player: EntityHandle,
    press:  PressDisambiguator,
}

impl LightingController {
    pub fn new(player: EntityHandle, tuning: &ScriptTuning) -> Self {
        Self { player, press: PressDisambiguator::new(tuning.keys.lights, tuning.hold_threshold_ms) }
    }

    fn toggle(&mut self, ctx: &mut TickContext<'_>, switch: Switch) -> IxResult<()> {
        let vehicle = ctx.world().status(self.player).and_then(|s| s.vehicle);
        let Some(vehicle) = vehicle else {
            ctx.notify("You need to be in a vehicle");
            ctx.cue(Cue::Deny);
            return Ok(());
        };
        let status = ctx.world().status(vehicle);
        let Some(status) = status else {
            ctx.cue(Cue::Deny);
            return Ok(());
        };

        let grant = match ctx.request_ownership(vehicle) {
            Ok(grant) => grant,
            Err(IxError::OwnershipConflict { holder, .. }) => {
                debug!(%vehicle, %holder, "vehicle busy");
                ctx.notify("The vehicle is busy");
                ctx.cue(Cue::Deny);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let (lights, siren, command) = match switch {
            Switch::Lights => (!status.lights, status.siren, WorldCommand::SetLights(!status.lights)),
            Switch::Siren => (status.lights, !status.siren, WorldCommand::SetSiren(!status.siren)),
        };
        let applied = ctx.command(vehicle, command);
        if grant == Grant::Granted {
            if let Err(err) = ctx.command(vehicle, WorldCommand::ResumeAmbient) {
                warn!(%vehicle, %err, "could not resume ambient behavior");
            }
            ctx.release_ownership(vehicle);
        }
        applied?;

        let me = ctx.me()?;
        ctx.shared_mut().lights_on.set(me, lights)?;
        ctx.publish(InteractionEvent::LightsChanged { vehicle, lights, siren });
        ctx.cue(Cue::Confirm);
        Ok(())
    }
}

impl Controller for LightingController {
    fn name(&self) -> &str {
        "lighting"
    }

    fn input_keys(&self) -> Vec<ActionKey> {
        vec![self.press.key()]
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        let me = ctx.me()?;
        ctx.shared_mut().lights_on.bind_writer(me)
    }

    fn process(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        match self.press.update(ctx.input) {
            Some(PressKind::Tap) => self.toggle(ctx, Switch::Lights),
            Some(PressKind::Hold) => self.toggle(ctx, Switch::Siren),
            None => Ok(()),
        }
    }
}
