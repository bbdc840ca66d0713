//! Arrest: restrain an actor, then transport or release with a warning.

use ix_controller::{Resolution, TickContext};
use ix_core::IxResult;
use ix_input::ActionKey;
use ix_world::{Cue, EntityKind, EntityStatus, WorldCommand};

use crate::custody::Outcome;
use crate::handoff::{CustodyKind, CustodySession, Scene};
use crate::{KeyBindings, ScriptTuning};

/// Seat a transported suspect takes in the patrol vehicle.
const REAR_SEAT: u8 = 1;

#[derive(Copy, Clone, Debug, Default)]
pub struct Arrest;

pub type ArrestSession = CustodySession<Arrest>;

impl CustodyKind for Arrest {
    const FEATURE: &'static str = "arrest";
    const WATCHER: &'static str = "arrest_feature";
    const TARGET_KIND: EntityKind = EntityKind::Actor;

    fn trigger_key(keys: &KeyBindings) -> ActionKey {
        keys.interact
    }

    fn eligible(status: &EntityStatus) -> bool {
        status.alive && !status.restrained && status.vehicle.is_none()
    }

    fn perform_ms(tuning: &ScriptTuning) -> u64 {
        tuning.restrain_ms
    }

    fn decision_help(&self) -> &'static str {
        "Tap to transport the suspect, hold to release them with a warning"
    }

    fn allow_escalation(&self) -> bool {
        true
    }

    fn approach(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()> {
        ctx.command(scene.target, WorldCommand::Face(scene.player))?;
        ctx.command(scene.target, WorldCommand::Hold)?;
        ctx.help_text("Approach the suspect");
        Ok(())
    }

    fn begin_perform(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()> {
        ctx.command(scene.target, WorldCommand::Hold)?;
        ctx.command(scene.target, WorldCommand::PlayAnim("restrained".into()))?;
        ctx.help_text("Restraining the suspect");
        Ok(())
    }

    fn perform_done(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()> {
        ctx.command(scene.target, WorldCommand::Restrain)?;
        ctx.cue(Cue::Confirm);
        Ok(())
    }

    /// Armed suspects fight, unarmed ones run.
    fn escalate(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()> {
        let armed = ctx.status(scene.target)?.armed;
        let command = if armed { WorldCommand::Fight(scene.player) } else { WorldCommand::Flee(scene.player) };
        ctx.command(scene.target, command)?;
        ctx.notify("The suspect is resisting!");
        ctx.cue(Cue::Alert);
        Ok(())
    }

    fn disarm(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()> {
        if ctx.status(scene.target)?.armed {
            ctx.command(scene.target, WorldCommand::DropWeapon)?;
        }
        ctx.command(scene.target, WorldCommand::Hold)?;
        ctx.notify("Suspect disarmed");
        Ok(())
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>, resolution: Resolution) -> IxResult<()> {
        match resolution {
            Resolution::PathA => {
                let world = ctx.world();
                let vehicle = world.position(scene.player).and_then(|at| {
                    world
                        .entities_near(at, scene.tuning.interaction_radius, EntityKind::Vehicle)
                        .into_iter()
                        .next()
                });
                let command = match vehicle {
                    Some(vehicle) => WorldCommand::EnterVehicle { vehicle, seat: REAR_SEAT },
                    None => WorldCommand::Follow(scene.player),
                };
                ctx.command(scene.target, command)?;
                ctx.notify("Suspect taken into custody");
                ctx.cue(Cue::Radio("arrest_transport".into()));
            }
            Resolution::PathB => {
                ctx.command(scene.target, WorldCommand::Unrestrain)?;
                ctx.notify("Suspect released with a warning");
            }
        }
        Ok(())
    }

    /// A transported suspect stays in custody after the claim is dropped.
    fn resumes_ambient(&self, outcome: Outcome) -> bool {
        outcome != Outcome::Resolved(Resolution::PathA)
    }
}
