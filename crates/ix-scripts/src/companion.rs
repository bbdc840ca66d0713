//! A partner actor that follows the player and joins in when a target resists.

use ix_arbiter::Revocation;
use ix_controller::{Controller, EventKind, InteractionEvent, TickContext};
use ix_core::{EntityHandle, IxResult};
use ix_world::WorldCommand;
use tracing::{debug, info};

/// Owns the companion for its whole life.
///
/// Subscribes to `TargetResisted` (assist against the resisting target) and
/// to `SessionResolved` / `SessionAborted` (go back to following the player
/// once the assisted session is over).  Ends when the companion is gone or
/// its claim is revoked.
pub struct CompanionController {
    companion: EntityHandle,
    player:    EntityHandle,
    assisting: Option<EntityHandle>,
}

impl CompanionController {
    pub fn new(companion: EntityHandle, player: EntityHandle) -> Self {
        Self { companion, player, assisting: None }
    }

    pub fn assisting(&self) -> Option<EntityHandle> {
        self.assisting
    }

    fn companion_ok(&self, ctx: &TickContext<'_>) -> bool {
        ctx.world().status(self.companion).is_some_and(|s| s.alive)
    }
}

impl Controller for CompanionController {
    fn name(&self) -> &str {
        "companion"
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        ctx.request_ownership(self.companion)?;
        ctx.command(self.companion, WorldCommand::Follow(self.player))?;
        ctx.subscribe(EventKind::TargetResisted)?;
        ctx.subscribe(EventKind::SessionResolved)?;
        ctx.subscribe(EventKind::SessionAborted)?;
        Ok(())
    }

    fn process(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        if !self.companion_ok(ctx) {
            info!(tick = ctx.now.0, companion = %self.companion, "companion lost");
            ctx.notify("Your partner is down");
            ctx.end();
        }
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut TickContext<'_>, event: &InteractionEvent) -> IxResult<()> {
        if !self.companion_ok(ctx) {
            return Ok(());
        }
        match *event {
            InteractionEvent::TargetResisted { target, .. } if ctx.world().exists(target) => {
                debug!(companion = %self.companion, %target, "assisting");
                ctx.command(self.companion, WorldCommand::Fight(target))?;
                self.assisting = Some(target);
            }
            InteractionEvent::SessionResolved { target, .. } | InteractionEvent::SessionAborted { target, .. }
                if self.assisting == Some(target) =>
            {
                ctx.command(self.companion, WorldCommand::Follow(self.player))?;
                self.assisting = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_ownership_lost(&mut self, ctx: &mut TickContext<'_>, _revocation: &Revocation) -> IxResult<()> {
        ctx.end();
        Ok(())
    }
}
