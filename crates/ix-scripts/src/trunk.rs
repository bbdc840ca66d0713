//! Trunk search: open a vehicle's trunk, search it, then seize the contents
//! or close it again.  Vehicles never resist.

use ix_controller::{Resolution, TickContext};
use ix_core::IxResult;
use ix_input::ActionKey;
use ix_world::{Cue, EntityKind, EntityStatus, WorldCommand};

use crate::handoff::{CustodyKind, CustodySession, Scene};
use crate::{KeyBindings, ScriptTuning};

#[derive(Copy, Clone, Debug, Default)]
pub struct TrunkSearch;

pub type TrunkSearchSession = CustodySession<TrunkSearch>;

impl CustodyKind for TrunkSearch {
    const FEATURE: &'static str = "trunk_search";
    const WATCHER: &'static str = "trunk_search_feature";
    const TARGET_KIND: EntityKind = EntityKind::Vehicle;

    fn trigger_key(keys: &KeyBindings) -> ActionKey {
        keys.search
    }

    fn eligible(status: &EntityStatus) -> bool {
        !status.trunk_open
    }

    fn perform_ms(tuning: &ScriptTuning) -> u64 {
        tuning.search_ms
    }

    fn decision_help(&self) -> &'static str {
        "Tap to seize the contents, hold to close the trunk"
    }

    fn approach(&mut self, ctx: &mut TickContext<'_>, _scene: &Scene<'_>) -> IxResult<()> {
        ctx.help_text("Walk to the rear of the vehicle");
        Ok(())
    }

    fn begin_perform(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>) -> IxResult<()> {
        ctx.command(scene.target, WorldCommand::SetTrunk(true))?;
        ctx.help_text("Searching the trunk");
        Ok(())
    }

    fn perform_done(&mut self, ctx: &mut TickContext<'_>, _scene: &Scene<'_>) -> IxResult<()> {
        ctx.notify("Search complete");
        Ok(())
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>, scene: &Scene<'_>, resolution: Resolution) -> IxResult<()> {
        match resolution {
            Resolution::PathA => {
                ctx.notify("Contents seized");
                ctx.cue(Cue::Confirm);
            }
            Resolution::PathB => ctx.notify("Trunk closed"),
        }
        ctx.command(scene.target, WorldCommand::SetTrunk(false))
    }
}
