//! Unit tests for ix-world.

use ix_core::{EntityHandle, Vec3};

use crate::{EntityKind, MemoryWorld, MemoryWorldBuilder, World, WorldCommand, WorldError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn two_actors_and_car() -> (MemoryWorld, Vec<EntityHandle>) {
    MemoryWorldBuilder::new()
        .actor(Vec3::ZERO)
        .armed_actor(Vec3::new(3.0, 0.0, 0.0))
        .vehicle(Vec3::new(6.0, 0.0, 0.0))
        .build()
}

// ── Liveness ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod liveness {
    use super::*;

    #[test]
    fn spawned_entities_exist() {
        let (world, h) = two_actors_and_car();
        assert_eq!(world.len(), 3);
        assert!(h.iter().all(|&e| world.exists(e)));
        assert_eq!(world.kind(h[2]), Some(EntityKind::Vehicle));
    }

    #[test]
    fn despawn_invalidates_handle() {
        let (mut world, h) = two_actors_and_car();
        assert!(world.despawn(h[1]));
        assert!(!world.exists(h[1]));
        assert!(world.status(h[1]).is_none());
        assert!(!world.despawn(h[1]), "second despawn is a no-op");
    }

    #[test]
    fn reused_slot_does_not_revive_stale_handle() {
        let (mut world, h) = two_actors_and_car();
        world.despawn(h[1]);
        let fresh = world.spawn_actor(Vec3::ZERO);
        assert_eq!(fresh.slot(), h[1].slot());
        assert_ne!(fresh, h[1]);
        assert!(world.exists(fresh));
        assert!(!world.exists(h[1]));
    }

    #[test]
    fn invalid_handle_never_exists() {
        let (world, _) = two_actors_and_car();
        assert!(!world.exists(EntityHandle::INVALID));
    }

    #[test]
    fn killed_actor_still_exists_but_not_alive() {
        let (mut world, h) = two_actors_and_car();
        assert!(world.kill(h[1]));
        assert!(world.exists(h[1]));
        assert_eq!(world.status(h[1]).map(|s| s.alive), Some(false));
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use super::*;

    #[test]
    fn entities_near_sorted_by_distance() {
        let (mut world, h) = two_actors_and_car();
        let close = world.spawn_actor(Vec3::new(1.0, 0.0, 0.0));
        let near = world.entities_near(Vec3::ZERO, 5.0, EntityKind::Actor);
        assert_eq!(near, vec![h[0], close, h[1]]);
    }

    #[test]
    fn entities_near_filters_kind_and_radius() {
        let (world, h) = two_actors_and_car();
        assert_eq!(world.entities_near(Vec3::ZERO, 10.0, EntityKind::Vehicle), vec![h[2]]);
        assert!(world.entities_near(Vec3::new(100.0, 0.0, 0.0), 1.0, EntityKind::Actor).is_empty());
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod commands {
    use super::*;

    #[test]
    fn clear_tasks_drops_ambient_queue() {
        let (mut world, h) = two_actors_and_car();
        world.push_ambient_task(h[1], WorldCommand::GoTo(Vec3::new(9.0, 9.0, 0.0)));
        assert_eq!(world.tasks(h[1]).len(), 1);
        assert!(world.is_ambient(h[1]));

        world.apply(h[1], WorldCommand::ClearTasks).unwrap();
        assert!(world.tasks(h[1]).is_empty());
        assert!(!world.is_ambient(h[1]));
    }

    #[test]
    fn state_commands_flip_flags() {
        let (mut world, h) = two_actors_and_car();
        world.apply(h[1], WorldCommand::DropWeapon).unwrap();
        world.apply(h[1], WorldCommand::Restrain).unwrap();
        let status = world.status(h[1]).unwrap();
        assert!(!status.armed);
        assert!(status.restrained);

        world.apply(h[2], WorldCommand::SetLights(true)).unwrap();
        assert!(world.status(h[2]).unwrap().lights);
    }

    #[test]
    fn movement_commands_are_queued_and_logged() {
        let (mut world, h) = two_actors_and_car();
        world.apply(h[1], WorldCommand::Follow(h[0])).unwrap();
        assert_eq!(world.tasks(h[1]), &[WorldCommand::Follow(h[0])]);
        assert_eq!(world.commands_for(h[1]), vec![&WorldCommand::Follow(h[0])]);
    }

    #[test]
    fn clearing_the_log_keeps_world_state() {
        let (mut world, h) = two_actors_and_car();
        world.apply(h[1], WorldCommand::Follow(h[0])).unwrap();
        world.apply(h[1], WorldCommand::Restrain).unwrap();
        assert_eq!(world.command_log().len(), 2);

        world.clear_log();
        assert!(world.command_log().is_empty());
        assert!(world.commands_for(h[1]).is_empty());
        assert_eq!(world.tasks(h[1]), &[WorldCommand::Follow(h[0])]);
        assert!(world.status(h[1]).unwrap().restrained);

        world.apply(h[1], WorldCommand::Hold).unwrap();
        assert_eq!(world.commands_for(h[1]), vec![&WorldCommand::Hold]);
    }

    #[test]
    fn stale_command_fails() {
        let (mut world, h) = two_actors_and_car();
        world.despawn(h[1]);
        assert_eq!(world.apply(h[1], WorldCommand::Hold), Err(WorldError::Stale(h[1])));
    }

    #[test]
    fn vehicle_commands_rejected_on_actors() {
        let (mut world, h) = two_actors_and_car();
        let err = world.apply(h[0], WorldCommand::SetSiren(true)).unwrap_err();
        assert!(matches!(err, WorldError::Unsupported { command: "set_siren", .. }));
        let err = world.apply(h[2], WorldCommand::Restrain).unwrap_err();
        assert!(matches!(err, WorldError::Unsupported { command: "restrain", .. }));
    }

    #[test]
    fn stale_error_maps_to_stale_reference() {
        let h = EntityHandle::new(0, 9);
        let err: ix_core::IxError = WorldError::Stale(h).into();
        assert_eq!(err, ix_core::IxError::StaleReference(h));
    }
}

// ── Presentation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod presentation {
    use crate::{Cue, Presentation, Presented, RecordingPresentation};

    #[test]
    fn recording_keeps_order() {
        let mut p = RecordingPresentation::new();
        p.help_text("Press E");
        p.notify("Suspect detained");
        p.cue(Cue::Confirm);
        assert!(p.notified("detained"));
        assert_eq!(
            p.drain(),
            vec![
                Presented::Help("Press E".into()),
                Presented::Notify("Suspect detained".into()),
                Presented::Cue(Cue::Confirm),
            ]
        );
        assert!(p.log.is_empty());
    }
}
