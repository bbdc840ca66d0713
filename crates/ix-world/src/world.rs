//! The `World` trait — query and command surface of the external simulation.

use ix_core::{EntityHandle, Vec3};

use crate::WorldResult;

/// What a handle refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Actor,
    Vehicle,
}

/// A by-value snapshot of one entity's observable state.
///
/// Snapshots are taken fresh each tick; holding one across ticks says nothing
/// about whether the entity still exists.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityStatus {
    pub kind:     EntityKind,
    pub position: Vec3,
    /// `false` once an actor has died.  A dead actor still exists (the body
    /// is in the world) until the world despawns it.
    pub alive:      bool,
    pub restrained: bool,
    pub armed:      bool,
    /// Vehicle the actor currently occupies.
    pub vehicle:    Option<EntityHandle>,
    // ── Vehicle-only state ────────────────────────────────────────────────
    pub lights:     bool,
    pub siren:      bool,
    pub trunk_open: bool,
}

impl EntityStatus {
    pub fn actor(position: Vec3) -> Self {
        Self {
            kind:       EntityKind::Actor,
            position,
            alive:      true,
            restrained: false,
            armed:      false,
            vehicle:    None,
            lights:     false,
            siren:      false,
            trunk_open: false,
        }
    }

    pub fn vehicle(position: Vec3) -> Self {
        Self { kind: EntityKind::Vehicle, ..Self::actor(position) }
    }
}

/// A behavior command issued to one entity.
///
/// Only the current owner of an entity may issue these; the controller layer
/// checks ownership before forwarding a command to [`World::apply`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldCommand {
    /// Drop every queued task, including ambient ones.
    ClearTasks,
    /// Hand the entity back to its ambient/autonomous behavior.
    ResumeAmbient,
    GoTo(Vec3),
    Follow(EntityHandle),
    Face(EntityHandle),
    /// Stand still in place until told otherwise.
    Hold,
    PlayAnim(String),
    Restrain,
    Unrestrain,
    DropWeapon,
    Flee(EntityHandle),
    Fight(EntityHandle),
    EnterVehicle { vehicle: EntityHandle, seat: u8 },
    LeaveVehicle,
    SetLights(bool),
    SetSiren(bool),
    SetTrunk(bool),
}

impl WorldCommand {
    /// Short static name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            WorldCommand::ClearTasks => "clear_tasks",
            WorldCommand::ResumeAmbient => "resume_ambient",
            WorldCommand::GoTo(_) => "go_to",
            WorldCommand::Follow(_) => "follow",
            WorldCommand::Face(_) => "face",
            WorldCommand::Hold => "hold",
            WorldCommand::PlayAnim(_) => "play_anim",
            WorldCommand::Restrain => "restrain",
            WorldCommand::Unrestrain => "unrestrain",
            WorldCommand::DropWeapon => "drop_weapon",
            WorldCommand::Flee(_) => "flee",
            WorldCommand::Fight(_) => "fight",
            WorldCommand::EnterVehicle { .. } => "enter_vehicle",
            WorldCommand::LeaveVehicle => "leave_vehicle",
            WorldCommand::SetLights(_) => "set_lights",
            WorldCommand::SetSiren(_) => "set_siren",
            WorldCommand::SetTrunk(_) => "set_trunk",
        }
    }

    /// `true` for commands that only make sense on a vehicle.
    pub fn is_vehicle_command(&self) -> bool {
        matches!(
            self,
            WorldCommand::SetLights(_) | WorldCommand::SetSiren(_) | WorldCommand::SetTrunk(_)
        )
    }
}

/// Query and command interface supplied by the world simulation layer.
///
/// All getters double as liveness checks: they return `None` when `entity`
/// no longer exists.
pub trait World {
    /// `true` while `entity` refers to something in the world.
    fn exists(&self, entity: EntityHandle) -> bool;

    /// Snapshot of `entity`'s observable state.
    fn status(&self, entity: EntityHandle) -> Option<EntityStatus>;

    fn position(&self, entity: EntityHandle) -> Option<Vec3> {
        self.status(entity).map(|s| s.position)
    }

    fn kind(&self, entity: EntityHandle) -> Option<EntityKind> {
        self.status(entity).map(|s| s.kind)
    }

    /// Entities of `kind` within `radius` metres of `centre`, nearest first.
    fn entities_near(&self, centre: Vec3, radius: f32, kind: EntityKind) -> Vec<EntityHandle>;

    /// Apply one behavior command.  Fails with [`WorldError::Stale`] if the
    /// entity is gone.
    ///
    /// [`WorldError::Stale`]: crate::WorldError::Stale
    fn apply(&mut self, entity: EntityHandle, command: WorldCommand) -> WorldResult<()>;
}
