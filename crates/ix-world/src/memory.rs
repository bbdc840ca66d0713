//! `MemoryWorld` — an in-memory [`World`] for tests, demos, and headless hosts.
//!
//! # Layout
//!
//! Structure-of-Arrays storage indexed by `EntityHandle::slot()`:
//!
//! ```ignore
//! let status = &world.statuses[handle.slot()];   // only if generations match
//! ```
//!
//! Every slot carries a generation counter.  Despawning frees the slot and
//! bumps its generation, so any handle issued before the despawn fails the
//! liveness check from then on, even after the slot is reused.
//!
//! Commands are not simulated.  State-changing commands (`Restrain`,
//! `SetLights`, …) flip the corresponding status flag immediately; movement
//! and animation commands are appended to the entity's task queue so tests
//! can inspect what a controller asked for.

use ix_core::{EntityHandle, Vec3};
use tracing::trace;

use crate::{EntityKind, EntityStatus, World, WorldCommand, WorldError, WorldResult};

pub struct MemoryWorld {
    generations: Vec<u32>,
    occupied:    Vec<bool>,
    statuses:    Vec<EntityStatus>,
    /// Pending behavior tasks per slot.
    tasks:       Vec<Vec<WorldCommand>>,
    /// `true` while the entity is driven by its own ambient logic.
    ambient:     Vec<bool>,
    free:        Vec<u32>,
    /// Every command accepted by `apply`, in order.
    log:         Vec<(EntityHandle, WorldCommand)>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            occupied:    Vec::new(),
            statuses:    Vec::new(),
            tasks:       Vec::new(),
            ambient:     Vec::new(),
            free:        Vec::new(),
            log:         Vec::new(),
        }
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Insert an entity and return its handle.  Freed slots are reused with a
    /// bumped generation.
    pub fn spawn(&mut self, status: EntityStatus) -> EntityHandle {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.occupied[slot] = true;
            self.statuses[slot] = status;
            self.tasks[slot].clear();
            self.ambient[slot] = true;
            return EntityHandle::new(index, self.generations[slot]);
        }
        let index = self.statuses.len() as u32;
        self.generations.push(0);
        self.occupied.push(true);
        self.statuses.push(status);
        self.tasks.push(Vec::new());
        self.ambient.push(true);
        EntityHandle::new(index, 0)
    }

    pub fn spawn_actor(&mut self, position: Vec3) -> EntityHandle {
        self.spawn(EntityStatus::actor(position))
    }

    pub fn spawn_vehicle(&mut self, position: Vec3) -> EntityHandle {
        self.spawn(EntityStatus::vehicle(position))
    }

    /// Remove an entity.  Returns `false` if it was already gone.
    pub fn despawn(&mut self, entity: EntityHandle) -> bool {
        if !self.exists(entity) {
            return false;
        }
        let slot = entity.slot();
        self.occupied[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.tasks[slot].clear();
        self.free.push(entity.index);
        trace!(%entity, "despawned");
        true
    }

    /// Mark an actor dead without removing it.
    pub fn kill(&mut self, entity: EntityHandle) -> bool {
        match self.status_mut(entity) {
            Some(status) => {
                status.alive = false;
                true
            }
            None => false,
        }
    }

    // ── Direct state access (host side) ───────────────────────────────────

    /// Mutable status for host-side edits (moving an entity, arming it, …).
    pub fn status_mut(&mut self, entity: EntityHandle) -> Option<&mut EntityStatus> {
        if self.exists(entity) { Some(&mut self.statuses[entity.slot()]) } else { None }
    }

    pub fn set_position(&mut self, entity: EntityHandle, position: Vec3) -> bool {
        self.status_mut(entity).map(|s| s.position = position).is_some()
    }

    /// Queue a task as the entity's own ambient logic would.
    pub fn push_ambient_task(&mut self, entity: EntityHandle, task: WorldCommand) -> bool {
        if !self.exists(entity) {
            return false;
        }
        self.tasks[entity.slot()].push(task);
        true
    }

    /// Pending tasks for `entity`; empty if it does not exist.
    pub fn tasks(&self, entity: EntityHandle) -> &[WorldCommand] {
        if self.exists(entity) { &self.tasks[entity.slot()] } else { &[] }
    }

    /// `true` while the entity runs its own ambient behavior.
    pub fn is_ambient(&self, entity: EntityHandle) -> bool {
        self.exists(entity) && self.ambient[entity.slot()]
    }

    /// All commands applied so far, in order.
    pub fn command_log(&self) -> &[(EntityHandle, WorldCommand)] {
        &self.log
    }

    /// Forget the command log; hosts running for long call this every tick.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Commands applied to one entity, in order.
    pub fn commands_for(&self, entity: EntityHandle) -> Vec<&WorldCommand> {
        self.log.iter().filter(|(e, _)| *e == entity).map(|(_, c)| c).collect()
    }
}

impl World for MemoryWorld {
    fn exists(&self, entity: EntityHandle) -> bool {
        let slot = entity.slot();
        slot < self.occupied.len()
            && self.occupied[slot]
            && self.generations[slot] == entity.generation
    }

    fn status(&self, entity: EntityHandle) -> Option<EntityStatus> {
        if self.exists(entity) { Some(self.statuses[entity.slot()].clone()) } else { None }
    }

    fn entities_near(&self, centre: Vec3, radius: f32, kind: EntityKind) -> Vec<EntityHandle> {
        let mut found: Vec<(f32, EntityHandle)> = (0..self.statuses.len())
            .filter(|&slot| self.occupied[slot])
            .filter(|&slot| self.statuses[slot].kind == kind)
            .filter_map(|slot| {
                let d = self.statuses[slot].position.distance_sq(centre);
                (d <= radius * radius)
                    .then(|| (d, EntityHandle::new(slot as u32, self.generations[slot])))
            })
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, h)| h).collect()
    }

    fn apply(&mut self, entity: EntityHandle, command: WorldCommand) -> WorldResult<()> {
        if !self.exists(entity) {
            return Err(WorldError::Stale(entity));
        }
        let slot = entity.slot();
        let kind = self.statuses[slot].kind;
        if command.is_vehicle_command() != (kind == EntityKind::Vehicle)
            && !matches!(command, WorldCommand::ClearTasks | WorldCommand::ResumeAmbient)
        {
            return Err(WorldError::Unsupported { entity, command: command.name() });
        }
        trace!(%entity, command = command.name(), "apply");

        let status = &mut self.statuses[slot];
        match &command {
            WorldCommand::ClearTasks => {
                self.tasks[slot].clear();
                self.ambient[slot] = false;
            }
            WorldCommand::ResumeAmbient => {
                self.tasks[slot].clear();
                self.ambient[slot] = true;
            }
            WorldCommand::Restrain => status.restrained = true,
            WorldCommand::Unrestrain => status.restrained = false,
            WorldCommand::DropWeapon => status.armed = false,
            WorldCommand::EnterVehicle { vehicle, .. } => status.vehicle = Some(*vehicle),
            WorldCommand::LeaveVehicle => status.vehicle = None,
            WorldCommand::SetLights(on) => status.lights = *on,
            WorldCommand::SetSiren(on) => status.siren = *on,
            WorldCommand::SetTrunk(open) => status.trunk_open = *open,
            WorldCommand::GoTo(_)
            | WorldCommand::Follow(_)
            | WorldCommand::Face(_)
            | WorldCommand::Hold
            | WorldCommand::PlayAnim(_)
            | WorldCommand::Flee(_)
            | WorldCommand::Fight(_) => self.tasks[slot].push(command.clone()),
        }
        self.log.push((entity, command));
        Ok(())
    }
}
