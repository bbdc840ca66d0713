//! Fluent builder for populating a [`MemoryWorld`] in one expression.
//!
//! # Usage
//!
//! ```rust
//! use ix_core::Vec3;
//! use ix_world::{MemoryWorldBuilder, World};
//!
//! let (world, handles) = MemoryWorldBuilder::new()
//!     .actor(Vec3::ZERO)                      // player
//!     .armed_actor(Vec3::new(2.0, 0.0, 0.0))  // suspect
//!     .vehicle(Vec3::new(5.0, 0.0, 0.0))
//!     .build();
//!
//! assert_eq!(handles.len(), 3);
//! assert!(world.exists(handles[1]));
//! ```

use ix_core::{EntityHandle, Vec3};

use crate::{EntityStatus, MemoryWorld};

/// Fluent builder for [`MemoryWorld`].  Handles are returned in the order the
/// entities were declared.
#[derive(Default)]
pub struct MemoryWorldBuilder {
    entities: Vec<EntityStatus>,
}

impl MemoryWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(mut self, position: Vec3) -> Self {
        self.entities.push(EntityStatus::actor(position));
        self
    }

    pub fn armed_actor(mut self, position: Vec3) -> Self {
        self.entities.push(EntityStatus { armed: true, ..EntityStatus::actor(position) });
        self
    }

    pub fn vehicle(mut self, position: Vec3) -> Self {
        self.entities.push(EntityStatus::vehicle(position));
        self
    }

    /// Add an entity with a fully specified initial status.
    pub fn entity(mut self, status: EntityStatus) -> Self {
        self.entities.push(status);
        self
    }

    pub fn build(self) -> (MemoryWorld, Vec<EntityHandle>) {
        let mut world = MemoryWorld::new();
        let handles = self.entities.into_iter().map(|s| world.spawn(s)).collect();
        (world, handles)
    }
}
