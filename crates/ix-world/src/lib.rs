//! `ix-world` — the narrow interfaces through which controllers see and act
//! on the external world simulation.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                      |
//! |--------------------|---------------------------------------------------------------|
//! | [`world`]          | `World` trait, `EntityKind`, `EntityStatus`, `WorldCommand`   |
//! | [`presentation`]   | `Presentation` trait, `Cue`, `NoopPresentation`, `RecordingPresentation` |
//! | [`memory`]         | `MemoryWorld` — generation-checked in-memory world            |
//! | [`builder`]        | `MemoryWorldBuilder` (fluent construction)                    |
//! | [`error`]          | `WorldError`, `WorldResult<T>`                                |
//!
//! The core owns none of the world's state.  Every getter returns `Option`
//! and yields `None` for a handle that no longer exists, so a liveness check
//! is built into every read.

pub mod builder;
pub mod error;
pub mod memory;
pub mod presentation;
pub mod world;

#[cfg(test)]
mod tests;

pub use builder::MemoryWorldBuilder;
pub use error::{WorldError, WorldResult};
pub use memory::MemoryWorld;
pub use presentation::{Cue, NoopPresentation, Presentation, Presented, RecordingPresentation};
pub use world::{EntityKind, EntityStatus, World, WorldCommand};
