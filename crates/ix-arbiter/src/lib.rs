//! `ix-arbiter` — which controller may drive which entity.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`claim`]     | `Claim`, `ClaimOptions`, `Priority`, `Grant`, `Revocation`|
//! | [`arbiter`]   | `OwnershipArbiter`                                        |
//! | [`error`]     | `ArbiterError`, `ArbiterResult<T>`                        |
//!
//! # Invariant
//!
//! At most one claim exists per entity at any instant.  A request never
//! revokes someone else's claim, whatever its priority: the loser is told
//! who holds the entity and decides for itself whether to wait, pick another
//! target, or give up.
//!
//! Granting a fresh claim clears the entity's task queue
//! (`WorldCommand::ClearTasks`), which also takes it off ambient behavior;
//! from then on only the owner issues behavior commands.

pub mod arbiter;
pub mod claim;
pub mod error;


pub use arbiter::OwnershipArbiter;
pub use claim::{Claim, ClaimOptions, Grant, Priority, RevokeReason, Revocation};
pub use error::{ArbiterError, ArbiterResult};
