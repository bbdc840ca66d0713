//! `ix-core` — foundational types for the `rust_ix` interaction framework.
//!
//! This crate is a dependency of every other `ix-*` crate.  It intentionally
//! has no `ix-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `EntityHandle`, `ControllerId`, `TimerId`, `SubscriptionId`|
//! | [`geom`]        | `Vec3` world position, planar/3-D distance                 |
//! | [`time`]        | `Tick`, `TickClock`, `SchedulerConfig`                     |
//! | [`rng`]         | `SessionRng` (per-controller deterministic RNG)            |
//! | [`error`]       | `IxError` taxonomy, `IxResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geom;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{IxError, IxResult};
pub use geom::Vec3;
pub use ids::{ControllerId, EntityHandle, SubscriptionId, TimerId};
pub use rng::SessionRng;
pub use time::{SchedulerConfig, Tick, TickClock};
