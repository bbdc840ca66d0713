//! `ix-scripts`: the interaction scripts built on `ix-controller`.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                            |
//! |---------------|---------------------------------------------------------------------|
//! | [`tuning`]    | `ScriptTuning`, `KeyBindings`                                       |
//! | [`custody`]   | `CustodyMachine`: the pure custody-handoff state machine            |
//! | [`handoff`]   | `CustodySession<K>`, `CustodyKind`: executes the machine            |
//! | [`arrest`]    | `Arrest`, `ArrestSession`                                           |
//! | [`trunk`]     | `TrunkSearch`, `TrunkSearchSession`                                 |
//! | [`feature`]   | `SessionFeature<K>`, `ArrestFeature`, `TrunkSearchFeature`          |
//! | [`duty`]      | `DutyController`                                                    |
//! | [`lighting`]  | `LightingController`                                                |
//! | [`companion`] | `CompanionController`                                               |
//!
//! # Wiring
//!
//! ```rust,ignore
//! let tuning = ScriptTuning::default();
//! let (sched, _) = SchedulerBuilder::new(config)
//!     .controller(Box::new(DutyController::new(player, &tuning)))
//!     .controller(Box::new(LightingController::new(player, &tuning)))
//!     .controller(Box::new(ArrestFeature::new(Arrest, player, tuning.clone())))
//!     .controller(Box::new(TrunkSearchFeature::new(TrunkSearch, player, tuning.clone())))
//!     .controller(Box::new(CompanionController::new(partner, player)))
//!     .build_with_ids()?;
//! ```
//!
//! The features spawn `ArrestSession` / `TrunkSearchSession` controllers on
//! demand; those end themselves when the handoff is over.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on `ScriptTuning`.         |

pub mod arrest;
pub mod companion;
pub mod custody;
pub mod duty;
pub mod feature;
pub mod handoff;
pub mod lighting;
pub mod trunk;
pub mod tuning;

#[cfg(test)]
mod tests;

pub use arrest::{Arrest, ArrestSession};
pub use companion::CompanionController;
pub use custody::{CustodyCommand, CustodyEvent, CustodyMachine, CustodyState, Outcome};
pub use duty::DutyController;
pub use feature::{ArrestFeature, SessionFeature, TrunkSearchFeature};
pub use handoff::{CustodyKind, CustodySession, Scene};
pub use lighting::LightingController;
pub use trunk::{TrunkSearch, TrunkSearchSession};
pub use tuning::{KeyBindings, ScriptTuning};
