//! `ix-input` — polled input, read once per tick and cached.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`source`]    | `ActionKey`, `InputSource` trait                                |
//! | [`frame`]     | `InputFrame` (edge + level state for one tick), `InputTracker`  |
//! | [`press`]     | `PressDisambiguator`, `PressKind` (tap vs hold)                 |
//! | [`scripted`]  | `ScriptedInput`, a timeline-driven source for tests and demos   |
//!
//! # Edge vs level
//!
//! The host's input layer is polled, never pushed.  `InputTracker::capture`
//! samples the source exactly once per tick for every bound key and stores
//! the result in an immutable `InputFrame`; controllers read only the frame,
//! so two controllers asking "was E pressed?" in the same tick always agree.
//!
//! * `pressed(key)`: edge, down this tick, up last tick.
//! * `held(key)`: level, down this tick.
//! * `released(key)`: edge, up this tick, down last tick.

pub mod frame;
pub mod press;
pub mod scripted;
pub mod source;

#[cfg(test)]
mod tests;

pub use frame::{InputFrame, InputTracker};
pub use press::{DEFAULT_HOLD_THRESHOLD_MS, PressDisambiguator, PressKind};
pub use scripted::ScriptedInput;
pub use source::{ActionKey, InputSource, NoInput};
