//! The host-side input interface.

use std::fmt;

use ix_core::Tick;

/// A host-defined action binding (e.g. "interact", "toggle duty").
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionKey(pub u16);

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

/// Polled input supplied by the host's input layer.
pub trait InputSource {
    /// Called once at the start of every tick, before any key is queried.
    fn advance(&mut self, _now: Tick) {}

    /// `true` on the tick the key went down.
    fn is_pressed(&self, key: ActionKey) -> bool;

    /// `true` on every tick the key is down.
    fn is_held(&self, key: ActionKey) -> bool;
}

/// An [`InputSource`] with nothing ever pressed.
pub struct NoInput;

impl InputSource for NoInput {
    fn is_pressed(&self, _key: ActionKey) -> bool {
        false
    }

    fn is_held(&self, _key: ActionKey) -> bool {
        false
    }
}
