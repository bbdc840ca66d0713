//! Per-tick cached input state.

use ix_core::Tick;

use crate::{ActionKey, InputSource};

/// Immutable snapshot of every bound key for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub tick:   Tick,
    /// Nominal milliseconds since tick 0 at the start of this tick.
    pub now_ms: u64,
    pressed:    Vec<ActionKey>,
    held:       Vec<ActionKey>,
    released:   Vec<ActionKey>,
}

impl InputFrame {
    /// A frame with nothing pressed, for tests and ticks without input.
    pub fn empty(tick: Tick, now_ms: u64) -> Self {
        Self { tick, now_ms, ..Self::default() }
    }

    /// Edge: the key went down this tick.
    #[inline]
    pub fn pressed(&self, key: ActionKey) -> bool {
        self.pressed.contains(&key)
    }

    /// Level: the key is down this tick.
    #[inline]
    pub fn held(&self, key: ActionKey) -> bool {
        self.held.contains(&key)
    }

    /// Edge: the key came up this tick.
    #[inline]
    pub fn released(&self, key: ActionKey) -> bool {
        self.released.contains(&key)
    }

    /// `true` if no bound key is pressed, held, or released.
    pub fn is_idle(&self) -> bool {
        self.pressed.is_empty() && self.held.is_empty() && self.released.is_empty()
    }
}

/// Samples an [`InputSource`] once per tick for a fixed set of bound keys and
/// derives release edges from the previous tick's level state.
#[derive(Default)]
pub struct InputTracker {
    bindings:  Vec<ActionKey>,
    prev_held: Vec<ActionKey>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sampling `key`.  Binding the same key twice is harmless.
    pub fn bind(&mut self, key: ActionKey) {
        if !self.bindings.contains(&key) {
            self.bindings.push(key);
            self.bindings.sort_unstable();
        }
    }

    pub fn bindings(&self) -> &[ActionKey] {
        &self.bindings
    }

    /// Poll `source` for every bound key and build this tick's frame.
    pub fn capture(&mut self, source: &mut dyn InputSource, tick: Tick, now_ms: u64) -> InputFrame {
        source.advance(tick);
        let mut frame = InputFrame::empty(tick, now_ms);
        for &key in &self.bindings {
            let held = source.is_held(key);
            let was_held = self.prev_held.contains(&key);
            if source.is_pressed(key) || (held && !was_held) {
                frame.pressed.push(key);
            }
            if held {
                frame.held.push(key);
            } else if was_held {
                frame.released.push(key);
            }
        }
        self.prev_held.clone_from(&frame.held);
        frame
    }
}
