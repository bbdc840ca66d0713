//! `ScriptedInput` — a timeline of key intervals, replayed tick by tick.

use ix_core::Tick;

use crate::{ActionKey, InputSource};

#[derive(Clone, Debug)]
struct Interval {
    key:   ActionKey,
    start: Tick,
    /// Exclusive.
    end:   Tick,
}

/// An [`InputSource`] driven by a fixed script.
///
/// ```rust
/// use ix_core::Tick;
/// use ix_input::{ActionKey, InputSource, ScriptedInput};
///
/// const INTERACT: ActionKey = ActionKey(1);
/// let mut input = ScriptedInput::new().hold(INTERACT, Tick(3), 4);
///
/// input.advance(Tick(3));
/// assert!(input.is_pressed(INTERACT));
/// input.advance(Tick(6));
/// assert!(input.is_held(INTERACT) && !input.is_pressed(INTERACT));
/// input.advance(Tick(7));
/// assert!(!input.is_held(INTERACT));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    intervals: Vec<Interval>,
    now:       Tick,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `key` down for `ticks` ticks starting at `start`.
    pub fn hold(mut self, key: ActionKey, start: Tick, ticks: u64) -> Self {
        self.intervals.push(Interval { key, start, end: start.offset(ticks.max(1)) });
        self
    }

    /// A one-tick press at `at`.
    pub fn tap(self, key: ActionKey, at: Tick) -> Self {
        self.hold(key, at, 1)
    }

    /// Append a hold at runtime (e.g. from a demo's scenario table).
    pub fn push_hold(&mut self, key: ActionKey, start: Tick, ticks: u64) {
        self.intervals.push(Interval { key, start, end: start.offset(ticks.max(1)) });
    }

    /// Tick of the last scripted key release; `Tick::ZERO` when empty.
    pub fn last_tick(&self) -> Tick {
        self.intervals.iter().map(|i| i.end).max().unwrap_or(Tick::ZERO)
    }
}

impl InputSource for ScriptedInput {
    fn advance(&mut self, now: Tick) {
        self.now = now;
    }

    fn is_pressed(&self, key: ActionKey) -> bool {
        self.intervals.iter().any(|i| i.key == key && i.start == self.now)
    }

    fn is_held(&self, key: ActionKey) -> bool {
        self.intervals
            .iter()
            .any(|i| i.key == key && i.start <= self.now && self.now < i.end)
    }
}
