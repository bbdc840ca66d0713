//! Tap vs hold disambiguation.
//!
//! A single key carries two actions: a quick press ("tap") and a sustained
//! press ("hold").  The disambiguator watches one key across frames:
//!
//! ```text
//! down ──► held < threshold ──► up      ⇒ Tap   (on release)
//! down ──► held ≥ threshold             ⇒ Hold  (once, while still down)
//!                             ──► up    ⇒ nothing further
//! ```
//!
//! Durations are measured in nominal milliseconds from the frames, so the
//! outcome for a given press is deterministic for a fixed tick duration.

use crate::{ActionKey, InputFrame};

/// Default hold threshold.
pub const DEFAULT_HOLD_THRESHOLD_MS: u64 = 250;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PressKind {
    Tap,
    Hold,
}

#[derive(Clone, Debug)]
pub struct PressDisambiguator {
    key:           ActionKey,
    threshold_ms:  u64,
    down_since_ms: Option<u64>,
    hold_reported: bool,
}

impl PressDisambiguator {
    pub fn new(key: ActionKey, threshold_ms: u64) -> Self {
        Self { key, threshold_ms, down_since_ms: None, hold_reported: false }
    }

    pub fn with_default_threshold(key: ActionKey) -> Self {
        Self::new(key, DEFAULT_HOLD_THRESHOLD_MS)
    }

    pub fn key(&self) -> ActionKey {
        self.key
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    /// `true` between the press edge and the release edge.
    pub fn is_down(&self) -> bool {
        self.down_since_ms.is_some()
    }

    /// How long the key has been down as of `frame`, if it is down.
    pub fn held_for_ms(&self, frame: &InputFrame) -> Option<u64> {
        self.down_since_ms.map(|since| frame.now_ms.saturating_sub(since))
    }

    /// Forget any press in progress.
    pub fn reset(&mut self) {
        self.down_since_ms = None;
        self.hold_reported = false;
    }

    /// Feed one frame.  Returns at most one classified press per call.
    pub fn update(&mut self, frame: &InputFrame) -> Option<PressKind> {
        if frame.pressed(self.key) && self.down_since_ms.is_none() {
            self.down_since_ms = Some(frame.now_ms);
            self.hold_reported = false;
        }
        let since = self.down_since_ms?;

        if frame.held(self.key) {
            if !self.hold_reported && frame.now_ms.saturating_sub(since) >= self.threshold_ms {
                self.hold_reported = true;
                return Some(PressKind::Hold);
            }
            return None;
        }

        let was_hold = self.hold_reported;
        self.reset();
        if was_hold { None } else { Some(PressKind::Tap) }
    }
}
