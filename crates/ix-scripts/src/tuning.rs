//! Tunable parameters shared by every script.

use ix_core::{IxError, IxResult};
use ix_input::ActionKey;

// ── KeyBindings ───────────────────────────────────────────────────────────────

/// Host action keys the scripts listen to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KeyBindings {
    /// Starts an arrest; also the decision and disarm key inside one.
    pub interact: ActionKey,
    /// Starts a trunk search and decides it.
    pub search:   ActionKey,
    pub duty:     ActionKey,
    /// Tap toggles emergency lights, hold toggles the siren.
    pub lights:   ActionKey,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            interact: ActionKey(1),
            search:   ActionKey(2),
            duty:     ActionKey(3),
            lights:   ActionKey(4),
        }
    }
}

// ── ScriptTuning ──────────────────────────────────────────────────────────────

/// Distances, durations and odds used by the interaction scripts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScriptTuning {
    /// How far from the player a feature looks for a target, in metres.
    pub interaction_radius: f32,

    /// Distance at which the player counts as having reached the target.
    pub contact_radius: f32,

    /// A session whose target is not reached within this long is aborted.
    pub approach_timeout_ms: u64,

    /// A resisting target not disarmed within this long has escaped.
    pub escalation_timeout_ms: u64,

    pub restrain_ms: u64,
    pub search_ms:   u64,

    /// Presses shorter than this are taps, longer ones are holds.
    pub hold_threshold_ms: u64,

    /// Chance that an arrest target resists, rolled at session start and
    /// again after each disarm.
    pub resist_probability: f64,

    pub keys: KeyBindings,
}

impl Default for ScriptTuning {
    fn default() -> Self {
        Self {
            interaction_radius:    5.0,
            contact_radius:        2.0,
            approach_timeout_ms:   10_000,
            escalation_timeout_ms: 15_000,
            restrain_ms:           3_000,
            search_ms:             4_000,
            hold_threshold_ms:     ix_input::DEFAULT_HOLD_THRESHOLD_MS,
            resist_probability:    0.2,
            keys:                  KeyBindings::default(),
        }
    }
}

impl ScriptTuning {
    pub fn with_resist_probability(mut self, p: f64) -> Self {
        self.resist_probability = p;
        self
    }

    pub fn with_durations(mut self, restrain_ms: u64, search_ms: u64) -> Self {
        self.restrain_ms = restrain_ms;
        self.search_ms = search_ms;
        self
    }

    pub fn with_approach_timeout_ms(mut self, ms: u64) -> Self {
        self.approach_timeout_ms = ms;
        self
    }

    pub fn with_escalation_timeout_ms(mut self, ms: u64) -> Self {
        self.escalation_timeout_ms = ms;
        self
    }

    /// Reject values the scripts cannot work with.
    pub fn validate(&self) -> IxResult<()> {
        if !(self.interaction_radius > 0.0) {
            return Err(IxError::Config(format!(
                "interaction_radius must be positive, got {}",
                self.interaction_radius
            )));
        }
        if !(0.0..=self.interaction_radius).contains(&self.contact_radius) {
            return Err(IxError::Config(format!(
                "contact_radius {} must lie in 0..={}",
                self.contact_radius, self.interaction_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.resist_probability) {
            return Err(IxError::Config(format!(
                "resist_probability must lie in 0..=1, got {}",
                self.resist_probability
            )));
        }
        if self.escalation_timeout_ms == 0 {
            return Err(IxError::Config("escalation_timeout_ms must be > 0".into()));
        }
        if self.hold_threshold_ms == 0 {
            return Err(IxError::Config("hold_threshold_ms must be > 0".into()));
        }
        let keys = [self.keys.interact, self.keys.search, self.keys.duty, self.keys.lights];
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(IxError::Config(format!("{key} is bound to two actions")));
            }
        }
        Ok(())
    }
}
