//! What to schedule: delay, repetition, and the parameters handed back on fire.

use ix_core::{EntityHandle, TickClock};

/// How long until a timer is due.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delay {
    Ticks(u64),
    /// Converted with [`TickClock::ticks_for_ms`] (rounds up).
    Millis(u64),
}

impl Delay {
    pub fn to_ticks(self, clock: &TickClock) -> u64 {
        match self {
            Delay::Ticks(n) => n,
            Delay::Millis(ms) => clock.ticks_for_ms(ms),
        }
    }
}

/// The values a deferred callback needs, captured explicitly at schedule
/// time.  Callbacks receive these by reference; nothing else from the
/// scheduling site survives until the timer fires.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimerParams {
    /// Caller-defined discriminator, e.g. "approach timeout" vs "restrain done".
    pub tag:    u32,
    pub entity: Option<EntityHandle>,
    pub value:  i64,
}

impl TimerParams {
    pub fn tagged(tag: u32) -> Self {
        Self { tag, ..Self::default() }
    }
}

/// A fully described timer, ready to hand to `TimerService::schedule`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerSpec {
    pub delay:  Delay,
    /// `Some(period)` for repeating timers.
    pub period: Option<Delay>,
    pub params: TimerParams,
}

impl TimerSpec {
    /// Fire once after `delay`.
    pub fn once(delay: Delay) -> Self {
        Self { delay, period: None, params: TimerParams::default() }
    }

    /// Fire after `period`, then every `period` until cancelled.
    pub fn every(period: Delay) -> Self {
        Self { delay: period, period: Some(period), params: TimerParams::default() }
    }

    pub fn tag(mut self, tag: u32) -> Self {
        self.params.tag = tag;
        self
    }

    pub fn entity(mut self, entity: EntityHandle) -> Self {
        self.params.entity = Some(entity);
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.params.value = value;
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.period.is_some()
    }
}
