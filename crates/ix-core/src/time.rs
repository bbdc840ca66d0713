//! Tick time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter advanced
//! once per host frame.  The mapping to milliseconds is held in `TickClock`:
//!
//!   elapsed_ms = tick * tick_duration_ms
//!
//! Using an integer tick as the canonical time unit means all timer
//! arithmetic is exact (no floating-point drift) and comparisons are O(1).
//! Millisecond delays are converted to ticks by rounding up, so nothing ever
//! fires early.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute scheduler tick counter.
///
/// `Tick(0)` is "before the first frame"; the first call to
/// `FrameScheduler::tick` processes `Tick(1)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }

    /// Ticks elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        self.offset(rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.since(rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TickClock ─────────────────────────────────────────────────────────────────

/// Converts between tick counts and nominal milliseconds.
///
/// `TickClock` is cheap to copy and intentionally holds no heap data.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickClock {
    /// How many milliseconds one tick represents.
    pub tick_duration_ms: u32,
    /// The most recently started tick.
    pub current_tick: Tick,
}

impl TickClock {
    pub fn new(tick_duration_ms: u32) -> Self {
        Self { tick_duration_ms, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick and return the new current tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = self.current_tick.offset(1);
        self.current_tick
    }

    /// Nominal milliseconds elapsed since tick 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.ms_for_ticks(self.current_tick.0)
    }

    /// Milliseconds spanned by `ticks` ticks.
    #[inline]
    pub fn ms_for_ticks(&self, ticks: u64) -> u64 {
        ticks * self.tick_duration_ms as u64
    }

    /// How many ticks span `ms` milliseconds? (rounds up, never early)
    #[inline]
    pub fn ticks_for_ms(&self, ms: u64) -> u64 {
        ms.div_ceil(self.tick_duration_ms.max(1) as u64)
    }
}

impl fmt::Display for TickClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.elapsed_ms();
        write!(f, "{} ({}.{:03}s)", self.current_tick, ms / 1_000, ms % 1_000)
    }
}

// ── SchedulerConfig ───────────────────────────────────────────────────────────

/// Top-level scheduler configuration.
///
/// Typically built in code by the host, or loaded from a JSON file with the
/// `serde` feature enabled.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Nominal milliseconds per tick.  Used to convert millisecond delays and
    /// hold thresholds into ticks.  Default: 16 (≈ 60 frames per second).
    pub tick_duration_ms: u32,

    /// Master RNG seed.  Every controller's `SessionRng` derives from it.
    pub seed: u64,

    /// Release claims on entities that no longer exist during the per-tick
    /// ownership sweep, notifying the former owner.  Off by default: owners
    /// are expected to notice dead targets themselves.
    pub auto_release_dead: bool,

    /// Upper bound used by `run_until_idle`.  `0` means unbounded.
    pub max_ticks: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms:  16,
            seed:              42,
            auto_release_dead: false,
            max_ticks:         0,
        }
    }
}

impl SchedulerConfig {
    pub fn with_tick_duration_ms(mut self, ms: u32) -> Self {
        self.tick_duration_ms = ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_auto_release_dead(mut self, enabled: bool) -> Self {
        self.auto_release_dead = enabled;
        self
    }

    pub fn with_max_ticks(mut self, max: u64) -> Self {
        self.max_ticks = max;
        self
    }

    /// Construct a `TickClock` pre-configured for this run.
    pub fn make_clock(&self) -> TickClock {
        TickClock::new(self.tick_duration_ms)
    }
}
