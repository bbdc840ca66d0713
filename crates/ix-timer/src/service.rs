//! `TimerService` — ordered queue of pending timers.
//!
//! # Ordering
//!
//! Pending timers live in a `BTreeMap<(Tick, seq), TimerId>`.  `seq` is a
//! monotonically increasing schedule counter, so timers due on the same tick
//! fire in the order they were scheduled (or re-armed), and iteration over
//! the map is exactly the firing order.
//!
//! # States
//!
//! ```text
//!   schedule ──► Pending ──collect_due──► Due ──begin_fire──► Firing ──finish_fire──┐
//!                   ▲                      │                     │                  │
//!                   │                   cancel               cancel (flag)          │
//!                   │                      ▼                     ▼                  │
//!                   │                  removed            removed on finish         │
//!                   └──────────────── re-armed (periodic, not cancelled) ◄──────────┘
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ix_core::{ControllerId, Tick, TickClock, TimerId};
use tracing::trace;

use crate::{TimerParams, TimerSpec};

/// Caller-side reference to a scheduled timer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TimerHandle(pub TimerId);

impl TimerHandle {
    #[inline]
    pub fn id(self) -> TimerId {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0.0)
    }
}

/// Who receives a firing.
///
/// `C` is the detached-callback type chosen by the layer above (the
/// controller crate uses a boxed callback trait object).
pub enum TimerTarget<C> {
    /// Deliver to the controller's `on_timer` hook.
    Controller(ControllerId),
    /// Deliver to a free-standing callback object.
    Callback(C),
}

impl<C> TimerTarget<C> {
    pub fn controller(&self) -> Option<ControllerId> {
        match self {
            TimerTarget::Controller(id) => Some(*id),
            TimerTarget::Callback(_) => None,
        }
    }
}

impl<C> fmt::Debug for TimerTarget<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerTarget::Controller(id) => write!(f, "Controller({id})"),
            TimerTarget::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// A timer taken out of the service for the duration of its callback.
#[derive(Debug)]
pub struct Firing<C> {
    pub handle:     TimerHandle,
    pub params:     TimerParams,
    pub target:     TimerTarget<C>,
    /// The tick this occurrence was due on.
    pub due:        Tick,
    /// 1 for the first firing, 2 for the second, …
    pub occurrence: u64,
    pub repeating:  bool,
}

struct Entry<C> {
    due:          Tick,
    seq:          u64,
    period_ticks: Option<u64>,
    params:       TimerParams,
    /// `None` while the timer is firing (the target is on loan to `Firing`).
    target:       Option<TimerTarget<C>>,
    owner:        Option<ControllerId>,
    cancelled:    bool,
    fired:        u64,
}

/// One-shot and periodic timers keyed by due tick.
pub struct TimerService<C> {
    queue:    BTreeMap<(Tick, u64), TimerId>,
    entries:  HashMap<TimerId, Entry<C>>,
    next_id:  TimerId,
    next_seq: u64,
}

impl<C> Default for TimerService<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimerService<C> {
    pub fn new() -> Self {
        Self {
            queue:    BTreeMap::new(),
            entries:  HashMap::new(),
            next_id:  TimerId(0),
            next_seq: 0,
        }
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// Schedule `spec` relative to `clock.current_tick`.
    ///
    /// The timer is due at `current_tick + delay` and fires on the first tick
    /// whose timer phase starts at or after that tick.  Periods are clamped
    /// to at least one tick.
    pub fn schedule(
        &mut self,
        clock:  &TickClock,
        spec:   TimerSpec,
        target: TimerTarget<C>,
    ) -> TimerHandle {
        let id = self.next_id;
        self.next_id = id.next();

        let due = clock.current_tick.offset(spec.delay.to_ticks(clock));
        let period_ticks = spec.period.map(|p| p.to_ticks(clock).max(1));
        let seq = self.bump_seq();

        trace!(timer = id.0, %due, repeating = period_ticks.is_some(), "schedule");
        self.queue.insert((due, seq), id);
        self.entries.insert(id, Entry {
            due,
            seq,
            period_ticks,
            params: spec.params,
            owner: target.controller(),
            target: Some(target),
            cancelled: false,
            fired: 0,
        });
        TimerHandle(id)
    }

    /// Stop a timer.  Returns `true` if it was live.
    ///
    /// Idempotent.  A timer that is due this tick but has not fired yet never
    /// fires.  A timer cancelled from inside its own callback completes the
    /// current firing and is then dropped instead of re-armed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let id = handle.id();
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        if entry.cancelled {
            return false;
        }
        if entry.target.is_none() {
            // Currently firing: let finish_fire drop it.
            entry.cancelled = true;
        } else {
            self.queue.remove(&(entry.due, entry.seq));
            self.entries.remove(&id);
        }
        trace!(timer = id.0, "cancel");
        true
    }

    /// Cancel every timer that targets `owner`.  Returns how many were live.
    pub fn cancel_owned_by(&mut self, owner: ControllerId) -> usize {
        let ids: Vec<TimerId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.owner == Some(owner) && !e.cancelled)
            .map(|(&id, _)| id)
            .collect();
        ids.into_iter().filter(|&id| self.cancel(TimerHandle(id))).count()
    }

    // ── Firing protocol ───────────────────────────────────────────────────

    /// Remove and return every timer due at or before `now`, in firing order.
    pub fn collect_due(&mut self, now: Tick) -> Vec<TimerId> {
        let later = self.queue.split_off(&(now.offset(1), 0));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().collect()
    }

    /// Take a due timer out for firing.  `None` if it was cancelled since
    /// `collect_due`.
    pub fn begin_fire(&mut self, id: TimerId) -> Option<Firing<C>> {
        let entry = self.entries.get_mut(&id)?;
        if entry.cancelled {
            return None;
        }
        let target = entry.target.take()?;
        entry.fired += 1;
        Some(Firing {
            handle:     TimerHandle(id),
            params:     entry.params.clone(),
            target,
            due:        entry.due,
            occurrence: entry.fired,
            repeating:  entry.period_ticks.is_some(),
        })
    }

    /// Return a fired timer.  One-shot and cancelled timers are dropped;
    /// periodic timers are re-armed at `now + period`.
    pub fn finish_fire(&mut self, firing: Firing<C>, now: Tick) {
        let id = firing.handle.id();
        let seq = self.bump_seq();
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        let rearm = if entry.cancelled { None } else { entry.period_ticks };
        match rearm {
            Some(period) => {
                entry.due = now.offset(period);
                entry.seq = seq;
                entry.target = Some(firing.target);
                self.queue.insert((entry.due, seq), id);
            }
            None => {
                self.entries.remove(&id);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` while the timer may still fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.get(&handle.id()).is_some_and(|e| !e.cancelled)
    }

    /// Tick the timer is (next) due on.
    pub fn due_tick(&self, handle: TimerHandle) -> Option<Tick> {
        self.entries.get(&handle.id()).filter(|e| !e.cancelled).map(|e| e.due)
    }

    /// The earliest tick with at least one pending timer.
    pub fn next_due(&self) -> Option<Tick> {
        self.queue.keys().next().map(|&(tick, _)| tick)
    }

    /// Number of live (not cancelled) timers.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| !e.cancelled).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
