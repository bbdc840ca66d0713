//! Unit tests for ix-input.

use ix_core::{Tick, TickClock};

use crate::{ActionKey, InputFrame, InputTracker, PressDisambiguator, PressKind, ScriptedInput};

const INTERACT: ActionKey = ActionKey(1);
const DUTY: ActionKey = ActionKey(2);

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Run `input` through a tracker for ticks `1..=ticks` at `tick_ms` per tick
/// and return every frame.
fn frames(mut input: ScriptedInput, ticks: u64, tick_ms: u32) -> Vec<InputFrame> {
    let mut tracker = InputTracker::new();
    tracker.bind(INTERACT);
    tracker.bind(DUTY);
    let mut clock = TickClock::new(tick_ms);
    (0..ticks)
        .map(|_| {
            let now = clock.advance();
            tracker.capture(&mut input, now, clock.elapsed_ms())
        })
        .collect()
}

fn classify(frames: &[InputFrame], threshold_ms: u64) -> Vec<(Tick, PressKind)> {
    let mut press = PressDisambiguator::new(INTERACT, threshold_ms);
    frames
        .iter()
        .filter_map(|f| press.update(f).map(|kind| (f.tick, kind)))
        .collect()
}

// ── InputTracker ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tracker {
    use super::*;

    #[test]
    fn edges_and_levels() {
        let input = ScriptedInput::new().hold(INTERACT, Tick(2), 3);
        let f = frames(input, 6, 16);

        assert!(f[0].is_idle());
        assert!(f[1].pressed(INTERACT) && f[1].held(INTERACT));
        assert!(!f[2].pressed(INTERACT) && f[2].held(INTERACT));
        assert!(f[3].held(INTERACT));
        assert!(f[4].released(INTERACT) && !f[4].held(INTERACT));
        assert!(f[5].is_idle());
    }

    #[test]
    fn unbound_keys_are_invisible() {
        let mut input = ScriptedInput::new().tap(ActionKey(9), Tick(1));
        let mut tracker = InputTracker::new();
        tracker.bind(INTERACT);
        let frame = tracker.capture(&mut input, Tick(1), 16);
        assert!(!frame.pressed(ActionKey(9)));
        assert!(frame.is_idle());
    }

    #[test]
    fn binding_twice_is_harmless() {
        let mut tracker = InputTracker::new();
        tracker.bind(DUTY);
        tracker.bind(INTERACT);
        tracker.bind(DUTY);
        assert_eq!(tracker.bindings(), &[INTERACT, DUTY]);
    }

    #[test]
    fn keys_are_independent() {
        let input = ScriptedInput::new().tap(INTERACT, Tick(1)).hold(DUTY, Tick(1), 2);
        let f = frames(input, 3, 16);
        assert!(f[0].pressed(INTERACT) && f[0].pressed(DUTY));
        assert!(f[1].released(INTERACT) && f[1].held(DUTY));
        assert!(f[2].released(DUTY));
    }
}

// ── PressDisambiguator ────────────────────────────────────────────────────────

#[cfg(test)]
mod press {
    use super::*;

    #[test]
    fn quick_press_is_tap_sustained_press_is_hold() {
        // 50 ms ticks: a 2-tick press lasts 100 ms, a 16-tick press 800 ms.
        let quick = frames(ScriptedInput::new().hold(INTERACT, Tick(1), 2), 20, 50);
        let long = frames(ScriptedInput::new().hold(INTERACT, Tick(1), 16), 20, 50);

        assert_eq!(classify(&quick, 250), vec![(Tick(3), PressKind::Tap)]);
        // Down at 50 ms; 250 ms later is tick 6 (300 ms).
        assert_eq!(classify(&long, 250), vec![(Tick(6), PressKind::Hold)]);
    }

    #[test]
    fn hold_reported_once_and_release_is_silent() {
        let f = frames(ScriptedInput::new().hold(INTERACT, Tick(1), 30), 40, 50);
        let kinds = classify(&f, 250);
        assert_eq!(kinds.len(), 1);
        assert_eq!(kinds[0].1, PressKind::Hold);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // Down at tick 1 (50 ms); at tick 6 elapsed is exactly 250 ms.
        let f = frames(ScriptedInput::new().hold(INTERACT, Tick(1), 5), 10, 50);
        assert_eq!(classify(&f, 250), vec![(Tick(6), PressKind::Tap)]);
        let f = frames(ScriptedInput::new().hold(INTERACT, Tick(1), 6), 10, 50);
        assert_eq!(classify(&f, 250), vec![(Tick(6), PressKind::Hold)]);
    }

    #[test]
    fn two_taps_are_two_actions() {
        let input = ScriptedInput::new().tap(INTERACT, Tick(1)).tap(INTERACT, Tick(4));
        let f = frames(input, 8, 16);
        assert_eq!(
            classify(&f, 250),
            vec![(Tick(2), PressKind::Tap), (Tick(5), PressKind::Tap)]
        );
    }

    #[test]
    fn held_for_ms_tracks_press() {
        let f = frames(ScriptedInput::new().hold(INTERACT, Tick(1), 4), 4, 50);
        let mut press = PressDisambiguator::with_default_threshold(INTERACT);
        press.update(&f[0]);
        press.update(&f[1]);
        assert!(press.is_down());
        assert_eq!(press.held_for_ms(&f[1]), Some(50));
        press.reset();
        assert!(!press.is_down());
    }
}

// ── ScriptedInput ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod scripted {
    use super::*;

    #[test]
    fn last_tick_is_latest_release() {
        let input = ScriptedInput::new().tap(INTERACT, Tick(3)).hold(DUTY, Tick(1), 10);
        assert_eq!(input.last_tick(), Tick(11));
        assert_eq!(ScriptedInput::new().last_tick(), Tick::ZERO);
    }
}
