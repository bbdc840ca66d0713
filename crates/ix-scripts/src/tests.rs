//! Unit and scenario tests for ix-scripts.

use std::cell::RefCell;
use std::rc::Rc;

use ix_controller::{
    AbortReason, Controller, EventKind, FsmDriver, InteractionEvent, Resolution, StateMachine, TickContext,
};
use ix_core::{ControllerId, EntityHandle, IxError, IxResult, SchedulerConfig, Tick, Vec3};
use ix_input::{ActionKey, ScriptedInput};
use ix_sched::{EndReason, FrameScheduler, Host, SchedulerBuilder, TickReport};
use ix_world::{MemoryWorld, MemoryWorldBuilder, RecordingPresentation, World, WorldCommand};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

const INTERACT: ActionKey = ActionKey(1);
const SEARCH: ActionKey = ActionKey(2);
const DUTY: ActionKey = ActionKey(3);
const LIGHTS: ActionKey = ActionKey(4);

const ALL_KINDS: [EventKind; 8] = [
    EventKind::SessionStarted,
    EventKind::TargetResisted,
    EventKind::TargetDisarmed,
    EventKind::SessionResolved,
    EventKind::SessionAborted,
    EventKind::OwnershipRevoked,
    EventKind::DutyChanged,
    EventKind::LightsChanged,
];

type Events = Rc<RefCell<Vec<InteractionEvent>>>;

/// Records every event it is delivered.
struct EventLog(Events);

impl Controller for EventLog {
    fn name(&self) -> &str {
        "event_log"
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        for kind in ALL_KINDS {
            ctx.subscribe(kind)?;
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut TickContext<'_>) -> IxResult<()> {
        Ok(())
    }

    fn on_event(&mut self, _ctx: &mut TickContext<'_>, event: &InteractionEvent) -> IxResult<()> {
        self.0.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// 50 ms ticks, nobody resists, 500 ms actions, 1 s approach timeout.
fn quick_tuning() -> ScriptTuning {
    ScriptTuning::default()
        .with_resist_probability(0.0)
        .with_durations(500, 500)
        .with_approach_timeout_ms(1_000)
}

/// Duty toggled on with a tap at T1 (effective T2).
fn on_duty() -> ScriptedInput {
    ScriptedInput::new().tap(DUTY, Tick(1))
}

/// Player at the origin, an armed suspect 1 m away, a partner 3 m away and
/// a patrol car 1.5 m away, driven by the full set of script controllers.
struct Patrol {
    world:        MemoryWorld,
    input:        ScriptedInput,
    presentation: RecordingPresentation,
    sched:        FrameScheduler,
    events:       Events,
    player:       EntityHandle,
    suspect:      EntityHandle,
    partner:      EntityHandle,
    car:          EntityHandle,
}

impl Patrol {
    fn new(tuning: ScriptTuning, input: ScriptedInput) -> Self {
        Self::build(tuning, input, false)
    }

    fn with_partner(tuning: ScriptTuning, input: ScriptedInput) -> Self {
        Self::build(tuning, input, true)
    }

    fn build(tuning: ScriptTuning, input: ScriptedInput, partner_follows: bool) -> Self {
        let (world, e) = MemoryWorldBuilder::new()
            .actor(Vec3::ZERO)
            .armed_actor(Vec3::new(1.0, 0.0, 0.0))
            .actor(Vec3::new(-3.0, 0.0, 0.0))
            .vehicle(Vec3::new(0.0, 1.5, 0.0))
            .build();
        let (player, suspect, partner, car) = (e[0], e[1], e[2], e[3]);
        let events = Events::default();

        let mut builder = SchedulerBuilder::new(SchedulerConfig::default().with_tick_duration_ms(50).with_seed(7))
            .controller(Box::new(EventLog(Rc::clone(&events))))
            .controller(Box::new(DutyController::new(player, &tuning)))
            .controller(Box::new(LightingController::new(player, &tuning)))
            .controller(Box::new(ArrestFeature::new(Arrest, player, tuning.clone())))
            .controller(Box::new(TrunkSearchFeature::new(TrunkSearch, player, tuning.clone())));
        if partner_follows {
            builder = builder.controller(Box::new(CompanionController::new(partner, player)));
        }

        Self {
            world,
            input,
            presentation: RecordingPresentation::new(),
            sched: builder.build().unwrap(),
            events,
            player,
            suspect,
            partner,
            car,
        }
    }

    fn tick(&mut self) -> TickReport {
        let mut host = Host::new(&mut self.world, &mut self.input, &mut self.presentation);
        self.sched.tick(&mut host)
    }

    /// Run until `tick` has been processed.
    fn run_to(&mut self, tick: u64) {
        while self.sched.now() < Tick(tick) {
            self.tick();
        }
    }

    /// Active controllers with the given name.
    fn live(&self, name: &str) -> Vec<ControllerId> {
        self.sched
            .active_controllers()
            .into_iter()
            .filter(|&id| self.sched.controller_name(id) == Some(name))
            .collect()
    }

    fn events(&self, kind: EventKind) -> Vec<InteractionEvent> {
        self.events.borrow().iter().filter(|e| e.kind() == kind).cloned().collect()
    }

    fn commanded(&self, entity: EntityHandle, command: &WorldCommand) -> bool {
        self.world.commands_for(entity).contains(&command)
    }

    fn status(&self, entity: EntityHandle) -> ix_world::EntityStatus {
        self.world.status(entity).unwrap()
    }
}

// ── Tuning ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tuning {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ScriptTuning::default().validate(), Ok(()));
        assert_eq!(ScriptTuning::default().hold_threshold_ms, 250);
    }

    #[test]
    fn bad_values_rejected() {
        let bad_odds = ScriptTuning::default().with_resist_probability(1.5);
        assert!(matches!(bad_odds.validate(), Err(IxError::Config(_))));

        let wide_contact = ScriptTuning { contact_radius: 6.0, ..ScriptTuning::default() };
        assert!(matches!(wide_contact.validate(), Err(IxError::Config(_))));

        let mut clash = ScriptTuning::default();
        clash.keys.search = clash.keys.interact;
        assert!(matches!(clash.validate(), Err(IxError::Config(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let tuning: ScriptTuning = serde_json::from_str(r#"{ "restrain_ms": 500 }"#).unwrap();
        assert_eq!(tuning.restrain_ms, 500);
        assert_eq!(tuning.search_ms, ScriptTuning::default().search_ms);
        assert_eq!(tuning.keys, KeyBindings::default());
    }
}

// ── Custody machine ───────────────────────────────────────────────────────────

#[cfg(test)]
mod machine {
    use proptest::prelude::*;

    use super::*;
    use crate::CustodyCommand as C;
    use crate::CustodyEvent as E;
    use crate::CustodyState as S;

    fn run(machine: CustodyMachine, events: &[CustodyEvent]) -> (FsmDriver<CustodyMachine>, Vec<CustodyCommand>) {
        let mut fsm = FsmDriver::new(machine, S::Init);
        let commands = events.iter().flat_map(|&e| fsm.fire(e)).collect();
        (fsm, commands)
    }

    #[test]
    fn cooperative_handoff_to_path_a() {
        let (fsm, commands) = run(
            CustodyMachine::new(true),
            &[E::Begin, E::Claimed, E::Arrived, E::PerformDone, E::Choose(Resolution::PathA), E::PathDone, E::Released],
        );
        let done = Outcome::Resolved(Resolution::PathA);
        assert_eq!(*fsm.state(), S::Terminal(done));
        assert!(fsm.is_terminal());
        assert_eq!(commands, vec![
            C::RequestOwnership,
            C::Approach,
            C::StartApproachTimeout,
            C::CancelApproachTimeout,
            C::BeginPerform,
            C::PromptDecision,
            C::Execute(Resolution::PathA),
            C::CancelTimers,
            C::ReleaseAll,
            C::Finish(done),
        ]);
    }

    #[test]
    fn denied_claim_still_releases() {
        let (fsm, commands) = run(CustodyMachine::new(true), &[E::Begin, E::ClaimDenied]);
        let denied = Outcome::Aborted(AbortReason::OwnershipDenied);
        assert_eq!(*fsm.state(), S::Releasing(denied));
        assert_eq!(commands[1..], [C::CancelTimers, C::ReleaseAll]);
    }

    #[test]
    fn vehicles_never_escalate() {
        let (fsm, commands) = run(CustodyMachine::new(false), &[E::Begin, E::Claimed, E::Resisted]);
        assert_eq!(*fsm.state(), S::Approaching);
        assert_eq!(commands.len(), 3);
    }

    #[test]
    fn disarm_rerolls_until_cooperative() {
        let (fsm, commands) = run(
            CustodyMachine::new(true),
            &[
                E::Begin,
                E::Claimed,
                E::Resisted,
                E::Disarmed { cooperates: false },
                E::Disarmed { cooperates: true },
            ],
        );
        assert_eq!(*fsm.state(), S::Performing);
        assert_eq!(commands[3..], [
            C::CancelApproachTimeout,
            C::Escalate,
            C::StartEscalationTimeout,
            C::CancelEscalationTimeout,
            C::Escalate,
            C::StartEscalationTimeout,
            C::CancelEscalationTimeout,
            C::BeginPerform,
        ]);
    }

    #[test]
    fn undisarmed_target_escapes() {
        let (fsm, commands) =
            run(CustodyMachine::new(true), &[E::Begin, E::Claimed, E::Resisted, E::EscalationTimedOut]);
        assert_eq!(*fsm.state(), S::Releasing(Outcome::Aborted(AbortReason::Escaped)));
        assert_eq!(commands[commands.len() - 2..], [C::CancelTimers, C::ReleaseAll]);

        // Only an escalated session listens to the escalation timeout.
        let (fsm, _) = run(CustodyMachine::new(true), &[E::Begin, E::Claimed, E::EscalationTimedOut]);
        assert_eq!(*fsm.state(), S::Approaching);
    }

    #[test]
    fn abort_from_every_live_state() {
        let machine = CustodyMachine::new(true);
        let live = [
            S::Init,
            S::Claiming,
            S::Approaching,
            S::Performing,
            S::AwaitingDecision,
            S::PathA,
            S::PathB,
            S::Escalated,
        ];
        for state in live {
            let (next, commands) = machine.transition(&state, &E::Abort(AbortReason::Cancelled));
            assert_eq!(next, S::Releasing(Outcome::Aborted(AbortReason::Cancelled)), "from {state:?}");
            assert_eq!(commands, vec![C::CancelTimers, C::ReleaseAll]);
        }
    }

    #[test]
    fn closing_states_ignore_abort() {
        let machine = CustodyMachine::new(true);
        let releasing = S::Releasing(Outcome::Resolved(Resolution::PathB));
        assert_eq!(machine.transition(&releasing, &E::Abort(AbortReason::TargetGone)), (releasing, vec![]));
        let terminal = S::Terminal(Outcome::Aborted(AbortReason::TimedOut));
        assert_eq!(machine.transition(&terminal, &E::Begin), (terminal, vec![]));
    }

    fn event() -> impl Strategy<Value = CustodyEvent> {
        prop::sample::select(vec![
            E::Begin,
            E::Claimed,
            E::ClaimDenied,
            E::Arrived,
            E::ApproachTimedOut,
            E::Resisted,
            E::EscalationTimedOut,
            E::Disarmed { cooperates: true },
            E::Disarmed { cooperates: false },
            E::PerformDone,
            E::Choose(Resolution::PathA),
            E::Choose(Resolution::PathB),
            E::PathDone,
            E::Released,
            E::Abort(AbortReason::TargetGone),
            E::Abort(AbortReason::OwnershipLost),
        ])
    }

    proptest! {
        /// Whatever arrives, a session finishes at most once, only from
        /// `Releasing`, and never leaves `Terminal`.
        #[test]
        fn finishes_once_through_releasing(
            escalation in any::<bool>(),
            events in proptest::collection::vec(event(), 1..40),
        ) {
            let mut fsm = FsmDriver::new(CustodyMachine::new(escalation), S::Init);
            let mut finishes = 0;
            for event in events {
                let before = *fsm.state();
                let commands = fsm.fire(event);
                let after = *fsm.state();
                if matches!(before, S::Terminal(_)) {
                    prop_assert_eq!(after, before);
                    prop_assert!(commands.is_empty());
                }
                if matches!(after, S::Terminal(_)) && !matches!(before, S::Terminal(_)) {
                    prop_assert!(matches!(before, S::Releasing(_)));
                }
                finishes += commands.iter().filter(|c| matches!(c, C::Finish(_))).count();
                prop_assert!(finishes <= 1);
            }
        }
    }
}

// ── Arrest ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod arrest {
    use super::*;

    /// Full arrest, deciding with a press of `hold_ticks` starting at T20.
    fn decide(hold_ticks: u64) -> Patrol {
        let input = on_duty().tap(INTERACT, Tick(4)).hold(INTERACT, Tick(20), hold_ticks);
        let mut patrol = Patrol::new(quick_tuning(), input);
        patrol.run_to(40);
        patrol
    }

    fn resolution(patrol: &Patrol) -> Option<Resolution> {
        patrol.events(EventKind::SessionResolved).iter().find_map(|e| match e {
            InteractionEvent::SessionResolved { resolution, .. } => Some(*resolution),
            _ => None,
        })
    }

    #[test]
    fn tap_transports_suspect() {
        let input = on_duty().tap(INTERACT, Tick(4)).hold(INTERACT, Tick(20), 2);
        let mut p = Patrol::new(quick_tuning(), input);

        p.run_to(5);
        assert!(p.sched.shared().on_duty.get());
        assert!(p.live("arrest").is_empty());

        p.run_to(6);
        let session = p.live("arrest");
        assert_eq!(session.len(), 1);
        assert_eq!(p.sched.arbiter().current_owner(p.suspect), Some(session[0]));
        assert!(p.commanded(p.suspect, &WorldCommand::Face(p.player)));
        assert!(p.commanded(p.suspect, &WorldCommand::PlayAnim("restrained".into())));

        p.run_to(15);
        assert!(!p.status(p.suspect).restrained);
        p.run_to(16);
        assert!(p.status(p.suspect).restrained);

        p.run_to(21);
        assert_eq!(p.live("arrest"), session);
        p.run_to(22);
        assert!(p.live("arrest").is_empty());
        let status = p.status(p.suspect);
        assert!(status.restrained);
        assert_eq!(status.vehicle, Some(p.car));
        assert_eq!(p.sched.arbiter().current_owner(p.suspect), None);
        assert!(!p.world.is_ambient(p.suspect));
        assert!(p.presentation.notified("custody"));
        assert_eq!(resolution(&p), Some(Resolution::PathA));
    }

    #[test]
    fn hold_releases_with_warning() {
        let input = on_duty().tap(INTERACT, Tick(4)).hold(INTERACT, Tick(20), 16);
        let mut p = Patrol::new(quick_tuning(), input);

        p.run_to(24);
        assert_eq!(p.live("arrest").len(), 1);
        p.run_to(25);
        assert!(p.live("arrest").is_empty());
        assert!(!p.status(p.suspect).restrained);
        assert!(p.world.is_ambient(p.suspect));
        assert!(p.presentation.notified("warning"));
        assert_eq!(resolution(&p), Some(Resolution::PathB));

        // Releasing the held key does not start another arrest.
        p.run_to(40);
        assert_eq!(p.events(EventKind::SessionStarted).len(), 1);
    }

    #[test]
    fn short_and_long_presses_differ() {
        assert_eq!(resolution(&decide(2)), Some(Resolution::PathA)); // 100 ms
        assert_eq!(resolution(&decide(16)), Some(Resolution::PathB)); // 800 ms
    }

    #[test]
    fn off_duty_trigger_refused() {
        let mut p = Patrol::new(quick_tuning(), ScriptedInput::new().tap(INTERACT, Tick(4)));
        p.run_to(8);
        assert!(p.presentation.notified("off duty"));
        assert!(p.events(EventKind::SessionStarted).is_empty());
        assert!(p.sched.arbiter().is_empty());
    }

    #[test]
    fn second_trigger_ignored_while_running() {
        let input = on_duty().tap(INTERACT, Tick(4)).tap(INTERACT, Tick(8));
        let mut p = Patrol::new(quick_tuning(), input);
        p.run_to(12);
        assert_eq!(p.live("arrest").len(), 1);
        assert_eq!(p.events(EventKind::SessionStarted).len(), 1);
    }

    #[test]
    fn despawned_target_aborts_and_frees_feature() {
        let input = on_duty().tap(INTERACT, Tick(4)).tap(INTERACT, Tick(14));
        let mut p = Patrol::new(quick_tuning(), input);

        p.run_to(10);
        p.world.despawn(p.suspect);
        p.run_to(11);
        assert!(p.live("arrest").is_empty());
        assert!(p.sched.arbiter().is_empty());
        assert!(matches!(
            p.events(EventKind::SessionAborted).as_slice(),
            [InteractionEvent::SessionAborted { reason: AbortReason::TargetGone, .. }]
        ));

        // The next nearest actor is picked on the following trigger.
        p.run_to(16);
        let started = p.events(EventKind::SessionStarted);
        assert_eq!(started.len(), 2);
        assert!(matches!(started[1], InteractionEvent::SessionStarted { target, .. } if target == p.partner));
    }

    #[test]
    fn target_despawned_before_perform_timer_aborts_cleanly() {
        let input = on_duty().tap(INTERACT, Tick(4));
        let mut p = Patrol::new(quick_tuning(), input);

        // The restraint timer is due at T16; the suspect is gone by then.
        p.run_to(15);
        p.world.despawn(p.suspect);
        let report = p.tick();
        assert_eq!(report.tick, Tick(16));
        assert!(report.faults.is_empty(), "{:?}", report.faults);
        assert!(report.ended.iter().all(|end| !end.reason.is_fault()));
        assert!(report.ended.iter().any(|end| end.name == "arrest" && end.reason == EndReason::Completed));

        assert!(p.live("arrest").is_empty());
        assert!(p.sched.arbiter().is_empty());
        assert!(matches!(
            p.events(EventKind::SessionAborted).as_slice(),
            [InteractionEvent::SessionAborted { reason: AbortReason::TargetGone, .. }]
        ));
        assert!(p.events(EventKind::SessionResolved).is_empty());
    }

    #[test]
    fn unreachable_target_times_out() {
        let input = on_duty().tap(INTERACT, Tick(4));
        let mut p = Patrol::new(quick_tuning(), input);
        p.world.set_position(p.suspect, Vec3::new(4.0, 0.0, 0.0));
        p.world.set_position(p.partner, Vec3::new(-30.0, 0.0, 0.0));

        p.run_to(25);
        assert_eq!(p.live("arrest").len(), 1);
        p.run_to(26);
        assert!(p.live("arrest").is_empty());
        assert!(matches!(
            p.events(EventKind::SessionAborted).as_slice(),
            [InteractionEvent::SessionAborted { reason: AbortReason::TimedOut, .. }]
        ));
        assert!(p.world.is_ambient(p.suspect));
    }

    #[test]
    fn resisting_suspect_and_partner_assist() {
        let tuning = quick_tuning().with_resist_probability(1.0);
        let input = on_duty().tap(INTERACT, Tick(4)).tap(INTERACT, Tick(8));
        let mut p = Patrol::with_partner(tuning, input);

        p.run_to(6);
        assert!(p.commanded(p.suspect, &WorldCommand::Fight(p.player)));
        assert!(p.commanded(p.partner, &WorldCommand::Fight(p.suspect)));
        assert!(p.presentation.notified("resisting"));

        // Disarming works, but the re-roll escalates again: now unarmed, the
        // suspect runs.
        p.run_to(9);
        assert!(!p.status(p.suspect).armed);
        assert!(p.commanded(p.suspect, &WorldCommand::DropWeapon));
        assert!(p.commanded(p.suspect, &WorldCommand::Flee(p.player)));
        assert_eq!(p.events(EventKind::TargetDisarmed).len(), 1);
        assert_eq!(p.events(EventKind::TargetResisted).len(), 2);
        assert_eq!(p.live("arrest").len(), 1);

        // Once the session is over the partner falls back in.
        p.world.despawn(p.suspect);
        p.run_to(11);
        assert!(p.live("arrest").is_empty());
        assert_eq!(p.world.commands_for(p.partner).last(), Some(&&WorldCommand::Follow(p.player)));
        assert_eq!(p.live("companion").len(), 1);
    }

    #[test]
    fn resisting_suspect_out_of_reach_escapes() {
        let tuning = quick_tuning().with_resist_probability(1.0).with_escalation_timeout_ms(1_000);
        let input = on_duty().tap(INTERACT, Tick(4)).tap(INTERACT, Tick(10));
        let mut p = Patrol::new(tuning, input);

        p.run_to(6);
        assert_eq!(p.events(EventKind::TargetResisted).len(), 1);
        p.world.set_position(p.suspect, Vec3::new(500.0, 0.0, 0.0));

        // Out of contact, the disarm press does nothing.
        p.run_to(14);
        assert!(p.events(EventKind::TargetDisarmed).is_empty());
        assert!(p.status(p.suspect).armed);
        assert_eq!(p.live("arrest").len(), 1);

        p.run_to(30);
        assert!(p.live("arrest").is_empty());
        assert!(p.sched.arbiter().is_empty());
        assert!(matches!(
            p.events(EventKind::SessionAborted).as_slice(),
            [InteractionEvent::SessionAborted { reason: AbortReason::Escaped, .. }]
        ));
        assert!(p.world.is_ambient(p.suspect));
    }
}

// ── Trunk search and lighting ─────────────────────────────────────────────────

#[cfg(test)]
mod vehicle {
    use super::*;

    #[test]
    fn trunk_search_seizes_contents() {
        let input = on_duty().tap(SEARCH, Tick(4)).tap(SEARCH, Tick(20));
        let mut p = Patrol::new(quick_tuning(), input);

        p.run_to(6);
        let session = p.live("trunk_search");
        assert_eq!(session.len(), 1);
        assert_eq!(p.sched.arbiter().current_owner(p.car), Some(session[0]));
        assert!(p.status(p.car).trunk_open);

        p.run_to(16);
        assert!(p.presentation.notified("Search complete"));

        p.run_to(21);
        assert!(p.live("trunk_search").is_empty());
        assert!(!p.status(p.car).trunk_open);
        assert!(p.world.is_ambient(p.car));
        assert!(p.presentation.notified("seized"));
        assert!(matches!(
            p.events(EventKind::SessionResolved).as_slice(),
            [InteractionEvent::SessionResolved { feature: "trunk_search", resolution: Resolution::PathA, .. }]
        ));
    }

    #[test]
    fn lights_wait_for_busy_vehicle() {
        let input = on_duty()
            .tap(SEARCH, Tick(4))
            .tap(LIGHTS, Tick(8))
            .tap(SEARCH, Tick(20))
            .tap(LIGHTS, Tick(24))
            .hold(LIGHTS, Tick(28), 16);
        let mut p = Patrol::new(quick_tuning(), input);
        let car = p.car;
        p.world.status_mut(p.player).unwrap().vehicle = Some(car);

        // The trunk search owns the car, so the lights are refused.
        p.run_to(9);
        assert!(p.presentation.notified("busy"));
        assert!(!p.status(car).lights);

        p.run_to(25);
        assert!(p.status(car).lights);
        assert!(p.sched.shared().lights_on.get());
        assert_eq!(p.sched.arbiter().current_owner(car), None);
        assert!(p.world.is_ambient(car));

        p.run_to(32);
        assert!(!p.status(car).siren);
        p.run_to(33);
        assert!(p.status(car).siren);
        assert!(p.status(car).lights);
        assert_eq!(p.events(EventKind::LightsChanged), vec![
            InteractionEvent::LightsChanged { vehicle: car, lights: true, siren: false },
            InteractionEvent::LightsChanged { vehicle: car, lights: true, siren: true },
        ]);
    }

    #[test]
    fn lights_need_a_vehicle() {
        let mut p = Patrol::new(quick_tuning(), ScriptedInput::new().tap(LIGHTS, Tick(2)));
        p.run_to(4);
        assert!(p.presentation.notified("vehicle"));
        assert!(!p.sched.shared().lights_on.get());
    }
}

// ── Duty ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod duty {
    use super::*;

    #[test]
    fn tap_toggles_duty() {
        let mut p = Patrol::new(quick_tuning(), on_duty().tap(DUTY, Tick(5)));
        p.run_to(1);
        assert!(!p.sched.shared().on_duty.get());
        p.run_to(2);
        assert!(p.sched.shared().on_duty.get());
        p.run_to(6);
        assert!(!p.sched.shared().on_duty.get());
        assert_eq!(p.events(EventKind::DutyChanged), vec![
            InteractionEvent::DutyChanged { on_duty: true },
            InteractionEvent::DutyChanged { on_duty: false },
        ]);
    }

    #[test]
    fn player_down_goes_off_duty() {
        let mut p = Patrol::new(quick_tuning(), on_duty().tap(INTERACT, Tick(6)));
        p.run_to(3);
        p.world.kill(p.player);
        p.run_to(4);
        let shared = p.sched.shared();
        assert!(shared.player_injured.get());
        assert!(!shared.on_duty.get());
        assert!(p.presentation.notified("Officer down"));
        p.presentation.drain();

        p.run_to(8);
        assert!(p.presentation.notified("You are off duty"));
        assert!(p.events(EventKind::SessionStarted).is_empty());
    }

    #[test]
    fn only_one_duty_writer() {
        let tuning = quick_tuning();
        let (mut world, e) = MemoryWorldBuilder::new().actor(Vec3::ZERO).build();
        let (mut sched, ids) = SchedulerBuilder::new(SchedulerConfig::default())
            .controller(Box::new(DutyController::new(e[0], &tuning)))
            .controller(Box::new(DutyController::new(e[0], &tuning)))
            .build_with_ids()
            .unwrap();
        let mut input = ScriptedInput::new();
        let mut presentation = RecordingPresentation::new();
        let report = sched.tick(&mut Host::new(&mut world, &mut input, &mut presentation));

        assert!(sched.is_active(ids[0]));
        assert!(report.ended(ids[1]).is_some_and(|end| end.reason.is_fault()));
        assert_eq!(sched.shared().on_duty.writer(), Some(ids[0]));
    }
}
