//! patrol: a scripted traffic stop driven through the rust_ix framework.
//!
//! One officer sits in a patrol car next to a suspect, with a partner
//! following on foot.  A fixed input script goes on duty, arrests the
//! suspect, searches the trunk, toggles the lights and siren and goes off
//! duty again.  Everything the scripts tell the player is printed with the
//! tick it happened on.
//!
//! ```text
//! cargo run -p patrol -- [tuning.json]
//! RUST_LOG=debug cargo run -p patrol
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ix_controller::{Controller, EventKind, InteractionEvent, TickContext};
use ix_core::{IxResult, SchedulerConfig, Tick, Vec3};
use ix_input::ScriptedInput;
use ix_sched::{EndReason, Host, SchedulerBuilder};
use ix_scripts::{
    Arrest, ArrestFeature, CompanionController, DutyController, LightingController, ScriptTuning, TrunkSearch,
    TrunkSearchFeature,
};
use ix_world::{MemoryWorldBuilder, Presented, RecordingPresentation, World};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64 = 42;
const TICK_DURATION_MS: u32 = 50;  // 20 ticks per second
const TOTAL_TICKS:      u64 = 420; // 21 s of game time

// ── Session log ───────────────────────────────────────────────────────────────

/// Logs the end of every custody session.
struct SessionLog;

impl Controller for SessionLog {
    fn name(&self) -> &str {
        "session_log"
    }

    fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
        ctx.subscribe(EventKind::SessionResolved)?;
        ctx.subscribe(EventKind::SessionAborted)?;
        Ok(())
    }

    fn process(&mut self, _ctx: &mut TickContext<'_>) -> IxResult<()> {
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut TickContext<'_>, event: &InteractionEvent) -> IxResult<()> {
        match event {
            InteractionEvent::SessionResolved { feature, target, resolution, .. } => {
                info!(tick = ctx.now.0, feature, %target, ?resolution, "session resolved");
            }
            InteractionEvent::SessionAborted { feature, target, reason, .. } => {
                warn!(tick = ctx.now.0, feature, %target, ?reason, "session aborted");
            }
            _ => {}
        }
        Ok(())
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}

fn load_tuning(path: Option<&Path>) -> Result<ScriptTuning> {
    let tuning = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ScriptTuning::default(),
    };
    tuning.validate()?;
    Ok(tuning)
}

fn input_script(tuning: &ScriptTuning) -> ScriptedInput {
    let keys = tuning.keys;
    ScriptedInput::new()
        .tap(keys.duty, Tick(2))
        // Arrest the suspect.  The later taps disarm a resisting suspect and
        // then pick transport once the restraint is done.
        .tap(keys.interact, Tick(10))
        .tap(keys.interact, Tick(30))
        .tap(keys.interact, Tick(60))
        .tap(keys.interact, Tick(140))
        // Search the car's trunk, then hold to close it without seizing.
        .tap(keys.search, Tick(180))
        .hold(keys.search, Tick(300), 10)
        // Lights on, then hold for the siren.
        .tap(keys.lights, Tick(340))
        .hold(keys.lights, Tick(360), 8)
        .tap(keys.duty, Tick(400))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    // 1. Tuning, from the optional JSON file argument.
    let path = std::env::args().nth(1);
    let tuning = load_tuning(path.as_deref().map(Path::new))?;
    println!("=== patrol: rust_ix interaction framework ===");
    println!(
        "Ticks: {TOTAL_TICKS} × {TICK_DURATION_MS} ms  |  Seed: {SEED}  |  Resist odds: {:.2}",
        tuning.resist_probability
    );
    println!();

    // 2. World: officer in the patrol car, suspect alongside, partner behind.
    let (mut world, e) = MemoryWorldBuilder::new()
        .actor(Vec3::ZERO)
        .armed_actor(Vec3::new(1.5, 0.0, 0.0))
        .actor(Vec3::new(-3.0, 0.0, 0.0))
        .vehicle(Vec3::new(0.0, 1.5, 0.0))
        .build();
    let [player, suspect, partner, car] = [e[0], e[1], e[2], e[3]];
    if let Some(status) = world.status_mut(player) {
        status.vehicle = Some(car);
    }

    // 3. Scheduler with the full script set.
    let config = SchedulerConfig::default().with_tick_duration_ms(TICK_DURATION_MS).with_seed(SEED);
    let mut sched = SchedulerBuilder::new(config)
        .controller(Box::new(SessionLog))
        .controller(Box::new(DutyController::new(player, &tuning)))
        .controller(Box::new(LightingController::new(player, &tuning)))
        .controller(Box::new(ArrestFeature::new(Arrest, player, tuning.clone())))
        .controller(Box::new(TrunkSearchFeature::new(TrunkSearch, player, tuning.clone())))
        .controller(Box::new(CompanionController::new(partner, player)))
        .build()?;

    // 4. Run, printing what the player would see.
    let mut input = input_script(&tuning);
    let mut presentation = RecordingPresentation::new();
    let mut faults = 0;
    let t0 = Instant::now();
    for _ in 0..TOTAL_TICKS {
        let report = sched.tick(&mut Host::new(&mut world, &mut input, &mut presentation));
        for shown in presentation.drain() {
            match shown {
                Presented::Notify(text) => println!("[{}] {text}", report.tick),
                Presented::Help(text) if !text.is_empty() => println!("[{}] ({text})", report.tick),
                Presented::Help(_) | Presented::Cue(_) => {}
            }
        }
        for end in &report.ended {
            if let EndReason::Faulted(err) = &end.reason {
                warn!(tick = report.tick.0, controller = %end.id, name = %end.name, %err, "controller faulted");
            }
        }
        faults += report.faults.len();
        world.clear_log();
    }
    let elapsed = t0.elapsed();

    // 5. Summary.
    println!();
    println!("Run complete in {:.3} ms ({faults} isolated faults)", elapsed.as_secs_f64() * 1e3);
    println!("  controllers still active : {}", sched.active_controllers().len());
    println!("  on duty                  : {}", sched.shared().on_duty.get());
    println!("  lights on                : {}", sched.shared().lights_on.get());
    println!();
    println!("{:<10} {:<10} {:<10} {:<10}", "Entity", "Alive", "Restrained", "In car");
    println!("{}", "-".repeat(42));
    for (label, entity) in [("officer", player), ("suspect", suspect), ("partner", partner)] {
        if let Some(status) = world.status(entity) {
            println!(
                "{:<10} {:<10} {:<10} {:<10}",
                label,
                status.alive,
                status.restrained,
                status.vehicle == Some(car),
            );
        }
    }

    Ok(())
}
