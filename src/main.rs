//! Arcade Pool headless session
//!
//! Runs one minute of blocker spawning at the fixed timestep and reports how
//! the pools behaved. Pass a tuning JSON path as the first argument.

use std::cell::{Cell, RefCell};
use std::process::ExitCode;
use std::rc::Rc;

use glam::Vec2;

use arcade_pool::consts::SIM_DT;
use arcade_pool::lives::LifeTracker;
use arcade_pool::pool::{KindDef, KindId, PoolError, PooledHandle};
use arcade_pool::{EventArgs, GameBus, GameEvent, RandomSource, SharedRng, Spawner, Tuning};

/// One minute at 120 Hz
const SESSION_FRAMES: u32 = 120 * 60;
const SPAWN_EVERY: u32 = 90;
const HEART_EVERY: u32 = 600;
const LANES: usize = 5;
const BLOCKER_RADIUS: f32 = 24.0;
const FALL_SPEED: f32 = 160.0;

#[derive(Debug)]
struct Blocker {
    serial: u32,
    active: bool,
    reuses: u32,
}

#[derive(Debug, Default)]
struct Summary {
    frames: u32,
    spawned: usize,
    killed: usize,
    missed: usize,
    hearts: usize,
    game_over: bool,
}

fn blocker_kinds(names: &[String]) -> Vec<KindDef<Blocker>> {
    let serial = Rc::new(Cell::new(0u32));
    names
        .iter()
        .map(|name| {
            let serial = serial.clone();
            KindDef::new(name.clone(), move || {
                serial.set(serial.get() + 1);
                Blocker {
                    serial: serial.get(),
                    active: false,
                    reuses: 0,
                }
            })
            .with_reset(|b| {
                b.reuses += 1;
            })
            .with_park(|b| {
                b.active = false;
            })
        })
        .collect()
}

fn counter(bus: &mut GameBus, event: GameEvent) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let c = count.clone();
    bus.start_listening(event, move |_, _| {
        *c.borrow_mut() += 1;
    });
    count
}

fn run(tuning: &Tuning) -> Result<Summary, PoolError> {
    let rng = SharedRng::new(tuning.seed);
    let mut lanes = rng.clone();
    let mut bus = GameBus::new();

    let lives = LifeTracker::attach(&mut bus, tuning.starting_lives, tuning.max_lives);
    let spawned = counter(&mut bus, GameEvent::BlockerSpawned);
    let killed = counter(&mut bus, GameEvent::EnemyKilled);
    let missed = counter(&mut bus, GameEvent::EnemyMissed);

    let mut spawner = Spawner::from_tuning(blocker_kinds(&tuning.blocker_kinds), tuning, &rng);
    let bounds = tuning.bounds;
    let lane_width = (bounds.max.x - bounds.min.x) / LANES as f32;

    let mut summary = Summary::default();
    for frame in 0..SESSION_FRAMES {
        summary.frames = frame + 1;

        if frame % SPAWN_EVERY == 0 {
            let lane = lanes.below(LANES) as f32;
            let x = bounds.min.x + lane_width * (lane + 0.5);
            let handle = spawner.spawn_random(
                Vec2::new(x, bounds.max.y),
                Vec2::new(0.0, -FALL_SPEED),
                BLOCKER_RADIUS,
                &mut bus,
            )?;
            if let Some(blocker) = spawner.catalog_mut().get_mut(handle) {
                blocker.active = true;
                log::trace!("blocker #{} live (reuse {})", blocker.serial, blocker.reuses);
            }
        }

        spawner.advance(SIM_DT);

        // The player clears most blockers once they pass the midline
        let cleared: Vec<PooledHandle> = spawner
            .active()
            .iter()
            .filter(|s| s.pos.y < 0.0 && s.handle.slot() % 4 != 0)
            .map(|s| s.handle)
            .collect();
        for handle in cleared {
            spawner.despawn(handle, &mut bus)?;
        }

        spawner.sweep_out_of_bounds(&bounds, &mut bus)?;

        if frame % HEART_EVERY == 0 && spawner.roll_heart() {
            summary.hearts += 1;
            bus.trigger_event(GameEvent::HeartCollected, EventArgs::default());
        }

        if lives.is_game_over() {
            summary.game_over = true;
            break;
        }
    }

    for k in 0..spawner.catalog().kind_count() {
        let kind = KindId(k);
        log::info!(
            "Pool '{}': {} created, {} parked, {} out",
            spawner.catalog().kind_name(kind)?,
            spawner.catalog().created(kind)?,
            spawner.catalog().available(kind)?,
            spawner.catalog().outstanding(kind)?,
        );
    }

    summary.spawned = *spawned.borrow();
    summary.killed = *killed.borrow();
    summary.missed = *missed.borrow();
    let remaining = lives.detach(&mut bus);
    log::info!("Lives remaining: {}/{}", remaining.current, remaining.max);
    Ok(summary)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();

    let tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::load(path),
        None => Tuning::default(),
    };
    log::info!("Arcade Pool starting (seed {})", tuning.seed);

    match run(&tuning) {
        Ok(summary) => {
            log::info!(
                "Session ended after {} frames: {} spawned, {} killed, {} missed, {} hearts{}",
                summary.frames,
                summary.spawned,
                summary.killed,
                summary.missed,
                summary.hearts,
                if summary.game_over { " (game over)" } else { "" }
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Session aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Host engine drives the library directly on web
}
