use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::RngCore;

use arcade_pool::consts::SIM_DT;
use arcade_pool::lives::LifeTracker;
use arcade_pool::{
    EventArgs, GameBus, GameEvent, KindDef, KindId, PoolCatalog, SharedRng, Spawner, Tuning,
};

fn kinds(names: &[String]) -> Vec<KindDef<String>> {
    names
        .iter()
        .map(|name| {
            let label = name.clone();
            KindDef::new(name.clone(), move || label.clone())
        })
        .collect()
}

#[test]
fn test_unattended_session_runs_out_of_lives() {
    let tuning = Tuning::from_json(
        r#"{ "seed": 2024, "starting_lives": 3, "max_lives": 3, "heart_spawn_chance": 0.0,
             "heart_pity_after": 0 }"#,
    )
    .unwrap();
    let rng = SharedRng::new(tuning.seed);
    let mut bus = GameBus::new();
    let lives = LifeTracker::attach(&mut bus, tuning.starting_lives, tuning.max_lives);

    let over = Rc::new(RefCell::new(0));
    let o = over.clone();
    bus.start_listening(GameEvent::GameOver, move |_, _| {
        *o.borrow_mut() += 1;
    });

    let mut spawner = Spawner::from_tuning(kinds(&tuning.blocker_kinds), &tuning, &rng);
    let mut last = None;
    let mut frames = 0;

    while !lives.is_game_over() && frames < 120 * 120 {
        if frames % 60 == 0 {
            let handle = spawner
                .spawn_random(
                    Vec2::new(0.0, tuning.bounds.max.y),
                    Vec2::new(0.0, -300.0),
                    16.0,
                    &mut bus,
                )
                .unwrap();
            assert_ne!(Some(handle.kind()), last);
            last = Some(handle.kind());
            assert!(!spawner.roll_heart());
        }
        spawner.advance(SIM_DT);
        spawner.sweep_out_of_bounds(&tuning.bounds, &mut bus).unwrap();

        for k in 0..spawner.catalog().kind_count() {
            let kind = KindId(k);
            let live = spawner.active().iter().filter(|s| s.kind() == kind).count();
            assert_eq!(spawner.catalog().outstanding(kind), Ok(live));
        }
        frames += 1;
    }

    assert!(lives.is_game_over());
    assert_eq!(*over.borrow(), 1);
    // Objects in flight stay checked out; nothing was lost
    let total_created: usize = (0..spawner.catalog().kind_count())
        .map(|k| spawner.catalog().created(KindId(k)).unwrap())
        .sum();
    let total_parked: usize = (0..spawner.catalog().kind_count())
        .map(|k| spawner.catalog().available(KindId(k)).unwrap())
        .sum();
    assert_eq!(total_created, total_parked + spawner.active().len());
}

#[test]
fn test_hearts_keep_player_alive() {
    let tuning =
        Tuning::from_json(r#"{ "heart_spawn_chance": 1.0, "starting_lives": 2 }"#).unwrap();
    let rng = SharedRng::new(tuning.seed);
    let mut bus = GameBus::new();
    let lives = LifeTracker::attach(&mut bus, tuning.starting_lives, tuning.max_lives);
    let mut spawner = Spawner::from_tuning(kinds(&tuning.blocker_kinds), &tuning, &rng);

    for _ in 0..10 {
        spawner
            .spawn(KindId(0), Vec2::new(0.0, -1000.0), Vec2::ZERO, 8.0, &mut bus)
            .unwrap();
        assert_eq!(spawner.sweep_out_of_bounds(&tuning.bounds, &mut bus), Ok(1));
        if spawner.roll_heart() {
            bus.trigger_event(GameEvent::HeartCollected, EventArgs::default());
        }
    }

    assert_eq!(lives.lives().current, 2);
    // One instance served every spawn
    assert_eq!(spawner.catalog().created(KindId(0)), Ok(1));
}

#[test]
fn test_catalog_shares_session_rng() {
    let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

    let mut solo = PoolCatalog::new(kinds(&names), SharedRng::new(5));
    let mut twin = PoolCatalog::new(kinds(&names), SharedRng::new(5));
    let solo_picks: Vec<KindId> = (0..20).map(|_| solo.acquire_random().unwrap().1).collect();
    let twin_picks: Vec<KindId> = (0..20).map(|_| twin.acquire_random().unwrap().1).collect();
    assert_eq!(solo_picks, twin_picks);

    // The catalog draws from the same stream as every other clone
    let rng = SharedRng::new(5);
    let mut catalog = PoolCatalog::new(kinds(&names), rng.clone());
    let mut other = rng.clone();
    let mut mirror = SharedRng::new(5);

    let a = catalog.rng_mut().next_u32();
    let b = other.next_u32();
    assert_eq!(a, mirror.next_u32());
    assert_eq!(b, mirror.next_u32());
}
