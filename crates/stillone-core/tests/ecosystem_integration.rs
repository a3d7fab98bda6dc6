use stillone_core::{
    ControlCommand, EcosystemConfig, EcosystemWorld, FollowerState, PopulationConfig, Position,
    PursuerState, Tick, TickSummary, WorldSnapshot, apply_control_command,
};

fn seeded(seed: u64) -> EcosystemConfig {
    EcosystemConfig {
        rng_seed: Some(seed),
        ..EcosystemConfig::default()
    }
}

fn run(world: &mut EcosystemWorld, ticks: usize, dt: f32) -> Vec<TickSummary> {
    (0..ticks).map(|_| world.step(dt)).collect()
}

#[test]
fn default_world_stays_within_caps_and_bounds() {
    let config = seeded(0x5EED);
    let bounds = config.bounds;
    let caps = config.population.clone();
    let mut world = EcosystemWorld::new(config).expect("world");

    for summary in run(&mut world, 1_800, 1.0 / 60.0) {
        assert!(summary.followers <= caps.max_follower_count);
        assert!(summary.signs <= caps.max_sign_count);
        assert!(summary.pursuers >= 1, "a split always leaves a clone behind");
    }

    for (_, follower) in world.population().followers() {
        assert!(bounds.contains(follower.position()));
    }
    for (_, pursuer) in world.pursuers() {
        assert!(bounds.contains(pursuer.position()));
    }
    assert_eq!(world.tick(), Tick(1_800));
}

#[test]
fn identical_seeds_replay_identically() {
    let mut a = EcosystemWorld::new(seeded(99)).expect("a");
    let mut b = EcosystemWorld::new(seeded(99)).expect("b");
    let summaries_a = run(&mut a, 600, 1.0 / 30.0);
    let summaries_b = run(&mut b, 600, 1.0 / 30.0);
    assert_eq!(summaries_a, summaries_b);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn history_matches_returned_summaries() {
    let config = EcosystemConfig {
        history_capacity: 16,
        ..seeded(5)
    };
    let mut world = EcosystemWorld::new(config).expect("world");
    let summaries = run(&mut world, 40, 0.05);
    let history: Vec<TickSummary> = world.history().copied().collect();
    assert_eq!(history.len(), 16);
    assert_eq!(history.as_slice(), &summaries[24..]);
}

#[test]
fn dance_through_the_sign_produces_offspring() {
    let mut config = seeded(21);
    config.initial_pursuer_count = 0;
    config.population = PopulationConfig {
        initial_follower_count: 0,
        initial_sign_count: 0,
        follower_spawn_interval: 1_000.0,
        sign_spawn_interval: 1_000.0,
        ..PopulationConfig::default()
    };
    config.follower.spawn_cooldown = 0.0;
    config.follower.dance_speed = 0.0;
    config.follower.min_spawn_count = 2;
    config.follower.max_spawn_count = 2;
    let follower_config = config.follower.clone();

    let mut world = EcosystemWorld::new(config).expect("world");
    world
        .population_mut()
        .spawn_sign_at(Position::new(0.0, 0.0))
        .expect("sign");
    let dancer = world
        .population_mut()
        .spawn_follower_at(Position::new(-3.0, 0.0), &follower_config)
        .expect("dancer");

    let summaries = run(&mut world, 240, 1.0 / 60.0);
    let completion = summaries
        .iter()
        .find(|s| s.deaths > 0)
        .expect("dancer crosses the sign centre");
    assert_eq!(completion.deaths, 1);
    assert_eq!(completion.births, 2);
    assert!(world.population().follower(dancer).is_none());
}

#[test]
fn pursuer_eventually_splits_in_a_crowd() {
    let mut config = seeded(8);
    config.pursuer.collision_threshold = 2;
    config.population.initial_follower_count = 0;
    config.population.initial_sign_count = 0;
    config.population.follower_spawn_interval = 1_000.0;
    config.population.sign_spawn_interval = 1_000.0;
    config.initial_pursuer_count = 0;
    let follower_config = config.follower.clone();

    let mut world = EcosystemWorld::new(config).expect("world");
    let pursuer = world.spawn_pursuer_at(Position::new(0.0, 0.0));
    for x in [0.3_f32, -0.3] {
        world
            .population_mut()
            .spawn_follower_at(Position::new(x, 0.0), &follower_config)
            .expect("follower");
    }

    let summary = world.step(0.01);
    assert_eq!(summary.deaths, 2);
    assert_eq!(summary.splits, 1);
    assert_eq!(summary.pursuers, 2);
    assert_eq!(
        world.pursuer(pursuer).expect("original").state(),
        PursuerState::Dying
    );
}

#[test]
fn control_commands_drive_reserved_pursuer_states() {
    let mut config = seeded(4);
    config.pursuer.still_duration = 0.5;
    let mut world = EcosystemWorld::new(config).expect("world");
    let (pursuer, _) = world.pursuers().next().expect("initial pursuer");

    apply_control_command(&mut world, ControlCommand::StillPursuer(pursuer)).expect("still");
    let before = world.pursuer(pursuer).expect("pursuer").position();
    world.step(0.1);
    let after = world.pursuer(pursuer).expect("pursuer");
    assert_eq!(after.state(), PursuerState::Still);
    assert_eq!(after.position(), before);

    run(&mut world, 5, 0.1);
    assert_ne!(
        world.pursuer(pursuer).expect("pursuer").state(),
        PursuerState::Still
    );
}

#[test]
fn new_followers_start_idle_in_cooldown() {
    let mut world = EcosystemWorld::new(seeded(17)).expect("world");
    for (_, follower) in world.population().followers() {
        let view = follower.view();
        assert_eq!(view.state, FollowerState::Idle);
        assert!(view.in_cooldown);
    }
    apply_control_command(&mut world, ControlCommand::SpawnFollower).expect("spawn");
    assert_eq!(world.population().follower_count(), 11);
}

#[test]
fn snapshot_serialises_to_json() {
    let mut world = EcosystemWorld::new(seeded(1)).expect("world");
    run(&mut world, 10, 0.1);
    let snapshot = world.snapshot();
    let json = serde_json::to_string(&snapshot).expect("serialise");
    let decoded: WorldSnapshot = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(decoded.tick, Tick(10));
    assert_eq!(decoded.followers.len(), snapshot.followers.len());
    assert_eq!(decoded.pursuers.len(), snapshot.pursuers.len());
}
