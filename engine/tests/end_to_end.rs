use maze_survival_core::{
    Beam, BeamKind, Command, EntityKind, Event, SimulationConfig, SpawnTarget, TerminalKind,
    TileCoord,
};
use maze_survival_engine::Simulation;
use maze_survival_world::query;

fn small_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.grid_size = 128;
    config.world.player_anchor = [64, 64];
    config.world.altar_anchors = vec![[20, 20], [100, 100]];
    config
}

fn is_spawn_attempt(event: &Event) -> bool {
    matches!(
        event,
        Event::MonsterSpawned { .. } | Event::SpawnFailed { .. }
    )
}

/// Finds a reachable tile several steps away from the player and routes the
/// player toward it.
fn route_player(simulation: &mut Simulation) -> TileCoord {
    let player = query::player(simulation.world()).expect("player").position;
    let origin = TileCoord::from_position(player, 128);

    for radius in 4..40_i64 {
        for (dx, dy) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
            let x = i64::from(origin.x()) + dx * radius;
            let y = i64::from(origin.y()) + dy * radius;
            let grid = query::grid(simulation.world());
            let Some(goal) = grid.tile_at(x, y) else {
                continue;
            };
            if grid.is_walkable(goal) && simulation.request_path(goal) {
                return goal;
            }
        }
    }
    panic!("no reachable goal near the player");
}

fn remaining_waypoints(simulation: &Simulation) -> usize {
    query::player(simulation.world())
        .and_then(|player| player.path())
        .map_or(0, |path| path.len())
}

#[test]
fn player_consumes_one_waypoint_per_tick_until_arrival() {
    let mut simulation = Simulation::new(small_config(), 41);
    let goal = route_player(&mut simulation);
    let waypoints = remaining_waypoints(&simulation);
    assert!(waypoints >= 5);

    for elapsed in 1..waypoints {
        let _ = simulation.tick();
        assert_eq!(remaining_waypoints(&simulation), waypoints - elapsed);
    }
    let _ = simulation.tick();

    let player = query::player(simulation.world()).expect("player");
    assert_eq!(remaining_waypoints(&simulation), 0);
    assert!(
        player.position.distance(goal.to_position()) < player.speed().expect("speed"),
        "player stopped at {:?}, goal {goal:?}",
        player.position
    );
}

#[test]
fn monster_at_altar_discharges_after_fifty_ticks() {
    let mut simulation = Simulation::new(small_config(), 46);
    let frame = simulation.frame();
    let altar = frame
        .entities
        .iter()
        .find(|entity| entity.is_altar())
        .cloned()
        .expect("altar");
    let events = simulation.submit(Command::SpawnMonster {
        anchor: TileCoord::from_position(altar.position, 128),
        target: SpawnTarget::FirstAltar,
    });
    assert!(matches!(events.as_slice(), [Event::MonsterSpawned { .. }]));

    let is_altar_beam = |event: &Event| {
        matches!(
            event,
            Event::BeamFired { beam } if beam.kind == BeamKind::Normal && beam.from == altar.position
        )
    };
    for _ in 1..50 {
        let events = simulation.tick();
        assert!(!events.iter().any(is_altar_beam));
    }

    let events = simulation.tick();
    let player = query::player(simulation.world()).expect("player").position;
    assert!(events.contains(&Event::BeamFired {
        beam: Beam::new(altar.position, player, 10, BeamKind::Normal),
    }));
    let monster = simulation
        .frame()
        .entities
        .iter()
        .find_map(|entity| entity.as_monster().cloned())
        .expect("monster");
    assert_eq!(monster.charge, 0.0);
    assert_eq!(monster.target, None);
}

#[test]
fn unreachable_goal_leaves_player_standing() {
    let mut simulation = Simulation::new(small_config(), 42);
    let grid = query::grid(simulation.world());
    let wall = (0..128)
        .flat_map(|y| (0..128).map(move |x| TileCoord::new(x, y)))
        .find(|tile| !grid.is_walkable(*tile))
        .expect("maze has walls");

    assert!(!simulation.request_path(wall));
    let player = query::player(simulation.world()).expect("player");
    assert!(player.path().expect("path").is_empty());
}

#[test]
fn disabled_altars_hold_waves_until_expiry() {
    let mut simulation = Simulation::new(small_config(), 43);
    let _ = simulation.tick();

    let terminal = simulation
        .frame()
        .entities
        .iter()
        .find(|entity| matches!(entity.kind, EntityKind::Terminal(_)))
        .map(|entity| entity.id)
        .expect("terminal batch generated on the first tick");
    let events = simulation.submit(Command::RequestChallenge { terminal });
    assert!(matches!(
        events.as_slice(),
        [Event::ChallengeRequested { .. }]
    ));

    let events = simulation.complete_challenge(terminal, TerminalKind::DisableAltar);
    assert!(events.contains(&Event::PowerUpActivated {
        power_up: maze_survival_core::PowerUp::AltarsDisabled,
        expires_at: 902,
    }));
    assert!(simulation.status().altars_disabled);
    assert!(simulation.pending_challenge().is_none());

    for _ in 2..902 {
        let events = simulation.tick();
        assert!(!events.iter().any(is_spawn_attempt));
    }

    let events = simulation.tick();
    assert!(!simulation.status().altars_disabled);
    assert!(events.iter().any(is_spawn_attempt));
}

#[test]
fn death_freezes_the_run() {
    let mut simulation = Simulation::new(small_config(), 44);
    for _ in 0..10 {
        let _ = simulation.tick();
    }
    let player = query::player(simulation.world()).expect("player").id;

    let events = simulation.submit(Command::DamageEntity {
        entity: player,
        amount: 1_000.0,
    });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlayerDied { .. })));
    assert!(simulation.is_dead());

    let frozen = simulation.status();
    assert!(simulation.tick().is_empty());
    assert_eq!(simulation.status(), frozen);
    assert!(!simulation.request_path(TileCoord::new(64, 64)));
    assert_eq!(simulation.frame().player_health.map(|(health, _)| health), Some(0.0));
}

#[test]
fn restart_discards_run_state() {
    let mut simulation = Simulation::new(small_config(), 45);
    for _ in 0..200 {
        let _ = simulation.tick();
    }
    let first_seed = simulation.seed();
    assert!(simulation.status().score > 0.0);

    simulation.restart();

    let status = simulation.status();
    assert_eq!(status.tick, 0);
    assert_eq!(status.score, 0.0);
    assert!(!status.dead);
    assert_ne!(simulation.seed(), first_seed);

    let frame = simulation.frame();
    assert!(frame.beams.is_empty());
    assert!(frame
        .entities
        .iter()
        .all(|entity| !matches!(entity.kind, EntityKind::Monster(_) | EntityKind::Terminal(_))));
    assert_eq!(frame.player_health, Some((100.0, 100.0)));
}
