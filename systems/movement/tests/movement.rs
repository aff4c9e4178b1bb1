use maze_survival_core::{Command, Event, SimulationConfig, TileCoord};
use maze_survival_system_movement::Movement;
use maze_survival_world::{self as world, query, World};

fn small_world(seed: u64) -> World {
    let mut config = SimulationConfig::default();
    config.world.grid_size = 128;
    config.world.player_anchor = [64, 64];
    config.world.altar_anchors = vec![[20, 20]];
    World::new(config, seed)
}

/// Requests player paths to nearby tiles until one with several waypoints is found.
fn assign_walkable_goal(world: &mut World) -> (TileCoord, usize) {
    let player = query::player(world).expect("player").position;
    let origin = TileCoord::from_position(player, 128);

    for radius in 3..40_u32 {
        for (dx, dy) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
            let x = i64::from(origin.x()) + dx * i64::from(radius);
            let y = i64::from(origin.y()) + dy * i64::from(radius);
            let Some(goal) = query::grid(world).tile_at(x, y) else {
                continue;
            };
            if !query::grid(world).is_walkable(goal) {
                continue;
            }

            let mut events = Vec::new();
            world::apply(world, Command::RequestPlayerPath { goal }, &mut events);
            if let [Event::PlayerPathAssigned { waypoints }] = events.as_slice() {
                if *waypoints > 5 {
                    return (goal, *waypoints);
                }
            }
        }
    }
    panic!("no reachable goal near the player");
}

fn run_tick(world: &mut World, movement: &mut Movement) {
    let view = query::entity_view(world);
    let mut commands = Vec::new();
    movement.handle(&view, true, &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

#[test]
fn player_walks_its_path_to_the_goal() {
    let mut world = small_world(21);
    let mut movement = Movement::default();
    let (goal, waypoints) = assign_walkable_goal(&mut world);

    for _ in 0..waypoints + 2 {
        run_tick(&mut world, &mut movement);
    }

    let player = query::player(&world).expect("player");
    let speed = player.speed().expect("speed");
    assert!(player.path().expect("path").is_empty());
    assert!(
        player.position.distance(goal.to_position()) < speed,
        "player stopped at {:?}, goal {goal:?}",
        player.position
    );
}

#[test]
fn dead_player_does_not_move() {
    let mut world = small_world(22);
    let _ = assign_walkable_goal(&mut world);
    let before = query::player(&world).expect("player").position;

    let view = query::entity_view(&world);
    let mut commands = Vec::new();
    Movement::default().handle(&view, false, &mut commands);

    assert!(commands.is_empty());
    assert_eq!(query::player(&world).expect("player").position, before);
}

#[test]
fn only_entities_with_paths_move() {
    let mut world = small_world(23);
    let _ = assign_walkable_goal(&mut world);

    let view = query::entity_view(&world);
    let mut commands = Vec::new();
    Movement::default().handle(&view, true, &mut commands);

    let player = query::player(&world).expect("player").id;
    assert!(matches!(
        commands.as_slice(),
        [Command::MoveEntity { entity, .. }] if *entity == player
    ));
}
