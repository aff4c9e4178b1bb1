#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Kinematics system that advances moving entities along their paths.

use std::collections::VecDeque;

use maze_survival_core::{Command, Entity, EntityKind, EntityView, TileCoord, Vec2};

/// Fraction of the speed inside which a waypoint counts as reached.
const ARRIVAL_FRACTION: f32 = 0.5;
/// Share of the next segment the player glides into after reaching a waypoint.
const PLAYER_BLEND: f32 = 0.1;

/// Pure system that proposes one movement step per entity with a path.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits a [`Command::MoveEntity`] for every player or monster with a
    /// non-empty path. The player is skipped once it has died.
    pub fn handle(&mut self, view: &EntityView, player_alive: bool, out: &mut Vec<Command>) {
        for entity in view.iter() {
            if let Some(command) = step_command(entity, player_alive) {
                out.push(command);
            }
        }
    }
}

fn step_command(entity: &Entity, player_alive: bool) -> Option<Command> {
    let (path, speed, blend) = match &entity.kind {
        EntityKind::Player(player) if player_alive => (&player.path, player.speed, true),
        EntityKind::Monster(monster) => (&monster.path, monster.speed, false),
        EntityKind::Player(_) | EntityKind::Altar | EntityKind::Terminal(_) => return None,
    };
    let step = advance(entity.position, speed, path, blend)?;
    Some(Command::MoveEntity {
        entity: entity.id,
        position: step.position,
        reached_waypoint: step.reached_waypoint,
    })
}

/// Outcome of advancing an entity by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Position after the tick.
    pub position: Vec2,
    /// Whether the head waypoint was reached and must be consumed.
    pub reached_waypoint: bool,
}

/// Advances a position toward the head of `path` at `speed` units per tick.
///
/// A waypoint closer than half the speed is reached. Monsters snap onto it;
/// with `blend` set the entity instead glides a tenth of a step-ratio into the
/// following segment, or stays put when the reached waypoint was the last one.
/// Returns `None` when the path is empty.
#[must_use]
pub fn advance(position: Vec2, speed: f32, path: &VecDeque<TileCoord>, blend: bool) -> Option<Step> {
    let waypoint = path.front()?.to_position();
    let offset = waypoint - position;
    let distance = offset.length();

    if distance < speed * ARRIVAL_FRACTION {
        let position = if !blend {
            waypoint
        } else {
            match path.get(1) {
                Some(next) => {
                    let segment = next.to_position() - waypoint;
                    let length = segment.length();
                    let ratio = if length > 0.0 { speed / length } else { 0.0 };
                    waypoint + segment * ratio * PLAYER_BLEND
                }
                None => position,
            }
        };
        return Some(Step {
            position,
            reached_waypoint: true,
        });
    }

    Some(Step {
        position: position + offset * (speed / distance),
        reached_waypoint: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(tiles: &[(u32, u32)]) -> VecDeque<TileCoord> {
        tiles.iter().map(|&(x, y)| TileCoord::new(x, y)).collect()
    }

    #[test]
    fn empty_path_produces_no_step() {
        assert_eq!(advance(Vec2::ZERO, 1.0, &VecDeque::new(), false), None);
    }

    #[test]
    fn moves_by_speed_toward_distant_waypoint() {
        let step = advance(Vec2::ZERO, 1.0, &path(&[(4, 0)]), false).expect("step");
        assert_eq!(step.position, Vec2::new(1.0, 0.0));
        assert!(!step.reached_waypoint);
    }

    #[test]
    fn monsters_snap_onto_reached_waypoint() {
        let step = advance(Vec2::new(3.6, 0.0), 1.0, &path(&[(4, 0), (5, 0)]), false)
            .expect("step");
        assert_eq!(step.position, Vec2::new(4.0, 0.0));
        assert!(step.reached_waypoint);
    }

    #[test]
    fn player_blends_into_following_segment() {
        let step = advance(Vec2::new(3.5, 0.0), 2.0, &path(&[(4, 0), (5, 0)]), true)
            .expect("step");
        assert!((step.position.x - 4.2).abs() < 1e-6);
        assert_eq!(step.position.y, 0.0);
        assert!(step.reached_waypoint);
    }

    #[test]
    fn player_stays_put_on_final_waypoint() {
        let start = Vec2::new(4.3, 0.2);
        let step = advance(start, 2.0, &path(&[(4, 0)]), true).expect("step");
        assert_eq!(step.position, start);
        assert!(step.reached_waypoint);
    }
}
