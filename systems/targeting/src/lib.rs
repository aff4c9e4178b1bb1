#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks monster objectives, charges altars and decides when
//! a monster needs a fresh path.

use maze_survival_core::{
    Command, Entity, EntityId, EntityView, MonsterState, Vec2, MONSTER_ABANDON_THRESHOLD,
};

/// Altars closer than this are strongly preferred over every other objective.
pub const ALTAR_PRIORITY_RANGE: f32 = 200.0;
/// Score subtracted from an altar inside [`ALTAR_PRIORITY_RANGE`].
pub const ALTAR_PRIORITY_BONUS: f32 = 1000.0;
/// Distance below which a monster charges its altar instead of walking.
pub const ALTAR_CHARGE_RANGE: f32 = 10.0;
/// Charge gained per tick while standing at an altar.
pub const CHARGE_STEP: f32 = 0.02;
/// Charge at or above which the altar fires.
const CHARGE_SNAP: f32 = 0.999;
/// Axis drift between the path's final waypoint and the objective that forces a replan.
pub const REPLAN_TOLERANCE: f32 = 10.0;

/// Monster targeting system.
#[derive(Debug, Default)]
pub struct Targeting;

impl Targeting {
    /// Creates a new targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits retarget, charge, discharge and replan commands for every monster
    /// in the snapshot.
    pub fn handle(&mut self, view: &EntityView, out: &mut Vec<Command>) {
        for monster in view.monsters() {
            let Some(state) = monster.as_monster() else {
                continue;
            };
            if state.stuck_counter >= MONSTER_ABANDON_THRESHOLD {
                continue;
            }
            decide(view, monster, state, out);
        }
    }
}

fn decide(view: &EntityView, monster: &Entity, state: &MonsterState, out: &mut Vec<Command>) {
    let Some(best) = best_objective(view, monster.position) else {
        return;
    };

    let mut path_cleared = false;
    if state.target != Some(best) {
        out.push(Command::RetargetMonster {
            monster: monster.id,
            target: best,
        });
        path_cleared = true;
    }

    let Some(objective) = view.get(best) else {
        return;
    };

    if objective.is_altar() && monster.position.distance(objective.position) < ALTAR_CHARGE_RANGE {
        let progress = next_charge(state.charge);
        if progress < 1.0 {
            out.push(Command::ChargeAltar {
                monster: monster.id,
                progress,
            });
        } else {
            out.push(Command::DischargeAltar {
                monster: monster.id,
                altar: objective.id,
            });
        }
        return;
    }

    let stale = path_cleared
        || state.path.back().map_or(true, |last| {
            let drift = (last.to_position() - objective.position).abs();
            drift.x > REPLAN_TOLERANCE || drift.y > REPLAN_TOLERANCE
        });
    if stale {
        out.push(Command::PlanMonsterPath {
            monster: monster.id,
            goal: objective.position,
        });
    }
}

/// Scores the player and every altar from `position` and returns the best one.
///
/// The player is considered first, so it wins exact ties.
#[must_use]
pub fn best_objective(view: &EntityView, position: Vec2) -> Option<EntityId> {
    view.player()
        .into_iter()
        .chain(view.altars())
        .map(|candidate| (candidate.id, objective_score(candidate, position)))
        .fold(None, |best: Option<(EntityId, f32)>, (id, score)| match best {
            Some((_, best_score)) if best_score <= score => best,
            _ => Some((id, score)),
        })
        .map(|(id, _)| id)
}

fn objective_score(candidate: &Entity, position: Vec2) -> f32 {
    let distance = position.distance(candidate.position);
    if candidate.is_altar() && distance < ALTAR_PRIORITY_RANGE {
        distance - ALTAR_PRIORITY_BONUS
    } else {
        distance
    }
}

/// Charge after one more tick at an altar, snapped to exactly 1 near completion.
#[must_use]
pub fn next_charge(charge: f32) -> f32 {
    let progress = (charge + CHARGE_STEP).min(1.0);
    if progress >= CHARGE_SNAP {
        1.0
    } else {
        progress
    }
}
