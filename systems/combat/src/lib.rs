#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system resolving contact damage, beam damage, beam aging and the
//! railgun hazard.

use maze_survival_core::{
    within_box, Beam, BeamKind, Command, CombatTuning, Entity, EntityKind, EntityView,
    SimulationStatus, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Combat system that turns a pre-tick snapshot into damage and beam commands.
#[derive(Debug)]
pub struct Combat {
    tuning: CombatTuning,
    rng: ChaCha8Rng,
}

impl Combat {
    /// Creates a combat system drawing railgun volleys from the seeded stream.
    #[must_use]
    pub fn new(tuning: CombatTuning, rng_seed: u64) -> Self {
        Self {
            tuning,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Emits one [`Command::DamageEntity`] per hurt entity, then
    /// [`Command::AgeBeams`], then any railgun volley.
    ///
    /// Damage is computed from `beams` as they were before aging, so a beam
    /// hurts on every tick its progress is below its duration.
    pub fn handle(
        &mut self,
        view: &EntityView,
        beams: &[Beam],
        status: &SimulationStatus,
        out: &mut Vec<Command>,
    ) {
        let touching = view.player().map_or(0, |player| {
            view.monsters()
                .filter(|monster| {
                    within_box(monster.position, player.position, self.tuning.contact_range)
                })
                .count()
        });

        for entity in view.iter() {
            let amount = self.damage_to(entity, touching, beams);
            if amount > 0.0 {
                out.push(Command::DamageEntity {
                    entity: entity.id,
                    amount,
                });
            }
        }

        out.push(Command::AgeBeams);

        if status.railgun_active && self.rng.gen_bool(self.tuning.railgun_chance.clamp(0.0, 1.0)) {
            for monster in view.monsters() {
                let origin = Vec2::new(monster.position.x, self.tuning.railgun_origin_y);
                out.push(Command::FireBeam {
                    beam: Beam::new(
                        origin,
                        monster.position,
                        self.tuning.railgun_beam_ticks,
                        BeamKind::Railgun,
                    ),
                });
            }
        }
    }

    fn damage_to(&self, entity: &Entity, touching: usize, beams: &[Beam]) -> f32 {
        let per_beam = match entity.kind {
            EntityKind::Player(_) => self.tuning.beam_damage_player,
            EntityKind::Monster(_) => self.tuning.beam_damage_other,
            EntityKind::Altar | EntityKind::Terminal(_) => return 0.0,
        };

        let beam_hits = beams
            .iter()
            .filter(|beam| beam.is_alive())
            .filter(|beam| within_box(beam.to, entity.position, self.tuning.beam_radius))
            .count();
        let mut amount = per_beam * beam_hits as f32;

        if matches!(entity.kind, EntityKind::Player(_)) {
            amount += self.tuning.contact_damage * touching as f32;
        }
        amount
    }
}
