//! Tick-scheduled expiry for timed power-ups.

use maze_survival_core::PowerUp;

/// Expiry ticks for every timed power-up.
///
/// A power-up activated while the clock reads `now` for `duration` ticks stays
/// active for ticks `now + 1 ..= now + duration` and resets when the clock
/// reaches `now + duration + 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PowerUpSchedule {
    altars_disabled_until: Option<u64>,
    railgun_until: Option<u64>,
}

impl PowerUpSchedule {
    /// Activates a power-up, replacing any earlier expiry, and returns the
    /// tick at which it resets.
    pub fn activate(&mut self, power_up: PowerUp, now: u64, duration: u64) -> u64 {
        let expires_at = now.saturating_add(duration).saturating_add(1);
        *self.slot_mut(power_up) = Some(expires_at);
        expires_at
    }

    /// Reports whether the power-up is currently active.
    #[must_use]
    pub fn is_active(&self, power_up: PowerUp) -> bool {
        self.expires_at(power_up).is_some()
    }

    /// Tick at which the power-up resets, if active.
    #[must_use]
    pub fn expires_at(&self, power_up: PowerUp) -> Option<u64> {
        match power_up {
            PowerUp::AltarsDisabled => self.altars_disabled_until,
            PowerUp::Railgun => self.railgun_until,
        }
    }

    /// Resets every power-up whose expiry tick has been reached and reports
    /// which ones expired.
    pub fn expire_due(&mut self, now: u64) -> Vec<PowerUp> {
        let mut expired = Vec::new();
        for power_up in [PowerUp::AltarsDisabled, PowerUp::Railgun] {
            let slot = self.slot_mut(power_up);
            if slot.map_or(false, |expires_at| now >= expires_at) {
                *slot = None;
                expired.push(power_up);
            }
        }
        expired
    }

    fn slot_mut(&mut self, power_up: PowerUp) -> &mut Option<u64> {
        match power_up {
            PowerUp::AltarsDisabled => &mut self.altars_disabled_until,
            PowerUp::Railgun => &mut self.railgun_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_stays_active_for_exactly_its_duration() {
        let mut schedule = PowerUpSchedule::default();
        let expires_at = schedule.activate(PowerUp::Railgun, 10, 450);
        assert_eq!(expires_at, 461);

        for tick in 11..=460 {
            assert!(schedule.expire_due(tick).is_empty(), "expired early at {tick}");
            assert!(schedule.is_active(PowerUp::Railgun));
        }

        assert_eq!(schedule.expire_due(461), vec![PowerUp::Railgun]);
        assert!(!schedule.is_active(PowerUp::Railgun));
        assert!(schedule.expire_due(462).is_empty());
    }

    #[test]
    fn reactivation_extends_the_expiry() {
        let mut schedule = PowerUpSchedule::default();
        let _ = schedule.activate(PowerUp::AltarsDisabled, 0, 900);
        let extended = schedule.activate(PowerUp::AltarsDisabled, 600, 900);

        assert_eq!(extended, 1501);
        assert!(schedule.expire_due(901).is_empty());
        assert_eq!(schedule.expires_at(PowerUp::AltarsDisabled), Some(1501));
    }

    #[test]
    fn power_ups_expire_independently() {
        let mut schedule = PowerUpSchedule::default();
        let _ = schedule.activate(PowerUp::AltarsDisabled, 0, 5);
        let _ = schedule.activate(PowerUp::Railgun, 0, 2);

        assert_eq!(schedule.expire_due(3), vec![PowerUp::Railgun]);
        assert!(schedule.is_active(PowerUp::AltarsDisabled));
        assert_eq!(schedule.expire_due(6), vec![PowerUp::AltarsDisabled]);
    }
}
