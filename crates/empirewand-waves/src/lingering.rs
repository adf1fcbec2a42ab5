//! Lingering clouds left behind by poison hits.
//!
//! A cloud stays at a fixed point and pulses on a fixed schedule. Every
//! pulse shows particles; every fifth pulse poisons living entities inside
//! it, except the entity that created it.

use empirewand_common::EntityId;
use glam::Vec3;
use tracing::debug;

use crate::host::{StatusKind, TimedEffect, VisualBurst, VisualKind, WaveHost};

/// Cloud radius.
pub const CLOUD_RADIUS: f32 = 2.5;
/// Ticks between pulses (and before the first one).
pub const PULSE_INTERVAL: u32 = 4;
/// Total pulses before the cloud expires.
pub const PULSE_COUNT: u32 = 20;
/// Every this many pulses, entities inside are poisoned.
pub const POISON_EVERY: u32 = 5;
/// Status applied by a poisoning pulse.
pub const CLOUD_POISON: TimedEffect = TimedEffect::new(StatusKind::Poison, 40, 0);

/// A stationary pulsing area.
#[derive(Debug, Clone, PartialEq)]
pub struct LingeringCloud {
    center: Vec3,
    radius: f32,
    owner: EntityId,
    ticks_until_pulse: u32,
    pulses_done: u32,
}

impl LingeringCloud {
    /// A poison cloud at `center` owned by `owner`.
    #[must_use]
    pub const fn poison(center: Vec3, owner: EntityId) -> Self {
        Self {
            center,
            radius: CLOUD_RADIUS,
            owner,
            ticks_until_pulse: PULSE_INTERVAL,
            pulses_done: 0,
        }
    }

    /// Cloud centre.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Cloud radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Entity that created the cloud.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Pulses performed so far.
    #[must_use]
    pub const fn pulses_done(&self) -> u32 {
        self.pulses_done
    }

    /// Whether the cloud has pulsed for the last time.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.pulses_done >= PULSE_COUNT
    }

    /// Advances one tick. Returns the number of entities poisoned.
    pub fn tick(&mut self, host: &mut dyn WaveHost) -> usize {
        if self.is_expired() {
            return 0;
        }
        self.ticks_until_pulse = self.ticks_until_pulse.saturating_sub(1);
        if self.ticks_until_pulse > 0 {
            return 0;
        }
        self.ticks_until_pulse = PULSE_INTERVAL;
        self.pulses_done += 1;
        self.pulse(host)
    }

    fn pulse(&self, host: &mut dyn WaveHost) -> usize {
        let ambient = VisualBurst::new(VisualKind::Slime, 2)
            .with_spread(1.0, 0.5, 1.0)
            .with_speed(0.02);
        if let Err(e) = host.play_visual(self.center, &ambient) {
            debug!("Cloud particles dropped: {e}");
        }

        if self.pulses_done % POISON_EVERY != 0 {
            return 0;
        }

        let mut poisoned = 0;
        for entity in host.living_entities_near(self.center, self.radius) {
            if entity == self.owner {
                continue;
            }
            host.add_timed_effect(entity, CLOUD_POISON);
            if let Some(position) = host.position_of(entity) {
                let marker = VisualBurst::new(VisualKind::Sparkle, 2)
                    .with_spread(0.2, 0.3, 0.2);
                if let Err(e) = host.play_visual(position + Vec3::Y, &marker) {
                    debug!("Cloud marker dropped: {e}");
                }
            }
            poisoned += 1;
        }
        poisoned
    }
}

/// All live clouds.
#[derive(Debug, Default)]
pub struct LingeringField {
    clouds: Vec<LingeringCloud>,
}

impl LingeringField {
    /// Create an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds clouds.
    pub fn absorb(&mut self, clouds: impl IntoIterator<Item = LingeringCloud>) {
        self.clouds.extend(clouds);
    }

    /// Advances every cloud one tick and drops expired ones.
    pub fn tick(&mut self, host: &mut dyn WaveHost) -> usize {
        let mut poisoned = 0;
        for cloud in &mut self.clouds {
            poisoned += cloud.tick(host);
        }
        self.clouds.retain(|c| !c.is_expired());
        poisoned
    }

    /// Live clouds.
    #[must_use]
    pub fn clouds(&self) -> &[LingeringCloud] {
        &self.clouds
    }

    /// Number of live clouds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    /// Whether there are no clouds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    /// Removes every cloud.
    pub fn clear(&mut self) {
        self.clouds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaWorld;

    #[test]
    fn test_pulse_schedule() {
        let mut world = ArenaWorld::new();
        let owner = world.spawn_entity(Vec3::ZERO, 20.0);
        let victim = world.spawn_entity(Vec3::new(1.0, 0.0, 0.0), 20.0);
        let far = world.spawn_entity(Vec3::new(10.0, 0.0, 0.0), 20.0);

        let mut cloud = LingeringCloud::poison(Vec3::ZERO, owner);

        // first pulse on the fourth tick
        for _ in 0..3 {
            assert_eq!(cloud.tick(&mut world), 0);
        }
        assert_eq!(cloud.pulses_done(), 0);
        cloud.tick(&mut world);
        assert_eq!(cloud.pulses_done(), 1);

        let mut poisoned_on = Vec::new();
        let mut ticks = 4;
        while !cloud.is_expired() {
            ticks += 1;
            if cloud.tick(&mut world) > 0 {
                poisoned_on.push(cloud.pulses_done());
            }
        }

        assert_eq!(ticks, PULSE_INTERVAL * PULSE_COUNT);
        assert_eq!(poisoned_on, vec![5, 10, 15, 20]);
        assert_eq!(world.effects_on(victim).len(), 4);
        assert!(world.effects_on(owner).is_empty());
        assert!(world.effects_on(far).is_empty());
        assert_eq!(cloud.tick(&mut world), 0);
    }

    #[test]
    fn test_field_drops_expired() {
        let mut world = ArenaWorld::new();
        let owner = world.spawn_entity(Vec3::ZERO, 20.0);
        let mut field = LingeringField::new();
        field.absorb([LingeringCloud::poison(Vec3::ZERO, owner)]);
        assert_eq!(field.len(), 1);

        for _ in 0..PULSE_INTERVAL * PULSE_COUNT {
            field.tick(&mut world);
        }
        assert!(field.is_empty());
    }
}
