//! Screen shake for observers near an impact.

use glam::Vec3;

use crate::host::WaveHost;

/// Observers farther than this from an impact are not shaken.
pub const SHAKE_RADIUS: f32 = 10.0;

/// Velocity perturbation applied to nearby observers on impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenShake {
    /// Strength at distance zero.
    pub intensity: f32,
}

impl ScreenShake {
    /// Create a shake with the given peak intensity.
    #[must_use]
    pub const fn new(intensity: f32) -> Self {
        Self { intensity }
    }

    /// Strength at `distance` from the impact, zero beyond [`SHAKE_RADIUS`].
    #[must_use]
    pub fn strength_at(&self, distance: f32) -> f32 {
        if distance > SHAKE_RADIUS {
            return 0.0;
        }
        self.intensity * (1.0 - distance / SHAKE_RADIUS)
    }

    /// Random impulse for an observer at `distance`, or `None` when out of
    /// range.
    pub fn impulse_for(&self, distance: f32, rng: &mut fastrand::Rng) -> Option<Vec3> {
        if distance > SHAKE_RADIUS {
            return None;
        }
        let s = self.strength_at(distance);
        Some(Vec3::new(
            (rng.f32() - 0.5) * s,
            (rng.f32() - 0.5) * s * 0.5,
            (rng.f32() - 0.5) * s,
        ))
    }

    /// Pushes every observer within range of `center`. Returns how many
    /// observers were shaken.
    pub fn apply(&self, host: &mut dyn WaveHost, center: Vec3, rng: &mut fastrand::Rng) -> usize {
        let mut shaken = 0;
        for observer in host.observers_near(center, SHAKE_RADIUS) {
            let Some(position) = host.position_of(observer) else {
                continue;
            };
            if let Some(impulse) = self.impulse_for(position.distance(center), rng) {
                host.push(observer, impulse);
                shaken += 1;
            }
        }
        shaken
    }
}
