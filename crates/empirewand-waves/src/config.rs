//! Wave tunables.
//!
//! A [`WaveConfig`] is fixed for the lifetime of one cast. Spell presets are
//! built from it with the `with_*` setters, and [`WaveOverrides`] carries a
//! partial set of fields read from TOML.

use serde::{Deserialize, Serialize};

use empirewand_common::{ConfigError, ConfigResult};

use crate::effect::EffectType;
use crate::formation::FormationKind;

/// Configuration of a single wave cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    // === Shape ===
    /// Formation pattern
    pub formation: FormationKind,
    /// Effect type
    pub effect: EffectType,
    /// Number of projectiles
    pub projectile_count: u32,

    // === Motion ===
    /// Distance per step
    pub speed: f32,
    /// Distance after which a projectile impacts on its own
    pub max_distance: f32,
    /// Upper bound on the number of steps the wave runs
    pub lifetime_ticks: u32,

    // === Combat ===
    /// Damage per hit
    pub damage: f32,
    /// Collision query radius
    pub hit_radius: f32,
    /// Whether projectiles continue after hitting
    pub pierce_entities: bool,
    /// Maximum hits per projectile when piercing
    pub max_pierces: u32,

    // === Presentation ===
    /// Particle count multiplier
    pub particle_density: f32,
    /// Shake nearby observers on impact
    pub screen_shake: bool,
    /// Shake strength at the impact point
    pub screen_shake_intensity: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            formation: FormationKind::Line,
            effect: EffectType::Blood,
            projectile_count: 5,

            speed: 1.0,
            max_distance: 20.0,
            lifetime_ticks: 100,

            damage: 6.0,
            hit_radius: 2.0,
            pierce_entities: false,
            max_pierces: 3,

            particle_density: 1.0,
            screen_shake: true,
            screen_shake_intensity: 0.5,
        }
    }
}

impl WaveConfig {
    /// Set the formation.
    #[must_use]
    pub const fn with_formation(mut self, formation: FormationKind) -> Self {
        self.formation = formation;
        self
    }

    /// Set the effect type.
    #[must_use]
    pub const fn with_effect(mut self, effect: EffectType) -> Self {
        self.effect = effect;
        self
    }

    /// Set the projectile count.
    #[must_use]
    pub const fn with_projectile_count(mut self, count: u32) -> Self {
        self.projectile_count = count;
        self
    }

    /// Set the speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the maximum travel distance.
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the lifetime bound.
    #[must_use]
    pub const fn with_lifetime_ticks(mut self, ticks: u32) -> Self {
        self.lifetime_ticks = ticks;
        self
    }

    /// Set damage per hit.
    #[must_use]
    pub const fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set the hit radius.
    #[must_use]
    pub const fn with_hit_radius(mut self, radius: f32) -> Self {
        self.hit_radius = radius;
        self
    }

    /// Enable piercing with the given budget.
    #[must_use]
    pub const fn with_piercing(mut self, max_pierces: u32) -> Self {
        self.pierce_entities = true;
        self.max_pierces = max_pierces;
        self
    }

    /// Set the particle density.
    #[must_use]
    pub const fn with_particle_density(mut self, density: f32) -> Self {
        self.particle_density = density;
        self
    }

    /// Enable screen shake with the given intensity.
    #[must_use]
    pub const fn with_screen_shake(mut self, intensity: f32) -> Self {
        self.screen_shake = true;
        self.screen_shake_intensity = intensity;
        self
    }

    /// Disable screen shake.
    #[must_use]
    pub const fn without_screen_shake(mut self) -> Self {
        self.screen_shake = false;
        self
    }

    /// Hits a projectile may take before it terminates.
    ///
    /// A piercing config with `max_pierces == 0` still allows one hit.
    #[must_use]
    pub fn pierce_budget(&self) -> u32 {
        if self.pierce_entities {
            self.max_pierces.max(1)
        } else {
            1
        }
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.projectile_count < 1 {
            return Err(invalid("projectile_count", "must be at least 1"));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(invalid("speed", "must be positive"));
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(invalid("max_distance", "must be positive"));
        }
        if self.lifetime_ticks < 1 {
            return Err(invalid("lifetime_ticks", "must be at least 1"));
        }
        if !self.damage.is_finite() || self.damage < 0.0 {
            return Err(invalid("damage", "must not be negative"));
        }
        if !self.hit_radius.is_finite() || self.hit_radius < 0.0 {
            return Err(invalid("hit_radius", "must not be negative"));
        }
        if !self.particle_density.is_finite() || self.particle_density < 0.0 {
            return Err(invalid("particle_density", "must not be negative"));
        }
        if !self.screen_shake_intensity.is_finite() || self.screen_shake_intensity < 0.0 {
            return Err(invalid("screen_shake_intensity", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

/// A partial [`WaveConfig`]; every present field replaces the preset's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveOverrides {
    /// Formation pattern
    pub formation: Option<FormationKind>,
    /// Effect type
    pub effect: Option<EffectType>,
    /// Number of projectiles
    pub projectile_count: Option<u32>,
    /// Distance per step
    pub speed: Option<f32>,
    /// Maximum travel distance
    pub max_distance: Option<f32>,
    /// Lifetime bound
    pub lifetime_ticks: Option<u32>,
    /// Damage per hit
    pub damage: Option<f32>,
    /// Collision radius
    pub hit_radius: Option<f32>,
    /// Piercing toggle
    pub pierce_entities: Option<bool>,
    /// Pierce budget
    pub max_pierces: Option<u32>,
    /// Particle density
    pub particle_density: Option<f32>,
    /// Screen shake toggle
    pub screen_shake: Option<bool>,
    /// Screen shake strength
    pub screen_shake_intensity: Option<f32>,
}

impl WaveOverrides {
    /// Applies the present fields on top of `base`.
    #[must_use]
    pub fn apply(&self, base: &WaveConfig) -> WaveConfig {
        let mut config = base.clone();
        if let Some(v) = self.formation {
            config.formation = v;
        }
        if let Some(v) = self.effect {
            config.effect = v;
        }
        if let Some(v) = self.projectile_count {
            config.projectile_count = v;
        }
        if let Some(v) = self.speed {
            config.speed = v;
        }
        if let Some(v) = self.max_distance {
            config.max_distance = v;
        }
        if let Some(v) = self.lifetime_ticks {
            config.lifetime_ticks = v;
        }
        if let Some(v) = self.damage {
            config.damage = v;
        }
        if let Some(v) = self.hit_radius {
            config.hit_radius = v;
        }
        if let Some(v) = self.pierce_entities {
            config.pierce_entities = v;
        }
        if let Some(v) = self.max_pierces {
            config.max_pierces = v;
        }
        if let Some(v) = self.particle_density {
            config.particle_density = v;
        }
        if let Some(v) = self.screen_shake {
            config.screen_shake = v;
        }
        if let Some(v) = self.screen_shake_intensity {
            config.screen_shake_intensity = v;
        }
        config
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WaveConfig::default();
        assert_eq!(config.formation, FormationKind::Line);
        assert_eq!(config.effect, EffectType::Blood);
        assert_eq!(config.projectile_count, 5);
        assert_eq!(config.max_distance, 20.0);
        assert_eq!(config.lifetime_ticks, 100);
        assert!(!config.pierce_entities);
        assert_eq!(config.max_pierces, 3);
        assert!(config.screen_shake);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pierce_budget() {
        assert_eq!(WaveConfig::default().pierce_budget(), 1);
        assert_eq!(WaveConfig::default().with_piercing(4).pierce_budget(), 4);
        assert_eq!(WaveConfig::default().with_piercing(0).pierce_budget(), 1);
    }

    #[test]
    fn test_validate_rejects() {
        let cases = [
            (WaveConfig::default().with_projectile_count(0), "projectile_count"),
            (WaveConfig::default().with_speed(0.0), "speed"),
            (WaveConfig::default().with_speed(f32::NAN), "speed"),
            (WaveConfig::default().with_max_distance(-1.0), "max_distance"),
            (WaveConfig::default().with_lifetime_ticks(0), "lifetime_ticks"),
            (WaveConfig::default().with_hit_radius(-0.5), "hit_radius"),
            (WaveConfig::default().with_particle_density(-1.0), "particle_density"),
            (WaveConfig::default().with_screen_shake(-0.1), "screen_shake_intensity"),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_overrides_from_toml() {
        let overrides: WaveOverrides = toml::from_str(
            r#"
            formation = "burst"
            projectile_count = 12
            screen_shake = false
            "#,
        )
        .expect("valid overrides");

        let config = overrides.apply(&WaveConfig::default());
        assert_eq!(config.formation, FormationKind::Burst);
        assert_eq!(config.projectile_count, 12);
        assert!(!config.screen_shake);
        // untouched fields keep the base value
        assert_eq!(config.speed, 1.0);
    }

    #[test]
    fn test_overrides_reject_unknown_field() {
        let parsed: Result<WaveOverrides, _> = toml::from_str("velocity = 3.0");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = WaveConfig::default()
            .with_formation(FormationKind::Spiral)
            .with_effect(EffectType::Lightning)
            .with_piercing(2);
        let text = toml::to_string_pretty(&config).expect("serialize");
        let back: WaveConfig = toml::from_str(&text).expect("deserialize");
        assert_eq!(back, config);
        assert!(WaveOverrides::default().is_empty());
    }
}
