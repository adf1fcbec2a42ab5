//! Host server capabilities consumed by the wave simulation.
//!
//! The simulation never owns world state. Everything it needs from the
//! server (spatial queries, damage, status effects, particles, sounds and
//! the proxy entities that visualise each projectile) goes through the
//! traits in this module. Any type implementing all of them is a
//! [`WaveHost`].

use empirewand_common::{EffectError, EntityId};
use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// Proxy handles
// ============================================================================

/// Handle to a host-side proxy entity that visualises one projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyHandle(u64);

impl ProxyHandle {
    /// Creates a handle from a raw host value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

// ============================================================================
// Status effects
// ============================================================================

/// Kind of timed status effect a spell can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Damage over time that can kill.
    Wither,
    /// Reduced melee damage.
    Weakness,
    /// Damage over time that cannot kill.
    Poison,
    /// Screen wobble.
    Nausea,
    /// Reduced movement speed.
    Slowness,
    /// Reduced dig speed.
    MiningFatigue,
    /// Outline visible through walls.
    Glowing,
}

/// A status effect with its duration and strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Effect kind.
    pub kind: StatusKind,
    /// Duration in ticks.
    pub duration_ticks: u32,
    /// Amplifier (0 = level I).
    pub amplifier: u8,
}

impl TimedEffect {
    /// Create a timed effect.
    #[must_use]
    pub const fn new(kind: StatusKind, duration_ticks: u32, amplifier: u8) -> Self {
        Self {
            kind,
            duration_ticks,
            amplifier,
        }
    }
}

// ============================================================================
// Visual and audio descriptors
// ============================================================================

/// Particle kinds the effect sink knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    /// Coloured dust mote.
    Dust,
    /// Slow falling red droplet.
    DrippingLava,
    /// White puff.
    Cloud,
    /// Green slime splat.
    Slime,
    /// Purple witch spark.
    Witch,
    /// Green sneeze puff.
    Sneeze,
    /// Small flame.
    Flame,
    /// Popping lava ember.
    Lava,
    /// Explosion flash.
    Explosion,
    /// Falling snowflake.
    Snowflake,
    /// Glowing rod spark.
    EndRod,
    /// Electric spark.
    ElectricSpark,
    /// Full-bright flash.
    Flash,
    /// Heart, used for healing feedback.
    Heart,
    /// Grey smoke.
    Smoke,
    /// Firework trail spark.
    FireworkSpark,
    /// Critical hit star.
    Crit,
    /// Enchanting glyph.
    Enchant,
    /// Green happy sparkle.
    Sparkle,
}

/// A burst of particles handed to the effect sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualBurst {
    /// Particle kind.
    pub kind: VisualKind,
    /// Number of particles (already scaled by density).
    pub count: u32,
    /// Random offset range per axis.
    pub spread: Vec3,
    /// Particle speed.
    pub speed: f32,
    /// Optional RGB tint.
    pub color: Option<[f32; 3]>,
    /// Density multiplier the count was scaled with.
    pub density: f32,
}

impl VisualBurst {
    /// Create a burst with no spread.
    #[must_use]
    pub const fn new(kind: VisualKind, count: u32) -> Self {
        Self {
            kind,
            count,
            spread: Vec3::ZERO,
            speed: 0.0,
            color: None,
            density: 1.0,
        }
    }

    /// Set per-axis spread.
    #[must_use]
    pub const fn with_spread(mut self, x: f32, y: f32, z: f32) -> Self {
        self.spread = Vec3::new(x, y, z);
        self
    }

    /// Set uniform spread.
    #[must_use]
    pub const fn with_uniform_spread(self, spread: f32) -> Self {
        self.with_spread(spread, spread, spread)
    }

    /// Set particle speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set tint.
    #[must_use]
    pub const fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }

    /// Record the density multiplier.
    #[must_use]
    pub const fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Sound cues played by wave spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Heavy bash (blood launch).
    IronDoorBash,
    /// Undead groan (blood impact).
    ZombieHurt,
    /// Chitter (poison launch).
    SpiderHurt,
    /// Potion throw (poison impact).
    WitchThrow,
    /// Fire whoosh (flame launch).
    BlazeShoot,
    /// Explosion (flame impact).
    Explosion,
    /// Glass shatter (ice launch).
    GlassBreak,
    /// Freezing hurt (ice impact).
    FreezeHurt,
    /// Thunder roll (lightning launch).
    Thunder,
    /// Lightning crack (lightning impact).
    LightningImpact,
}

// ============================================================================
// Capability traits
// ============================================================================

/// Read access to the host's spatial index.
pub trait SpatialQuery {
    /// Living entities within `radius` of `position`, in host order.
    fn living_entities_near(&self, position: Vec3, radius: f32) -> Vec<EntityId>;
    /// Current position of an entity, if it still exists.
    fn position_of(&self, entity: EntityId) -> Option<Vec3>;
    /// Whether the entity exists and is alive.
    fn is_alive(&self, entity: EntityId) -> bool;
    /// Players (screen observers) within `radius` of `position`.
    fn observers_near(&self, position: Vec3, radius: f32) -> Vec<EntityId>;
}

/// Gameplay mutations on living entities.
pub trait CombatSink {
    /// Apply damage, optionally attributed to another entity.
    fn damage(&mut self, target: EntityId, amount: f32, attributed_to: Option<EntityId>);
    /// Heal an entity, clamped to its maximum health by the host.
    fn heal(&mut self, target: EntityId, amount: f32);
    /// Apply a timed status effect.
    fn add_timed_effect(&mut self, target: EntityId, effect: TimedEffect);
    /// Set the entity on fire for `ticks`.
    fn ignite(&mut self, target: EntityId, ticks: u32);
    /// Add an impulse to the entity's velocity.
    fn push(&mut self, target: EntityId, impulse: Vec3);
}

/// Fire-and-forget particle and sound playback.
pub trait EffectSink {
    /// Spawn a particle burst.
    fn play_visual(&mut self, position: Vec3, burst: &VisualBurst) -> Result<(), EffectError>;
    /// Play a sound.
    fn play_audio(
        &mut self,
        position: Vec3,
        cue: SoundCue,
        volume: f32,
        pitch: f32,
    ) -> Result<(), EffectError>;
}

/// Spawning and moving projectile proxy entities.
pub trait ProxyRegistry {
    /// Spawn a proxy; `None` if the host refuses.
    fn spawn_proxy(&mut self, position: Vec3, direction: Vec3, owner: EntityId)
        -> Option<ProxyHandle>;
    /// Whether the proxy still exists.
    fn proxy_is_valid(&self, handle: ProxyHandle) -> bool;
    /// Current proxy position.
    fn proxy_position(&self, handle: ProxyHandle) -> Option<Vec3>;
    /// Move the proxy and set the velocity it should render with.
    fn move_proxy(&mut self, handle: ProxyHandle, position: Vec3, velocity: Vec3);
    /// Remove the proxy. Removing an already removed proxy is a no-op.
    fn destroy_proxy(&mut self, handle: ProxyHandle);
}

/// Best-effort terrain changes (may be ignored by protected regions).
pub trait TerrainEffects {
    /// Set flammable blocks around `center` alight.
    fn ignite_flammables(&mut self, center: Vec3, radius: f32);
    /// Place temporary ice that the host reverts after `revert_after_ticks`.
    fn place_temporary_ice(&mut self, center: Vec3, radius: f32, revert_after_ticks: u32);
}

/// Everything a wave simulation needs from the host.
pub trait WaveHost: SpatialQuery + CombatSink + EffectSink + ProxyRegistry + TerrainEffects {}

impl<T> WaveHost for T where
    T: SpatialQuery + CombatSink + EffectSink + ProxyRegistry + TerrainEffects + ?Sized
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_burst_builder() {
        let burst = VisualBurst::new(VisualKind::Flame, 6)
            .with_uniform_spread(0.3)
            .with_speed(0.01)
            .with_color([1.0, 0.5, 0.1]);

        assert_eq!(burst.count, 6);
        assert_eq!(burst.spread, Vec3::splat(0.3));
        assert_eq!(burst.color, Some([1.0, 0.5, 0.1]));
        assert_eq!(burst.density, 1.0);
    }

    #[test]
    fn test_proxy_handle_raw() {
        assert_eq!(ProxyHandle::from_raw(7).raw(), 7);
    }
}
