//! Effect strategies.
//!
//! Every [`EffectType`] maps to an [`EffectStrategy`] that renders trails,
//! impacts and entity hits and applies the gameplay status effects of a
//! spell element. Strategies are stateless and shared; all per-cast state
//! they need is handed in through an [`EffectContext`].

use std::fmt;
use std::sync::Arc;

use empirewand_common::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::elements::{BloodWave, FlameWave, IceWave, LightningWave, PoisonWave};
use crate::host::{SoundCue, VisualBurst, VisualKind, WaveHost};
use crate::lingering::LingeringCloud;
use crate::screen_shake::ScreenShake;

/// Base particle count of a trail puff, before density scaling.
pub const TRAIL_PARTICLES: u32 = 3;
/// Base particle count of an impact, before density scaling.
pub const IMPACT_PARTICLES: u32 = 15;
/// Base particle count of an entity hit, before density scaling.
pub const ENTITY_HIT_PARTICLES: u32 = 8;
/// Impact sound volume.
pub const IMPACT_VOLUME: f32 = 0.8;
/// Impact sound pitch.
pub const IMPACT_PITCH: f32 = 1.2;

// ============================================================================
// Effect types
// ============================================================================

/// Spell element of a wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Life drain
    #[default]
    Blood,
    /// Damage over time with a lingering cloud
    Poison,
    /// Burning
    Flame,
    /// Freezing slow
    Ice,
    /// Chaining shock
    Lightning,
}

impl EffectType {
    /// All effect types.
    pub const ALL: [Self; 5] = [
        Self::Blood,
        Self::Poison,
        Self::Flame,
        Self::Ice,
        Self::Lightning,
    ];

    /// Returns the strategy implementing this effect type.
    #[must_use]
    pub fn strategy(self) -> Arc<dyn EffectStrategy> {
        match self {
            Self::Blood => Arc::new(BloodWave),
            Self::Poison => Arc::new(PoisonWave),
            Self::Flame => Arc::new(FlameWave),
            Self::Ice => Arc::new(IceWave),
            Self::Lightning => Arc::new(LightningWave),
        }
    }

    /// Returns the visual and audio signature of this effect type.
    #[must_use]
    pub fn profile(self) -> &'static EffectProfile {
        match self {
            Self::Blood => &BloodWave::PROFILE,
            Self::Poison => &PoisonWave::PROFILE,
            Self::Flame => &FlameWave::PROFILE,
            Self::Ice => &IceWave::PROFILE,
            Self::Lightning => &LightningWave::PROFILE,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blood => "blood",
            Self::Poison => "poison",
            Self::Flame => "flame",
            Self::Ice => "ice",
            Self::Lightning => "lightning",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Visual and audio signature of an effect type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectProfile {
    /// Main particle
    pub main: VisualKind,
    /// Trail particle
    pub trail: VisualKind,
    /// Impact particle
    pub impact: VisualKind,
    /// Sound played on launch
    pub launch_sound: SoundCue,
    /// Sound played on impact
    pub impact_sound: SoundCue,
    /// Primary tint
    pub primary_color: [f32; 3],
    /// Secondary tint
    pub secondary_color: [f32; 3],
}

// ============================================================================
// Particle recipes
// ============================================================================

/// How many particles a [`Layer`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerCount {
    /// Multiple of the density-scaled base count.
    Scaled(u32),
    /// Fixed count, unaffected by density.
    Fixed(u32),
}

/// One particle burst within a trail, impact or hit effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Particle kind
    pub kind: VisualKind,
    /// Particle count
    pub count: LayerCount,
    /// Per-axis spread
    pub spread: Vec3,
    /// Particle speed
    pub speed: f32,
    /// Vertical offset from the effect position
    pub lift: f32,
    /// Tint with the profile's primary colour
    pub tinted: bool,
}

impl Layer {
    /// Layer emitting `multiple` times the scaled base count.
    #[must_use]
    pub const fn scaled(kind: VisualKind, multiple: u32, spread: Vec3, speed: f32) -> Self {
        Self {
            kind,
            count: LayerCount::Scaled(multiple),
            spread,
            speed,
            lift: 0.0,
            tinted: false,
        }
    }

    /// Layer emitting a fixed count.
    #[must_use]
    pub const fn fixed(kind: VisualKind, count: u32, spread: Vec3, speed: f32) -> Self {
        Self {
            kind,
            count: LayerCount::Fixed(count),
            spread,
            speed,
            lift: 0.0,
            tinted: false,
        }
    }

    /// Raise the layer by `lift`.
    #[must_use]
    pub const fn lifted(mut self, lift: f32) -> Self {
        self.lift = lift;
        self
    }

    /// Tint the layer with the primary colour.
    #[must_use]
    pub const fn tinted(mut self) -> Self {
        self.tinted = true;
        self
    }

    /// Particle count for a given scaled base.
    #[must_use]
    pub const fn count_for(&self, scaled_base: u32) -> u32 {
        match self.count {
            LayerCount::Scaled(multiple) => scaled_base * multiple,
            LayerCount::Fixed(count) => count,
        }
    }
}

/// Particle layers of an effect type.
#[derive(Debug, Clone, Copy)]
pub struct EffectRecipe {
    /// Emitted at every live agent each step
    pub trail: &'static [Layer],
    /// Emitted where an agent impacts
    pub impact: &'static [Layer],
    /// Emitted at a hit entity
    pub entity_hit: &'static [Layer],
}

// ============================================================================
// Context
// ============================================================================

/// Per-cast state handed to effect strategies.
///
/// Effect sink failures are logged at `debug` and otherwise ignored.
pub struct EffectContext<'a> {
    /// Host capabilities
    pub host: &'a mut dyn WaveHost,
    /// Casting entity (may no longer be alive)
    pub caster: EntityId,
    /// Particle density multiplier
    pub density: f32,
    /// Cast-local randomness
    pub rng: &'a mut fastrand::Rng,
    /// Shake applied on impacts, if enabled
    pub shake: Option<ScreenShake>,
    lingering: &'a mut Vec<LingeringCloud>,
}

impl<'a> EffectContext<'a> {
    /// Create a context.
    pub fn new(
        host: &'a mut dyn WaveHost,
        caster: EntityId,
        density: f32,
        rng: &'a mut fastrand::Rng,
        lingering: &'a mut Vec<LingeringCloud>,
    ) -> Self {
        Self {
            host,
            caster,
            density,
            rng,
            shake: None,
            lingering,
        }
    }

    /// Shake observers on impacts.
    #[must_use]
    pub fn with_shake(mut self, shake: Option<ScreenShake>) -> Self {
        self.shake = shake;
        self
    }

    /// `base` scaled by the particle density, rounded down.
    #[must_use]
    pub fn scaled(&self, base: u32) -> u32 {
        (base as f32 * self.density) as u32
    }

    /// The caster, if still alive.
    #[must_use]
    pub fn live_caster(&self) -> Option<EntityId> {
        self.host.is_alive(self.caster).then_some(self.caster)
    }

    /// Plays a particle burst, ignoring sink failures.
    pub fn visual(&mut self, position: Vec3, burst: VisualBurst) {
        if let Err(e) = self.host.play_visual(position, &burst) {
            debug!("Visual {:?} dropped: {e}", burst.kind);
        }
    }

    /// Plays a sound, ignoring sink failures.
    pub fn audio(&mut self, position: Vec3, cue: SoundCue, volume: f32, pitch: f32) {
        if let Err(e) = self.host.play_audio(position, cue, volume, pitch) {
            debug!("Sound {cue:?} dropped: {e}");
        }
    }

    /// Plays each layer at `position` with `base` as the unscaled count.
    pub fn play_layers(&mut self, position: Vec3, base: u32, layers: &[Layer], tint: [f32; 3]) {
        let scaled = self.scaled(base);
        for layer in layers {
            let mut burst = VisualBurst::new(layer.kind, layer.count_for(scaled))
                .with_spread(layer.spread.x, layer.spread.y, layer.spread.z)
                .with_speed(layer.speed)
                .with_density(self.density);
            if layer.tinted {
                burst = burst.with_color(tint);
            }
            self.visual(position + Vec3::Y * layer.lift, burst);
        }
    }

    /// Hands a lingering cloud to the simulation's owner.
    pub fn emit_lingering(&mut self, cloud: LingeringCloud) {
        self.lingering.push(cloud);
    }

    /// Impact effect plus screen shake.
    pub fn impact(&mut self, effect: &dyn EffectStrategy, position: Vec3, target: Option<EntityId>) {
        effect.impact(self, position, target);
        self.shake_at(position);
    }

    /// Shakes observers around `position` if shake is enabled. Returns how
    /// many were shaken.
    pub fn shake_at(&mut self, position: Vec3) -> usize {
        match self.shake {
            Some(shake) => shake.apply(&mut *self.host, position, self.rng),
            None => 0,
        }
    }
}

impl fmt::Debug for EffectContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectContext")
            .field("caster", &self.caster)
            .field("density", &self.density)
            .field("shake", &self.shake)
            .field("pending_lingering", &self.lingering.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Strategy contract
// ============================================================================

/// Behaviour of one effect type.
pub trait EffectStrategy: Send + Sync + fmt::Debug {
    /// Visual and audio signature.
    fn profile(&self) -> &EffectProfile;

    /// Particle layers.
    fn recipe(&self) -> &EffectRecipe;

    /// Launch sound at the cast origin.
    fn launch(&self, ctx: &mut EffectContext<'_>, origin: Vec3) {
        ctx.audio(origin, self.profile().launch_sound, 1.0, 1.0);
    }

    /// Trail puff at a live agent.
    fn trail(&self, ctx: &mut EffectContext<'_>, position: Vec3) {
        let tint = self.profile().primary_color;
        ctx.play_layers(position, TRAIL_PARTICLES, self.recipe().trail, tint);
    }

    /// Impact burst and sound. `target` is `None` for distance expiry.
    fn impact(&self, ctx: &mut EffectContext<'_>, position: Vec3, _target: Option<EntityId>) {
        let profile = self.profile();
        ctx.play_layers(
            position,
            IMPACT_PARTICLES,
            self.recipe().impact,
            profile.primary_color,
        );
        ctx.audio(position, profile.impact_sound, IMPACT_VOLUME, IMPACT_PITCH);
    }

    /// Particles at a hit entity.
    fn entity_hit(&self, ctx: &mut EffectContext<'_>, target_position: Vec3) {
        let tint = self.profile().secondary_color;
        ctx.play_layers(
            target_position,
            ENTITY_HIT_PARTICLES,
            self.recipe().entity_hit,
            tint,
        );
    }

    /// Element-specific status effects on a hit target.
    fn apply_status(&self, ctx: &mut EffectContext<'_>, target: EntityId);
}
