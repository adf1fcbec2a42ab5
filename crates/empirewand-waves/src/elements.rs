//! The five wave elements.

use empirewand_common::EntityId;
use glam::Vec3;

use crate::effect::{EffectContext, EffectProfile, EffectRecipe, EffectStrategy, Layer};
use crate::host::{SoundCue, StatusKind, TimedEffect, VisualBurst, VisualKind};
use crate::lingering::LingeringCloud;

const fn cube(v: f32) -> Vec3 {
    Vec3::new(v, v, v)
}

const fn tall(xz: f32, y: f32) -> Vec3 {
    Vec3::new(xz, y, xz)
}

/// Applies each effect in `effects` to `target`.
fn apply_all(ctx: &mut EffectContext<'_>, target: EntityId, effects: &[TimedEffect]) {
    for effect in effects {
        ctx.host.add_timed_effect(target, *effect);
    }
}

// ============================================================================
// Blood
// ============================================================================

/// Life drain: withers the target and heals the caster.
#[derive(Debug, Clone, Copy, Default)]
pub struct BloodWave;

impl BloodWave {
    /// Health returned to the caster per hit.
    pub const HEAL: f32 = 2.0;
    /// Status effects applied on hit.
    pub const STATUS: [TimedEffect; 2] = [
        TimedEffect::new(StatusKind::Wither, 100, 0),
        TimedEffect::new(StatusKind::Weakness, 120, 0),
    ];
    /// Visual and audio signature.
    pub const PROFILE: EffectProfile = EffectProfile {
        main: VisualKind::Dust,
        trail: VisualKind::DrippingLava,
        impact: VisualKind::Cloud,
        launch_sound: SoundCue::IronDoorBash,
        impact_sound: SoundCue::ZombieHurt,
        primary_color: [0.8, 0.1, 0.1],
        secondary_color: [0.6, 0.0, 0.0],
    };
    const RECIPE: EffectRecipe = EffectRecipe {
        trail: &[
            Layer::scaled(VisualKind::DrippingLava, 1, cube(0.1), 0.0),
            Layer::fixed(VisualKind::Cloud, 1, cube(0.2), 0.02),
        ],
        impact: &[
            Layer::scaled(VisualKind::Cloud, 1, cube(0.5), 0.2),
            Layer::scaled(VisualKind::Dust, 2, cube(0.8), 0.1).tinted(),
            Layer::fixed(VisualKind::DrippingLava, 8, cube(0.3), 0.0),
        ],
        entity_hit: &[
            Layer::scaled(VisualKind::Dust, 1, tall(0.3, 0.5), 0.2)
                .lifted(1.0)
                .tinted(),
            Layer::fixed(VisualKind::DrippingLava, 4, cube(0.2), 0.0).lifted(0.5),
        ],
    };
}

impl EffectStrategy for BloodWave {
    fn profile(&self) -> &EffectProfile {
        &Self::PROFILE
    }

    fn recipe(&self) -> &EffectRecipe {
        &Self::RECIPE
    }

    fn apply_status(&self, ctx: &mut EffectContext<'_>, target: EntityId) {
        apply_all(ctx, target, &Self::STATUS);

        let Some(caster) = ctx.live_caster() else {
            return;
        };
        ctx.host.heal(caster, Self::HEAL);
        if let Some(position) = ctx.host.position_of(caster) {
            ctx.visual(
                position + Vec3::Y,
                VisualBurst::new(VisualKind::Heart, 3).with_uniform_spread(0.3),
            );
        }
    }
}

// ============================================================================
// Poison
// ============================================================================

/// Layered poison that leaves a lingering cloud.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoisonWave;

impl PoisonWave {
    /// Status effects applied on hit.
    pub const STATUS: [TimedEffect; 3] = [
        TimedEffect::new(StatusKind::Poison, 140, 1),
        TimedEffect::new(StatusKind::Nausea, 100, 0),
        TimedEffect::new(StatusKind::Weakness, 160, 0),
    ];
    /// Visual and audio signature.
    pub const PROFILE: EffectProfile = EffectProfile {
        main: VisualKind::Slime,
        trail: VisualKind::Witch,
        impact: VisualKind::Sneeze,
        launch_sound: SoundCue::SpiderHurt,
        impact_sound: SoundCue::WitchThrow,
        primary_color: [0.2, 0.8, 0.1],
        secondary_color: [0.1, 0.6, 0.0],
    };
    const RECIPE: EffectRecipe = EffectRecipe {
        trail: &[
            Layer::scaled(VisualKind::Witch, 1, cube(0.15), 0.0),
            Layer::fixed(VisualKind::Slime, 1, cube(0.1), 0.0),
        ],
        impact: &[
            Layer::scaled(VisualKind::Sneeze, 1, cube(0.6), 0.1),
            Layer::scaled(VisualKind::Slime, 1, cube(0.7), 0.2),
            Layer::fixed(VisualKind::Witch, 10, cube(0.5), 0.0),
        ],
        entity_hit: &[
            Layer::scaled(VisualKind::Slime, 1, tall(0.4, 0.6), 0.1).lifted(1.0),
            Layer::fixed(VisualKind::Sneeze, 6, cube(0.3), 0.0).lifted(0.5),
        ],
    };
}

impl EffectStrategy for PoisonWave {
    fn profile(&self) -> &EffectProfile {
        &Self::PROFILE
    }

    fn recipe(&self) -> &EffectRecipe {
        &Self::RECIPE
    }

    fn apply_status(&self, ctx: &mut EffectContext<'_>, target: EntityId) {
        apply_all(ctx, target, &Self::STATUS);
        if let Some(position) = ctx.host.position_of(target) {
            let owner = ctx.caster;
            ctx.emit_lingering(LingeringCloud::poison(position, owner));
        }
    }
}

// ============================================================================
// Flame
// ============================================================================

/// Sets targets and their surroundings alight.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlameWave;

impl FlameWave {
    /// Burn duration.
    pub const FIRE_TICKS: u32 = 100;
    /// Radius of surrounding ignition.
    pub const IGNITE_RADIUS: f32 = 2.0;
    /// Status effects applied on hit.
    pub const STATUS: [TimedEffect; 1] = [TimedEffect::new(StatusKind::Slowness, 80, 0)];
    /// Visual and audio signature.
    pub const PROFILE: EffectProfile = EffectProfile {
        main: VisualKind::Flame,
        trail: VisualKind::Lava,
        impact: VisualKind::Explosion,
        launch_sound: SoundCue::BlazeShoot,
        impact_sound: SoundCue::Explosion,
        primary_color: [1.0, 0.5, 0.1],
        secondary_color: [1.0, 0.8, 0.0],
    };
    const RECIPE: EffectRecipe = EffectRecipe {
        trail: &[
            Layer::scaled(VisualKind::Lava, 1, cube(0.1), 0.0),
            Layer::fixed(VisualKind::Lava, 1, cube(0.2), 0.0),
            Layer::fixed(VisualKind::Flame, 2, cube(0.3), 0.01),
        ],
        impact: &[
            Layer::fixed(VisualKind::Explosion, 1, Vec3::ZERO, 0.0),
            Layer::scaled(VisualKind::Flame, 2, cube(0.8), 0.3),
            Layer::scaled(VisualKind::Lava, 1, cube(1.0), 0.0),
            Layer::fixed(VisualKind::Smoke, 8, cube(0.5), 0.1),
        ],
        entity_hit: &[
            Layer::scaled(VisualKind::Flame, 1, tall(0.3, 0.6), 0.2).lifted(1.0),
            Layer::fixed(VisualKind::Smoke, 4, tall(0.2, 0.4), 0.05).lifted(0.5),
        ],
    };
}

impl EffectStrategy for FlameWave {
    fn profile(&self) -> &EffectProfile {
        &Self::PROFILE
    }

    fn recipe(&self) -> &EffectRecipe {
        &Self::RECIPE
    }

    fn apply_status(&self, ctx: &mut EffectContext<'_>, target: EntityId) {
        ctx.host.ignite(target, Self::FIRE_TICKS);
        apply_all(ctx, target, &Self::STATUS);
        if let Some(position) = ctx.host.position_of(target) {
            ctx.host.ignite_flammables(position, Self::IGNITE_RADIUS);
        }
    }
}

// ============================================================================
// Ice
// ============================================================================

/// Heavy slows and a short-lived ice patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct IceWave;

impl IceWave {
    /// Radius of the temporary ice.
    pub const ICE_RADIUS: f32 = 1.0;
    /// Ticks before the ice reverts.
    pub const ICE_TICKS: u32 = 100;
    /// Status effects applied on hit.
    pub const STATUS: [TimedEffect; 3] = [
        TimedEffect::new(StatusKind::Slowness, 160, 2),
        TimedEffect::new(StatusKind::MiningFatigue, 120, 1),
        TimedEffect::new(StatusKind::Weakness, 100, 0),
    ];
    /// Visual and audio signature.
    pub const PROFILE: EffectProfile = EffectProfile {
        main: VisualKind::Snowflake,
        trail: VisualKind::Cloud,
        impact: VisualKind::Snowflake,
        launch_sound: SoundCue::GlassBreak,
        impact_sound: SoundCue::FreezeHurt,
        primary_color: [0.7, 0.9, 1.0],
        secondary_color: [0.9, 0.9, 1.0],
    };
    const RECIPE: EffectRecipe = EffectRecipe {
        trail: &[
            Layer::scaled(VisualKind::Cloud, 1, cube(0.2), 0.02),
            Layer::fixed(VisualKind::Snowflake, 2, cube(0.3), 0.0),
        ],
        impact: &[
            Layer::scaled(VisualKind::Snowflake, 2, cube(0.7), 0.2),
            Layer::scaled(VisualKind::Snowflake, 1, cube(0.5), 0.1),
            Layer::fixed(VisualKind::Cloud, 6, cube(0.4), 0.02),
        ],
        entity_hit: &[
            Layer::scaled(VisualKind::Snowflake, 1, tall(0.4, 0.6), 0.1).lifted(1.0),
            Layer::fixed(VisualKind::Cloud, 3, cube(0.3), 0.02).lifted(0.5),
        ],
    };
}

impl EffectStrategy for IceWave {
    fn profile(&self) -> &EffectProfile {
        &Self::PROFILE
    }

    fn recipe(&self) -> &EffectRecipe {
        &Self::RECIPE
    }

    fn apply_status(&self, ctx: &mut EffectContext<'_>, target: EntityId) {
        apply_all(ctx, target, &Self::STATUS);
        if let Some(position) = ctx.host.position_of(target) {
            ctx.host
                .place_temporary_ice(position, Self::ICE_RADIUS, Self::ICE_TICKS);
        }
    }
}

// ============================================================================
// Lightning
// ============================================================================

/// Shock that arcs to nearby entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningWave;

impl LightningWave {
    /// Chain search radius around the hit target.
    pub const CHAIN_RADIUS: f32 = 5.0;
    /// Maximum chain targets per hit.
    pub const MAX_CHAIN: usize = 3;
    /// Damage per chain target.
    pub const CHAIN_DAMAGE: f32 = 3.0;
    /// Distance between arc particles.
    pub const ARC_STEP: f32 = 0.3;
    /// Status effects applied on hit.
    pub const STATUS: [TimedEffect; 2] = [
        TimedEffect::new(StatusKind::Glowing, 120, 0),
        TimedEffect::new(StatusKind::Slowness, 60, 1),
    ];
    /// Status applied to chain targets.
    pub const CHAIN_STATUS: TimedEffect = TimedEffect::new(StatusKind::Glowing, 60, 0);
    /// Visual and audio signature.
    pub const PROFILE: EffectProfile = EffectProfile {
        main: VisualKind::EndRod,
        trail: VisualKind::ElectricSpark,
        impact: VisualKind::Flash,
        launch_sound: SoundCue::Thunder,
        impact_sound: SoundCue::LightningImpact,
        primary_color: [0.8, 0.8, 1.0],
        secondary_color: [1.0, 1.0, 0.8],
    };
    const RECIPE: EffectRecipe = EffectRecipe {
        trail: &[
            Layer::scaled(VisualKind::ElectricSpark, 1, cube(0.1), 0.1),
            Layer::fixed(VisualKind::EndRod, 1, cube(0.2), 0.05),
        ],
        impact: &[
            Layer::fixed(VisualKind::Flash, 1, Vec3::ZERO, 0.0),
            Layer::scaled(VisualKind::ElectricSpark, 2, cube(0.8), 0.3),
            Layer::scaled(VisualKind::EndRod, 1, cube(0.6), 0.2),
        ],
        entity_hit: &[
            Layer::scaled(VisualKind::ElectricSpark, 1, tall(0.4, 0.6), 0.3).lifted(1.0),
            Layer::fixed(VisualKind::EndRod, 3, tall(0.2, 0.4), 0.1).lifted(0.5),
        ],
    };

    /// Chains from `target` to nearby living entities. Returns the chain
    /// targets in the order they were struck.
    pub fn chain(ctx: &mut EffectContext<'_>, target: EntityId) -> Vec<EntityId> {
        let Some(origin) = ctx.host.position_of(target) else {
            return Vec::new();
        };
        let caster = ctx.caster;
        let attributed = ctx.live_caster();

        let struck: Vec<EntityId> = ctx
            .host
            .living_entities_near(origin, Self::CHAIN_RADIUS)
            .into_iter()
            .filter(|&e| e != target && e != caster)
            .take(Self::MAX_CHAIN)
            .collect();

        for &next in &struck {
            if let Some(to) = ctx.host.position_of(next) {
                Self::draw_arc(ctx, origin, to);
            }
            ctx.host.damage(next, Self::CHAIN_DAMAGE, attributed);
            ctx.host.add_timed_effect(next, Self::CHAIN_STATUS);
        }
        struck
    }

    /// Jittered spark line from `from` to `to`. Returns the particle count.
    pub fn draw_arc(ctx: &mut EffectContext<'_>, from: Vec3, to: Vec3) -> usize {
        let delta = to - from;
        let length = delta.length();
        let direction = delta.normalize_or_zero();

        let mut placed = 0;
        let mut along = 0.0;
        while along < length {
            let jitter = Vec3::new(
                (ctx.rng.f32() - 0.5) * Self::ARC_STEP,
                (ctx.rng.f32() - 0.5) * Self::ARC_STEP,
                (ctx.rng.f32() - 0.5) * Self::ARC_STEP,
            );
            ctx.visual(
                from + direction * along + jitter,
                VisualBurst::new(VisualKind::ElectricSpark, 1).with_speed(0.1),
            );
            placed += 1;
            along += Self::ARC_STEP;
        }
        placed
    }
}

impl EffectStrategy for LightningWave {
    fn profile(&self) -> &EffectProfile {
        &Self::PROFILE
    }

    fn recipe(&self) -> &EffectRecipe {
        &Self::RECIPE
    }

    fn apply_status(&self, ctx: &mut EffectContext<'_>, target: EntityId) {
        apply_all(ctx, target, &Self::STATUS);
        Self::chain(ctx, target);
    }
}
