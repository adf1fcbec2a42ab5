//! # Empire Wand Waves
//!
//! Formation-based multi-projectile wave spells.
//!
//! This crate provides the simulation core behind the wave spell family:
//! - Formations that place and steer projectiles (line, arc, sine, spiral, burst, chevron)
//! - Projectile agents with travel distance, pierce budget and hit sets
//! - Collision resolution against living entities
//! - Elemental effects (blood, poison, flame, ice, lightning)
//! - Screen shake and lingering poison clouds
//! - Wave configuration with TOML overrides and a spell catalog
//! - A director that owns every active cast
//! - An event bus for observers
//!
//! The game world is reached only through the capability traits in
//! [`host`]. [`arena::ArenaWorld`] implements them in memory.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod arena;
pub mod collision;
pub mod config;
pub mod director;
pub mod effect;
pub mod elements;
pub mod events;
pub mod formation;
pub mod host;
pub mod lingering;
pub mod screen_shake;
pub mod simulation;
pub mod spellbook;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::{AgentId, AgentState, ProjectileAgent, Termination};
    pub use crate::arena::ArenaWorld;
    pub use crate::collision::{CollisionOutcome, CollisionResolver, Resolution};
    pub use crate::config::{WaveConfig, WaveOverrides};
    pub use crate::director::WaveDirector;
    pub use crate::effect::{EffectContext, EffectProfile, EffectStrategy, EffectType};
    pub use crate::elements::{BloodWave, FlameWave, IceWave, LightningWave, PoisonWave};
    pub use crate::events::{EventBus, WaveEvent};
    pub use crate::formation::{
        ArcFan, Burst, Chevron, FormationKind, FormationStrategy, Line, SineWave, SpawnPlacement,
        Spiral,
    };
    pub use crate::host::{
        CombatSink, EffectSink, ProxyHandle, ProxyRegistry, SoundCue, SpatialQuery, StatusKind,
        TerrainEffects, TimedEffect, VisualBurst, VisualKind, WaveHost,
    };
    pub use crate::lingering::{LingeringCloud, LingeringField};
    pub use crate::screen_shake::ScreenShake;
    pub use crate::simulation::{launch, WaveLaunch, WaveSimulation, WaveStats};
    pub use crate::spellbook::{SpellBook, SpellOverrides, WaveSpell};
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use empirewand_common::EntityId;
    use glam::Vec3;

    #[test]
    fn test_every_spell_runs_to_completion() {
        let book = SpellBook::builtin();
        for spell in book.iter() {
            let mut world = ArenaWorld::new();
            let caster = world.spawn_entity(Vec3::ZERO, 20.0);
            for i in 0..6 {
                world.spawn_entity(Vec3::new(4.0 + i as f32 * 3.0, 0.0, 0.0), 50.0);
            }

            let mut wave = WaveLaunch::new(spell.config.clone())
                .seed(5)
                .launch(&mut world, caster, Vec3::ZERO, Vec3::X);
            assert!(wave.is_active(), "{} did not launch", spell.key);

            let mut steps = 0;
            while wave.step(&mut world) {
                steps += 1;
            }
            assert!(steps < spell.config.lifetime_ticks, "{} overran", spell.key);
            assert_eq!(world.live_proxy_count(), 0, "{} leaked proxies", spell.key);
            assert!(wave.stats().hits > 0, "{} never hit", spell.key);
        }
    }

    #[test]
    fn test_custom_formation_plugs_in() {
        use std::sync::Arc;

        #[derive(Debug)]
        struct Stacked;

        impl FormationStrategy for Stacked {
            fn spawn(&self, index: usize, _count: usize, base: Vec3) -> SpawnPlacement {
                SpawnPlacement {
                    offset: Vec3::Y * index as f32,
                    direction: base,
                }
            }
        }

        let mut world = ArenaWorld::new();
        let caster = world.spawn_entity(Vec3::ZERO, 20.0);
        let wave = WaveLaunch::new(WaveConfig::default().with_projectile_count(4))
            .formation(Arc::new(Stacked))
            .launch(&mut world, caster, Vec3::ZERO, Vec3::X);

        let heights: Vec<f32> = wave.agents().iter().map(|a| a.position().y).collect();
        assert_eq!(heights, vec![0.0, 1.0, 2.0, 3.0]);
        assert_ne!(wave.caster(), EntityId::NULL);
    }
}
