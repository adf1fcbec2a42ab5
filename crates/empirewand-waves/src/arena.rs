//! In-memory host.
//!
//! [`ArenaWorld`] implements every host capability over plain maps and
//! records everything the simulation asks of it. The engine's headless demo
//! and the crate's tests run against it.

use std::collections::BTreeMap;

use empirewand_common::{EffectError, EntityId};
use glam::Vec3;

use crate::collision::nearest_first;
use crate::host::{
    CombatSink, EffectSink, ProxyHandle, ProxyRegistry, SoundCue, SpatialQuery, TerrainEffects,
    TimedEffect, VisualBurst, VisualKind,
};

/// A damage call as received by the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRecord {
    /// Entity damaged
    pub target: EntityId,
    /// Amount requested
    pub amount: f32,
    /// Attributed source
    pub source: Option<EntityId>,
}

/// A sound as received by the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundRecord {
    /// Where it played
    pub position: Vec3,
    /// Cue
    pub cue: SoundCue,
    /// Volume
    pub volume: f32,
    /// Pitch
    pub pitch: f32,
}

#[derive(Debug, Clone)]
struct ArenaEntity {
    position: Vec3,
    health: f32,
    max_health: f32,
    alive: bool,
    observer: bool,
    fire_ticks: Option<u32>,
    effects: Vec<TimedEffect>,
    pushes: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy)]
struct ArenaProxy {
    position: Vec3,
    velocity: Vec3,
    owner: EntityId,
}

/// Host world kept entirely in memory.
#[derive(Debug, Default)]
pub struct ArenaWorld {
    entities: BTreeMap<EntityId, ArenaEntity>,
    proxies: BTreeMap<ProxyHandle, ArenaProxy>,
    next_proxy: u64,
    proxy_limit: Option<usize>,
    fail_effects: bool,

    damage_log: Vec<DamageRecord>,
    heals: Vec<(EntityId, f32)>,
    visuals: Vec<(Vec3, VisualBurst)>,
    sounds: Vec<SoundRecord>,
    ignited: Vec<(Vec3, f32)>,
    ice: Vec<(Vec3, f32, u32)>,
}

impl ArenaWorld {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Population ===

    /// Adds a living entity at full health.
    pub fn spawn_entity(&mut self, position: Vec3, max_health: f32) -> EntityId {
        self.insert(position, max_health, false)
    }

    /// Adds a player that observes screen shake.
    pub fn spawn_observer(&mut self, position: Vec3) -> EntityId {
        self.insert(position, 20.0, true)
    }

    fn insert(&mut self, position: Vec3, max_health: f32, observer: bool) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(
            id,
            ArenaEntity {
                position,
                health: max_health,
                max_health,
                alive: true,
                observer,
                fire_ticks: None,
                effects: Vec::new(),
                pushes: Vec::new(),
            },
        );
        id
    }

    /// Marks an entity dead.
    pub fn kill(&mut self, entity: EntityId) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.alive = false;
            e.health = 0.0;
        }
    }

    /// Sets current health, clamped to the entity's maximum.
    pub fn set_health(&mut self, entity: EntityId, health: f32) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.health = health.min(e.max_health);
        }
    }

    /// Limits how many proxies may exist at once (`None` = unlimited).
    pub fn set_proxy_limit(&mut self, limit: Option<usize>) {
        self.proxy_limit = limit;
    }

    /// Makes every visual and audio call fail.
    pub fn set_fail_effects(&mut self, fail: bool) {
        self.fail_effects = fail;
    }

    // === Inspection ===

    /// Current health.
    #[must_use]
    pub fn health_of(&self, entity: EntityId) -> Option<f32> {
        self.entities.get(&entity).map(|e| e.health)
    }

    /// Status effects applied to an entity, in order.
    #[must_use]
    pub fn effects_on(&self, entity: EntityId) -> &[TimedEffect] {
        self.entities
            .get(&entity)
            .map(|e| e.effects.as_slice())
            .unwrap_or_default()
    }

    /// Impulses pushed onto an entity, in order.
    #[must_use]
    pub fn pushes_on(&self, entity: EntityId) -> &[Vec3] {
        self.entities
            .get(&entity)
            .map(|e| e.pushes.as_slice())
            .unwrap_or_default()
    }

    /// Remaining burn duration set by the last ignite.
    #[must_use]
    pub fn fire_ticks(&self, entity: EntityId) -> Option<u32> {
        self.entities.get(&entity).and_then(|e| e.fire_ticks)
    }

    /// Every damage call.
    #[must_use]
    pub fn damage_log(&self) -> &[DamageRecord] {
        &self.damage_log
    }

    /// Every heal call.
    #[must_use]
    pub fn heals(&self) -> &[(EntityId, f32)] {
        &self.heals
    }

    /// Every particle burst played.
    #[must_use]
    pub fn visuals(&self) -> &[(Vec3, VisualBurst)] {
        &self.visuals
    }

    /// Number of bursts of `kind` played.
    #[must_use]
    pub fn visuals_of(&self, kind: VisualKind) -> usize {
        self.visuals.iter().filter(|(_, b)| b.kind == kind).count()
    }

    /// Every sound played.
    #[must_use]
    pub fn sounds(&self) -> &[SoundRecord] {
        &self.sounds
    }

    /// Number of times `cue` played.
    #[must_use]
    pub fn sound_count(&self, cue: SoundCue) -> usize {
        self.sounds.iter().filter(|s| s.cue == cue).count()
    }

    /// Areas set alight.
    #[must_use]
    pub fn ignited_areas(&self) -> &[(Vec3, f32)] {
        &self.ignited
    }

    /// Temporary ice placements.
    #[must_use]
    pub fn ice_patches(&self) -> &[(Vec3, f32, u32)] {
        &self.ice
    }

    /// Proxies currently alive.
    #[must_use]
    pub fn live_proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Owner and velocity of a live proxy.
    #[must_use]
    pub fn proxy_motion(&self, handle: ProxyHandle) -> Option<(EntityId, Vec3)> {
        self.proxies.get(&handle).map(|p| (p.owner, p.velocity))
    }

    /// Number of living entities.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.entities.values().filter(|e| e.alive).count()
    }

    fn check_effects(&self) -> Result<(), EffectError> {
        if self.fail_effects {
            return Err(EffectError::Unavailable("arena effects disabled".to_string()));
        }
        Ok(())
    }
}

impl SpatialQuery for ArenaWorld {
    fn living_entities_near(&self, position: Vec3, radius: f32) -> Vec<EntityId> {
        let candidates = self
            .entities
            .iter()
            .filter(|(_, e)| e.alive && e.position.distance(position) <= radius)
            .map(|(id, e)| (*id, e.position))
            .collect();
        nearest_first(position, candidates)
    }

    fn position_of(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|e| e.position)
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.alive)
    }

    fn observers_near(&self, position: Vec3, radius: f32) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.alive && e.observer && e.position.distance(position) <= radius)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl CombatSink for ArenaWorld {
    fn damage(&mut self, target: EntityId, amount: f32, attributed_to: Option<EntityId>) {
        self.damage_log.push(DamageRecord {
            target,
            amount,
            source: attributed_to,
        });
        if let Some(e) = self.entities.get_mut(&target) {
            e.health -= amount;
            if e.health <= 0.0 {
                e.health = 0.0;
                e.alive = false;
            }
        }
    }

    fn heal(&mut self, target: EntityId, amount: f32) {
        self.heals.push((target, amount));
        if let Some(e) = self.entities.get_mut(&target) {
            if e.alive {
                e.health = (e.health + amount).min(e.max_health);
            }
        }
    }

    fn add_timed_effect(&mut self, target: EntityId, effect: TimedEffect) {
        if let Some(e) = self.entities.get_mut(&target) {
            e.effects.push(effect);
        }
    }

    fn ignite(&mut self, target: EntityId, ticks: u32) {
        if let Some(e) = self.entities.get_mut(&target) {
            e.fire_ticks = Some(ticks);
        }
    }

    fn push(&mut self, target: EntityId, impulse: Vec3) {
        if let Some(e) = self.entities.get_mut(&target) {
            e.pushes.push(impulse);
        }
    }
}

impl EffectSink for ArenaWorld {
    fn play_visual(&mut self, position: Vec3, burst: &VisualBurst) -> Result<(), EffectError> {
        self.check_effects()?;
        self.visuals.push((position, *burst));
        Ok(())
    }

    fn play_audio(
        &mut self,
        position: Vec3,
        cue: SoundCue,
        volume: f32,
        pitch: f32,
    ) -> Result<(), EffectError> {
        self.check_effects()?;
        self.sounds.push(SoundRecord {
            position,
            cue,
            volume,
            pitch,
        });
        Ok(())
    }
}

impl ProxyRegistry for ArenaWorld {
    fn spawn_proxy(
        &mut self,
        position: Vec3,
        direction: Vec3,
        owner: EntityId,
    ) -> Option<ProxyHandle> {
        if self.proxy_limit.is_some_and(|limit| self.proxies.len() >= limit) {
            return None;
        }
        self.next_proxy += 1;
        let handle = ProxyHandle::from_raw(self.next_proxy);
        self.proxies.insert(
            handle,
            ArenaProxy {
                position,
                velocity: direction,
                owner,
            },
        );
        Some(handle)
    }

    fn proxy_is_valid(&self, handle: ProxyHandle) -> bool {
        self.proxies.contains_key(&handle)
    }

    fn proxy_position(&self, handle: ProxyHandle) -> Option<Vec3> {
        self.proxies.get(&handle).map(|p| p.position)
    }

    fn move_proxy(&mut self, handle: ProxyHandle, position: Vec3, velocity: Vec3) {
        if let Some(p) = self.proxies.get_mut(&handle) {
            p.position = position;
            p.velocity = velocity;
        }
    }

    fn destroy_proxy(&mut self, handle: ProxyHandle) {
        self.proxies.remove(&handle);
    }
}

impl TerrainEffects for ArenaWorld {
    fn ignite_flammables(&mut self, center: Vec3, radius: f32) {
        self.ignited.push((center, radius));
    }

    fn place_temporary_ice(&mut self, center: Vec3, radius: f32, revert_after_ticks: u32) {
        self.ice.push((center, radius, revert_after_ticks));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_nearest_first() {
        let mut world = ArenaWorld::new();
        let far = world.spawn_entity(Vec3::new(3.0, 0.0, 0.0), 20.0);
        let near = world.spawn_entity(Vec3::new(1.0, 0.0, 0.0), 20.0);
        let dead = world.spawn_entity(Vec3::new(0.5, 0.0, 0.0), 20.0);
        world.kill(dead);

        assert_eq!(world.living_entities_near(Vec3::ZERO, 5.0), vec![near, far]);
        assert_eq!(world.living_entities_near(Vec3::ZERO, 2.0), vec![near]);
        assert!(!world.is_alive(dead));
    }

    #[test]
    fn test_damage_kills() {
        let mut world = ArenaWorld::new();
        let e = world.spawn_entity(Vec3::ZERO, 5.0);
        world.damage(e, 3.0, None);
        assert_eq!(world.health_of(e), Some(2.0));
        world.damage(e, 3.0, None);
        assert!(!world.is_alive(e));
        assert_eq!(world.living_count(), 0);
    }

    #[test]
    fn test_heal_clamps() {
        let mut world = ArenaWorld::new();
        let e = world.spawn_entity(Vec3::ZERO, 20.0);
        world.set_health(e, 19.0);
        world.heal(e, 2.0);
        assert_eq!(world.health_of(e), Some(20.0));
        assert_eq!(world.heals().len(), 1);
    }

    #[test]
    fn test_proxy_lifecycle() {
        let mut world = ArenaWorld::new();
        let owner = world.spawn_entity(Vec3::ZERO, 20.0);
        let handle = world
            .spawn_proxy(Vec3::ZERO, Vec3::X, owner)
            .expect("unlimited");
        world.move_proxy(handle, Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        assert_eq!(world.proxy_position(handle), Some(Vec3::X));
        assert_eq!(world.proxy_motion(handle), Some((owner, Vec3::X)));

        world.destroy_proxy(handle);
        world.destroy_proxy(handle);
        assert!(!world.proxy_is_valid(handle));
    }

    #[test]
    fn test_failing_effects() {
        let mut world = ArenaWorld::new();
        world.set_fail_effects(true);
        let burst = VisualBurst::new(VisualKind::Flame, 1);
        assert!(world.play_visual(Vec3::ZERO, &burst).is_err());
        assert!(world
            .play_audio(Vec3::ZERO, SoundCue::Thunder, 1.0, 1.0)
            .is_err());
        assert!(world.visuals().is_empty());
    }
}
