//! Owner of every active cast.
//!
//! The director turns spell keys into running waves, steps them on the
//! host's tick, keeps the lingering clouds they leave behind, and collects
//! their events on one bus.

use ahash::AHashMap;
use empirewand_common::{CastError, EntityId, WaveId};
use glam::Vec3;
use tracing::{debug, info, warn};

use crate::events::{EventBus, WaveEvent};
use crate::host::WaveHost;
use crate::lingering::{LingeringCloud, LingeringField};
use crate::simulation::{WaveLaunch, WaveSimulation};
use crate::spellbook::SpellBook;

/// Runs casts from a [`SpellBook`].
#[derive(Debug)]
pub struct WaveDirector {
    spellbook: SpellBook,
    waves: Vec<WaveSimulation>,
    lingering: LingeringField,
    events: EventBus,
    seed: Option<u64>,
    casts: u64,
}

impl WaveDirector {
    /// Director over `spellbook` with a default-sized event bus.
    #[must_use]
    pub fn new(spellbook: SpellBook) -> Self {
        Self {
            spellbook,
            waves: Vec::new(),
            lingering: LingeringField::new(),
            events: EventBus::default(),
            seed: None,
            casts: 0,
        }
    }

    /// Seeds every cast for reproducible runs. Cast `n` uses `seed + n`.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Spell catalog.
    #[must_use]
    pub const fn spellbook(&self) -> &SpellBook {
        &self.spellbook
    }

    /// Casts the spell `key`.
    ///
    /// # Errors
    ///
    /// [`CastError::UnknownSpell`] when the key is not registered and
    /// [`CastError::Fizzled`] when the launch spawned nothing.
    pub fn cast(
        &mut self,
        host: &mut dyn WaveHost,
        key: &str,
        caster: EntityId,
        origin: Vec3,
        direction: Vec3,
    ) -> Result<WaveId, CastError> {
        let Some(spell) = self.spellbook.get(key) else {
            warn!("{caster} tried to cast unknown spell `{key}`");
            return Err(CastError::UnknownSpell(key.to_string()));
        };

        let mut launch = WaveLaunch::new(spell.config.clone()).events(self.events.sender());
        if let Some(seed) = self.seed {
            launch = launch.seed(seed.wrapping_add(self.casts));
        }
        self.casts += 1;

        let wave = launch.launch(host, caster, origin, direction);
        if !wave.is_active() {
            return Err(CastError::Fizzled(key.to_string()));
        }

        let id = wave.id();
        info!("{caster} cast {} as {id}", spell.name);
        self.waves.push(wave);
        Ok(id)
    }

    /// Steps every wave and cloud once, then drops finished waves.
    pub fn tick(&mut self, host: &mut dyn WaveHost) {
        for wave in &mut self.waves {
            wave.step(host);
            self.lingering.absorb(wave.take_lingering());
        }
        self.lingering.tick(host);
        self.retire_finished();
    }

    /// Stops one wave. Returns whether it was running.
    pub fn stop(&mut self, host: &mut dyn WaveHost, id: WaveId) -> bool {
        let Some(index) = self.waves.iter().position(|w| w.id() == id) else {
            return false;
        };
        let mut wave = self.waves.swap_remove(index);
        wave.stop(host);
        self.lingering.absorb(wave.take_lingering());
        debug!("Stopped {id}");
        true
    }

    /// Stops every wave cast by `caster`. Returns how many were stopped.
    pub fn stop_caster(&mut self, host: &mut dyn WaveHost, caster: EntityId) -> usize {
        let mut stopped = 0;
        for wave in self.waves.iter_mut().filter(|w| w.caster() == caster) {
            wave.stop(host);
            stopped += 1;
        }
        self.retire_finished();
        if stopped > 0 {
            debug!("Stopped {stopped} waves of {caster}");
        }
        stopped
    }

    /// Stops every wave and clears all lingering clouds.
    pub fn stop_all(&mut self, host: &mut dyn WaveHost) -> usize {
        let stopped = self.waves.len();
        for wave in &mut self.waves {
            wave.stop(host);
        }
        self.waves.clear();
        self.lingering.clear();
        stopped
    }

    fn retire_finished(&mut self) {
        for wave in self.waves.iter_mut().filter(|w| !w.is_active()) {
            self.lingering.absorb(wave.take_lingering());
        }
        self.waves.retain(WaveSimulation::is_active);
    }

    /// Waves still running.
    #[must_use]
    pub fn active_waves(&self) -> &[WaveSimulation] {
        &self.waves
    }

    /// Looks up a running wave.
    #[must_use]
    pub fn wave(&self, id: WaveId) -> Option<&WaveSimulation> {
        self.waves.iter().find(|w| w.id() == id)
    }

    /// Active waves per caster.
    #[must_use]
    pub fn waves_by_caster(&self) -> AHashMap<EntityId, usize> {
        let mut counts = AHashMap::new();
        for wave in &self.waves {
            *counts.entry(wave.caster()).or_insert(0) += 1;
        }
        counts
    }

    /// Clouds still pulsing.
    #[must_use]
    pub fn lingering_clouds(&self) -> &[LingeringCloud] {
        self.lingering.clouds()
    }

    /// Drains pending events.
    pub fn events(&self) -> Vec<WaveEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaWorld;
    use crate::host::ProxyRegistry;

    fn world_with_caster() -> (ArenaWorld, EntityId) {
        let mut world = ArenaWorld::new();
        let caster = world.spawn_entity(Vec3::ZERO, 20.0);
        (world, caster)
    }

    fn director() -> WaveDirector {
        WaveDirector::new(SpellBook::builtin()).with_seed(11)
    }

    #[test]
    fn test_cast_unknown_spell() {
        let (mut world, caster) = world_with_caster();
        let mut director = director();
        let err = director
            .cast(&mut world, "meteor", caster, Vec3::ZERO, Vec3::X)
            .unwrap_err();
        assert_eq!(err, CastError::UnknownSpell("meteor".to_string()));
        assert!(director.active_waves().is_empty());
    }

    #[test]
    fn test_cast_fizzles_for_dead_caster() {
        let (mut world, caster) = world_with_caster();
        world.kill(caster);
        let mut director = director();
        let err = director
            .cast(&mut world, "ice-wave", caster, Vec3::ZERO, Vec3::X)
            .unwrap_err();
        assert_eq!(err, CastError::Fizzled("ice-wave".to_string()));
    }

    #[test]
    fn test_cast_and_run_to_completion() {
        let (mut world, caster) = world_with_caster();
        let mut director = director();
        let id = director
            .cast(&mut world, "ice-wave", caster, Vec3::ZERO, Vec3::X)
            .expect("cast");

        assert_eq!(director.active_waves().len(), 1);
        assert_eq!(world.live_proxy_count(), 7);
        assert!(director.wave(id).is_some());

        for _ in 0..200 {
            director.tick(&mut world);
        }

        assert!(director.active_waves().is_empty());
        assert_eq!(world.live_proxy_count(), 0);

        let events = director.events();
        assert!(matches!(events.first(), Some(WaveEvent::Launched { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, WaveEvent::Finished { wave, .. } if *wave == id)));
    }

    #[test]
    fn test_stop_single_wave() {
        let (mut world, caster) = world_with_caster();
        let mut director = director();
        let first = director
            .cast(&mut world, "flame-wave", caster, Vec3::ZERO, Vec3::X)
            .expect("cast");
        director
            .cast(&mut world, "bloodwave", caster, Vec3::ZERO, Vec3::Z)
            .expect("cast");

        assert!(director.stop(&mut world, first));
        assert!(!director.stop(&mut world, first));
        assert_eq!(director.active_waves().len(), 1);
        assert_eq!(world.live_proxy_count(), 7);
    }

    #[test]
    fn test_stop_caster() {
        let (mut world, alice) = world_with_caster();
        let bob = world.spawn_entity(Vec3::new(0.0, 0.0, 40.0), 20.0);
        let mut director = director();
        director
            .cast(&mut world, "ice-wave", alice, Vec3::ZERO, Vec3::X)
            .expect("cast");
        director
            .cast(&mut world, "poison-wave", alice, Vec3::ZERO, Vec3::NEG_X)
            .expect("cast");
        director
            .cast(&mut world, "lightning-wave", bob, Vec3::new(0.0, 0.0, 40.0), Vec3::Z)
            .expect("cast");

        assert_eq!(director.waves_by_caster().get(&alice), Some(&2));
        assert_eq!(director.stop_caster(&mut world, alice), 2);
        assert_eq!(director.active_waves().len(), 1);
        assert_eq!(director.active_waves()[0].caster(), bob);
        assert_eq!(director.stop_caster(&mut world, alice), 0);
    }

    #[test]
    fn test_stop_all_clears_everything() {
        let (mut world, caster) = world_with_caster();
        world.spawn_entity(Vec3::new(2.0, 0.0, 0.0), 100.0);
        let mut director = director();
        director
            .cast(&mut world, "poison-wave", caster, Vec3::ZERO, Vec3::X)
            .expect("cast");
        director
            .cast(&mut world, "ice-wave", caster, Vec3::ZERO, Vec3::Z)
            .expect("cast");
        director.tick(&mut world);
        director.tick(&mut world);

        assert_eq!(director.stop_all(&mut world), 2);
        assert!(director.active_waves().is_empty());
        assert!(director.lingering_clouds().is_empty());
        assert_eq!(world.live_proxy_count(), 0);
        assert_eq!(director.stop_all(&mut world), 0);
    }

    #[test]
    fn test_poison_hit_leaves_cloud() {
        let (mut world, caster) = world_with_caster();
        world.spawn_entity(Vec3::new(2.0, 0.0, 0.0), 100.0);
        let mut director = director();
        director
            .cast(&mut world, "poison-wave", caster, Vec3::ZERO, Vec3::X)
            .expect("cast");

        for _ in 0..3 {
            director.tick(&mut world);
        }

        assert!(!director.lingering_clouds().is_empty());
        assert!(director
            .lingering_clouds()
            .iter()
            .all(|c| c.owner() == caster));
    }

    #[test]
    fn test_overridden_spell_is_cast() {
        let (mut world, caster) = world_with_caster();
        let book = SpellBook::from_toml_str("[spells.ice-wave]\nprojectile_count = 3")
            .expect("overrides");
        let mut director = WaveDirector::new(book);
        director
            .cast(&mut world, "ice-wave", caster, Vec3::ZERO, Vec3::X)
            .expect("cast");
        assert_eq!(director.active_waves()[0].active_projectile_count(), 3);
        assert_eq!(world.live_proxy_count(), 3);
        assert!(world.proxy_is_valid(director.active_waves()[0].agents()[0].proxy()));
    }
}
