//! Wave simulation.
//!
//! A [`WaveSimulation`] owns the agents of one cast and advances them one
//! fixed step at a time. Each step, for every live agent:
//!
//! 1. a proxy removed by the host drops the agent silently;
//! 2. travel distance grows by `speed`;
//! 3. reaching `max_distance` plays a target-less impact and terminates;
//! 4. otherwise the formation's velocity moves the agent and its proxy;
//! 5. collisions are resolved, possibly terminating the agent;
//! 6. survivors leave a trail.
//!
//! The wave ends when no agent is left or after `lifetime_ticks` steps,
//! whichever comes first.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Sender;
use empirewand_common::{EntityId, WaveId};
use glam::Vec3;
use tracing::{debug, info, warn};

use crate::agent::{AgentId, ProjectileAgent, Termination};
use crate::collision::{CollisionOutcome, CollisionResolver};
use crate::config::WaveConfig;
use crate::effect::{EffectContext, EffectStrategy};
use crate::events::WaveEvent;
use crate::formation::{formation_phase, FormationStrategy};
use crate::host::WaveHost;
use crate::lingering::LingeringCloud;
use crate::screen_shake::ScreenShake;

/// Counters for one wave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveStats {
    /// Agents spawned
    pub spawned: u32,
    /// Entities hit
    pub hits: u32,
    /// Impact effects played
    pub impacts: u32,
    /// Agents dropped because their proxy vanished
    pub dropped: u32,
}

impl WaveStats {
    /// Counts a terminated agent as an impact or a drop.
    pub fn record_termination(&mut self, reason: Termination) {
        if reason.has_impact() {
            self.impacts += 1;
        } else if reason == Termination::ProxyLost {
            self.dropped += 1;
        }
    }
}

// ============================================================================
// Launch builder
// ============================================================================

/// Builder for a wave launch.
///
/// Formation and effect default to the config's kinds; custom strategies
/// can be plugged in instead.
pub struct WaveLaunch {
    config: WaveConfig,
    formation: Option<Arc<dyn FormationStrategy>>,
    effect: Option<Arc<dyn EffectStrategy>>,
    seed: Option<u64>,
    events: Option<Sender<WaveEvent>>,
}

impl WaveLaunch {
    /// Start a launch with `config`.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            formation: None,
            effect: None,
            seed: None,
            events: None,
        }
    }

    /// Use a custom formation strategy.
    #[must_use]
    pub fn formation(mut self, formation: Arc<dyn FormationStrategy>) -> Self {
        self.formation = Some(formation);
        self
    }

    /// Use a custom effect strategy.
    #[must_use]
    pub fn effect(mut self, effect: Arc<dyn EffectStrategy>) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Seed the wave's random source.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Publish events to `sender`.
    #[must_use]
    pub fn events(mut self, sender: Sender<WaveEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Spawns the wave. Invalid input yields an inactive simulation.
    pub fn launch(
        self,
        host: &mut dyn WaveHost,
        caster: EntityId,
        origin: Vec3,
        direction: Vec3,
    ) -> WaveSimulation {
        let formation = self
            .formation
            .unwrap_or_else(|| self.config.formation.strategy());
        let effect = self.effect.unwrap_or_else(|| self.config.effect.strategy());
        let rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut sim = WaveSimulation {
            id: WaveId::next(),
            caster,
            origin,
            resolver: CollisionResolver::from_config(&self.config),
            shake: self
                .config
                .screen_shake
                .then(|| ScreenShake::new(self.config.screen_shake_intensity)),
            config: self.config,
            formation,
            effect,
            agents: Vec::new(),
            tick: 0,
            active: false,
            rng,
            lingering: Vec::new(),
            events: self.events,
            stats: WaveStats::default(),
        };

        if let Err(reason) = sim.spawn_agents(host, direction) {
            warn!("Wave {} not launched: {reason}", sim.id);
            return sim;
        }

        sim.active = true;
        let mut ctx = EffectContext::new(
            host,
            sim.caster,
            sim.config.particle_density,
            &mut sim.rng,
            &mut sim.lingering,
        );
        sim.effect.launch(&mut ctx, origin);

        info!(
            "Wave {} launched by {caster}: {} x {} {}",
            sim.id,
            sim.agents.len(),
            sim.config.effect,
            sim.config.formation
        );
        sim.publish(WaveEvent::Launched {
            wave: sim.id,
            caster,
            formation: sim.config.formation,
            effect: sim.config.effect,
            projectiles: sim.agents.len(),
        });
        sim
    }
}

impl fmt::Debug for WaveLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaveLaunch")
            .field("config", &self.config)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Launches a wave with the config's own formation and effect.
pub fn launch(
    host: &mut dyn WaveHost,
    caster: EntityId,
    origin: Vec3,
    direction: Vec3,
    config: WaveConfig,
) -> WaveSimulation {
    WaveLaunch::new(config).launch(host, caster, origin, direction)
}

// ============================================================================
// Simulation
// ============================================================================

/// One running (or finished) wave.
pub struct WaveSimulation {
    id: WaveId,
    /// Held by id only; liveness is checked through the host at each use.
    caster: EntityId,
    origin: Vec3,
    config: WaveConfig,
    formation: Arc<dyn FormationStrategy>,
    effect: Arc<dyn EffectStrategy>,
    resolver: CollisionResolver,
    agents: Vec<ProjectileAgent>,
    tick: u32,
    active: bool,
    rng: fastrand::Rng,
    shake: Option<ScreenShake>,
    lingering: Vec<LingeringCloud>,
    events: Option<Sender<WaveEvent>>,
    stats: WaveStats,
}

impl WaveSimulation {
    fn spawn_agents(&mut self, host: &mut dyn WaveHost, direction: Vec3) -> Result<(), String> {
        self.config.validate().map_err(|e| e.to_string())?;
        if !host.is_alive(self.caster) {
            return Err(format!("caster {} is not alive", self.caster));
        }
        if !self.origin.is_finite() {
            return Err("origin is not finite".to_string());
        }
        let base = direction.normalize_or_zero();
        if base == Vec3::ZERO || !base.is_finite() {
            return Err("direction is zero".to_string());
        }

        let count = self.config.projectile_count as usize;
        for index in 0..count {
            let placement = self.formation.spawn(index, count, base);
            let heading = placement.direction.try_normalize().unwrap_or(base);
            let position = self.origin + placement.offset;

            let Some(proxy) = host.spawn_proxy(position, heading, self.caster) else {
                debug!("Wave {}: host refused proxy {index}", self.id);
                continue;
            };
            self.agents.push(ProjectileAgent::new(
                AgentId(index as u32),
                proxy,
                position,
                heading,
                formation_phase(index, count),
            ));
        }

        self.stats.spawned = self.agents.len() as u32;
        if self.agents.is_empty() {
            return Err("no proxy could be spawned".to_string());
        }
        Ok(())
    }

    /// Advances one step. Returns whether the wave is still active.
    pub fn step(&mut self, host: &mut dyn WaveHost) -> bool {
        if !self.active {
            return false;
        }

        let speed = self.config.speed;
        let max_distance = self.config.max_distance;
        let mut outbox = Vec::new();
        let mut ctx = EffectContext::new(
            host,
            self.caster,
            self.config.particle_density,
            &mut self.rng,
            &mut self.lingering,
        )
        .with_shake(self.shake);

        for agent in self.agents.iter_mut().filter(|a| a.is_live()) {
            if !ctx.host.proxy_is_valid(agent.proxy()) {
                debug!("Wave {}: {} lost its proxy", self.id, agent.id());
                agent.terminate(Termination::ProxyLost);
                self.stats.record_termination(Termination::ProxyLost);
                outbox.push(terminated(self.id, agent));
                continue;
            }

            if agent.advance(speed) >= max_distance {
                ctx.impact(self.effect.as_ref(), agent.position(), None);
                ctx.host.destroy_proxy(agent.proxy());
                agent.terminate(Termination::MaxDistance);
                self.stats.record_termination(Termination::MaxDistance);
                outbox.push(terminated(self.id, agent));
                continue;
            }

            let velocity = self.formation.velocity(agent, speed);
            let position = agent.position() + velocity;
            agent.move_to(position);
            ctx.host.move_proxy(agent.proxy(), position, velocity);

            let resolution = self.resolver.resolve(
                agent,
                &mut ctx,
                self.effect.as_ref(),
                self.formation.as_ref(),
            );
            for target in resolution.hits {
                self.stats.hits += 1;
                outbox.push(WaveEvent::TargetHit {
                    wave: self.id,
                    agent: agent.id(),
                    target,
                    damage: self.resolver.damage(),
                });
            }
            if resolution.outcome == CollisionOutcome::Terminate {
                self.stats.record_termination(Termination::TargetHit);
                outbox.push(terminated(self.id, agent));
                continue;
            }

            self.effect.trail(&mut ctx, agent.position());
        }
        drop(ctx);

        self.agents.retain(ProjectileAgent::is_live);
        self.tick += 1;

        for event in outbox {
            self.publish(event);
        }

        if self.agents.is_empty() {
            self.finish();
        } else if self.tick >= self.config.lifetime_ticks {
            debug!("Wave {} reached its lifetime", self.id);
            self.clear_agents(host, Termination::Lifetime);
            self.finish();
        }
        self.active
    }

    /// Destroys every remaining proxy and halts the wave. Safe to call more
    /// than once.
    pub fn stop(&mut self, host: &mut dyn WaveHost) {
        if !self.active && self.agents.is_empty() {
            return;
        }
        self.clear_agents(host, Termination::Stopped);
        if self.active {
            self.finish();
        }
    }

    fn clear_agents(&mut self, host: &mut dyn WaveHost, reason: Termination) {
        for agent in &mut self.agents {
            if agent.terminate(reason) {
                host.destroy_proxy(agent.proxy());
            }
        }
        let events: Vec<_> = self.agents.iter().map(|a| terminated(self.id, a)).collect();
        self.agents.clear();
        for event in events {
            self.publish(event);
        }
    }

    fn finish(&mut self) {
        self.active = false;
        info!(
            "Wave {} finished after {} ticks: {} hits, {} impacts",
            self.id, self.tick, self.stats.hits, self.stats.impacts
        );
        self.publish(WaveEvent::Finished {
            wave: self.id,
            ticks: self.tick,
            hits: self.stats.hits,
        });
    }

    fn publish(&self, event: WaveEvent) {
        if let Some(sender) = &self.events {
            // Non-blocking send - if full, event is dropped
            let _ = sender.try_send(event);
        }
    }

    /// Wave id.
    #[must_use]
    pub const fn id(&self) -> WaveId {
        self.id
    }

    /// Casting entity.
    #[must_use]
    pub const fn caster(&self) -> EntityId {
        self.caster
    }

    /// Cast origin.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Wave configuration.
    #[must_use]
    pub const fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Whether the wave is still stepping.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Number of projectiles still in flight.
    #[must_use]
    pub fn active_projectile_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_live()).count()
    }

    /// Live agents.
    #[must_use]
    pub fn agents(&self) -> &[ProjectileAgent] {
        &self.agents
    }

    /// Steps performed.
    #[must_use]
    pub const fn ticks_elapsed(&self) -> u32 {
        self.tick
    }

    /// Counters.
    #[must_use]
    pub const fn stats(&self) -> WaveStats {
        self.stats
    }

    /// Takes the lingering clouds emitted since the last call.
    pub fn take_lingering(&mut self) -> Vec<LingeringCloud> {
        std::mem::take(&mut self.lingering)
    }
}

impl fmt::Debug for WaveSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaveSimulation")
            .field("id", &self.id)
            .field("caster", &self.caster)
            .field("tick", &self.tick)
            .field("active", &self.active)
            .field("agents", &self.agents.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn terminated(wave: WaveId, agent: &ProjectileAgent) -> WaveEvent {
    WaveEvent::ProjectileTerminated {
        wave,
        agent: agent.id(),
        reason: agent.termination().unwrap_or(Termination::Stopped),
        position: agent.position(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaWorld;
    use crate::effect::EffectType;
    use crate::events::EventBus;
    use crate::formation::FormationKind;
    use crate::host::{ProxyRegistry, SoundCue};
    use empirewand_common::yaw_between;
    use proptest::prelude::*;

    fn arena() -> (ArenaWorld, EntityId) {
        let mut world = ArenaWorld::new();
        let caster = world.spawn_entity(Vec3::ZERO, 20.0);
        (world, caster)
    }

    fn burst_config() -> WaveConfig {
        WaveConfig::default()
            .with_formation(FormationKind::Burst)
            .with_projectile_count(8)
            .with_speed(1.0)
            .with_max_distance(20.0)
    }

    #[test]
    fn test_burst_scenario() {
        let (mut world, caster) = arena();
        let mut sim = WaveLaunch::new(burst_config())
            .seed(1)
            .launch(&mut world, caster, Vec3::ZERO, Vec3::Z);

        assert!(sim.is_active());
        assert_eq!(sim.active_projectile_count(), 8);
        for (i, agent) in sim.agents().iter().enumerate() {
            let yaw = yaw_between(Vec3::Z, agent.direction()).to_degrees();
            assert!((yaw - 45.0 * i as f32).abs() < 1e-2);
        }

        for step in 1..20 {
            assert!(sim.step(&mut world), "ended early on step {step}");
            assert_eq!(sim.active_projectile_count(), 8);
        }
        assert!(!sim.step(&mut world));

        assert_eq!(sim.active_projectile_count(), 0);
        assert_eq!(sim.ticks_elapsed(), 20);
        assert_eq!(sim.stats().impacts, 8);
        assert_eq!(sim.stats().hits, 0);
        assert_eq!(world.sound_count(SoundCue::ZombieHurt), 8);
        assert_eq!(world.live_proxy_count(), 0);
    }

    #[test]
    fn test_distance_grows_by_speed() {
        let (mut world, caster) = arena();
        let config = WaveConfig::default()
            .with_speed(1.25)
            .with_max_distance(100.0)
            .with_lifetime_ticks(200);
        let mut sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, config);

        for step in 1..=10 {
            sim.step(&mut world);
            for agent in sim.agents() {
                let expected = 1.25 * step as f32;
                assert!((agent.distance_traveled() - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_lifetime_bound() {
        let (mut world, caster) = arena();
        let config = WaveConfig::default()
            .with_max_distance(1000.0)
            .with_lifetime_ticks(10)
            .with_hit_radius(0.0);
        let mut sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, config);

        let mut steps = 0;
        while sim.step(&mut world) {
            steps += 1;
            assert!(steps < 10);
        }

        assert_eq!(sim.ticks_elapsed(), 10);
        assert_eq!(sim.stats().impacts, 0);
        assert_eq!(world.live_proxy_count(), 0);
        assert_eq!(world.sound_count(SoundCue::ZombieHurt), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut world, caster) = arena();
        let bus = EventBus::new(64);
        let mut sim = WaveLaunch::new(WaveConfig::default())
            .events(bus.sender())
            .launch(&mut world, caster, Vec3::ZERO, Vec3::X);
        sim.step(&mut world);

        sim.stop(&mut world);
        assert!(!sim.is_active());
        assert_eq!(world.live_proxy_count(), 0);
        let first = bus.drain();
        assert!(matches!(first.last(), Some(WaveEvent::Finished { .. })));

        sim.stop(&mut world);
        assert!(bus.drain().is_empty());
        assert!(!sim.step(&mut world));
    }

    #[test]
    fn test_invalid_launches_are_inactive() {
        let (mut world, caster) = arena();

        let zero = launch(
            &mut world,
            caster,
            Vec3::ZERO,
            Vec3::X,
            WaveConfig::default().with_projectile_count(0),
        );
        assert!(!zero.is_active());
        assert_eq!(zero.active_projectile_count(), 0);

        let no_direction = launch(&mut world, caster, Vec3::ZERO, Vec3::ZERO, WaveConfig::default());
        assert!(!no_direction.is_active());

        world.kill(caster);
        let dead = launch(&mut world, caster, Vec3::ZERO, Vec3::X, WaveConfig::default());
        assert!(!dead.is_active());

        assert_eq!(world.live_proxy_count(), 0);
        assert!(world.sounds().is_empty());
    }

    #[test]
    fn test_refused_proxies() {
        let (mut world, caster) = arena();
        world.set_proxy_limit(Some(2));

        let sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, WaveConfig::default());
        assert!(sim.is_active());
        assert_eq!(sim.stats().spawned, 2);

        world.set_proxy_limit(Some(0));
        let none = launch(&mut world, caster, Vec3::ZERO, Vec3::X, WaveConfig::default());
        assert!(!none.is_active());
    }

    #[test]
    fn test_removed_proxy_is_dropped_silently() {
        let (mut world, caster) = arena();
        let config = WaveConfig::default().with_projectile_count(3);
        let mut sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, config);

        let victim = sim.agents()[1].proxy();
        world.destroy_proxy(victim);
        sim.step(&mut world);

        assert_eq!(sim.active_projectile_count(), 2);
        assert_eq!(sim.stats().dropped, 1);
        assert_eq!(sim.stats().impacts, 0);
    }

    #[test]
    fn test_stats_count_only_impacts_and_drops() {
        let mut stats = WaveStats::default();
        for reason in [
            Termination::MaxDistance,
            Termination::TargetHit,
            Termination::ProxyLost,
            Termination::Lifetime,
            Termination::Stopped,
        ] {
            stats.record_termination(reason);
        }
        assert_eq!(stats.impacts, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.spawned, 0);
    }

    #[test]
    fn test_effect_failures_do_not_halt() {
        let (mut world, caster) = arena();
        world.set_fail_effects(true);
        let mut sim = WaveLaunch::new(burst_config())
            .seed(9)
            .launch(&mut world, caster, Vec3::ZERO, Vec3::X);

        let mut steps = 0;
        while sim.step(&mut world) {
            steps += 1;
        }
        assert_eq!(steps, 19);
        assert_eq!(sim.stats().impacts, 8);
        assert!(world.visuals().is_empty());
    }

    #[test]
    fn test_hits_and_events() {
        let (mut world, caster) = arena();
        let target = world.spawn_entity(Vec3::new(5.0, 0.0, 0.0), 100.0);
        let bus = EventBus::new(256);
        let config = WaveConfig::default().with_projectile_count(1);
        let mut sim = WaveLaunch::new(config)
            .events(bus.sender())
            .launch(&mut world, caster, Vec3::ZERO, Vec3::X);

        while sim.step(&mut world) {}

        assert_eq!(sim.stats().hits, 1);
        let events = bus.drain();
        assert!(matches!(events[0], WaveEvent::Launched { projectiles: 1, .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e, WaveEvent::TargetHit { target: t, .. } if *t == target)));
        assert!(events.iter().any(|e| matches!(
            e,
            WaveEvent::ProjectileTerminated {
                reason: Termination::TargetHit,
                ..
            }
        )));
        assert!(matches!(events.last(), Some(WaveEvent::Finished { hits: 1, .. })));
    }

    #[test]
    fn test_impact_shakes_observers() {
        let (mut world, caster) = arena();
        let observer = world.spawn_observer(Vec3::new(0.0, 0.0, 24.0));
        let config = WaveConfig::default()
            .with_projectile_count(1)
            .with_max_distance(3.0)
            .with_screen_shake(0.5);
        let mut sim = WaveLaunch::new(config)
            .seed(5)
            .launch(&mut world, caster, Vec3::ZERO, Vec3::Z);
        while sim.step(&mut world) {}

        // impact at z = 2, observer 22 away: no shake
        assert!(world.pushes_on(observer).is_empty());

        let near = world.spawn_observer(Vec3::new(3.0, 0.0, 2.0));
        let mut sim = WaveLaunch::new(
            WaveConfig::default()
                .with_projectile_count(1)
                .with_max_distance(3.0)
                .with_hit_radius(0.0),
        )
        .seed(5)
        .launch(&mut world, caster, Vec3::ZERO, Vec3::Z);
        while sim.step(&mut world) {}
        assert_eq!(world.pushes_on(near).len(), 1);
    }

    #[test]
    fn test_poison_hits_emit_lingering() {
        let (mut world, caster) = arena();
        world.spawn_entity(Vec3::new(3.0, 0.0, 0.0), 100.0);
        let config = WaveConfig::default()
            .with_effect(EffectType::Poison)
            .with_projectile_count(1);
        let mut sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, config);
        while sim.step(&mut world) {}

        let clouds = sim.take_lingering();
        assert_eq!(clouds.len(), 1);
        assert!(sim.take_lingering().is_empty());
    }

    proptest! {
        #[test]
        fn prop_launch_spawns_every_agent(count in 1u32..24, kind_index in 0usize..6) {
            let (mut world, caster) = arena();
            let config = WaveConfig::default()
                .with_formation(FormationKind::ALL[kind_index])
                .with_projectile_count(count);
            let sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, config);
            prop_assert!(sim.is_active());
            prop_assert_eq!(sim.active_projectile_count(), count as usize);
            prop_assert_eq!(world.live_proxy_count(), count as usize);
        }

        #[test]
        fn prop_inactive_within_lifetime(lifetime in 1u32..40, count in 1u32..8) {
            let (mut world, caster) = arena();
            let config = WaveConfig::default()
                .with_projectile_count(count)
                .with_max_distance(10_000.0)
                .with_lifetime_ticks(lifetime);
            let mut sim = launch(&mut world, caster, Vec3::ZERO, Vec3::X, config);
            for _ in 0..lifetime {
                sim.step(&mut world);
            }
            prop_assert!(!sim.is_active());
            prop_assert_eq!(world.live_proxy_count(), 0);
        }
    }
}
