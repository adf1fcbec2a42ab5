//! Arena demo.
//!
//! Casts wave spells from a single caster at lanes of target dummies and
//! runs the director until every wave and cloud has played out.

use std::f32::consts::TAU;

use anyhow::{bail, Context, Result};
use empirewand_common::{rotate_about_y, EntityId, FORWARD};
use empirewand_waves::{ArenaWorld, SpellBook, WaveDirector, WaveEvent};
use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::timing::TickClock;

/// Caster health in the arena.
const CASTER_HEALTH: f32 = 20.0;

/// Outcome of one demo run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoReport {
    /// Spells that launched
    pub casts: usize,
    /// Spells that fizzled
    pub fizzled: usize,
    /// Ticks simulated
    pub ticks: u32,
    /// Entities hit across all waves
    pub hits: u32,
    /// Total damage dealt
    pub damage: f32,
    /// Dummies left alive
    pub survivors: usize,
    /// Events drained from the bus
    pub events: usize,
}

/// Loads the spell book, applying the configured overrides file.
pub fn load_spellbook(config: &EngineConfig) -> Result<SpellBook> {
    let mut book = SpellBook::builtin();
    if let Some(path) = &config.spells_file {
        book.load_overrides(path)
            .with_context(|| format!("loading spell overrides from {}", path.display()))?;
    }
    Ok(book)
}

/// Runs the arena demo.
pub fn run(config: &EngineConfig) -> Result<DemoReport> {
    let book = load_spellbook(config)?;
    let keys: Vec<String> = if config.spells.is_empty() {
        book.keys().map(str::to_string).collect()
    } else {
        config.spells.clone()
    };
    if keys.is_empty() {
        bail!("no spells to cast");
    }

    let mut world = ArenaWorld::new();
    let caster = world.spawn_entity(Vec3::ZERO, CASTER_HEALTH);
    let lanes = lane_directions(keys.len());
    let dummies = place_dummies(&mut world, &lanes, config);
    info!(
        "Arena ready: {} lanes, {} dummies",
        lanes.len(),
        dummies.len()
    );

    let mut director = WaveDirector::new(book);
    if let Some(seed) = config.seed {
        director = director.with_seed(seed);
    }

    let mut report = DemoReport::default();
    for (key, direction) in keys.iter().zip(&lanes) {
        match director.cast(&mut world, key, caster, Vec3::ZERO, *direction) {
            Ok(id) => {
                debug!("Cast {key} as {id}");
                report.casts += 1;
            },
            Err(e) => {
                warn!("Cast failed: {e}");
                report.fizzled += 1;
            },
        }
    }

    let mut clock = TickClock::new(config.tick_interval_ms).with_realtime(config.realtime);
    while report.ticks < config.max_ticks
        && !(director.active_waves().is_empty() && director.lingering_clouds().is_empty())
    {
        clock.begin_tick();
        director.tick(&mut world);
        clock.end_tick();
        report.ticks += 1;

        for event in director.events() {
            tally(&mut report, &event, config.log_events);
        }
    }

    if !director.active_waves().is_empty() {
        warn!("Tick budget exhausted with waves still running");
        director.stop_all(&mut world);
        for event in director.events() {
            tally(&mut report, &event, config.log_events);
        }
    }

    report.damage = world.damage_log().iter().map(|d| d.amount).sum();
    report.survivors = dummies
        .iter()
        .filter(|id| world.health_of(**id).is_some_and(|h| h > 0.0))
        .count();

    info!(
        "Demo finished in {} ticks ({:?} simulated, {:.3} ms/tick, {:.0}% load)",
        clock.ticks(),
        clock.simulated(),
        clock.average_tick_ms(),
        clock.load() * 100.0
    );
    info!(
        "{} casts, {} hits, {:.1} damage, {}/{} dummies standing",
        report.casts,
        report.hits,
        report.damage,
        report.survivors,
        dummies.len()
    );
    Ok(report)
}

fn tally(report: &mut DemoReport, event: &WaveEvent, log: bool) {
    report.events += 1;
    if let WaveEvent::TargetHit { .. } = event {
        report.hits += 1;
    }
    if log {
        info!("{event:?}");
    }
}

/// Evenly spread horizontal directions, starting at [`FORWARD`].
fn lane_directions(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| rotate_about_y(FORWARD, TAU * i as f32 / count as f32))
        .collect()
}

fn place_dummies(world: &mut ArenaWorld, lanes: &[Vec3], config: &EngineConfig) -> Vec<EntityId> {
    let mut dummies = Vec::new();
    for lane in lanes {
        for i in 1..=config.targets_per_lane {
            let position = *lane * config.target_spacing * i as f32;
            dummies.push(world.spawn_entity(position, config.target_health));
        }
    }
    dummies
}
