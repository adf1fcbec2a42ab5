//! Catalog of named wave spells.
//!
//! Every built-in spell is a [`WaveConfig`] preset derived from a shared
//! base. Server owners can retune any of them from TOML:
//!
//! ```toml
//! [spells.bloodwave]
//! projectile_count = 9
//! damage = 10.0
//!
//! [spells.flame-wave]
//! formation = "burst"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use empirewand_common::{ConfigError, ConfigResult, WandResult};

use crate::config::{WaveConfig, WaveOverrides};
use crate::effect::EffectType;
use crate::formation::FormationKind;

/// A named, castable wave preset.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSpell {
    /// Lookup key (`bloodwave`, `flame-wave`, ...)
    pub key: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Tunables
    pub config: WaveConfig,
}

impl WaveSpell {
    /// Create a spell.
    #[must_use]
    pub fn new(key: &str, name: &str, description: &str, config: WaveConfig) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            config,
        }
    }
}

/// TOML layout of an overrides file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpellOverrides {
    /// Per-spell overrides keyed by spell key
    #[serde(default)]
    pub spells: BTreeMap<String, WaveOverrides>,
}

/// Registered wave spells.
#[derive(Debug, Clone, Default)]
pub struct SpellBook {
    spells: BTreeMap<String, WaveSpell>,
}

impl SpellBook {
    /// Settings shared by every built-in spell.
    #[must_use]
    pub fn base_preset() -> WaveConfig {
        WaveConfig::default()
            .with_speed(1.2)
            .with_max_distance(25.0)
            .with_projectile_count(7)
            .with_damage(8.0)
            .with_lifetime_ticks(120)
            .with_hit_radius(2.5)
            .with_piercing(2)
            .with_particle_density(1.0)
            .with_screen_shake(0.6)
    }

    /// An empty book.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The five built-in wave spells.
    #[must_use]
    pub fn builtin() -> Self {
        let base = Self::base_preset();
        let mut book = Self::empty();
        book.register(WaveSpell::new(
            "bloodwave",
            "Bloodwave",
            "Weaving crimson bolts that drain life back to the caster",
            base.clone()
                .with_formation(FormationKind::SineWave)
                .with_effect(EffectType::Blood),
        ));
        book.register(WaveSpell::new(
            "poison-wave",
            "Poison Wave",
            "A fan of toxic bolts that leave lingering clouds",
            base.clone()
                .with_formation(FormationKind::Arc)
                .with_effect(EffectType::Poison),
        ));
        book.register(WaveSpell::new(
            "flame-wave",
            "Flame Wave",
            "A chevron of fire that sets targets and ground alight",
            base.clone()
                .with_formation(FormationKind::Chevron)
                .with_effect(EffectType::Flame),
        ));
        book.register(WaveSpell::new(
            "ice-wave",
            "Ice Wave",
            "A wall of frost that slows everything it touches",
            base.clone()
                .with_formation(FormationKind::Line)
                .with_effect(EffectType::Ice),
        ));
        book.register(WaveSpell::new(
            "lightning-wave",
            "Lightning Wave",
            "Spiralling sparks that arc between nearby enemies",
            base.with_formation(FormationKind::Spiral)
                .with_effect(EffectType::Lightning),
        ));
        book
    }

    /// Built-in spells with the overrides in `text` applied.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let mut book = Self::builtin();
        book.apply_toml(text)?;
        Ok(book)
    }

    /// Applies overrides from a TOML file. Returns how many spells changed.
    pub fn load_overrides<P: AsRef<Path>>(&mut self, path: P) -> WandResult<usize> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let changed = self.apply_toml(&text)?;
        info!("Loaded {changed} spell overrides from {}", path.display());
        Ok(changed)
    }

    /// Applies overrides from TOML text. Returns how many spells changed.
    pub fn apply_toml(&mut self, text: &str) -> ConfigResult<usize> {
        let overrides: SpellOverrides =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        self.apply_overrides(&overrides)
    }

    /// Applies every override or none of them.
    pub fn apply_overrides(&mut self, overrides: &SpellOverrides) -> ConfigResult<usize> {
        let mut updated = Vec::with_capacity(overrides.spells.len());
        for (key, patch) in &overrides.spells {
            let Some(spell) = self.spells.get(key) else {
                warn!("Overrides name unknown spell `{key}`");
                return Err(ConfigError::UnknownSpell(key.clone()));
            };
            let config = patch.apply(&spell.config);
            if let Err(e) = config.validate() {
                warn!("Rejected overrides for `{key}`: {e}");
                return Err(e);
            }
            updated.push((key.clone(), config));
        }

        let changed = updated.len();
        for (key, config) in updated {
            if let Some(spell) = self.spells.get_mut(&key) {
                spell.config = config;
            }
        }
        Ok(changed)
    }

    /// Adds or replaces a spell.
    pub fn register(&mut self, spell: WaveSpell) {
        self.spells.insert(spell.key.clone(), spell);
    }

    /// Looks up a spell by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&WaveSpell> {
        self.spells.get(key)
    }

    /// Spell keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.spells.keys().map(String::as_str)
    }

    /// All spells in key order.
    pub fn iter(&self) -> impl Iterator<Item = &WaveSpell> {
        self.spells.values()
    }

    /// Number of spells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}
