//! Engine configuration.
//!
//! Controls the tick loop and the demo arena. Configuration can be loaded
//! from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "empirewand.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Tick Settings ===
    /// Milliseconds per simulation tick
    pub tick_interval_ms: u64,
    /// Hard stop after this many ticks
    pub max_ticks: u32,
    /// Sleep between ticks to match wall-clock time
    pub realtime: bool,

    // === Simulation Settings ===
    /// Seed for reproducible runs (None = random)
    pub seed: Option<u64>,
    /// TOML file with spell overrides
    pub spells_file: Option<PathBuf>,

    // === Arena Settings ===
    /// Spells to cast (empty = every spell in the book)
    pub spells: Vec<String>,
    /// Target dummies placed along each cast direction
    pub targets_per_lane: u32,
    /// Health of each target dummy
    pub target_health: f32,
    /// Distance between consecutive dummies
    pub target_spacing: f32,

    // === Debug Settings ===
    /// Log every wave event
    pub log_events: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Tick
            tick_interval_ms: 50,
            max_ticks: 600,
            realtime: false,

            // Simulation
            seed: None,
            spells_file: None,

            // Arena
            spells: Vec::new(),
            targets_per_lane: 4,
            target_health: 40.0,
            target_spacing: 4.0,

            // Debug
            log_events: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        if let Some(config_dir) = dirs_config_path() {
            config_dir.join("empirewand").join(CONFIG_FILE)
        } else {
            PathBuf::from(CONFIG_FILE)
        }
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Tick
        self.tick_interval_ms = self.tick_interval_ms.clamp(1, 1000);
        self.max_ticks = self.max_ticks.clamp(1, 72_000);

        // Arena
        self.targets_per_lane = self.targets_per_lane.min(32);
        if !self.target_health.is_finite() {
            self.target_health = 40.0;
        }
        self.target_health = self.target_health.clamp(1.0, 10_000.0);
        if !self.target_spacing.is_finite() {
            self.target_spacing = 4.0;
        }
        self.target_spacing = self.target_spacing.clamp(0.5, 50.0);
    }
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval_ms, 50);
        assert!(!config.realtime);
        assert!(config.spells.is_empty());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.tick_interval_ms = 0;
        config.max_ticks = 0;
        config.target_health = f32::NAN;
        config.target_spacing = 0.0;

        config.validate();

        assert_eq!(config.tick_interval_ms, 1);
        assert_eq!(config.max_ticks, 1);
        assert_eq!(config.target_health, 40.0);
        assert!((config.target_spacing - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("engine.toml");

        let mut config = EngineConfig::default();
        config.seed = Some(12345);
        config.realtime = true;
        config.spells = vec!["ice-wave".to_string()];
        config.spells_file = Some(PathBuf::from("spells.toml"));

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/config.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "tick_interval_ms = \"fast\"").expect("write");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = toml::from_str("max_ticks = 100").expect("parse");
        assert_eq!(config.max_ticks, 100);
        assert_eq!(config.tick_interval_ms, 50);
    }

    #[test]
    fn test_config_path_file_name() {
        assert!(EngineConfig::config_path().ends_with(CONFIG_FILE));
    }
}
