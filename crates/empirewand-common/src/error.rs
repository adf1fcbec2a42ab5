//! Error types for Empire Wand.

use thiserror::Error;

/// Top-level error type for Empire Wand operations.
#[derive(Debug, Error)]
pub enum WandError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Spell casting errors
    #[error("Cast error: {0}")]
    Cast(#[from] CastError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A field holds a value outside its valid range
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Overrides name a spell the catalog does not know
    #[error("unknown spell `{0}`")]
    UnknownSpell(String),

    /// Config text could not be parsed
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Errors reported by a host effect sink.
///
/// These never abort a simulation; callers log and continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    /// The sink is not currently able to play effects
    #[error("effect sink unavailable: {0}")]
    Unavailable(String),

    /// The sink refused a specific effect
    #[error("effect rejected: {0}")]
    Rejected(String),
}

/// Errors returned when casting a named spell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    /// No spell with this key is registered
    #[error("unknown spell `{0}`")]
    UnknownSpell(String),

    /// The launch produced no live projectiles
    #[error("spell `{0}` fizzled")]
    Fizzled(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for Empire Wand operations.
pub type WandResult<T> = Result<T, WandError>;
