//! # Empire Wand Common
//!
//! Common types, utilities, and shared abstractions for Empire Wand.
//!
//! This crate provides foundational types used across the spell crates:
//! - ID types (EntityId, WaveId)
//! - Vector helpers over `glam`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_wave_id_generation() {
        let a = WaveId::next();
        let b = WaveId::next();
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidValue {
            field: "speed",
            reason: "must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for `speed`: must be positive");

        let wrapped: WandError = err.into();
        assert!(wrapped.to_string().starts_with("Config error"));
    }
}
