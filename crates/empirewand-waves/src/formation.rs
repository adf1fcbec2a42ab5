//! Formation strategies.
//!
//! A formation decides where each projectile of a wave spawns, which way it
//! initially points, and (for continuous-motion kinds) how its velocity
//! evolves with the distance it has covered. All rotations are about the
//! vertical axis.

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::sync::Arc;

use empirewand_common::{horizontal_heading, horizontal_perpendicular, rotate_about_y};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::agent::ProjectileAgent;
use crate::host::VisualKind;

/// Lateral spacing between neighbours in Line and Chevron formations.
pub const LINE_SPACING: f32 = 1.5;
/// Angular step between neighbours in an Arc formation, in degrees.
pub const ARC_STEP_DEGREES: f32 = 15.0;
/// Forward spawn distance for Arc projectiles.
pub const ARC_SPAWN_DISTANCE: f32 = 0.5;
/// Forward spawn distance for Burst projectiles.
pub const BURST_SPAWN_DISTANCE: f32 = 1.0;

// ============================================================================
// Formation kinds
// ============================================================================

/// Geometric pattern a wave is launched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationKind {
    /// Side-by-side row perpendicular to the cast direction
    #[default]
    Line,
    /// Fan of diverging directions
    Arc,
    /// Parallel paths that weave sideways
    SineWave,
    /// Paths that continuously turn with distance
    Spiral,
    /// Full ring of outward directions
    Burst,
    /// V shape with a single leader
    Chevron,
}

impl FormationKind {
    /// All formation kinds.
    pub const ALL: [Self; 6] = [
        Self::Line,
        Self::Arc,
        Self::SineWave,
        Self::Spiral,
        Self::Burst,
        Self::Chevron,
    ];

    /// Returns the strategy implementing this formation.
    #[must_use]
    pub fn strategy(self) -> Arc<dyn FormationStrategy> {
        match self {
            Self::Line => Arc::new(Line),
            Self::Arc => Arc::new(ArcFan),
            Self::SineWave => Arc::new(SineWave),
            Self::Spiral => Arc::new(Spiral),
            Self::Burst => Arc::new(Burst),
            Self::Chevron => Arc::new(Chevron),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Arc => "arc",
            Self::SineWave => "sine_wave",
            Self::Spiral => "spiral",
            Self::Burst => "burst",
            Self::Chevron => "chevron",
        }
    }
}

impl fmt::Display for FormationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Strategy contract
// ============================================================================

/// Where an agent spawns relative to the cast origin and which way it points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlacement {
    /// Offset from the cast origin.
    pub offset: Vec3,
    /// Initial travel direction.
    pub direction: Vec3,
}

impl SpawnPlacement {
    /// Placement at the origin travelling along `direction`.
    #[must_use]
    pub const fn straight(direction: Vec3) -> Self {
        Self {
            offset: Vec3::ZERO,
            direction,
        }
    }
}

/// Decorative particle pattern drawn around a target when a projectile
/// terminates on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Flourish {
    /// Particle kind.
    pub kind: VisualKind,
    /// Particles per point.
    pub per_point: u32,
    /// Spread per point.
    pub spread: f32,
    /// Offsets from the target position.
    pub points: Vec<Vec3>,
}

/// Geometry and motion model of one formation kind.
pub trait FormationStrategy: Send + Sync + fmt::Debug {
    /// Spawn placement of agent `index` out of `count`.
    ///
    /// `base` must be a unit vector.
    fn spawn(&self, index: usize, count: usize, base: Vec3) -> SpawnPlacement;

    /// Velocity for the agent's next step.
    fn velocity(&self, agent: &ProjectileAgent, speed: f32) -> Vec3 {
        agent.direction() * speed
    }

    /// Pattern drawn when an agent terminates on a target.
    fn flourish(&self) -> Option<Flourish> {
        None
    }
}

/// Formation phase of agent `index` out of `count`, in roughly `[-0.5, 0.5)`.
#[must_use]
pub fn formation_phase(index: usize, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    centered_index(index, count) / count as f32
}

/// `index - count / 2` in floating point.
fn centered_index(index: usize, count: usize) -> f32 {
    index as f32 - count as f32 / 2.0
}

// ============================================================================
// Strategies
// ============================================================================

/// Row perpendicular to the cast direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Line;

impl FormationStrategy for Line {
    fn spawn(&self, index: usize, count: usize, base: Vec3) -> SpawnPlacement {
        let offset = horizontal_perpendicular(base) * centered_index(index, count) * LINE_SPACING;
        SpawnPlacement {
            offset,
            direction: base,
        }
    }
}

/// Fan of directions 15° apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcFan;

impl FormationStrategy for ArcFan {
    fn spawn(&self, index: usize, count: usize, base: Vec3) -> SpawnPlacement {
        let angle = (centered_index(index, count) * ARC_STEP_DEGREES).to_radians();
        let direction = rotate_about_y(base, angle);
        SpawnPlacement {
            offset: direction * ARC_SPAWN_DISTANCE,
            direction,
        }
    }

    fn flourish(&self) -> Option<Flourish> {
        let points = (0..8)
            .map(|i| {
                let angle = i as f32 * PI / 7.0 - PI / 2.0;
                Vec3::new(angle.cos() * 3.0, angle.abs().sin(), angle.sin() * 3.0)
            })
            .collect();
        Some(Flourish {
            kind: VisualKind::Crit,
            per_point: 2,
            spread: 0.1,
            points,
        })
    }
}

/// Parallel paths with a sideways sine component.
#[derive(Debug, Clone, Copy, Default)]
pub struct SineWave;

impl FormationStrategy for SineWave {
    fn spawn(&self, _index: usize, _count: usize, base: Vec3) -> SpawnPlacement {
        SpawnPlacement::straight(base)
    }

    fn velocity(&self, agent: &ProjectileAgent, speed: f32) -> Vec3 {
        let direction = agent.direction();
        let sway = (agent.distance_traveled() * 0.5 + agent.phase() * PI).sin() * 2.0;
        direction * speed + horizontal_perpendicular(direction) * (sway * 0.1)
    }

    fn flourish(&self) -> Option<Flourish> {
        let points = (0..15)
            .map(|i| {
                let progress = i as f32 / 14.0;
                Vec3::new(progress * 5.0 - 2.5, (progress * TAU).sin() * 1.5, 0.0)
            })
            .collect();
        Some(Flourish {
            kind: VisualKind::Enchant,
            per_point: 1,
            spread: 0.0,
            points,
        })
    }
}

/// Paths that turn further the farther they travel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spiral;

impl FormationStrategy for Spiral {
    fn spawn(&self, _index: usize, _count: usize, base: Vec3) -> SpawnPlacement {
        SpawnPlacement::straight(base)
    }

    fn velocity(&self, agent: &ProjectileAgent, speed: f32) -> Vec3 {
        let angle = agent.distance_traveled() * 0.2 + agent.phase() * PI;
        rotate_about_y(agent.direction(), angle) * speed
    }

    fn flourish(&self) -> Option<Flourish> {
        let points = (0..20)
            .map(|i| {
                let angle = i as f32 * TAU / 10.0;
                let radius = i as f32 * 0.2;
                Vec3::new(angle.cos() * radius, 0.1, angle.sin() * radius)
            })
            .collect();
        Some(Flourish {
            kind: VisualKind::FireworkSpark,
            per_point: 1,
            spread: 0.0,
            points,
        })
    }
}

/// Evenly spaced ring of outward directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Burst;

impl FormationStrategy for Burst {
    fn spawn(&self, index: usize, count: usize, base: Vec3) -> SpawnPlacement {
        let angle = if count == 0 {
            0.0
        } else {
            TAU * index as f32 / count as f32
        };
        // a vertical base would spin in place, so ring around its heading
        let axis = if Vec3::new(base.x, 0.0, base.z).length_squared() < 1e-6 {
            horizontal_heading(base)
        } else {
            base
        };
        let direction = rotate_about_y(axis, angle);
        SpawnPlacement {
            offset: direction * BURST_SPAWN_DISTANCE,
            direction,
        }
    }

    fn flourish(&self) -> Option<Flourish> {
        let points = (0..12)
            .map(|i| {
                let angle = i as f32 * TAU / 12.0;
                Vec3::new(angle.cos() * 2.0, 0.5, angle.sin() * 2.0)
            })
            .collect();
        Some(Flourish {
            kind: VisualKind::Explosion,
            per_point: 2,
            spread: 0.2,
            points,
        })
    }
}

/// V shape: a leader at the origin with arms trailing back on both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chevron;

impl Chevron {
    /// Rank (distance from the leader) and side (+1/-1) of agent `index`.
    #[must_use]
    pub fn rank_and_side(index: usize) -> (usize, f32) {
        if index == 0 {
            return (0, 0.0);
        }
        let rank = index.div_ceil(2);
        let side = if index % 2 == 1 { 1.0 } else { -1.0 };
        (rank, side)
    }
}

impl FormationStrategy for Chevron {
    fn spawn(&self, index: usize, _count: usize, base: Vec3) -> SpawnPlacement {
        let (rank, side) = Self::rank_and_side(index);
        let rank = rank as f32;
        let offset = horizontal_perpendicular(base) * side * rank * LINE_SPACING
            - base * rank * LINE_SPACING;
        SpawnPlacement {
            offset,
            direction: base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empirewand_common::yaw_between;
    use crate::agent::AgentId;
    use crate::host::ProxyHandle;
    use proptest::prelude::*;

    fn agent_with_phase(phase: f32) -> ProjectileAgent {
        ProjectileAgent::new(AgentId(0), ProxyHandle::from_raw(1), Vec3::ZERO, Vec3::X, phase)
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_line_offsets() {
        let base = Vec3::X;
        let p0 = Line.spawn(0, 4, base);
        let p3 = Line.spawn(3, 4, base);

        // perpendicular of +X is +Z
        assert!(close(p0.offset, Vec3::new(0.0, 0.0, -3.0)));
        assert!(close(p3.offset, Vec3::new(0.0, 0.0, 1.5)));
        assert_eq!(p0.direction, base);
    }

    #[test]
    fn test_arc_fan() {
        let base = Vec3::X;
        let p = ArcFan.spawn(2, 2, base);
        let expected = rotate_about_y(base, 15f32.to_radians());
        assert!(close(p.direction, expected));
        assert!(close(p.offset, expected * 0.5));
    }

    #[test]
    fn test_burst_directions() {
        let base = Vec3::Z;
        for i in 0..8 {
            let p = Burst.spawn(i, 8, base);
            let yaw = yaw_between(base, p.direction).to_degrees();
            let expected = 45.0 * i as f32;
            assert!((yaw - expected).abs() < 1e-2, "agent {i}: {yaw} vs {expected}");
            assert!(close(p.offset, p.direction));
        }
    }

    #[test]
    fn test_vertical_cast_spreads() {
        let up = Vec3::Y;

        let line: Vec<Vec3> = (0..4).map(|i| Line.spawn(i, 4, up).offset).collect();
        for pair in line.windows(2) {
            assert!((pair[1] - pair[0]).length() > 1.4);
        }

        let burst: Vec<Vec3> = (0..8).map(|i| Burst.spawn(i, 8, up).direction).collect();
        for (i, a) in burst.iter().enumerate() {
            assert!(a.y.abs() < 1e-5);
            for b in &burst[i + 1..] {
                assert!(!close(*a, *b));
            }
        }

        let agent = ProjectileAgent::new(AgentId(0), ProxyHandle::from_raw(1), Vec3::ZERO, up, 0.5);
        let velocity = SineWave.velocity(&agent, 1.0);
        assert!(close(velocity, Vec3::new(-0.2, 1.0, 0.0)));
    }

    #[test]
    fn test_chevron_ranks() {
        assert_eq!(Chevron::rank_and_side(0), (0, 0.0));
        assert_eq!(Chevron::rank_and_side(1), (1, 1.0));
        assert_eq!(Chevron::rank_and_side(2), (1, -1.0));
        assert_eq!(Chevron::rank_and_side(5), (3, 1.0));

        let base = Vec3::X;
        let leader = Chevron.spawn(0, 5, base);
        assert!(close(leader.offset, Vec3::ZERO));

        let right = Chevron.spawn(1, 5, base);
        let left = Chevron.spawn(2, 5, base);
        assert!(close(right.offset, Vec3::new(-1.5, 0.0, 1.5)));
        assert!(close(left.offset, Vec3::new(-1.5, 0.0, -1.5)));
    }

    #[test]
    fn test_formation_phase() {
        assert_eq!(formation_phase(0, 4), -0.5);
        assert_eq!(formation_phase(2, 4), 0.0);
        assert_eq!(formation_phase(0, 0), 0.0);
    }

    #[test]
    fn test_sine_wave_velocity() {
        let agent = agent_with_phase(0.0);
        // sin(0) = 0: no sideways component at the start with zero phase
        assert!(close(SineWave.velocity(&agent, 1.0), Vec3::X));

        let agent = agent_with_phase(0.5);
        // sin(π/2) * 2 * 0.1 = 0.2 along +Z
        assert!(close(SineWave.velocity(&agent, 1.0), Vec3::new(1.0, 0.0, 0.2)));
    }

    #[test]
    fn test_spiral_velocity_keeps_speed() {
        let agent = agent_with_phase(0.25);
        let v = Spiral.velocity(&agent, 2.0);
        assert!((v.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_flourishes() {
        assert!(Line.flourish().is_none());
        assert!(Chevron.flourish().is_none());
        assert_eq!(Spiral.flourish().map(|f| f.points.len()), Some(20));
        assert_eq!(Burst.flourish().map(|f| f.points.len()), Some(12));
        assert_eq!(ArcFan.flourish().map(|f| f.points.len()), Some(8));
        assert_eq!(SineWave.flourish().map(|f| f.points.len()), Some(15));
    }

    #[test]
    fn test_kind_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            formation: FormationKind,
        }
        let parsed: Wrapper = toml::from_str("formation = \"sine_wave\"").expect("parse");
        assert_eq!(parsed.formation, FormationKind::SineWave);
        assert_eq!(FormationKind::Chevron.to_string(), "chevron");
    }

    proptest! {
        #[test]
        fn prop_spawn_directions_are_unit(count in 1usize..40, yaw in 0.0f32..6.0) {
            let base = rotate_about_y(Vec3::X, yaw);
            for kind in FormationKind::ALL {
                let strategy = kind.strategy();
                for i in 0..count {
                    let p = strategy.spawn(i, count, base);
                    prop_assert!((p.direction.length() - 1.0).abs() < 1e-3);
                    prop_assert!(p.offset.is_finite());
                }
            }
        }
    }
}
