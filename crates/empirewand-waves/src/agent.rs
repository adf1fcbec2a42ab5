//! Per-projectile state.
//!
//! Each projectile of a wave is a [`ProjectileAgent`]. Agents move from
//! `Spawned` to `Traveling` on their first step and end in `Terminated`;
//! a terminated agent is never revived.

use std::fmt;

use ahash::AHashSet;
use empirewand_common::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::host::ProxyHandle;

/// Index of an agent within its wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Agent lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    /// Spawned, not yet stepped.
    #[default]
    Spawned,
    /// In flight.
    Traveling,
    /// Finished; will not be stepped again.
    Terminated,
}

/// Why an agent terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    /// The host removed the proxy entity.
    ProxyLost,
    /// Reached the configured maximum distance.
    MaxDistance,
    /// Exhausted its pierce budget on a target.
    TargetHit,
    /// The wave reached its lifetime bound.
    Lifetime,
    /// The wave was stopped explicitly.
    Stopped,
}

impl Termination {
    /// Whether this termination plays an impact effect.
    #[must_use]
    pub const fn has_impact(self) -> bool {
        matches!(self, Self::MaxDistance | Self::TargetHit)
    }
}

/// A single projectile of a wave.
#[derive(Debug, Clone)]
pub struct ProjectileAgent {
    id: AgentId,
    proxy: ProxyHandle,
    /// Travel direction assigned at spawn.
    direction: Vec3,
    /// Formation phase, see [`crate::formation::formation_phase`].
    phase: f32,
    spawn_position: Vec3,
    position: Vec3,
    distance_traveled: f32,
    pierce_count: u32,
    hit_targets: AHashSet<EntityId>,
    state: AgentState,
    termination: Option<Termination>,
}

impl ProjectileAgent {
    /// Create an agent at its spawn position.
    #[must_use]
    pub fn new(
        id: AgentId,
        proxy: ProxyHandle,
        spawn_position: Vec3,
        direction: Vec3,
        phase: f32,
    ) -> Self {
        Self {
            id,
            proxy,
            direction,
            phase,
            spawn_position,
            position: spawn_position,
            distance_traveled: 0.0,
            pierce_count: 0,
            hit_targets: AHashSet::new(),
            state: AgentState::Spawned,
            termination: None,
        }
    }

    /// Agent id.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Host proxy handle.
    #[must_use]
    pub const fn proxy(&self) -> ProxyHandle {
        self.proxy
    }

    /// Direction assigned at spawn.
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Formation phase.
    #[must_use]
    pub const fn phase(&self) -> f32 {
        self.phase
    }

    /// Where the agent spawned.
    #[must_use]
    pub const fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Accumulated travel distance.
    #[must_use]
    pub const fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Entities hit so far.
    #[must_use]
    pub const fn pierce_count(&self) -> u32 {
        self.pierce_count
    }

    /// Ids of entities hit so far.
    #[must_use]
    pub const fn hit_targets(&self) -> &AHashSet<EntityId> {
        &self.hit_targets
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Termination reason, once terminated.
    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Whether the agent is still in flight.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state != AgentState::Terminated
    }

    /// Adds one step of travel and returns the new total distance.
    pub fn advance(&mut self, speed: f32) -> f32 {
        if self.state == AgentState::Spawned {
            self.state = AgentState::Traveling;
        }
        self.distance_traveled += speed;
        self.distance_traveled
    }

    /// Sets the current position.
    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Whether `target` was already hit by this agent.
    #[must_use]
    pub fn has_hit(&self, target: EntityId) -> bool {
        self.hit_targets.contains(&target)
    }

    /// Records a hit. Returns `false` (and changes nothing) for a repeat.
    pub fn record_hit(&mut self, target: EntityId) -> bool {
        if !self.hit_targets.insert(target) {
            return false;
        }
        self.pierce_count += 1;
        true
    }

    /// Terminates the agent. Returns `false` if it already was terminated.
    pub fn terminate(&mut self, reason: Termination) -> bool {
        if self.state == AgentState::Terminated {
            return false;
        }
        self.state = AgentState::Terminated;
        self.termination = Some(reason);
        true
    }
}
