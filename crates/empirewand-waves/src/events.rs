//! Event bus for wave notifications.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use empirewand_common::{EntityId, WaveId};

use crate::agent::{AgentId, Termination};
use crate::effect::EffectType;
use crate::formation::FormationKind;

/// Events emitted by running wave simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaveEvent {
    /// A wave was launched with at least one live projectile
    Launched {
        /// Wave ID
        wave: WaveId,
        /// Casting entity
        caster: EntityId,
        /// Formation used
        formation: FormationKind,
        /// Effect type used
        effect: EffectType,
        /// Projectiles spawned
        projectiles: usize,
    },
    /// A projectile hit a living entity
    TargetHit {
        /// Wave ID
        wave: WaveId,
        /// Projectile that hit
        agent: AgentId,
        /// Entity hit
        target: EntityId,
        /// Damage dealt
        damage: f32,
    },
    /// A projectile stopped
    ProjectileTerminated {
        /// Wave ID
        wave: WaveId,
        /// Projectile
        agent: AgentId,
        /// Why it stopped
        reason: Termination,
        /// Where it stopped
        position: Vec3,
    },
    /// The wave has no more live projectiles
    Finished {
        /// Wave ID
        wave: WaveId,
        /// Ticks the wave ran for
        ticks: u32,
        /// Total entity hits
        hits: u32,
    },
}

impl WaveEvent {
    /// Returns the wave this event belongs to.
    #[must_use]
    pub const fn wave(&self) -> WaveId {
        match self {
            Self::Launched { wave, .. }
            | Self::TargetHit { wave, .. }
            | Self::ProjectileTerminated { wave, .. }
            | Self::Finished { wave, .. } => *wave,
        }
    }
}

/// Event bus for broadcasting wave events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<WaveEvent>,
    /// Receiver for collecting events
    receiver: Receiver<WaveEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: WaveEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<WaveEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<WaveEvent> {
        self.sender.clone()
    }
}
