//! Collision resolution with a pierce budget.

use empirewand_common::EntityId;
use glam::Vec3;

use crate::agent::{ProjectileAgent, Termination};
use crate::config::WaveConfig;
use crate::effect::{EffectContext, EffectStrategy};
use crate::formation::FormationStrategy;
use crate::host::VisualBurst;

/// Whether an agent keeps flying after collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Keep flying.
    Continue,
    /// The agent terminated on a target.
    Terminate,
}

/// Result of resolving one agent for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Entities hit this step, in hit order.
    pub hits: Vec<EntityId>,
    /// Continue or terminate.
    pub outcome: CollisionOutcome,
}

impl Resolution {
    const fn miss() -> Self {
        Self {
            hits: Vec::new(),
            outcome: CollisionOutcome::Continue,
        }
    }
}

/// Applies hits for agents of one wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    damage: f32,
    hit_radius: f32,
    pierce: bool,
    budget: u32,
}

impl CollisionResolver {
    /// Resolver using the wave's combat settings.
    #[must_use]
    pub fn from_config(config: &WaveConfig) -> Self {
        Self {
            damage: config.damage,
            hit_radius: config.hit_radius,
            pierce: config.pierce_entities,
            budget: config.pierce_budget(),
        }
    }

    /// Damage per hit.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Hits an agent may take before it terminates.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.budget
    }

    /// Hits every new living entity near `agent` until the pierce budget
    /// runs out. Every hit shakes nearby observers. On termination the
    /// impact effect and formation flourish are played at the last target
    /// and the proxy is destroyed.
    pub fn resolve(
        &self,
        agent: &mut ProjectileAgent,
        ctx: &mut EffectContext<'_>,
        effect: &dyn EffectStrategy,
        formation: &dyn FormationStrategy,
    ) -> Resolution {
        if !agent.is_live() {
            return Resolution::miss();
        }

        let candidates = ctx.host.living_entities_near(agent.position(), self.hit_radius);
        let mut resolution = Resolution::miss();

        for target in candidates {
            if target == ctx.caster || agent.has_hit(target) {
                continue;
            }
            // an earlier hit this step (lightning chain) may have killed it
            if !ctx.host.is_alive(target) {
                continue;
            }

            let attributed = ctx.live_caster();
            ctx.host.damage(target, self.damage, attributed);
            effect.apply_status(ctx, target);

            let target_position = ctx.host.position_of(target).unwrap_or(agent.position());
            effect.entity_hit(ctx, target_position);

            agent.record_hit(target);
            resolution.hits.push(target);

            if !self.pierce || agent.pierce_count() >= self.budget {
                ctx.impact(effect, agent.position(), Some(target));
                if let Some(flourish) = formation.flourish() {
                    for offset in &flourish.points {
                        ctx.visual(
                            target_position + *offset,
                            VisualBurst::new(flourish.kind, flourish.per_point)
                                .with_uniform_spread(flourish.spread),
                        );
                    }
                }
                ctx.host.destroy_proxy(agent.proxy());
                agent.terminate(Termination::TargetHit);
                resolution.outcome = CollisionOutcome::Terminate;
                break;
            }
            ctx.shake_at(target_position);
        }

        resolution
    }
}

/// Orders candidates nearest to `origin` first. Ties keep input order.
#[must_use]
pub fn nearest_first(origin: Vec3, mut candidates: Vec<(EntityId, Vec3)>) -> Vec<EntityId> {
    candidates.sort_by(|a, b| {
        origin
            .distance_squared(a.1)
            .total_cmp(&origin.distance_squared(b.1))
    });
    candidates.into_iter().map(|(id, _)| id).collect()
}
