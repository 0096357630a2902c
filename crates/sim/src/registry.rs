//! Registry owning all live instances and driving the per-tick update.

use crate::config::SimConfig;
use crate::instance::{SimulationInstance, SpawnParams};
use singularity_core::{
    scoped_rng, EffectBroadcast, EffectPayload, EntityOps, InstanceId, SimError, WorldQuery,
};
use std::collections::BTreeMap;

/// Owns the set of live singularities and advances them once per host tick.
///
/// Constructed and held by the host (one per world, one per test) rather than
/// living in process-wide static state; multiple registries never share
/// anything. Iteration order is the id order, so replays are deterministic.
#[derive(Debug, Clone)]
pub struct SimulationRegistry {
    cfg: SimConfig,
    seed: u64,
    tick: u64,
    next_id: u32,
    instances: BTreeMap<InstanceId, SimulationInstance>,
}

impl SimulationRegistry {
    /// Create a registry with the given world seed and tuning.
    pub fn new(seed: u64, cfg: SimConfig) -> Self {
        Self {
            cfg,
            seed,
            tick: 0,
            next_id: 1,
            instances: BTreeMap::new(),
        }
    }

    /// Tuning in effect.
    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Ticks advanced so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance is live.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Look up a live instance.
    pub fn get(&self, id: InstanceId) -> Option<&SimulationInstance> {
        self.instances.get(&id)
    }

    /// Iterate live instances in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SimulationInstance> {
        self.instances.values()
    }

    /// Spawn a new instance. Validates size against the survivable range and
    /// the lifetime sentinel (-1 = infinite, otherwise non-negative).
    pub fn spawn(&mut self, params: SpawnParams) -> Result<InstanceId, SimError> {
        let growth = &self.cfg.growth;
        if !params.size.is_finite()
            || params.size <= growth.min_size
            || params.size > growth.max_size
        {
            return Err(SimError::InvalidSize {
                size: params.size,
                min: growth.min_size,
                max: growth.max_size,
            });
        }
        if params.lifetime_ticks < -1 {
            return Err(SimError::InvalidLifetime(params.lifetime_ticks));
        }
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        tracing::info!(
            id = id.0,
            size = params.size,
            lifetime = params.lifetime_ticks,
            "singularity spawned"
        );
        self.instances
            .insert(id, SimulationInstance::new(id, params, &self.cfg));
        Ok(id)
    }

    /// Remove an instance by id, broadcasting the removal.
    pub fn remove<F: EffectBroadcast>(&mut self, id: InstanceId, fx: &mut F) -> Result<(), SimError> {
        let inst = self
            .instances
            .remove(&id)
            .ok_or(SimError::UnknownInstance(id))?;
        fx.notify_near(
            inst.position(),
            inst.effect_radius(&self.cfg),
            EffectPayload::SingularityRemoved { id },
        );
        Ok(())
    }

    /// Clamp an instance to a new size, credit lifetime and broadcast.
    pub fn update_size<F: EffectBroadcast>(
        &mut self,
        id: InstanceId,
        new_size: f64,
        lifetime_bonus: i64,
        fx: &mut F,
    ) -> Result<(), SimError> {
        let inst = self
            .instances
            .get_mut(&id)
            .ok_or(SimError::UnknownInstance(id))?;
        inst.apply_size_update(new_size, lifetime_bonus, &self.cfg);
        fx.notify_near(
            inst.position(),
            inst.effect_radius(&self.cfg),
            EffectPayload::SingularitySize {
                id,
                size: inst.size(),
            },
        );
        Ok(())
    }

    /// Advance every live instance by one tick.
    ///
    /// Per instance: dimension binding check (mismatch evicts, never
    /// propagates), age/expiry, entity pass every tick, block scan every
    /// `scan_interval_ticks`, budgeted destroy pass every tick, then
    /// growth/decay bookkeeping. Cost per instance is bounded by the budgets
    /// regardless of how large its affected region has grown.
    pub fn tick_all<W, E, F>(&mut self, world: &mut W, entities: &mut E, fx: &mut F)
    where
        W: WorldQuery,
        E: EntityOps,
        F: EffectBroadcast,
    {
        self.tick += 1;
        let scan_tick = self.tick % self.cfg.scan_interval_ticks == 0;
        let mut evicted: Vec<InstanceId> = Vec::new();
        let mut destroyed_total = 0;

        for (&id, inst) in self.instances.iter_mut() {
            if inst.dimension() != world.dimension() {
                tracing::warn!(
                    id = id.0,
                    bound = inst.dimension().0,
                    world = world.dimension().0,
                    "instance bound to wrong dimension, evicting"
                );
                evicted.push(id);
                continue;
            }

            inst.advance_age();
            if inst.expired(&self.cfg) {
                tracing::info!(id = id.0, age = inst.age(), size = inst.size(), "singularity expired");
                evicted.push(id);
                continue;
            }

            inst.entity_pass(world, entities, &self.cfg);
            if scan_tick {
                let mut rng = scoped_rng(self.seed, id.0 as u64, self.tick);
                inst.scan_pass(world, &mut rng, &self.cfg);
            }
            destroyed_total += inst.destroy_pass(world, &self.cfg);
            if inst.growth_pass() {
                fx.notify_near(
                    inst.position(),
                    inst.effect_radius(&self.cfg),
                    EffectPayload::SingularitySize {
                        id,
                        size: inst.size(),
                    },
                );
            }
        }

        for id in evicted {
            if let Some(inst) = self.instances.remove(&id) {
                fx.notify_near(
                    inst.position(),
                    inst.effect_radius(&self.cfg),
                    EffectPayload::SingularityRemoved { id },
                );
            }
        }

        if destroyed_total > 0 {
            tracing::debug!(
                tick = self.tick,
                instances = self.instances.len(),
                destroyed = destroyed_total,
                "erosion tick"
            );
        }
    }
}
