//! One live singularity: owned queue, scan cursor and growth state.

use crate::config::SimConfig;
use crate::force::{apply_zone_effects, ForceOutcome};
use crate::growth::{is_infinite_lifetime, GrowthDecayController};
use crate::queue::DestructionQueue;
use crate::scan::{scan_step, ScanCursor, ScanStats};
use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use singularity_core::{Aabb, DimensionId, EntityOps, InstanceId, WorldQuery};

/// Host-facing parameters for spawning a singularity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    /// Dimension the instance is bound to.
    pub dimension: DimensionId,
    /// Immutable center position.
    pub position: DVec3,
    /// Initial size (zone radii scale with it).
    pub size: f64,
    /// Visual rotation speed; also scales the orbital force term.
    pub rotation_speed: f64,
    /// Lifetime in ticks; -1 means the instance never expires by age.
    pub lifetime_ticks: i64,
}

impl SpawnParams {
    /// Spawn parameters with default rotation, infinite lifetime and the
    /// default dimension.
    pub fn new(position: DVec3, size: f64) -> Self {
        Self {
            dimension: DimensionId::DEFAULT,
            position,
            size,
            rotation_speed: 1.0,
            lifetime_ticks: -1,
        }
    }
}

/// One live black-hole simulation instance.
///
/// Owned exclusively by the registry; owns its destruction queue and scan
/// cursor. No instance ever touches another's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInstance {
    id: InstanceId,
    dimension: DimensionId,
    position: DVec3,
    size: f64,
    rotation_speed: f64,
    lifetime: i64,
    age: u64,
    cursor: ScanCursor,
    queue: DestructionQueue,
    growth: GrowthDecayController,
    fed_this_tick: bool,
}

impl SimulationInstance {
    /// Build a fresh instance from validated spawn parameters.
    pub fn new(id: InstanceId, params: SpawnParams, cfg: &SimConfig) -> Self {
        Self {
            id,
            dimension: params.dimension,
            position: params.position,
            size: params.size,
            rotation_speed: params.rotation_speed,
            lifetime: params.lifetime_ticks,
            age: 0,
            cursor: ScanCursor::default(),
            queue: DestructionQueue::new(cfg.queue_capacity),
            growth: GrowthDecayController::new(cfg.growth),
            fed_this_tick: false,
        }
    }

    /// Instance identifier.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Dimension the instance is bound to.
    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    /// Center position.
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Current size.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Rotation speed (visual, plus orbital force scaling).
    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Remaining lifetime in ticks (-1 = infinite).
    pub fn lifetime(&self) -> i64 {
        self.lifetime
    }

    /// Ticks since creation.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Queued destruction candidates.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Ticks since the last consumed block.
    pub fn time_since_fed(&self) -> u32 {
        self.growth.time_since_fed()
    }

    /// Radius within which this instance has any effect (for broadcasts and
    /// the entity-region query).
    pub fn effect_radius(&self, cfg: &SimConfig) -> f64 {
        cfg.zone.max_reach(self.size)
    }

    pub(crate) fn advance_age(&mut self) {
        self.age += 1;
    }

    /// Whether the instance should be evicted: aged out (finite lifetimes
    /// only) or decayed down to the size floor.
    pub fn expired(&self, cfg: &SimConfig) -> bool {
        let aged_out = !is_infinite_lifetime(self.lifetime) && self.age >= self.lifetime as u64;
        aged_out || self.size <= cfg.growth.min_size
    }

    /// Producer phase: advance the resumable scan by one budgeted pass.
    pub fn scan_pass<W: WorldQuery, R: Rng>(
        &mut self,
        world: &W,
        rng: &mut R,
        cfg: &SimConfig,
    ) -> ScanStats {
        scan_step(
            self.position,
            self.size,
            &mut self.cursor,
            &mut self.queue,
            world,
            rng,
            &cfg.scan,
            &cfg.zone,
        )
    }

    /// Consumer phase: destroy up to the per-tick budget of queued blocks.
    ///
    /// Each candidate is re-validated against the live world first; a block
    /// that changed since scan time is skipped silently and earns no growth.
    pub fn destroy_pass<W: WorldQuery>(&mut self, world: &mut W, cfg: &SimConfig) -> usize {
        let mut destroyed = 0;
        for candidate in self.queue.poll_up_to(cfg.destroy_budget) {
            let live = world.material(candidate.pos);
            if !live.is_destructible() || live != candidate.material {
                continue;
            }
            world.destroy_block(candidate.pos);
            if live.drops_on_destruction() {
                world.spawn_drops(candidate.pos, live);
            }
            self.growth.on_fed(&mut self.size, &mut self.lifetime, live);
            self.fed_this_tick = true;
            destroyed += 1;
        }
        destroyed
    }

    /// Entity phase: classify and affect every entity within reach.
    pub fn entity_pass<W: WorldQuery, E: EntityOps>(
        &self,
        world: &W,
        entities: &mut E,
        cfg: &SimConfig,
    ) -> usize {
        let reach = self.effect_radius(cfg);
        let region = Aabb::from_center_half_extents(self.position, DVec3::splat(reach));
        let mut affected = 0;
        for entity in world.entities_in_region(&region) {
            if !entities.is_alive(entity) {
                continue;
            }
            let outcome = apply_zone_effects(
                self.position,
                self.size,
                self.rotation_speed,
                entity,
                entities,
                &cfg.force,
                &cfg.zone,
            );
            if outcome != ForceOutcome::OutOfRange {
                affected += 1;
            }
        }
        affected
    }

    /// Growth/decay bookkeeping for this tick. Returns whether the caller
    /// should broadcast a size update.
    pub fn growth_pass(&mut self) -> bool {
        let fed = std::mem::take(&mut self.fed_this_tick);
        self.growth.tick(fed, &mut self.size, &mut self.lifetime)
    }

    /// Host-requested size update: clamp and credit lifetime.
    pub fn apply_size_update(&mut self, new_size: f64, lifetime_bonus: i64, cfg: &SimConfig) {
        self.size = new_size.clamp(cfg.growth.min_size, cfg.growth.max_size);
        if !is_infinite_lifetime(self.lifetime) {
            self.lifetime = (self.lifetime + lifetime_bonus).max(0);
        }
    }
}
