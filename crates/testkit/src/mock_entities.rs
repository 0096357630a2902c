//! In-memory entity store implementing [`EntityOps`].

use glam::DVec3;
use singularity_core::{DamageSource, EntityId, EntityOps};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct MockEntity {
    pos: DVec3,
    vel: DVec3,
    radius: f64,
    health: f32,
    alive: bool,
}

/// Entity store with damage/removal recording for assertions.
#[derive(Debug, Default, Clone)]
pub struct MockEntities {
    entities: BTreeMap<EntityId, MockEntity>,
    next_id: u64,
    /// Every damage application, in order.
    pub damage_log: Vec<(EntityId, f32, DamageSource)>,
    /// Every outright removal, in order.
    pub removed: Vec<EntityId>,
}

impl MockEntities {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity at `pos` with the given bounding radius and health.
    pub fn insert(&mut self, pos: DVec3, radius: f64, health: f32) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            MockEntity {
                pos,
                vel: DVec3::ZERO,
                radius,
                health,
                alive: true,
            },
        );
        id
    }

    /// Ids of all living entities.
    pub fn alive_ids(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.alive)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Position without the trait's liveness caveats (test helper).
    pub fn position_of(&self, id: EntityId) -> DVec3 {
        self.entities.get(&id).map(|e| e.pos).unwrap_or(DVec3::ZERO)
    }

    /// Remaining health (0 when unknown).
    pub fn health_of(&self, id: EntityId) -> f32 {
        self.entities.get(&id).map(|e| e.health).unwrap_or(0.0)
    }

    /// Advance positions by one tick of current velocity.
    pub fn integrate(&mut self) {
        for entity in self.entities.values_mut() {
            if entity.alive {
                entity.pos += entity.vel;
            }
        }
    }
}

impl EntityOps for MockEntities {
    fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).map(|e| e.alive).unwrap_or(false)
    }

    fn position(&self, entity: EntityId) -> DVec3 {
        self.position_of(entity)
    }

    fn velocity(&self, entity: EntityId) -> DVec3 {
        self.entities
            .get(&entity)
            .map(|e| e.vel)
            .unwrap_or(DVec3::ZERO)
    }

    fn bounding_radius(&self, entity: EntityId) -> f64 {
        self.entities.get(&entity).map(|e| e.radius).unwrap_or(0.0)
    }

    fn apply_damage(&mut self, entity: EntityId, amount: f32, source: DamageSource) {
        self.damage_log.push((entity, amount, source));
        if let Some(e) = self.entities.get_mut(&entity) {
            e.health -= amount;
            if e.health <= 0.0 {
                e.alive = false;
            }
        }
    }

    fn apply_velocity(&mut self, entity: EntityId, delta: DVec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.vel += delta;
        }
    }

    fn remove_entity(&mut self, entity: EntityId) {
        self.removed.push(entity);
        if let Some(e) = self.entities.get_mut(&entity) {
            e.alive = false;
        }
    }
}
