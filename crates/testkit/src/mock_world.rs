//! In-memory block store implementing [`WorldQuery`].

use crate::MockEntities;
use glam::DVec3;
use singularity_core::{Aabb, BlockPos, DimensionId, EntityId, EntityOps, MaterialKind, WorldQuery};
use std::collections::HashMap;

/// Sparse in-memory world. Absent coordinates read as air.
///
/// Entity positions and bounding radii are mirrored in via
/// [`MockWorld::sync_entities`] so the region query can honor the
/// bounding-box contract without holding a reference into the entity store.
#[derive(Debug, Default, Clone)]
pub struct MockWorld {
    dimension: DimensionId,
    blocks: HashMap<BlockPos, MaterialKind>,
    entity_bounds: Vec<(EntityId, DVec3, f64)>,
    /// Every coordinate destroyed through the trait, in order.
    pub destroyed: Vec<BlockPos>,
    /// Every drop spawned through the trait, in order.
    pub drops: Vec<(BlockPos, MaterialKind)>,
}

impl MockWorld {
    /// Empty world in the default dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty world bound to `dimension`.
    pub fn with_dimension(dimension: DimensionId) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    /// Place a block (or air, which clears the coordinate).
    pub fn set_block(&mut self, pos: BlockPos, material: MaterialKind) {
        if material == MaterialKind::Air {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, material);
        }
    }

    /// Fill the inclusive box `[min, max]` with `material`.
    pub fn fill_box(&mut self, min: BlockPos, max: BlockPos, material: MaterialKind) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_block(BlockPos::new(x, y, z), material);
                }
            }
        }
    }

    /// Remove every block.
    pub fn clear_all(&mut self) {
        self.blocks.clear();
    }

    /// Number of placed blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Mirror current entity positions and radii for the region query.
    pub fn sync_entities(&mut self, entities: &MockEntities) {
        self.entity_bounds = entities
            .alive_ids()
            .into_iter()
            .map(|id| (id, entities.position_of(id), entities.bounding_radius(id)))
            .collect();
    }
}

impl WorldQuery for MockWorld {
    fn dimension(&self) -> DimensionId {
        self.dimension
    }

    fn is_solid(&self, pos: BlockPos) -> bool {
        self.material(pos).is_solid()
    }

    fn material(&self, pos: BlockPos) -> MaterialKind {
        self.blocks.get(&pos).copied().unwrap_or(MaterialKind::Air)
    }

    fn destroy_block(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
        self.destroyed.push(pos);
    }

    fn spawn_drops(&mut self, pos: BlockPos, material: MaterialKind) {
        self.drops.push((pos, material));
    }

    fn entities_in_region(&self, region: &Aabb) -> Vec<EntityId> {
        self.entity_bounds
            .iter()
            .filter(|(_, pos, radius)| {
                Aabb::from_center_half_extents(*pos, DVec3::splat(*radius)).intersects(region)
            })
            .map(|(id, _, _)| *id)
            .collect()
    }
}
