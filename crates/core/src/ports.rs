//! Injected collaborator interfaces and the identifiers threaded through them.
//!
//! The simulation never owns world state. Blocks, entities and observers all
//! belong to the host; these traits are the complete surface it must provide.
//! All mutations are applied directly and immediately (last-write-wins with
//! re-validation at consumption time) -- no transactions, no rollback.

use crate::material::MaterialKind;
use crate::math::{Aabb, BlockPos};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Stable identifier for a host world dimension.
///
/// Gameplay rules are dimension-scoped. Threading the identifier through the
/// core types lets the registry detect an instance bound to the wrong world
/// and evict it instead of corrupting state.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DimensionId(pub u16);

impl DimensionId {
    /// Default dimension used when the host does not distinguish worlds.
    pub const DEFAULT: Self = Self(0);
}

/// Host-side entity handle. Opaque to the simulation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

/// Identifier for one live singularity instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct InstanceId(pub u32);

/// Tag identifying what dealt damage, for host-side death messages/resistances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// Tidal damage inside the accretion disk or photon sphere.
    Accretion,
    /// Flat damage from the polar jet column.
    PolarJet,
    /// A reflected beam segment.
    Beam,
}

/// Fire-and-forget payloads pushed to nearby observers.
///
/// Best-effort UI sync only; the state of record stays on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectPayload {
    /// A singularity changed size (growth, decay or an explicit update).
    SingularitySize {
        /// Instance that changed.
        id: InstanceId,
        /// New size after clamping.
        size: f64,
    },
    /// A singularity expired or was removed.
    SingularityRemoved {
        /// Instance that went away.
        id: InstanceId,
    },
    /// A beam was fired; observers render the segment trail themselves.
    BeamFired {
        /// Number of segments the trace produced.
        segments: u32,
    },
}

/// Block-level queries and mutations against the host world.
pub trait WorldQuery {
    /// Dimension this world view belongs to.
    fn dimension(&self) -> DimensionId;

    /// Whether the block at `pos` occludes movement and beams.
    fn is_solid(&self, pos: BlockPos) -> bool;

    /// Material classification of the block at `pos`.
    fn material(&self, pos: BlockPos) -> MaterialKind;

    /// Remove the block at `pos` from the world.
    fn destroy_block(&mut self, pos: BlockPos);

    /// Spill an item drop for a destroyed block of `material` at `pos`.
    fn spawn_drops(&mut self, pos: BlockPos, material: MaterialKind);

    /// Entities whose bounding box intersects `region`.
    fn entities_in_region(&self, region: &Aabb) -> Vec<EntityId>;
}

/// Entity-level queries and mutations against the host entity store.
pub trait EntityOps {
    /// Whether the entity still exists and is alive.
    fn is_alive(&self, entity: EntityId) -> bool;

    /// Center position of the entity.
    fn position(&self, entity: EntityId) -> DVec3;

    /// Current velocity of the entity.
    fn velocity(&self, entity: EntityId) -> DVec3;

    /// Approximate bounding-sphere radius of the entity.
    fn bounding_radius(&self, entity: EntityId) -> f64;

    /// Deal `amount` damage attributed to `source`.
    fn apply_damage(&mut self, entity: EntityId, amount: f32, source: DamageSource);

    /// Add `delta` to the entity's velocity.
    fn apply_velocity(&mut self, entity: EntityId, delta: DVec3);

    /// Remove the entity outright, bypassing health and invulnerability.
    fn remove_entity(&mut self, entity: EntityId);
}

/// Best-effort visual/state sync to observers near a point.
pub trait EffectBroadcast {
    /// Notify observers within `radius` of `center`. No acknowledgement, no retry.
    fn notify_near(&mut self, center: DVec3, radius: f64, payload: EffectPayload);
}
