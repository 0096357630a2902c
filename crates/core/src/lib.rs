#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod material;
pub mod math;
pub mod ports;

use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

// Re-export commonly used types
pub use material::MaterialKind;
pub use math::{Aabb, BlockPos};
pub use ports::{
    DamageSource, DimensionId, EffectBroadcast, EffectPayload, EntityId, EntityOps, InstanceId,
    WorldQuery,
};

/// Errors surfaced by the host-facing registry operations.
///
/// Everything the simulation classifies as an expected degrade (full queues,
/// stale block references, exhausted beam budgets) is handled locally and
/// never reaches this type.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Spawn was requested with a size outside the survivable range.
    #[error("spawn size {size} outside survivable range ({min}..={max})")]
    InvalidSize {
        /// Requested size.
        size: f64,
        /// Minimum size below which an instance expires.
        min: f64,
        /// Hard maximum size.
        max: f64,
    },
    /// Spawn was requested with a lifetime below -1 (the infinite sentinel).
    #[error("spawn lifetime {0} is invalid (-1 means infinite, otherwise >= 0)")]
    InvalidLifetime(i64),
    /// The referenced instance does not exist (expired, removed, or never spawned).
    #[error("unknown instance {0:?}")]
    UnknownInstance(InstanceId),
}

/// Helper to derive a reproducible RNG scoped by world seed + owner + tick.
///
/// Every stochastic decision in the simulation (destruction rolls, beam
/// splits) draws from an RNG built here so identical seeds replay identically.
pub fn scoped_rng(world_seed: u64, salt: u64, tick: u64) -> StdRng {
    let seed = world_seed ^ salt.rotate_left(17) ^ tick.rotate_left(37);
    StdRng::seed_from_u64(seed)
}
