//! Per-tick zone effects on entities: kill, damage, spiral and pull.

use crate::zone::{Zone, ZoneProfile};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use singularity_core::{DamageSource, EntityId, EntityOps};

/// Tuning for entity damage and forces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    /// Flat damage per tick inside the polar jet.
    pub jet_damage: f32,
    /// Photon sphere damage coefficient (times instance size).
    pub photon_damage: f32,
    /// Inner accretion damage coefficient (times instance size).
    pub inner_damage: f32,
    /// Outer accretion damage coefficient (times instance size).
    pub outer_damage: f32,
    /// Spiral force intensity in the photon sphere.
    pub photon_intensity: f64,
    /// Spiral force intensity in the inner band.
    pub inner_intensity: f64,
    /// Spiral force intensity in the outer band.
    pub outer_intensity: f64,
    /// Tangential (orbital) speed term, scaled by size and rotation speed.
    pub orbital_speed: f64,
    /// Radial inward pull term, scaled by size.
    pub radial_pull: f64,
    /// Damping factor applied to the summed spiral delta.
    pub damping: f64,
    /// Minimum distance used in force denominators. Keeps the math finite as
    /// an entity approaches the center.
    pub min_distance: f64,
    /// Inverse-square pull strength in the gravity well.
    pub gravity_pull: f64,
    /// Speed clamp is `max_speed_base + max_speed_per_size * size`.
    pub max_speed_base: f64,
    /// Per-size contribution to the speed clamp.
    pub max_speed_per_size: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            jet_damage: 12.0,
            photon_damage: 1.5,
            inner_damage: 0.8,
            outer_damage: 0.3,
            photon_intensity: 1.0,
            inner_intensity: 0.7,
            outer_intensity: 0.4,
            orbital_speed: 1.6,
            radial_pull: 1.2,
            damping: 0.85,
            min_distance: 0.5,
            gravity_pull: 2.0,
            max_speed_base: 0.6,
            max_speed_per_size: 0.25,
        }
    }
}

impl ForceConfig {
    /// Maximum entity speed after force application for an instance of `size`.
    pub fn max_speed(&self, size: f64) -> f64 {
        self.max_speed_base + self.max_speed_per_size * size
    }
}

/// What the force pass did to one entity. Returned for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceOutcome {
    /// Entity was inside the event horizon and removed outright.
    Removed,
    /// Entity was damaged (and, outside the jet, spiraled).
    Damaged(Zone),
    /// Entity was pulled by the gravity well without damage.
    Pulled,
    /// Entity was outside every zone.
    OutOfRange,
}

/// Apply one tick of zone effects to one entity.
///
/// Event horizon removal is unconditional (not damage-based) so nothing
/// survives it through invulnerability stacking. All other zones combine
/// zone-scaled damage with a spiral or pull velocity delta, and the resulting
/// speed is clamped to `cfg.max_speed(size)`.
pub fn apply_zone_effects<E: EntityOps>(
    center: DVec3,
    size: f64,
    rotation_speed: f64,
    entity: EntityId,
    ops: &mut E,
    cfg: &ForceConfig,
    profile: &ZoneProfile,
) -> ForceOutcome {
    let pos = ops.position(entity);
    let Some(zone) = profile.classify(center, size, pos) else {
        return ForceOutcome::OutOfRange;
    };

    match zone {
        Zone::EventHorizon => {
            ops.remove_entity(entity);
            ForceOutcome::Removed
        }
        Zone::PolarJet => {
            ops.apply_damage(entity, cfg.jet_damage, DamageSource::PolarJet);
            ForceOutcome::Damaged(Zone::PolarJet)
        }
        Zone::PhotonSphere | Zone::AccretionInner | Zone::AccretionOuter => {
            let (damage, intensity) = match zone {
                Zone::PhotonSphere => (cfg.photon_damage, cfg.photon_intensity),
                Zone::AccretionInner => (cfg.inner_damage, cfg.inner_intensity),
                _ => (cfg.outer_damage, cfg.outer_intensity),
            };
            ops.apply_damage(entity, damage * size as f32, DamageSource::Accretion);
            let delta = spiral_delta(pos - center, size, rotation_speed, cfg) * intensity;
            clamp_and_apply(ops, entity, delta, cfg.max_speed(size));
            ForceOutcome::Damaged(zone)
        }
        Zone::GravityWell => {
            let offset = pos - center;
            let dist = offset.length().max(cfg.min_distance);
            let delta = -offset / dist * (cfg.gravity_pull * size / (dist * dist));
            clamp_and_apply(ops, entity, delta, cfg.max_speed(size));
            ForceOutcome::Pulled
        }
    }
}

/// Tangential + radial decomposition producing a decaying-orbit delta.
fn spiral_delta(offset: DVec3, size: f64, rotation_speed: f64, cfg: &ForceConfig) -> DVec3 {
    let dist = offset.length().max(cfg.min_distance);
    let tangent_raw = DVec3::new(-offset.z, 0.0, offset.x);
    let tangent = if tangent_raw.length_squared() > 1e-9 {
        tangent_raw / tangent_raw.length()
    } else {
        DVec3::ZERO
    };
    let orbital = tangent * (cfg.orbital_speed * rotation_speed * size / dist);
    let inward = -offset / dist * (cfg.radial_pull * size / dist);
    (orbital + inward) * cfg.damping
}

/// Add `delta` to the entity's velocity, clamping the resulting speed.
fn clamp_and_apply<E: EntityOps>(ops: &mut E, entity: EntityId, delta: DVec3, max_speed: f64) {
    let current = ops.velocity(entity);
    let mut next = current + delta;
    let speed = next.length();
    if speed > max_speed && speed > 1e-9 {
        next *= max_speed / speed;
    }
    ops.apply_velocity(entity, next - current);
}
