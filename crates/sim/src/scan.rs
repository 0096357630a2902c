//! Resumable, budgeted block scan producing destruction candidates.
//!
//! The scan is the producer half of the erosion engine. It sweeps the bounding
//! volume of the largest zone in Y layers that alternate outward from the
//! center plane (0, +1, -1, +2, -2, ...), resuming mid-layer from a persisted
//! cursor so a fixed per-pass budget steadily advances an "erosion front"
//! instead of re-walking the volume from scratch every tick.

use crate::queue::{DestructionQueue, QueuedBlock};
use crate::zone::{Zone, ZoneProfile};
use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use singularity_core::{BlockPos, WorldQuery};

/// Tuning for the scan producer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Candidate positions examined per scan pass.
    pub budget: usize,
    /// Fixed destruction chance in the photon sphere.
    pub photon_sphere_chance: f64,
    /// Destruction chance at the inner accretion radius.
    pub accretion_inner_chance: f64,
    /// Destruction chance at the outer accretion radius. The chance between
    /// the two radii is a plain linear interpolation; the endpoints are
    /// hand-tuned constants, nothing more.
    pub accretion_outer_chance: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            budget: 150,
            photon_sphere_chance: 0.9,
            accretion_inner_chance: 0.8,
            accretion_outer_chance: 0.4,
        }
    }
}

/// Destruction probability for a classified point.
///
/// Deterministic in the event horizon and jet, fixed in the photon sphere,
/// interpolated across the accretion band, zero in the pull-only well.
pub fn destruction_chance(
    zone: Zone,
    dist: f64,
    scale: f64,
    profile: &ZoneProfile,
    cfg: &ScanConfig,
) -> f64 {
    match zone {
        Zone::EventHorizon | Zone::PolarJet => 1.0,
        Zone::PhotonSphere => cfg.photon_sphere_chance,
        Zone::AccretionInner | Zone::AccretionOuter => {
            let inner = profile.accretion_inner * scale;
            let outer = profile.accretion_outer * scale;
            let t = ((dist - inner) / (outer - inner)).clamp(0.0, 1.0);
            cfg.accretion_inner_chance + (cfg.accretion_outer_chance - cfg.accretion_inner_chance) * t
        }
        Zone::GravityWell => 0.0,
    }
}

/// Persisted progress marker for the volume sweep.
///
/// `layer` walks Y offsets outward with alternating sign; `cell` is the
/// flattened (x, z) index within the current layer. Both wrap when the volume
/// shrinks between passes (the instance decayed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCursor {
    layer: u32,
    cell: u32,
}

impl ScanCursor {
    /// Y offset for a layer index: 0, +1, -1, +2, -2, ...
    fn layer_to_y(layer: u32) -> i32 {
        if layer == 0 {
            0
        } else if layer % 2 == 1 {
            ((layer + 1) / 2) as i32
        } else {
            -((layer / 2) as i32)
        }
    }
}

/// Counters reported by one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Candidate positions examined (<= budget).
    pub examined: usize,
    /// Candidates accepted into the queue.
    pub offered: usize,
}

/// Run one budgeted scan pass, resuming from `cursor`.
///
/// Stops early when the queue fills: capacity rejection is silent
/// backpressure, the remaining volume simply waits for a later tick.
#[allow(clippy::too_many_arguments)]
pub fn scan_step<W: WorldQuery, R: Rng>(
    center: DVec3,
    scale: f64,
    cursor: &mut ScanCursor,
    queue: &mut DestructionQueue,
    world: &W,
    rng: &mut R,
    cfg: &ScanConfig,
    profile: &ZoneProfile,
) -> ScanStats {
    let center_block = BlockPos::from_point(center);
    // Horizontal reach: destruction only happens inside the outer radius.
    // Vertical reach additionally covers the jet column.
    let rh = (profile.accretion_outer * scale).ceil() as i32;
    let rv = (profile.jet_length.max(profile.accretion_outer) * scale).ceil() as i32;
    let row = (2 * rh + 1) as u32;
    let cells_per_layer = row * row;
    let total_layers = (2 * rv + 1) as u32;

    let mut stats = ScanStats::default();
    while stats.examined < cfg.budget {
        if queue.is_full() {
            break;
        }
        // Wrap against a shrunken volume or a completed sweep.
        if cursor.cell >= cells_per_layer {
            cursor.cell = 0;
            cursor.layer += 1;
        }
        if cursor.layer >= total_layers {
            *cursor = ScanCursor::default();
        }

        let dy = ScanCursor::layer_to_y(cursor.layer);
        let dx = (cursor.cell / row) as i32 - rh;
        let dz = (cursor.cell % row) as i32 - rh;
        cursor.cell += 1;
        stats.examined += 1;

        let pos = center_block.offset(dx, dy, dz);
        let point = pos.center();
        let Some(zone) = profile.classify(center, scale, point) else {
            continue;
        };
        let chance = destruction_chance(zone, point.distance(center), scale, profile, cfg);
        if chance <= 0.0 || !world.is_solid(pos) {
            continue;
        }
        let material = world.material(pos);
        if !material.is_destructible() {
            continue;
        }
        if rng.gen::<f64>() < chance {
            let accepted = queue.offer(QueuedBlock {
                pos,
                material,
                distance: point.distance(center),
            });
            if !accepted {
                break;
            }
            stats.offered += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use singularity_core::scoped_rng;
    use singularity_testkit::MockWorld;

    // Small profile so a full sweep fits in a few passes.
    fn small_profile() -> ZoneProfile {
        ZoneProfile {
            accretion_outer: 2.0,
            jet_length: 3.0,
            ..ZoneProfile::default()
        }
    }

    fn full_sweep(
        world: &MockWorld,
        queue: &mut DestructionQueue,
        profile: &ZoneProfile,
        passes: usize,
    ) -> ScanCursor {
        let mut cursor = ScanCursor::default();
        let mut rng = scoped_rng(1, 1, 1);
        for _ in 0..passes {
            scan_step(
                DVec3::new(0.5, 0.5, 0.5),
                1.0,
                &mut cursor,
                queue,
                world,
                &mut rng,
                &ScanConfig::default(),
                profile,
            );
        }
        cursor
    }

    #[test]
    fn horizon_blocks_are_always_queued() {
        let mut world = MockWorld::new();
        world.set_block(BlockPos::new(0, 0, 0), singularity_core::MaterialKind::Stone);
        let mut queue = DestructionQueue::new(200);
        // rh=2 -> 25 cells/layer, rv=3 -> 7 layers, 175 cells, 2 passes.
        full_sweep(&world, &mut queue, &small_profile(), 2);
        let polled = queue.poll_up_to(10);
        assert_eq!(polled.len(), 1);
        assert_eq!(polled[0].pos, BlockPos::new(0, 0, 0));
        assert!(polled[0].distance < 1e-9);
    }

    #[test]
    fn pass_examines_at_most_the_budget() {
        let mut world = MockWorld::new();
        world.fill_box(
            BlockPos::new(-3, -3, -3),
            BlockPos::new(3, 3, 3),
            singularity_core::MaterialKind::Stone,
        );
        let mut queue = DestructionQueue::new(500);
        let mut cursor = ScanCursor::default();
        let mut rng = scoped_rng(2, 2, 2);
        let stats = scan_step(
            DVec3::new(0.5, 0.5, 0.5),
            1.0,
            &mut cursor,
            &mut queue,
            &world,
            &mut rng,
            &ScanConfig::default(),
            &small_profile(),
        );
        assert!(stats.examined <= ScanConfig::default().budget);
        assert!(stats.offered <= stats.examined);
    }

    #[test]
    fn full_queue_stops_the_producer() {
        let mut world = MockWorld::new();
        world.fill_box(
            BlockPos::new(-2, -2, -2),
            BlockPos::new(2, 2, 2),
            singularity_core::MaterialKind::Stone,
        );
        let mut queue = DestructionQueue::new(3);
        full_sweep(&world, &mut queue, &small_profile(), 1);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn cursor_wraps_after_a_full_sweep() {
        let world = MockWorld::new(); // all air
        let mut queue = DestructionQueue::new(10);
        // 175 cells at budget 150: two passes finish the sweep and start over.
        let cursor = full_sweep(&world, &mut queue, &small_profile(), 2);
        // After wrapping, the cursor sits somewhere inside the first layers,
        // never past the end of the volume.
        assert!(cursor.layer < 7);
    }

    #[test]
    fn unbreakable_blocks_are_never_queued() {
        let mut world = MockWorld::new();
        world.set_block(
            BlockPos::new(0, 0, 0),
            singularity_core::MaterialKind::Unbreakable,
        );
        let mut queue = DestructionQueue::new(10);
        full_sweep(&world, &mut queue, &small_profile(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn accretion_chance_interpolates_between_radii() {
        let profile = ZoneProfile::default();
        let cfg = ScanConfig::default();
        let at_inner = destruction_chance(Zone::AccretionInner, 2.5, 1.0, &profile, &cfg);
        let midway = destruction_chance(Zone::AccretionOuter, 7.25, 1.0, &profile, &cfg);
        let at_outer = destruction_chance(Zone::AccretionOuter, 12.0, 1.0, &profile, &cfg);
        assert!((at_inner - 0.8).abs() < 1e-12);
        assert!((midway - 0.6).abs() < 1e-12);
        assert!((at_outer - 0.4).abs() < 1e-12);
        // Inside the inner radius the chance saturates at the inner endpoint.
        let saturated = destruction_chance(Zone::AccretionInner, 2.0, 1.0, &profile, &cfg);
        assert!((saturated - 0.8).abs() < 1e-12);
    }
}
