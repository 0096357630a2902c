//! Stepped raycasting with reflection, attenuation and probabilistic splits.

use glam::{DQuat, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use singularity_core::{BlockPos, WorldQuery};
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

/// Parameters for one beam firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamParams {
    /// Firing position.
    pub origin: DVec3,
    /// Firing direction (normalized before use).
    pub direction: DVec3,
    /// Initial energy; also the damage a segment deals at full strength.
    pub energy: f64,
    /// Trace ends when energy falls below this.
    pub min_energy: f64,
    /// Fraction of energy kept per bounce before material reflectivity.
    pub energy_retention: f64,
    /// Reflectivity below which a surface absorbs the beam outright.
    pub absorb_threshold: f64,
    /// Maximum reflections per beam.
    pub max_bounces: u32,
    /// Maximum total path length per beam.
    pub max_range: f64,
    /// Wall-clock budget for the whole trace, splits included. The trace must
    /// finish inside the calling tick; this is the hard safety valve against
    /// pathological geometry.
    pub time_budget: Duration,
    /// Base march step; shrinks as bounces accumulate.
    pub base_step: f64,
    /// Split probability on a significant bounce of a primary beam.
    pub split_chance_primary: f64,
    /// Split probability for beams that are themselves split children.
    pub split_chance_child: f64,
    /// Bounces only split while energy is above this.
    pub split_energy_threshold: f64,
    /// Angular divergence of a split child, radians.
    pub split_divergence: f64,
    /// Split-depth cap. The primary safety bound on branching.
    pub max_generations: u32,
    /// Segment cap per beam.
    pub max_segments_per_beam: usize,
    /// Segment ceiling across the whole trace, splits included.
    pub max_segments_total: usize,
    /// Visited-block exclusion set is cleared past this size.
    pub visited_cap: usize,
}

impl BeamParams {
    /// Parameters with the standard budgets for a beam fired from `origin`
    /// along `direction` with the given initial energy.
    pub fn new(origin: DVec3, direction: DVec3, energy: f64) -> Self {
        Self {
            origin,
            direction,
            energy,
            min_energy: 1.0,
            energy_retention: 0.98,
            absorb_threshold: 0.05,
            max_bounces: 6,
            max_range: 64.0,
            time_budget: Duration::from_millis(5),
            base_step: 0.5,
            split_chance_primary: 0.30,
            split_chance_child: 0.12,
            split_energy_threshold: 8.0,
            split_divergence: 0.12,
            max_generations: 3,
            max_segments_per_beam: 32,
            max_segments_total: 128,
            visited_cap: 64,
        }
    }
}

/// One straight piece of a traced beam, consumed by the damage pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSegment {
    /// Segment start point.
    pub start: DVec3,
    /// Segment end point (impact point when `hit_block`).
    pub end: DVec3,
    /// Beam energy along this segment.
    pub energy: f64,
    /// Reflections before this segment.
    pub bounces: u32,
    /// Split depth of the owning beam (0 = primary).
    pub generation: u32,
    /// Whether the segment ended on a solid surface.
    pub hit_block: bool,
}

impl BeamSegment {
    /// Segment midpoint.
    pub fn midpoint(&self) -> DVec3 {
        (self.start + self.end) * 0.5
    }

    /// Half the segment length.
    pub fn half_length(&self) -> f64 {
        self.start.distance(self.end) * 0.5
    }
}

/// Transient traversal state for one beam (primary or split child).
struct BeamState {
    pos: DVec3,
    dir: DVec3,
    energy: f64,
    bounces: u32,
    generation: u32,
    range_left: f64,
    segment_start: DVec3,
    visited: HashSet<BlockPos>,
    split_lineage: bool,
}

impl BeamState {
    fn segment_to(&self, end: DVec3, hit_block: bool) -> Option<BeamSegment> {
        if self.segment_start.distance_squared(end) < 1e-12 {
            return None;
        }
        Some(BeamSegment {
            start: self.segment_start,
            end,
            energy: self.energy,
            bounces: self.bounces,
            generation: self.generation,
            hit_block,
        })
    }
}

/// Specular reflection of `dir` off a surface with (unit) normal `normal`.
pub fn reflect(dir: DVec3, normal: DVec3) -> DVec3 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// A solid surface struck during one march step.
struct FaceHit {
    block: BlockPos,
    axis: usize,
    point: DVec3,
}

/// First solid cell the ray crosses into between `prev` and `prev + dir * step`.
///
/// A sampled step only proves it ended inside something solid; the surface
/// actually struck is found by walking the cell-boundary crossings of the
/// step in ray order and stopping at the first solid cell entered. Cells in
/// `exclude` are passed through (the cell a beam just reflected off). The
/// step never exceeds one cell, so at most one boundary per axis is crossed.
fn entry_hit<W: WorldQuery>(
    world: &W,
    exclude: &HashSet<BlockPos>,
    prev: DVec3,
    dir: DVec3,
    step: f64,
) -> Option<FaceHit> {
    let start = BlockPos::from_point(prev);
    let mut crossings = [(f64::INFINITY, 0usize); 3];
    let mut n = 0;
    for axis in 0..3 {
        if dir[axis] == 0.0 {
            continue;
        }
        let cell = match axis {
            0 => start.x,
            1 => start.y,
            _ => start.z,
        } as f64;
        let boundary = if dir[axis] > 0.0 { cell + 1.0 } else { cell };
        let t = (boundary - prev[axis]) / dir[axis];
        if (0.0..=step).contains(&t) {
            crossings[n] = (t, axis);
            n += 1;
        }
    }
    crossings[..n].sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut block = start;
    for &(t, axis) in &crossings[..n] {
        let toward = if dir[axis] > 0.0 { 1 } else { -1 };
        block = match axis {
            0 => block.offset(toward, 0, 0),
            1 => block.offset(0, toward, 0),
            _ => block.offset(0, 0, toward),
        };
        if !exclude.contains(&block) && world.is_solid(block) {
            return Some(FaceHit {
                block,
                axis,
                point: prev + dir * t,
            });
        }
    }
    None
}

/// Axis with the largest direction magnitude.
fn dominant_axis(dir: DVec3) -> usize {
    if dir.x.abs() >= dir.y.abs() && dir.x.abs() >= dir.z.abs() {
        0
    } else if dir.y.abs() >= dir.z.abs() {
        1
    } else {
        2
    }
}

/// Rotate `dir` by `angle` about an axis perpendicular to it, with a random
/// sign, producing the diverging direction of a split child.
fn diverge<R: Rng>(dir: DVec3, angle: f64, rng: &mut R) -> DVec3 {
    let mut axis = dir.cross(DVec3::Y);
    if axis.length_squared() < 1e-9 {
        axis = dir.cross(DVec3::X);
    }
    let axis = axis.normalize();
    let signed = if rng.gen::<bool>() { angle } else { -angle };
    (DQuat::from_axis_angle(axis, signed) * dir).normalize()
}

/// Trace a beam through the world, producing damage-ready segments.
///
/// Breadth-first over the beam and its split children. Stops producing
/// segments (never errors) when any budget is exhausted: per-beam segments,
/// the global segment ceiling, bounces, range, minimum energy, generation
/// depth or the wall-clock deadline.
pub fn trace<W: WorldQuery, R: Rng>(world: &W, rng: &mut R, params: &BeamParams) -> Vec<BeamSegment> {
    let deadline = Instant::now() + params.time_budget;
    let dir = params.direction.normalize_or_zero();
    if dir == DVec3::ZERO || params.energy < params.min_energy {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut work = VecDeque::new();
    work.push_back(BeamState {
        pos: params.origin,
        dir,
        energy: params.energy,
        bounces: 0,
        generation: 0,
        range_left: params.max_range,
        segment_start: params.origin,
        visited: HashSet::new(),
        split_lineage: false,
    });

    'beams: while let Some(mut beam) = work.pop_front() {
        let mut beam_segments = 0usize;
        loop {
            if segments.len() >= params.max_segments_total {
                break 'beams;
            }
            if Instant::now() >= deadline {
                segments.extend(beam.segment_to(beam.pos, false));
                tracing::debug!(segments = segments.len(), "beam trace hit the time budget");
                break 'beams;
            }
            if beam.energy < params.min_energy
                || beam.range_left <= 0.0
                || beam_segments >= params.max_segments_per_beam
            {
                segments.extend(beam.segment_to(beam.pos, false));
                break;
            }

            // Shrink the step as bounces accumulate to keep reflection points
            // accurate near surfaces.
            let step = (params.base_step / (1.0 + 0.25 * beam.bounces as f64))
                .min(beam.range_left)
                .max(1e-3);
            let prev = beam.pos;
            beam.pos += beam.dir * step;
            beam.range_left -= step;

            let sampled = BlockPos::from_point(beam.pos);
            if beam.visited.len() > params.visited_cap {
                beam.visited.clear();
            }
            if beam.visited.contains(&sampled) || !world.is_solid(sampled) {
                continue;
            }

            // Recover the actual surface struck during the step; the sampled
            // cell may lie past it on an oblique path.
            let (block, axis, impact) =
                match entry_hit(world, &beam.visited, prev, beam.dir, step) {
                    Some(hit) => (hit.block, hit.axis, hit.point),
                    // No boundary crossed: the beam started inside this cell.
                    None => (sampled, dominant_axis(beam.dir), beam.pos),
                };

            // Impact: close the current segment at the surface.
            segments.extend(beam.segment_to(impact, true));
            beam_segments += 1;

            let reflectivity = world.material(block).reflectivity();
            if reflectivity < params.absorb_threshold {
                break; // absorbed
            }
            beam.energy *= params.energy_retention * reflectivity;
            beam.bounces += 1;
            if beam.energy < params.min_energy || beam.bounces > params.max_bounces {
                break;
            }

            let mut normal = DVec3::ZERO;
            normal[axis] = -beam.dir[axis].signum();
            beam.dir = reflect(beam.dir, normal);
            // Step back out of the surface before continuing.
            beam.pos = prev;
            beam.segment_start = prev;
            beam.visited.insert(block);

            // Significant bounces may fork a diverging child with half the
            // energy. Child beams split again at a reduced chance; the
            // generation cap is the real bound on branching.
            if beam.energy > params.split_energy_threshold
                && beam.generation < params.max_generations
            {
                let chance = if beam.split_lineage {
                    params.split_chance_child
                } else {
                    params.split_chance_primary
                };
                if rng.gen::<f64>() < chance {
                    beam.energy *= 0.5;
                    work.push_back(BeamState {
                        pos: beam.pos,
                        dir: diverge(beam.dir, params.split_divergence, rng),
                        energy: beam.energy,
                        bounces: beam.bounces,
                        generation: beam.generation + 1,
                        range_left: beam.range_left,
                        segment_start: beam.pos,
                        visited: HashSet::new(),
                        split_lineage: true,
                    });
                    beam.split_lineage = true;
                }
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use singularity_core::{scoped_rng, MaterialKind};
    use singularity_testkit::MockWorld;

    fn origin() -> DVec3 {
        DVec3::new(0.5, 0.5, 0.5)
    }

    /// Glass wall filling the x = at plane across y/z [-4, 4].
    fn wall(world: &mut MockWorld, at: i32, material: MaterialKind) {
        world.fill_box(BlockPos::new(at, -4, -4), BlockPos::new(at, 4, 4), material);
    }

    fn trace_with_seed(world: &MockWorld, params: &BeamParams, seed: u64) -> Vec<BeamSegment> {
        let mut rng = scoped_rng(seed, 0, 0);
        trace(world, &mut rng, params)
    }

    #[test]
    fn open_space_is_one_full_range_segment() {
        let world = MockWorld::new();
        let params = BeamParams::new(origin(), DVec3::X, 25.0);
        let segments = trace_with_seed(&world, &params, 1);
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].hit_block);
        assert_eq!(segments[0].energy, 25.0);
        let length = segments[0].start.distance(segments[0].end);
        assert!((length - params.max_range).abs() < params.base_step + 1e-9);
    }

    #[test]
    fn glass_bounce_attenuates_exactly() {
        // energy 25, retention 0.98, glass reflectivity 0.95:
        // post-bounce energy = 25 * 0.98 * 0.95 = 23.275.
        let mut world = MockWorld::new();
        wall(&mut world, 6, MaterialKind::Glass);
        let mut params = BeamParams::new(origin(), DVec3::X, 25.0);
        params.split_chance_primary = 0.0; // isolate the bounce
        let segments = trace_with_seed(&world, &params, 2);
        assert!(segments.len() >= 2);
        assert!(segments[0].hit_block);
        assert_eq!(segments[0].energy, 25.0);
        assert!((segments[1].energy - 23.275).abs() < 1e-9);
        assert_eq!(segments[1].bounces, 1);
    }

    #[test]
    fn reflection_is_specular_off_axis_aligned_faces() {
        let mut world = MockWorld::new();
        wall(&mut world, 6, MaterialKind::Glass);
        let dir = DVec3::new(1.0, 0.0, 0.3).normalize();
        let mut params = BeamParams::new(origin(), dir, 25.0);
        params.split_chance_primary = 0.0;
        let segments = trace_with_seed(&world, &params, 3);
        assert!(segments.len() >= 2);
        let d_in = (segments[0].end - segments[0].start).normalize();
        let d_out = (segments[1].end - segments[1].start).normalize();
        // Wall face normal is -X: the incoming/outgoing normal components
        // mirror and the tangential components are preserved.
        let n = DVec3::new(-1.0, 0.0, 0.0);
        assert!((d_in.dot(n) + d_out.dot(n)).abs() < 1e-9);
        assert!((d_in.z - d_out.z).abs() < 1e-9);
        assert!((d_in.y - d_out.y).abs() < 1e-9);
    }

    #[test]
    fn oblique_hits_reflect_about_the_wall_face() {
        // A mostly +x beam grazing a z-facing wall crosses the x and z cell
        // boundaries in the same step; the wall face must still win, so only
        // the z component mirrors.
        let mut world = MockWorld::new();
        world.fill_box(
            BlockPos::new(-1, -4, 3),
            BlockPos::new(60, 4, 3),
            MaterialKind::Glass,
        );
        let dir = DVec3::new(1.0, 0.0, 0.45).normalize();
        let mut params = BeamParams::new(origin(), dir, 25.0);
        params.split_chance_primary = 0.0;
        let segments = trace_with_seed(&world, &params, 11);
        assert!(segments.len() >= 2);
        assert!(segments[0].hit_block);
        // Impact sits on the wall surface, not inside the sampled cell.
        assert!((segments[0].end.z - 3.0).abs() < 1e-9);
        let d_in = (segments[0].end - segments[0].start).normalize();
        let d_out = (segments[1].end - segments[1].start).normalize();
        assert!((d_in.x - d_out.x).abs() < 1e-9);
        assert!((d_in.z + d_out.z).abs() < 1e-9);
    }

    #[test]
    fn soft_materials_absorb_the_beam() {
        let mut world = MockWorld::new();
        wall(&mut world, 6, MaterialKind::Soil);
        let params = BeamParams::new(origin(), DVec3::X, 25.0);
        let segments = trace_with_seed(&world, &params, 4);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].hit_block);
    }

    #[test]
    fn total_segment_ceiling_holds_in_a_mirror_box() {
        let mut world = MockWorld::new();
        // A closed glass box around the origin.
        world.fill_box(BlockPos::new(-5, -5, -5), BlockPos::new(5, 5, 5), MaterialKind::Glass);
        world.fill_box(BlockPos::new(-4, -4, -4), BlockPos::new(4, 4, 4), MaterialKind::Air);
        let mut params = BeamParams::new(origin(), DVec3::new(1.0, 0.3, 0.2).normalize(), 500.0);
        params.split_chance_primary = 1.0;
        params.split_chance_child = 1.0;
        params.max_bounces = 64;
        params.max_segments_total = 16;
        params.time_budget = Duration::from_millis(250);
        let segments = trace_with_seed(&world, &params, 5);
        assert!(segments.len() <= 16);
    }

    #[test]
    fn bounce_cap_is_respected() {
        let mut world = MockWorld::new();
        wall(&mut world, 6, MaterialKind::Glass);
        wall(&mut world, -6, MaterialKind::Glass);
        let mut params = BeamParams::new(origin(), DVec3::X, 1000.0);
        params.split_chance_primary = 0.0;
        params.max_bounces = 2;
        let segments = trace_with_seed(&world, &params, 6);
        assert!(segments.iter().all(|s| s.bounces <= 2));
    }

    #[test]
    fn energy_never_increases_along_the_trace() {
        let mut world = MockWorld::new();
        wall(&mut world, 6, MaterialKind::Glass);
        wall(&mut world, -6, MaterialKind::Ice);
        let params = BeamParams::new(origin(), DVec3::X, 60.0);
        let segments = trace_with_seed(&world, &params, 7);
        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| s.energy <= 60.0 && s.energy > 0.0));
    }

    #[test]
    fn zero_time_budget_degrades_to_at_most_one_segment() {
        let mut world = MockWorld::new();
        world.fill_box(BlockPos::new(-5, -5, -5), BlockPos::new(5, 5, 5), MaterialKind::Glass);
        world.fill_box(BlockPos::new(-4, -4, -4), BlockPos::new(4, 4, 4), MaterialKind::Air);
        let mut params = BeamParams::new(origin(), DVec3::X, 100.0);
        params.time_budget = Duration::ZERO;
        let segments = trace_with_seed(&world, &params, 8);
        assert!(segments.len() <= 1);
    }

    #[test]
    fn split_children_carry_a_higher_generation() {
        let mut world = MockWorld::new();
        wall(&mut world, 6, MaterialKind::Glass);
        wall(&mut world, -6, MaterialKind::Glass);
        let mut params = BeamParams::new(origin(), DVec3::X, 400.0);
        params.split_chance_primary = 1.0;
        params.split_chance_child = 1.0;
        let segments = trace_with_seed(&world, &params, 9);
        assert!(segments.iter().any(|s| s.generation > 0));
        assert!(segments.iter().all(|s| s.generation <= params.max_generations));
    }

    #[test]
    fn reflect_matches_the_specular_identity() {
        let d = DVec3::new(0.8, -0.6, 0.0);
        let n = DVec3::Y;
        let r = reflect(d, n);
        assert!((r - DVec3::new(0.8, 0.6, 0.0)).length() < 1e-12);
        assert!((d.dot(n) + r.dot(n)).abs() < 1e-12);
    }
}
