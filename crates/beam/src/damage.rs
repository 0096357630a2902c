//! Segment-based damage application and the one-shot fire entry point.

use crate::trace::{trace, BeamParams, BeamSegment};
use glam::DVec3;
use rand::Rng;
use singularity_core::{
    Aabb, DamageSource, EffectBroadcast, EffectPayload, EntityId, EntityOps, WorldQuery,
};
use std::collections::HashSet;

/// One entity hit by a beam firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamHit {
    /// Entity that was hit.
    pub entity: EntityId,
    /// Damage dealt (the segment's energy at that point).
    pub damage: f64,
}

/// Apply a traced beam's segments to nearby entities.
///
/// Hit test is distance-to-midpoint bounded by half-length plus the entity's
/// radius -- a deliberately cheap capsule approximation. The region query is
/// the segment's own bounding box: any entity center passing the hit test
/// sits within `half_len + radius` of the midpoint per axis, so its bounding
/// box overlaps the region and `entities_in_region` must return it. Each
/// entity takes at most one hit per firing regardless of how many segments
/// graze it.
pub fn apply_beam_damage<W: WorldQuery, E: EntityOps>(
    world: &W,
    entities: &mut E,
    segments: &[BeamSegment],
) -> Vec<BeamHit> {
    let mut already_hit: HashSet<EntityId> = HashSet::new();
    let mut hits = Vec::new();
    for segment in segments {
        let mid = segment.midpoint();
        let half_len = segment.half_length();
        let region = Aabb::from_center_half_extents(mid, DVec3::splat(half_len));
        for entity in world.entities_in_region(&region) {
            if already_hit.contains(&entity) || !entities.is_alive(entity) {
                continue;
            }
            let radius = entities.bounding_radius(entity);
            if entities.position(entity).distance(mid) <= half_len + radius {
                entities.apply_damage(entity, segment.energy as f32, DamageSource::Beam);
                already_hit.insert(entity);
                hits.push(BeamHit {
                    entity,
                    damage: segment.energy,
                });
            }
        }
    }
    hits
}

/// Fire a beam: trace it, apply damage and notify observers.
///
/// Returns the traced segments so the caller can hand them to its renderer.
pub fn fire_beam<W, E, F, R>(
    world: &W,
    entities: &mut E,
    fx: &mut F,
    rng: &mut R,
    params: &BeamParams,
) -> Vec<BeamSegment>
where
    W: WorldQuery,
    E: EntityOps,
    F: EffectBroadcast,
    R: Rng,
{
    let segments = trace(world, rng, params);
    let hits = apply_beam_damage(world, entities, &segments);
    tracing::debug!(
        segments = segments.len(),
        hits = hits.len(),
        energy = params.energy,
        "beam fired"
    );
    fx.notify_near(
        params.origin,
        params.max_range,
        EffectPayload::BeamFired {
            segments: segments.len() as u32,
        },
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use singularity_core::scoped_rng;
    use singularity_testkit::{MockEntities, MockWorld, RecordingBroadcast};

    fn straight_segment(energy: f64) -> BeamSegment {
        BeamSegment {
            start: DVec3::new(0.0, 0.5, 0.5),
            end: DVec3::new(20.0, 0.5, 0.5),
            energy,
            bounces: 0,
            generation: 0,
            hit_block: false,
        }
    }

    #[test]
    fn entities_on_the_segment_take_its_energy_as_damage() {
        let mut world = MockWorld::new();
        let mut entities = MockEntities::new();
        let near = entities.insert(DVec3::new(5.0, 0.5, 0.5), 0.5, 100.0);
        let far = entities.insert(DVec3::new(19.0, 0.5, 0.5), 0.5, 100.0);
        let outside = entities.insert(DVec3::new(5.0, 30.0, 0.5), 0.5, 100.0);
        world.sync_entities(&entities);

        let hits = apply_beam_damage(&world, &mut entities, &[straight_segment(25.0)]);
        let hit_ids: Vec<EntityId> = hits.iter().map(|h| h.entity).collect();
        assert!(hit_ids.contains(&near));
        assert!(hit_ids.contains(&far));
        assert!(!hit_ids.contains(&outside));
        assert_eq!(entities.damage_log[0].1, 25.0);
    }

    #[test]
    fn one_hit_per_entity_per_firing() {
        // Two segments meeting at a bounce point; the entity sits inside both
        // capsules but must be damaged once.
        let mut world = MockWorld::new();
        let mut entities = MockEntities::new();
        let id = entities.insert(DVec3::new(10.0, 0.5, 0.5), 1.0, 100.0);
        world.sync_entities(&entities);

        let a = BeamSegment {
            start: DVec3::new(0.0, 0.5, 0.5),
            end: DVec3::new(10.5, 0.5, 0.5),
            energy: 25.0,
            bounces: 0,
            generation: 0,
            hit_block: true,
        };
        let b = BeamSegment {
            start: DVec3::new(10.5, 0.5, 0.5),
            end: DVec3::new(0.0, 0.5, 0.5),
            energy: 23.275,
            bounces: 1,
            generation: 0,
            hit_block: false,
        };
        let hits = apply_beam_damage(&world, &mut entities, &[a, b]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, id);
        assert_eq!(entities.damage_log.len(), 1);
    }

    #[test]
    fn large_entities_near_the_segment_box_edge_are_hit() {
        // The entity's center lies outside the segment's box; only its
        // bounding box overlaps it. The region query must still surface it.
        let mut world = MockWorld::new();
        let mut entities = MockEntities::new();
        let bulky = entities.insert(DVec3::new(5.0, 9.0, 0.5), 4.0, 100.0);
        world.sync_entities(&entities);

        let segment = BeamSegment {
            start: DVec3::new(0.0, 0.5, 0.5),
            end: DVec3::new(10.0, 0.5, 0.5),
            energy: 25.0,
            bounces: 0,
            generation: 0,
            hit_block: false,
        };
        // dist to midpoint (5, 0.5, 0.5) is 8.5 <= half_len 5 + radius 4.
        let hits = apply_beam_damage(&world, &mut entities, &[segment]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, bulky);
    }

    #[test]
    fn dead_entities_are_skipped() {
        let mut world = MockWorld::new();
        let mut entities = MockEntities::new();
        let id = entities.insert(DVec3::new(5.0, 0.5, 0.5), 0.5, 100.0);
        world.sync_entities(&entities);
        entities.remove_entity(id);

        let hits = apply_beam_damage(&world, &mut entities, &[straight_segment(25.0)]);
        assert!(hits.is_empty());
        assert!(entities.damage_log.is_empty());
    }

    #[test]
    fn fire_beam_damages_and_broadcasts() {
        let mut world = MockWorld::new();
        let mut entities = MockEntities::new();
        let id = entities.insert(DVec3::new(8.0, 0.5, 0.5), 0.5, 100.0);
        world.sync_entities(&entities);
        let mut fx = RecordingBroadcast::new();
        let mut rng = scoped_rng(11, 0, 0);

        let params = BeamParams::new(DVec3::new(0.5, 0.5, 0.5), DVec3::X, 25.0);
        let segments = fire_beam(&world, &mut entities, &mut fx, &mut rng, &params);
        assert!(!segments.is_empty());
        assert_eq!(fx.beam_count(), 1);
        assert_eq!(entities.damage_log.len(), 1);
        assert_eq!(entities.damage_log[0].0, id);
        assert_eq!(entities.damage_log[0].1, 25.0);
    }
}
