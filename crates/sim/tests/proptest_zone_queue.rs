//! Property tests for zone classification, the destruction queue and the
//! entity force clamp.

use glam::DVec3;
use proptest::prelude::*;
use singularity_core::{BlockPos, EntityOps, MaterialKind};
use singularity_sim::{
    apply_zone_effects, destruction_chance, DestructionQueue, ForceConfig, ForceOutcome,
    QueuedBlock, ScanConfig, Zone, ZoneProfile,
};
use singularity_testkit::MockEntities;
use std::collections::VecDeque;

fn point() -> impl Strategy<Value = DVec3> {
    (-40.0..40.0f64, -40.0..40.0f64, -40.0..40.0f64)
        .prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

proptest! {
    #[test]
    fn radial_zone_index_is_monotonic_in_distance(
        a in point(),
        b in point(),
        scale in 0.6..3.0f64,
    ) {
        let profile = ZoneProfile::default();
        let za = profile.classify(DVec3::ZERO, scale, a);
        let zb = profile.classify(DVec3::ZERO, scale, b);
        // The jet is a cylinder, not a shell, so it is exempt from the radial
        // ordering.
        if let (Some(za), Some(zb)) = (za, zb) {
            if za != Zone::PolarJet && zb != Zone::PolarJet && a.length() < b.length() {
                prop_assert!(
                    za.index() <= zb.index(),
                    "{za:?} at {} vs {zb:?} at {}",
                    a.length(),
                    b.length()
                );
            }
        }
    }

    #[test]
    fn every_point_inside_the_jet_cylinder_is_jet(
        scale in 0.6..3.0f64,
        frac_y in 0.001..1.0f64,
        frac_r in 0.0..1.0f64,
        angle in 0.0..std::f64::consts::TAU,
        below in any::<bool>(),
    ) {
        let profile = ZoneProfile::default();
        let horizon = profile.event_horizon * scale;
        let mut y = horizon + frac_y * (profile.jet_length * scale - horizon);
        if below {
            y = -y;
        }
        let r = frac_r * profile.jet_width * scale;
        let p = DVec3::new(r * angle.cos(), y, r * angle.sin());
        prop_assert_eq!(
            profile.classify(DVec3::ZERO, scale, p),
            Some(Zone::PolarJet)
        );
    }

    #[test]
    fn destruction_chance_is_a_probability_and_decays_outward(
        d1 in 0.0..100.0f64,
        d2 in 0.0..100.0f64,
        scale in 0.5..20.0f64,
    ) {
        let profile = ZoneProfile::default();
        let cfg = ScanConfig::default();
        for zone in [
            Zone::EventHorizon,
            Zone::PhotonSphere,
            Zone::AccretionInner,
            Zone::AccretionOuter,
            Zone::PolarJet,
            Zone::GravityWell,
        ] {
            let c = destruction_chance(zone, d1, scale, &profile, &cfg);
            prop_assert!((0.0..=1.0).contains(&c));
        }
        let near = destruction_chance(Zone::AccretionOuter, d1.min(d2), scale, &profile, &cfg);
        let far = destruction_chance(Zone::AccretionOuter, d1.max(d2), scale, &profile, &cfg);
        prop_assert!(near >= far);
    }

    #[test]
    fn queue_respects_capacity_and_fifo_order(
        cap in 1usize..32,
        ops in prop::collection::vec((any::<bool>(), 0usize..8), 1..200),
    ) {
        let mut queue = DestructionQueue::new(cap);
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut next_seq = 0i32;
        for (offer, n) in ops {
            if offer {
                let accepted = queue.offer(QueuedBlock {
                    pos: BlockPos::new(next_seq, 0, 0),
                    material: MaterialKind::Stone,
                    distance: 1.0,
                });
                prop_assert_eq!(accepted, model.len() < cap);
                if accepted {
                    model.push_back(next_seq);
                }
                next_seq += 1;
            } else {
                let polled = queue.poll_up_to(n);
                prop_assert!(polled.len() <= n);
                for block in polled {
                    prop_assert_eq!(Some(block.pos.x), model.pop_front());
                }
            }
            prop_assert!(queue.len() <= queue.capacity());
            prop_assert_eq!(queue.len(), model.len());
        }
    }

    #[test]
    fn forced_entities_never_exceed_the_speed_clamp(
        pos in point(),
        vel in point(),
        size in 0.6..5.0f64,
    ) {
        let cfg = ForceConfig::default();
        let mut entities = MockEntities::new();
        let id = entities.insert(pos, 0.5, 1.0e9);
        entities.apply_velocity(id, vel * 0.1);
        let before = entities.velocity(id);

        let outcome = apply_zone_effects(
            DVec3::ZERO,
            size,
            1.0,
            id,
            &mut entities,
            &cfg,
            &ZoneProfile::default(),
        );
        match outcome {
            ForceOutcome::Removed => prop_assert!(!entities.is_alive(id)),
            // The jet damages without force; out of range touches nothing.
            ForceOutcome::Damaged(Zone::PolarJet) | ForceOutcome::OutOfRange => {
                prop_assert_eq!(entities.velocity(id), before);
            }
            _ => {
                let v = entities.velocity(id);
                prop_assert!(v.is_finite());
                prop_assert!(v.length() <= cfg.max_speed(size) + 1e-9);
            }
        }
    }
}
