//! Recording implementation of [`EffectBroadcast`].

use glam::DVec3;
use singularity_core::{EffectBroadcast, EffectPayload, InstanceId};

/// Captures every broadcast for assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingBroadcast {
    /// Every notification: (center, radius, payload), in order.
    pub events: Vec<(DVec3, f64, EffectPayload)>,
}

impl RecordingBroadcast {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of removal notifications seen.
    pub fn removed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, _, p)| matches!(p, EffectPayload::SingularityRemoved { .. }))
            .count()
    }

    /// All size updates, in order.
    pub fn size_updates(&self) -> Vec<(InstanceId, f64)> {
        self.events
            .iter()
            .filter_map(|(_, _, p)| match p {
                EffectPayload::SingularitySize { id, size } => Some((*id, *size)),
                _ => None,
            })
            .collect()
    }

    /// Number of beam notifications seen.
    pub fn beam_count(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, _, p)| matches!(p, EffectPayload::BeamFired { .. }))
            .count()
    }
}

impl EffectBroadcast for RecordingBroadcast {
    fn notify_near(&mut self, center: DVec3, radius: f64, payload: EffectPayload) {
        self.events.push((center, radius, payload));
    }
}
