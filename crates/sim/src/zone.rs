//! Radial zone model around a singularity.
//!
//! Zones are derived purely from the offset between the singularity center and
//! a query point; nothing is cached or persisted. Block-scan and entity passes
//! classify through the same function so gameplay and visuals agree exactly.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Named spatial region around a singularity, ordered by distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Innermost sphere. Blocks always destroyed; entities always removed.
    EventHorizon,
    /// Thin shell outside the horizon with intense damage and pull.
    PhotonSphere,
    /// Inner accretion band.
    AccretionInner,
    /// Outer accretion band.
    AccretionOuter,
    /// Vertical jet column above and below the horizon. Cylinder test,
    /// checked before the radial zones.
    PolarJet,
    /// Pull-only skirt beyond the outer band. No damage, no destruction.
    GravityWell,
}

impl Zone {
    /// Distance ordering for the radial zones (event horizon = 0, gravity
    /// well = 5). The jet sits between the outer band and the well because it
    /// reaches past both.
    pub fn index(self) -> u8 {
        match self {
            Zone::EventHorizon => 0,
            Zone::PhotonSphere => 1,
            Zone::AccretionInner => 2,
            Zone::AccretionOuter => 3,
            Zone::PolarJet => 4,
            Zone::GravityWell => 5,
        }
    }
}

/// Per-zone radius multiplier table. Radii scale linearly with instance size.
///
/// The host renderer assumes these exact multipliers; changing them changes
/// both gameplay and visuals in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneProfile {
    /// Event horizon radius multiplier.
    pub event_horizon: f64,
    /// Photon sphere radius multiplier.
    pub photon_sphere: f64,
    /// Inner accretion band radius multiplier.
    pub accretion_inner: f64,
    /// Outer accretion band radius multiplier.
    pub accretion_outer: f64,
    /// Polar jet half-length multiplier (vertical reach per direction).
    pub jet_length: f64,
    /// Polar jet radius multiplier (horizontal cylinder width).
    pub jet_width: f64,
    /// Gravity well extends to `accretion_outer * gravity_well_skirt`.
    pub gravity_well_skirt: f64,
}

impl Default for ZoneProfile {
    fn default() -> Self {
        Self {
            event_horizon: 1.0,
            photon_sphere: 1.5,
            accretion_inner: 2.5,
            accretion_outer: 12.0,
            jet_length: 20.0,
            jet_width: 0.8,
            gravity_well_skirt: 1.3,
        }
    }
}

impl ZoneProfile {
    /// Largest radius at which the singularity has any effect at all.
    pub fn max_reach(&self, scale: f64) -> f64 {
        (self.accretion_outer * self.gravity_well_skirt).max(self.jet_length) * scale
    }

    /// Classify a point relative to a singularity of the given scale.
    ///
    /// The jet cylinder is tested first and wins over any radial zone. Its
    /// vertical test is strict (`|dy| > event_horizon`), so a thin shell
    /// directly above the horizon surface is radial-zone territory, not jet.
    pub fn classify(&self, center: DVec3, scale: f64, point: DVec3) -> Option<Zone> {
        let offset = point - center;
        let vertical = offset.y.abs();
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();

        let horizon = self.event_horizon * scale;
        if vertical > horizon
            && vertical <= self.jet_length * scale
            && horizontal <= self.jet_width * scale
        {
            return Some(Zone::PolarJet);
        }

        let dist = offset.length();
        let outer = self.accretion_outer * scale;
        if dist <= horizon {
            Some(Zone::EventHorizon)
        } else if dist <= self.photon_sphere * scale {
            Some(Zone::PhotonSphere)
        } else if dist <= self.accretion_inner * scale {
            Some(Zone::AccretionInner)
        } else if dist <= outer {
            Some(Zone::AccretionOuter)
        } else if dist <= outer * self.gravity_well_skirt {
            Some(Zone::GravityWell)
        } else {
            None
        }
    }
}
