//! Feed-driven growth and starvation decay.

use serde::{Deserialize, Serialize};
use singularity_core::MaterialKind;

/// Tuning for growth on consumption and decay under starvation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Base growth per consumed block before size and material scaling.
    pub base_rate: f64,
    /// Growth scales by `1 + size * size_scaling`: big holes grow faster.
    pub size_scaling: f64,
    /// Lifetime ticks gained per consumed block, times the material multiplier.
    pub lifetime_bonus: f64,
    /// Ticks without a feed before decay starts.
    pub decay_timeout_ticks: u32,
    /// Decay per starved tick is `decay_rate * max(decay_size_floor, size)`.
    pub decay_rate: f64,
    /// Floor for the size term in the decay formula.
    pub decay_size_floor: f64,
    /// Lifetime ticks lost per starved-decay tick.
    pub lifetime_decay: i64,
    /// Size-update broadcast cadence while being fed.
    pub fed_broadcast_interval: u32,
    /// Size-update broadcast cadence while decaying (slower).
    pub starved_broadcast_interval: u32,
    /// Size at or below which the instance is considered expired.
    pub min_size: f64,
    /// Hard size ceiling.
    pub max_size: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.02,
            size_scaling: 0.8,
            lifetime_bonus: 40.0,
            decay_timeout_ticks: 100,
            decay_rate: 0.01,
            decay_size_floor: 0.5,
            lifetime_decay: 10,
            fed_broadcast_interval: 20,
            starved_broadcast_interval: 40,
            min_size: 0.5,
            max_size: 20.0,
        }
    }
}

/// Whether a lifetime value means "never expires by age".
pub fn is_infinite_lifetime(lifetime: i64) -> bool {
    lifetime < 0
}

/// Tracks feed events and drives size growth and starvation decay.
///
/// Operates on the size/lifetime fields the instance owns; the controller only
/// keeps the counters. It never talks to the broadcast trait itself -- `tick`
/// returns whether the caller should push a size update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthDecayController {
    cfg: GrowthConfig,
    time_since_fed: u32,
    ticks_since_broadcast: u32,
}

impl GrowthDecayController {
    /// Create a controller in the freshly-fed state.
    pub fn new(cfg: GrowthConfig) -> Self {
        Self {
            cfg,
            time_since_fed: 0,
            ticks_since_broadcast: 0,
        }
    }

    /// Ticks since the last successful feed.
    pub fn time_since_fed(&self) -> u32 {
        self.time_since_fed
    }

    /// Credit one consumed block of `material`. Returns the applied growth.
    ///
    /// Size is clamped to the hard maximum; finite lifetimes gain a
    /// material-weighted bonus; the starvation counter resets.
    pub fn on_fed(&mut self, size: &mut f64, lifetime: &mut i64, material: MaterialKind) -> f64 {
        let mult = material.growth_multiplier();
        let growth = self.cfg.base_rate * (1.0 + *size * self.cfg.size_scaling) * mult;
        *size = (*size + growth).min(self.cfg.max_size);
        if !is_infinite_lifetime(*lifetime) {
            *lifetime += (self.cfg.lifetime_bonus * mult).round() as i64;
        }
        self.time_since_fed = 0;
        growth
    }

    /// Advance one tick. `fed` is whether any block was consumed this tick.
    ///
    /// Returns `true` when the caller should broadcast a size update: every
    /// `fed_broadcast_interval` ticks while fed, every
    /// `starved_broadcast_interval` ticks while decaying. Decay never takes
    /// size below `min_size` or a finite lifetime below zero.
    pub fn tick(&mut self, fed: bool, size: &mut f64, lifetime: &mut i64) -> bool {
        self.ticks_since_broadcast += 1;
        if fed {
            if self.ticks_since_broadcast >= self.cfg.fed_broadcast_interval {
                self.ticks_since_broadcast = 0;
                return true;
            }
            return false;
        }

        self.time_since_fed += 1;
        if self.time_since_fed <= self.cfg.decay_timeout_ticks {
            return false;
        }

        let decay = self.cfg.decay_rate * size.max(self.cfg.decay_size_floor);
        *size = (*size - decay).max(self.cfg.min_size);
        if !is_infinite_lifetime(*lifetime) {
            *lifetime = (*lifetime - self.cfg.lifetime_decay).max(0);
        }
        if self.ticks_since_broadcast >= self.cfg.starved_broadcast_interval {
            self.ticks_since_broadcast = 0;
            return true;
        }
        false
    }
}
