//! Top-level simulation tuning.

use crate::{ForceConfig, GrowthConfig, ScanConfig, ZoneProfile};
use serde::{Deserialize, Serialize};

/// Aggregated tuning for the whole simulation.
///
/// Hosts usually run `SimConfig::default()`; every constant is overridable so
/// tests and modded worlds can retune without recompiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Zone radius multipliers.
    pub zone: ZoneProfile,
    /// Growth/decay tuning.
    pub growth: GrowthConfig,
    /// Entity force and damage tuning.
    pub force: ForceConfig,
    /// Block scan tuning.
    pub scan: ScanConfig,
    /// Destruction queue capacity per instance.
    pub queue_capacity: usize,
    /// Blocks destroyed per instance per tick, at most.
    pub destroy_budget: usize,
    /// Block scans run every this many ticks (entity pass runs every tick).
    pub scan_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            zone: ZoneProfile::default(),
            growth: GrowthConfig::default(),
            force: ForceConfig::default(),
            scan: ScanConfig::default(),
            queue_capacity: 200,
            destroy_budget: 15,
            scan_interval_ticks: 3,
        }
    }
}
