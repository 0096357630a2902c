//! Block material kinds and their gameplay property tables.
//!
//! The simulation never stores block state itself; it asks the host world for
//! the material at a coordinate and keys every decision (destructibility,
//! growth credit, beam reflectivity) off these per-kind tables.

use serde::{Deserialize, Serialize};

/// Coarse material classification reported by the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Empty space; never destructible, never reflective.
    Air,
    /// Dirt, sand, gravel and other loose ground.
    Soil,
    /// Generic rock. The baseline "common" material.
    Stone,
    /// Logs, planks and other plant matter.
    Wood,
    /// Refined metal blocks.
    Metal,
    /// Volcanic glass; hard but destructible.
    Obsidian,
    /// Gem and ore blocks. The "precious" feed tier.
    Crystal,
    /// Plain glass panes/blocks.
    Glass,
    /// Packed ice.
    Ice,
    /// Water, lava and other liquids.
    Fluid,
    /// World-boundary blocks the simulation must never remove.
    Unbreakable,
}

impl MaterialKind {
    /// Whether the destruction engine may remove a block of this kind.
    pub fn is_destructible(self) -> bool {
        !matches!(self, MaterialKind::Air | MaterialKind::Unbreakable)
    }

    /// Whether the block occludes beams and reflects them.
    pub fn is_solid(self) -> bool {
        !matches!(self, MaterialKind::Air | MaterialKind::Fluid)
    }

    /// Growth credit multiplier applied when the singularity consumes a block.
    ///
    /// Common materials sit around 0.9-1.0, hard materials at 1.4 and
    /// precious materials at 2.5.
    pub fn growth_multiplier(self) -> f64 {
        match self {
            MaterialKind::Air | MaterialKind::Unbreakable => 0.0,
            MaterialKind::Fluid => 0.4,
            MaterialKind::Soil | MaterialKind::Wood => 0.9,
            MaterialKind::Stone | MaterialKind::Glass | MaterialKind::Ice => 1.0,
            MaterialKind::Metal | MaterialKind::Obsidian => 1.4,
            MaterialKind::Crystal => 2.5,
        }
    }

    /// Fraction of beam energy retained on reflection off this material.
    ///
    /// Values near zero mean the surface absorbs the beam outright.
    pub fn reflectivity(self) -> f64 {
        match self {
            MaterialKind::Air => 0.0,
            MaterialKind::Glass => 0.95,
            MaterialKind::Ice => 0.92,
            MaterialKind::Metal => 0.8,
            MaterialKind::Crystal => 0.9,
            MaterialKind::Obsidian => 0.6,
            MaterialKind::Stone | MaterialKind::Unbreakable => 0.45,
            MaterialKind::Fluid => 0.1,
            MaterialKind::Soil | MaterialKind::Wood => 0.03,
        }
    }

    /// Whether destroying this block should leave an item drop behind.
    ///
    /// Most consumed blocks are simply gone; only precious kinds spill.
    pub fn drops_on_destruction(self) -> bool {
        matches!(self, MaterialKind::Crystal | MaterialKind::Metal)
    }
}
