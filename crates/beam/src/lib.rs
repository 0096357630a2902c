//! Budgeted raycast/reflection engine for beam weapons.
//!
//! A trace is one attack resolution: it must finish inside the calling tick,
//! so alongside the usual per-beam caps (bounces, range, energy) it carries a
//! wall-clock budget and a global segment ceiling. When any budget runs out
//! the trace stops producing detail instead of failing.

mod damage;
mod trace;

pub use damage::*;
pub use trace::*;
