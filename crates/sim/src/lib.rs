//! Black-hole simulation engine: zone classification, tick-budgeted block
//! erosion, entity forces, growth/decay and the instance registry.
//!
//! All work is amortized across ticks. The host calls
//! [`SimulationRegistry::tick_all`] once per simulated tick; no call ever does
//! unbounded work, regardless of how large the affected region grows.

mod config;
mod force;
mod growth;
mod instance;
mod queue;
mod registry;
mod scan;
mod zone;

pub use config::*;
pub use force::*;
pub use growth::*;
pub use instance::*;
pub use queue::*;
pub use registry::*;
pub use scan::*;
pub use zone::*;
