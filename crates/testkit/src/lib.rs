#![warn(missing_docs)]
//! Deterministic testing surfaces for the simulation: in-memory
//! implementations of the host traits (world, entity store, broadcast
//! channel) plus a JSONL log for long-running singularity scenarios.

mod broadcast;
mod mock_entities;
mod mock_world;

use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub use broadcast::RecordingBroadcast;
pub use mock_entities::MockEntities;
pub use mock_world::MockWorld;

/// Install a compact tracing subscriber honoring `RUST_LOG`. Safe to call
/// from every test; repeat calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One line of a scenario log: what happened and on which simulation tick.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick the event landed on.
    pub tick: u64,
    /// Event kind, e.g. "evicted" or "fed_phase_done".
    pub kind: &'a str,
    /// Free-form detail for offline inspection.
    pub payload: &'a str,
}

/// Writes scenario events to disk as newline-delimited JSON.
///
/// Worldtests append one record per phase so a failing run can be compared
/// against a known-good log.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a sink at `path`, truncating any previous log.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Serialize and append one event.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}
