//! Bounded FIFO of blocks scheduled for destruction.

use serde::{Deserialize, Serialize};
use singularity_core::{BlockPos, MaterialKind};
use std::collections::VecDeque;

/// A block candidate captured by the scan phase.
///
/// Holds no reference back to its instance; the destruction phase re-validates
/// the live world state before acting, because anything may have changed
/// between scan and consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueuedBlock {
    /// Coordinate of the candidate block.
    pub pos: BlockPos,
    /// Material observed at scan time.
    pub material: MaterialKind,
    /// Distance from the singularity center at scan time.
    pub distance: f64,
}

/// Bounded FIFO feeding the per-tick destruction budget.
///
/// Capacity rejection is silent backpressure: the producer simply stops adding
/// until the consumer drains room. Offers and polls may interleave freely
/// across ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestructionQueue {
    blocks: VecDeque<QueuedBlock>,
    capacity: usize,
}

impl DestructionQueue {
    /// Create an empty queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    /// Enqueue a candidate. Returns `false` (and drops the candidate) when the
    /// queue is at capacity.
    pub fn offer(&mut self, block: QueuedBlock) -> bool {
        if self.blocks.len() >= self.capacity {
            return false;
        }
        self.blocks.push_back(block);
        true
    }

    /// Dequeue at most `n` candidates, oldest first.
    pub fn poll_up_to(&mut self, n: usize) -> Vec<QueuedBlock> {
        let take = n.min(self.blocks.len());
        self.blocks.drain(..take).collect()
    }

    /// Number of queued candidates.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether the queue is at capacity (producer should stop scanning).
    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
