//! Capture queue: the accumulator between block acquisition and storage.
//!
//! Blocks produced each tick are parked here until the record engine
//! drains them in storage-aligned batches. Capacity is fixed up front;
//! both ends run inside the tick context.

use std::collections::VecDeque;

use crate::pool::PooledBlock;

/// Bounded FIFO of captured blocks awaiting a storage write.
pub struct CaptureQueue {
    entries: VecDeque<PooledBlock>,
    capacity: usize,
}

impl CaptureQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue a block. A full queue hands the block back to the caller,
    /// which drops it (releasing it to the pool) and counts the loss.
    pub fn push(&mut self, block: PooledBlock) -> Result<(), PooledBlock> {
        if self.entries.len() >= self.capacity {
            return Err(block);
        }
        self.entries.push_back(block);
        Ok(())
    }

    /// Oldest queued block, moved out. Dropping it after the copy is the
    /// release step; each queued block is consumed exactly once.
    pub fn pop_oldest(&mut self) -> Option<PooledBlock> {
        self.entries.pop_front()
    }

    /// Drop every queued block, releasing the storage to the pool.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn available(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
