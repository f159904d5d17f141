//! Fixed-capacity audio block pool.
//!
//! All sample memory is allocated when the pool is built; `acquire` and the
//! implicit release on drop are bounded operations safe to call from the
//! tick path.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct PoolShared {
    free: Mutex<Vec<Box<[i16]>>>,
    block_samples: usize,
    capacity: usize,
    in_use: AtomicUsize,
}

/// Handle to a shared pool of equally sized audio blocks.
#[derive(Clone)]
pub struct BlockPool {
    shared: Arc<PoolShared>,
}

impl BlockPool {
    /// Build a pool of `capacity` blocks of `block_samples` i16 samples each.
    pub fn new(capacity: usize, block_samples: usize) -> Self {
        let capacity = capacity.max(1);
        let block_samples = block_samples.max(1);
        let mut free = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            free.push(vec![0i16; block_samples].into_boxed_slice());
        }
        Self {
            shared: Arc::new(PoolShared {
                free: Mutex::new(free),
                block_samples,
                capacity,
                in_use: AtomicUsize::new(0),
            }),
        }
    }

    /// Take a block from the pool without blocking.
    ///
    /// Returns `None` when the pool is exhausted. Block contents are
    /// whatever the previous owner left behind; callers overwrite or pad.
    pub fn acquire(&self) -> Option<PooledBlock> {
        let samples = self.shared.free.lock().pop()?;
        self.shared.in_use.fetch_add(1, Ordering::Relaxed);
        Some(PooledBlock {
            samples,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Acquire a block and copy `block`'s samples into it.
    ///
    /// `block` must come from a pool with the same block size.
    pub fn duplicate(&self, block: &PooledBlock) -> Option<PooledBlock> {
        let mut copy = self.acquire()?;
        debug_assert_eq!(copy.len(), block.len());
        copy.copy_from_slice(block);
        Some(copy)
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn block_samples(&self) -> usize {
        self.shared.block_samples
    }

    /// Number of blocks currently held by callers.
    pub fn in_use(&self) -> usize {
        self.shared.in_use.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("capacity", &self.shared.capacity)
            .field("block_samples", &self.shared.block_samples)
            .field("in_use", &self.in_use())
            .finish()
    }
}

/// An owned audio block; returns its storage to the pool when dropped.
pub struct PooledBlock {
    samples: Box<[i16]>,
    shared: Arc<PoolShared>,
}

impl std::ops::Deref for PooledBlock {
    type Target = [i16];

    fn deref(&self) -> &[i16] {
        &self.samples
    }
}

impl std::ops::DerefMut for PooledBlock {
    fn deref_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }
}

impl Drop for PooledBlock {
    fn drop(&mut self) {
        let samples = std::mem::take(&mut self.samples);
        if !samples.is_empty() {
            self.shared.free.lock().push(samples);
            self.shared.in_use.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for PooledBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBlock")
            .field("samples", &self.samples.len())
            .finish()
    }
}
