//! Lock-free single-producer single-consumer block ports.
//!
//! Two are used per looper: the live-input feed (hardware side in,
//! controller out) and the output tap (controller in, downstream out).

use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};

use crate::pool::PooledBlock;

/// Producer half of a block port.
pub struct BlockSender {
    prod: HeapProd<PooledBlock>,
}

impl BlockSender {
    /// Push a block without blocking. A full ring hands the block back so
    /// the caller can count the drop; dropping it releases it to the pool.
    pub fn try_send(&mut self, block: PooledBlock) -> Result<(), PooledBlock> {
        self.prod.try_push(block)
    }

    pub fn free_slots(&self) -> usize {
        self.prod.vacant_len()
    }

    pub fn capacity(&self) -> usize {
        self.prod.capacity().get()
    }
}

/// Consumer half of a block port.
pub struct BlockReceiver {
    cons: HeapCons<PooledBlock>,
}

impl BlockReceiver {
    /// Pop the oldest block, if any.
    pub fn try_recv(&mut self) -> Option<PooledBlock> {
        self.cons.try_pop()
    }

    pub fn available(&self) -> usize {
        self.cons.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.cons.is_empty()
    }

    /// Drop all queued blocks, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let mut cleared = 0;
        while self.cons.try_pop().is_some() {
            cleared += 1;
        }
        cleared
    }
}

/// Create a block port holding at most `capacity` in-flight blocks.
pub fn block_port(capacity: usize) -> (BlockSender, BlockReceiver) {
    let rb = HeapRb::<PooledBlock>::new(capacity.max(1));
    let (prod, cons) = rb.split();
    (BlockSender { prod }, BlockReceiver { cons })
}
