//! Test helpers and fixtures for Ostinato integration tests
//!
//! Tests drive the controller tick by tick against the in-memory
//! backend for determinism; the service tests poll a real tick thread
//! over disk storage instead.

// Each test binary compiles its own copy and uses a subset.
#![allow(dead_code)]

use ostinato::{BlockPool, LoopController, LooperConfig, LooperParts, MemoryStorage, PooledBlock};

/// Small block size so loops stay a handful of ticks long.
pub const TEST_BLOCK_SAMPLES: usize = 8;

/// Bytes per PCM16 test block.
pub const TEST_BLOCK_BYTES: usize = TEST_BLOCK_SAMPLES * 2;

/// Config used across the integration tests: tiny blocks, two slots.
pub fn test_config() -> LooperConfig {
    LooperConfig::with_block_samples(TEST_BLOCK_SAMPLES).with_slots("slot-a.raw", "slot-b.raw")
}

/// A looper over in-memory storage, plus a second handle on the store
/// for inspecting slot contents.
pub fn memory_looper() -> (LooperParts<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let parts = LoopController::new(storage.clone(), test_config());
    (parts, storage)
}

/// Acquire a block filled with a single value.
pub fn block_of(pool: &BlockPool, fill: i16) -> PooledBlock {
    let mut block = pool.acquire().expect("test pool exhausted");
    block.fill(fill);
    block
}

/// Push one constant-valued block into the live-input port.
pub fn push_live(parts: &mut LooperParts<MemoryStorage>, fill: i16) {
    let block = block_of(&parts.pool, fill);
    parts
        .input
        .try_send(block)
        .expect("live input port full in test");
}

/// Encode constant-valued blocks the way the record engine writes them.
pub fn pcm_blocks(fills: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(fills.len() * TEST_BLOCK_BYTES);
    for &fill in fills {
        ostinato::write_samples_le(&[fill; TEST_BLOCK_SAMPLES], &mut bytes);
    }
    bytes
}

/// Pop every block queued on the output tap, reduced to its fill value.
/// Panics if a block is not constant, so routing mistakes surface as the
/// offending samples rather than a mismatched summary.
pub fn drain_output_fills(parts: &mut LooperParts<MemoryStorage>) -> Vec<i16> {
    let mut fills = Vec::new();
    while let Some(block) = parts.output.try_recv() {
        let fill = block[0];
        assert!(
            block.iter().all(|&s| s == fill),
            "output block not constant: {:?}",
            &block[..]
        );
        fills.push(fill);
    }
    fills
}

/// Poll `check` every 2 ms until it holds or the timeout lapses.
pub fn wait_for(mut check: impl FnMut() -> bool, max_wait_ms: u64) -> bool {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(max_wait_ms);
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    false
}
