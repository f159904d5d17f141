//! Looper configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::block::{BYTES_PER_SAMPLE, DEFAULT_BLOCK_SAMPLES};

/// Configuration for block sizes, queue depths, and the two storage slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LooperConfig {
    /// Samples per block (default: 128, 256 bytes of PCM16)
    pub block_samples: usize,
    /// Blocks batched into one storage write (default: 2, a 512 byte write)
    pub write_batch_blocks: usize,
    /// Blocks pre-allocated in the pool (default: 64)
    pub pool_blocks: usize,
    /// Live-input port depth in blocks (default: 8)
    pub input_capacity_blocks: usize,
    /// Output tap depth in blocks (default: 8)
    pub output_capacity_blocks: usize,
    /// Capture queue depth in blocks (default: 53)
    pub capture_capacity_blocks: usize,
    /// Command queue depth (default: 32)
    pub command_capacity: usize,
    /// Sample rate in Hz, used for block timing and time queries (default: 44100)
    pub sample_rate_hz: u32,
    /// Storage slot A, the primary (default: "loop-a.raw")
    pub slot_a: String,
    /// Storage slot B (default: "loop-b.raw")
    pub slot_b: String,
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            block_samples: DEFAULT_BLOCK_SAMPLES,
            write_batch_blocks: 2,
            pool_blocks: 64,
            input_capacity_blocks: 8,
            output_capacity_blocks: 8,
            capture_capacity_blocks: 53,
            command_capacity: 32,
            sample_rate_hz: 44_100,
            slot_a: "loop-a.raw".to_string(),
            slot_b: "loop-b.raw".to_string(),
        }
    }
}

impl LooperConfig {
    /// Create a config with a custom block size.
    pub fn with_block_samples(samples: usize) -> Self {
        Self {
            block_samples: samples.max(8), // minimum 8 samples
            ..Default::default()
        }
    }

    /// Set the sample rate, clamped to at least 1 Hz.
    pub fn with_sample_rate(mut self, hz: u32) -> Self {
        self.sample_rate_hz = hz.max(1);
        self
    }

    /// Set the pool size, clamped to cover at least one write batch plus
    /// the in-flight playback and output blocks.
    pub fn with_pool_blocks(mut self, blocks: usize) -> Self {
        self.pool_blocks = blocks.max(self.write_batch_blocks + 2);
        self
    }

    /// Set the two storage slot names.
    pub fn with_slots(mut self, slot_a: impl Into<String>, slot_b: impl Into<String>) -> Self {
        self.slot_a = slot_a.into();
        self.slot_b = slot_b.into();
        self
    }

    /// Bytes per block of PCM16.
    pub fn block_bytes(&self) -> usize {
        self.block_samples * BYTES_PER_SAMPLE
    }

    /// Bytes per combined storage write.
    pub fn write_batch_bytes(&self) -> usize {
        self.block_bytes() * self.write_batch_blocks
    }

    /// Mono PCM16 byte rate, for time conversions.
    pub fn bytes_per_second(&self) -> u64 {
        self.sample_rate_hz as u64 * BYTES_PER_SAMPLE as u64
    }

    /// Convert a byte position in a stream to milliseconds.
    pub fn ms_from_bytes(&self, bytes: u64) -> u64 {
        bytes.saturating_mul(1000) / self.bytes_per_second()
    }

    /// Duration of one block at the configured sample rate.
    pub fn block_period(&self) -> Duration {
        let nanos = self.block_samples as u64 * 1_000_000_000 / self.sample_rate_hz as u64;
        Duration::from_nanos(nanos.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LooperConfig::default();
        assert_eq!(config.block_samples, 128);
        assert_eq!(config.write_batch_blocks, 2);
        assert_eq!(config.pool_blocks, 64);
        assert_eq!(config.input_capacity_blocks, 8);
        assert_eq!(config.output_capacity_blocks, 8);
        assert_eq!(config.capture_capacity_blocks, 53);
        assert_eq!(config.command_capacity, 32);
        assert_eq!(config.sample_rate_hz, 44_100);
        assert_eq!(config.slot_a, "loop-a.raw");
        assert_eq!(config.slot_b, "loop-b.raw");
    }

    #[test]
    fn test_derived_sizes() {
        let config = LooperConfig::default();
        assert_eq!(config.block_bytes(), 256);
        assert_eq!(config.write_batch_bytes(), 512);
        assert_eq!(config.bytes_per_second(), 88_200);
    }

    #[test]
    fn test_minimum_block_samples() {
        let config = LooperConfig::with_block_samples(1);
        assert_eq!(config.block_samples, 8); // clamped
    }

    #[test]
    fn test_time_conversion() {
        let config = LooperConfig::default();
        // one second of mono PCM16 at 44.1 kHz
        assert_eq!(config.ms_from_bytes(88_200), 1000);
        assert_eq!(config.ms_from_bytes(0), 0);
    }

    #[test]
    fn test_block_period() {
        let config = LooperConfig::default();
        let period = config.block_period();
        // 128 samples at 44.1 kHz is just over 2.9 ms
        assert!(period > Duration::from_micros(2900));
        assert!(period < Duration::from_micros(2910));
    }
}
