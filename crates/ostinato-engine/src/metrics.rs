//! Counters for looper activity and degradation events.
//!
//! All counters are atomics so the tick path can record without locking.
//! `snapshot()` gives a coherent-enough copy for logs and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, shared between the controller and observers.
#[derive(Debug, Default)]
pub struct LooperMetrics {
    ticks: AtomicU64,
    blocks_played: AtomicU64,
    blocks_captured: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    write_ops: AtomicU64,
    loop_cycles: AtomicU64,
    clipped_samples: AtomicU64,
    pool_exhausted: AtomicU64,
    capture_overflows: AtomicU64,
    input_starved: AtomicU64,
    output_dropped: AtomicU64,
    dropped_held_blocks: AtomicU64,
    missing_held_blocks: AtomicU64,
    invalid_transitions: AtomicU64,
    open_failures: AtomicU64,
    write_errors: AtomicU64,
}

impl LooperMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_block_played(&self, bytes: u64) {
        self.blocks_played.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_block_captured(&self) {
        self.blocks_captured.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self, bytes: u64) {
        self.write_ops.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_loop_cycle(&self) {
        self.loop_cycles.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_clipped(&self, samples: u64) {
        self.clipped_samples.fetch_add(samples, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_pool_exhausted(&self) {
        self.pool_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_capture_overflow(&self) {
        self.capture_overflows.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_input_starved(&self) {
        self.input_starved.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_output_dropped(&self) {
        self.output_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped_held(&self) {
        self.dropped_held_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_missing_held(&self) {
        self.missing_held_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_invalid_transition(&self) {
        self.invalid_transitions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_open_failure(&self) {
        self.open_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LooperMetricsSnapshot {
        LooperMetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            blocks_played: self.blocks_played.load(Ordering::Relaxed),
            blocks_captured: self.blocks_captured.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_ops: self.write_ops.load(Ordering::Relaxed),
            loop_cycles: self.loop_cycles.load(Ordering::Relaxed),
            clipped_samples: self.clipped_samples.load(Ordering::Relaxed),
            pool_exhausted: self.pool_exhausted.load(Ordering::Relaxed),
            capture_overflows: self.capture_overflows.load(Ordering::Relaxed),
            input_starved: self.input_starved.load(Ordering::Relaxed),
            output_dropped: self.output_dropped.load(Ordering::Relaxed),
            dropped_held_blocks: self.dropped_held_blocks.load(Ordering::Relaxed),
            missing_held_blocks: self.missing_held_blocks.load(Ordering::Relaxed),
            invalid_transitions: self.invalid_transitions.load(Ordering::Relaxed),
            open_failures: self.open_failures.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.blocks_played.store(0, Ordering::Relaxed);
        self.blocks_captured.store(0, Ordering::Relaxed);
        self.bytes_read.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.write_ops.store(0, Ordering::Relaxed);
        self.loop_cycles.store(0, Ordering::Relaxed);
        self.clipped_samples.store(0, Ordering::Relaxed);
        self.pool_exhausted.store(0, Ordering::Relaxed);
        self.capture_overflows.store(0, Ordering::Relaxed);
        self.input_starved.store(0, Ordering::Relaxed);
        self.output_dropped.store(0, Ordering::Relaxed);
        self.dropped_held_blocks.store(0, Ordering::Relaxed);
        self.missing_held_blocks.store(0, Ordering::Relaxed);
        self.invalid_transitions.store(0, Ordering::Relaxed);
        self.open_failures.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`LooperMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LooperMetricsSnapshot {
    pub ticks: u64,
    pub blocks_played: u64,
    pub blocks_captured: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub write_ops: u64,
    pub loop_cycles: u64,
    pub clipped_samples: u64,
    pub pool_exhausted: u64,
    pub capture_overflows: u64,
    pub input_starved: u64,
    pub output_dropped: u64,
    pub dropped_held_blocks: u64,
    pub missing_held_blocks: u64,
    pub invalid_transitions: u64,
    pub open_failures: u64,
    pub write_errors: u64,
}

impl LooperMetricsSnapshot {
    /// Mean bytes per completed write, 0.0 when nothing was written.
    pub fn avg_write_size(&self) -> f64 {
        if self.write_ops == 0 {
            0.0
        } else {
            self.bytes_written as f64 / self.write_ops as f64
        }
    }

    /// Total count of events where the looper had to degrade.
    pub fn degraded_events(&self) -> u64 {
        self.pool_exhausted
            + self.capture_overflows
            + self.output_dropped
            + self.dropped_held_blocks
            + self.missing_held_blocks
            + self.open_failures
            + self.write_errors
    }
}
