//! Batched capture writes over a [`StreamWriter`].

use ostinato_core::{write_samples_le, CaptureQueue, StreamWriter};
use tracing::{debug, warn};

use crate::metrics::LooperMetrics;

/// Flushes captured blocks to the record target.
///
/// Steady state waits for a full batch and commits it as one write.
/// `drain_and_close` empties whatever is left one block at a time so a
/// stopping looper loses nothing.
pub(crate) struct RecordEngine<W: StreamWriter> {
    writer: Option<W>,
    batch: Vec<u8>,
    batch_blocks: usize,
    target: String,
}

impl<W: StreamWriter> RecordEngine<W> {
    pub(crate) fn new(block_bytes: usize, batch_blocks: usize) -> Self {
        Self {
            writer: None,
            batch: Vec::with_capacity(block_bytes * batch_blocks),
            batch_blocks,
            target: String::new(),
        }
    }

    pub(crate) fn open(&mut self, writer: W, name: &str) {
        debug_assert!(self.writer.is_none(), "record target already open");
        self.writer = Some(writer);
        self.target.clear();
        self.target.push_str(name);
        debug!(target = name, "record target opened");
    }

    pub(crate) fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Commit one batch if enough blocks are queued. At most one write
    /// per tick keeps the storage cost bounded.
    pub(crate) fn step(&mut self, queue: &mut CaptureQueue, metrics: &LooperMetrics) {
        if self.writer.is_none() || queue.available() < self.batch_blocks {
            return;
        }
        self.batch.clear();
        for _ in 0..self.batch_blocks {
            if let Some(block) = queue.pop_oldest() {
                write_samples_le(&block, &mut self.batch);
            }
        }
        self.commit(metrics);
    }

    /// Write out every queued block, then flush and close the target.
    pub(crate) fn drain_and_close(&mut self, queue: &mut CaptureQueue, metrics: &LooperMetrics) {
        if self.writer.is_none() {
            queue.clear();
            return;
        }
        let mut drained = 0usize;
        while let Some(block) = queue.pop_oldest() {
            self.batch.clear();
            write_samples_le(&block, &mut self.batch);
            self.commit(metrics);
            drained += 1;
        }
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                warn!(target = %self.target, %err, "flush failed");
                metrics.record_write_error();
            }
        }
        debug!(target = %self.target, drained, "record target closed");
    }

    fn commit(&mut self, metrics: &LooperMetrics) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write_all(&self.batch) {
            Ok(()) => metrics.record_write(self.batch.len() as u64),
            Err(err) => {
                warn!(target = %self.target, bytes = self.batch.len(), %err, "write failed");
                metrics.record_write_error();
            }
        }
    }
}
