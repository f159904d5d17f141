//! Per-tick playback stepping over a [`StreamReader`].

use ostinato_core::{read_samples_le, BlockPool, PooledBlock, StreamReader};
use tracing::{debug, warn};

/// Outcome of one playback step.
#[derive(Debug)]
pub(crate) enum PlayStep {
    /// No stream is open.
    Inactive,
    /// Pool had no free block; nothing was read this tick.
    Skipped,
    /// One block of samples. `last` marks a short read that exhausted
    /// the stream; the tail past the decoded samples is zeroed.
    Produced {
        block: PooledBlock,
        bytes: usize,
        last: bool,
    },
    /// The stream was already exhausted; the reader has been closed.
    Boundary,
}

/// Streams one source a block per tick. Owns the reader between
/// open and exhaustion, plus a scratch buffer for the raw bytes.
pub(crate) struct PlaybackEngine<R: StreamReader> {
    reader: Option<R>,
    offset: u64,
    size: u64,
    byte_buf: Vec<u8>,
    source: String,
}

impl<R: StreamReader> PlaybackEngine<R> {
    pub(crate) fn new(block_bytes: usize) -> Self {
        Self {
            reader: None,
            offset: 0,
            size: 0,
            byte_buf: vec![0; block_bytes],
            source: String::new(),
        }
    }

    pub(crate) fn open(&mut self, reader: R, name: &str) {
        self.size = reader.size();
        self.offset = 0;
        self.reader = Some(reader);
        self.source.clear();
        self.source.push_str(name);
        debug!(source = name, size = self.size, "playback opened");
    }

    pub(crate) fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(source = %self.source, offset = self.offset, "playback closed");
        }
        self.offset = 0;
        self.size = 0;
    }

    pub(crate) fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    pub(crate) fn position_bytes(&self) -> u64 {
        self.offset
    }

    pub(crate) fn size_bytes(&self) -> u64 {
        self.size
    }

    /// Jump to an absolute byte offset. Returns false when no stream is
    /// open or the reader refuses the offset.
    pub(crate) fn seek(&mut self, offset: u64) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        match reader.seek(offset) {
            Ok(()) => {
                self.offset = offset;
                true
            }
            Err(err) => {
                warn!(source = %self.source, offset, %err, "seek rejected");
                false
            }
        }
    }

    /// Read and decode the next block.
    pub(crate) fn step(&mut self, pool: &BlockPool) -> PlayStep {
        let Some(reader) = self.reader.as_mut() else {
            return PlayStep::Inactive;
        };
        let Some(mut block) = pool.acquire() else {
            return PlayStep::Skipped;
        };

        let n = match reader.read(&mut self.byte_buf) {
            Ok(n) => n,
            Err(err) => {
                warn!(source = %self.source, offset = self.offset, %err, "read failed");
                0
            }
        };
        if n == 0 {
            self.close();
            return PlayStep::Boundary;
        }

        let decoded = read_samples_le(&self.byte_buf[..n], &mut block);
        block[decoded..].fill(0);
        self.offset += n as u64;

        let last = n < self.byte_buf.len();
        if last {
            self.close();
        }
        PlayStep::Produced {
            block,
            bytes: n,
            last,
        }
    }
}
