//! Looper kernel: audio blocks, the block pool, lock-free block ports, the
//! capture queue, and named storage streams.
//!
//! Everything here allocates up front and stays bounded afterwards, so the
//! engine's per-tick path never blocks on memory or I/O capacity.

pub mod error;
pub use error::{Error, Result};

pub mod block;
pub use block::{
    mix_saturating, read_samples_le, write_samples_le, BYTES_PER_SAMPLE, DEFAULT_BLOCK_SAMPLES,
};

pub mod capture;
pub use capture::CaptureQueue;

pub mod config;
pub use config::LooperConfig;

pub mod pool;
pub use pool::{BlockPool, PooledBlock};

pub mod port;
pub use port::{block_port, BlockReceiver, BlockSender};

pub mod storage;
#[cfg(feature = "disk")]
pub use storage::DiskStorage;
pub use storage::{MemoryStorage, StorageBackend, StreamReader, StreamWriter};
