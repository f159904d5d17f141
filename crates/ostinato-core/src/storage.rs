//! Named byte-stream storage abstraction.
//!
//! The looper engines are generic over a backend so the controller runs
//! unchanged against the in-memory store in tests and the filesystem in
//! deployment. Streams close on drop.

use crate::error::Result;

mod memory;
pub use memory::{MemoryReader, MemoryStorage, MemoryWriter};

#[cfg(feature = "disk")]
mod disk;
#[cfg(feature = "disk")]
pub use disk::{DiskReader, DiskStorage, DiskWriter};

/// Sequential reader over a named stream.
pub trait StreamReader {
    /// Read up to `buf.len()` bytes at the current position, returning the
    /// byte count. Zero means the stream is exhausted.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reposition to an absolute byte offset within the stream.
    fn seek(&mut self, offset: u64) -> Result<()>;

    /// Total size in bytes, captured when the stream was opened.
    fn size(&self) -> u64;
}

/// Sequential writer over a named stream.
pub trait StreamWriter {
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// A store of named byte streams.
pub trait StorageBackend {
    type Reader: StreamReader;
    type Writer: StreamWriter;

    fn open_read(&self, name: &str) -> Result<Self::Reader>;

    /// Open `name` for writing, truncating any existing contents.
    fn open_write(&self, name: &str) -> Result<Self::Writer>;

    fn exists(&self, name: &str) -> bool;

    /// Delete `name`. Removing a missing stream is not an error.
    fn remove(&self, name: &str) -> Result<()>;
}
