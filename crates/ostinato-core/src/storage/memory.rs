//! In-memory storage backend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::storage::{StorageBackend, StreamReader, StreamWriter};

type FileMap = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// Map-backed storage, shared between clones.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: FileMap,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the bytes of a stream, mainly for assertions in tests.
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().get(name).cloned()
    }

    /// Seed a stream with the given bytes.
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.lock().insert(name.into(), bytes);
    }
}

pub struct MemoryReader {
    files: FileMap,
    name: String,
    pos: u64,
    size: u64,
}

impl StreamReader for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let files = self.files.lock();
        let Some(data) = files.get(&self.name) else {
            return Err(Error::StreamNotFound(self.name.clone()));
        };
        let end = self.size.min(data.len() as u64);
        let remaining = end.saturating_sub(self.pos);
        let n = remaining.min(buf.len() as u64) as usize;
        let start = self.pos as usize;
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size {
            return Err(Error::SeekOutOfRange {
                offset,
                size: self.size,
            });
        }
        self.pos = offset;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

pub struct MemoryWriter {
    files: FileMap,
    name: String,
}

impl StreamWriter for MemoryWriter {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.files
            .lock()
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn open_read(&self, name: &str) -> Result<Self::Reader> {
        let size = {
            let files = self.files.lock();
            let Some(data) = files.get(name) else {
                return Err(Error::StreamNotFound(name.to_string()));
            };
            data.len() as u64
        };
        Ok(MemoryReader {
            files: Arc::clone(&self.files),
            name: name.to_string(),
            pos: 0,
            size,
        })
    }

    fn open_write(&self, name: &str) -> Result<Self::Writer> {
        self.files.lock().insert(name.to_string(), Vec::new());
        Ok(MemoryWriter {
            files: Arc::clone(&self.files),
            name: name.to_string(),
        })
    }

    fn exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.files.lock().remove(name);
        Ok(())
    }
}
