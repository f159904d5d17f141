//! Filesystem storage backend rooted at a directory.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::storage::{StorageBackend, StreamReader, StreamWriter};

/// Stores each named stream as a file under a root directory.
#[derive(Clone, Debug)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Use `root` for all streams, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

pub struct DiskReader {
    file: File,
    size: u64,
}

impl StreamReader for DiskReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        // fill the buffer if the file can; a short return means EOF
        let mut total = 0;
        while total < buf.len() {
            match self.file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size {
            return Err(Error::SeekOutOfRange {
                offset,
                size: self.size,
            });
        }
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

pub struct DiskWriter {
    inner: BufWriter<File>,
}

impl StreamWriter for DiskWriter {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl StorageBackend for DiskStorage {
    type Reader = DiskReader;
    type Writer = DiskWriter;

    fn open_read(&self, name: &str) -> Result<Self::Reader> {
        let path = self.path(name);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::StreamNotFound(name.to_string())
            } else {
                Error::Io(e)
            }
        })?;
        let size = file.metadata()?.len();
        Ok(DiskReader { file, size })
    }

    fn open_write(&self, name: &str) -> Result<Self::Writer> {
        let file = File::create(self.path(name))?;
        Ok(DiskWriter {
            inner: BufWriter::new(file),
        })
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();

        let mut writer = storage.open_write("take.raw").unwrap();
        writer.write_all(&[10, 20, 30]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        assert!(storage.exists("take.raw"));
        let mut reader = storage.open_read("take.raw").unwrap();
        assert_eq!(reader.size(), 3);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_open_write_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();

        let mut writer = storage.open_write("take.raw").unwrap();
        writer.write_all(&[1; 64]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        drop(storage.open_write("take.raw").unwrap());
        let reader = storage.open_read("take.raw").unwrap();
        assert_eq!(reader.size(), 0);
    }

    #[test]
    fn test_seek_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();

        let mut writer = storage.open_write("take.raw").unwrap();
        writer.write_all(&[0, 1, 2, 3, 4, 5]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut reader = storage.open_read("take.raw").unwrap();
        reader.seek(4).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert!(reader.seek(7).is_err());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();

        drop(storage.open_write("take.raw").unwrap());
        assert!(storage.exists("take.raw"));
        storage.remove("take.raw").unwrap();
        assert!(!storage.exists("take.raw"));
        storage.remove("take.raw").unwrap();
    }

    #[test]
    fn test_missing_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.open_read("ghost.raw"),
            Err(Error::StreamNotFound(_))
        ));
    }
}
