//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Named stream does not exist.
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Seek target lies past the end of the stream.
    #[error("Seek to byte {offset} past end of stream ({size} bytes)")]
    SeekOutOfRange { offset: u64, size: u64 },
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
