//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command queue is full; the command was not delivered.
    #[error("Command queue is full")]
    CommandQueueFull,

    /// The controller end of the command queue is gone.
    #[error("Controller is no longer running")]
    ControllerGone,
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
