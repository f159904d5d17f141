//! # Ostinato - Two-Slot Audio Looper
//!
//! Loop recorder and player built from two small crates.
//!
//! ## Architecture
//!
//! Ostinato is an umbrella crate that coordinates:
//! - **ostinato-core** - Block kernel (PCM16 blocks, pool, ports, capture
//!   queue, storage streams)
//! - **ostinato-engine** - Loop engine (five-mode controller, role swaps,
//!   overdub mixing, command queue, tick service)
//!
//! The looper records into one storage slot while playing the other; at
//! every loop boundary the slots swap, so the pass just captured becomes
//! the next pass's source. Overdubbing mixes live input into the loop as
//! it is rewritten.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ostinato::{DiskStorage, LoopController, LooperConfig, LooperService};
//!
//! let storage = DiskStorage::new("loops")?;
//! let parts = LoopController::new(storage, LooperConfig::default());
//! let handle = parts.handle.clone();
//! let service = LooperService::spawn(parts.controller)?;
//!
//! // record the first pass, then let it loop
//! handle.begin_record()?;
//! // ... feed parts.input with live blocks ...
//! handle.end_record()?;
//!
//! // stack a layer on top
//! handle.begin_record()?;
//! handle.end_record()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Disk-backed storage
//! - `disk` - [`DiskStorage`] over `std::fs`; disable to supply your own
//!   [`StorageBackend`]

/// Re-export of ostinato-core for direct access
pub use ostinato_core as core;

/// Re-export of ostinato-engine for direct access
pub use ostinato_engine as engine;

// Kernel types
pub use ostinato_core::{
    // Blocks and mixing
    mix_saturating,
    read_samples_le,
    write_samples_le,
    BYTES_PER_SAMPLE,
    DEFAULT_BLOCK_SAMPLES,

    // Pool, ports, queues
    block_port,
    BlockPool,
    BlockReceiver,
    BlockSender,
    CaptureQueue,
    PooledBlock,

    // Configuration
    LooperConfig,

    // Storage
    MemoryStorage,
    StorageBackend,
    StreamReader,
    StreamWriter,
};

#[cfg(feature = "disk")]
pub use ostinato_core::DiskStorage;

// Engine types
pub use ostinato_engine::{
    Error, LoopController, LoopMode, LooperCommand, LooperHandle, LooperMetricsSnapshot,
    LooperParts, LooperService, Result, SharedLooperState,
};
