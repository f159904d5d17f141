//! Loop control engine: modes, role swaps, and the tick driver.
//!
//! Builds the looper proper on top of the primitives in `ostinato-core`.
//!
//! # Features
//!
//! - **Mode machine**: five modes driven by a (mode, event) table
//! - **Two-slot looping**: playback and record roles swap at each boundary
//! - **Overdubbing**: live input mixed into the loop with saturating adds
//! - **Tick service**: background thread ticking at the block rate
//!
//! # Example
//!
//! ```ignore
//! use ostinato_engine::{LoopController, LooperService};
//! use ostinato_core::{DiskStorage, LooperConfig};
//!
//! let storage = DiskStorage::new("loops")?;
//! let parts = LoopController::new(storage, LooperConfig::default());
//! let handle = parts.handle.clone();
//! let service = LooperService::spawn(parts.controller)?;
//!
//! handle.begin_record()?;
//! // feed parts.input, pull parts.output ...
//! handle.end_record()?;
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

// Mode machine and observable state
pub mod mode;
pub use mode::{transition, LoopEvent, LoopMode, ModeAction, ModeStep};

pub mod state;
pub use state::SharedLooperState;

// Controller, its command surface, and the tick thread
pub mod command;
pub use command::{LooperCommand, LooperHandle};

mod controller;
pub use controller::{LoopController, LooperParts};

mod service;
pub use service::LooperService;

pub mod metrics;
pub use metrics::{LooperMetrics, LooperMetricsSnapshot};

// Per-tick stream engines, internal to the controller
mod playback;
mod record;
