//! Lock-free state mirror published by the controller after every tick.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use crate::mode::LoopMode;

/// Observable looper state. The controller is the only writer; handles
/// read it from any thread without blocking the tick path.
#[derive(Debug)]
pub struct SharedLooperState {
    mode: AtomicU8,
    position_bytes: AtomicU64,
    source_bytes: AtomicU64,
    looping: AtomicBool,
}

impl SharedLooperState {
    pub fn new() -> Self {
        Self {
            mode: AtomicU8::new(LoopMode::Stopped.into()),
            position_bytes: AtomicU64::new(0),
            source_bytes: AtomicU64::new(0),
            looping: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> LoopMode {
        LoopMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_mode(&self, mode: LoopMode) {
        self.mode.store(mode.into(), Ordering::Relaxed);
    }

    /// Playback offset in bytes, 0 when no stream is open.
    pub fn position_bytes(&self) -> u64 {
        self.position_bytes.load(Ordering::Relaxed)
    }

    /// Size in bytes of the stream behind the playback role, 0 when closed.
    pub fn source_bytes(&self) -> u64 {
        self.source_bytes.load(Ordering::Relaxed)
    }

    pub fn set_progress(&self, position: u64, size: u64) {
        self.position_bytes.store(position, Ordering::Relaxed);
        self.source_bytes.store(size, Ordering::Relaxed);
    }

    pub fn is_looping(&self) -> bool {
        self.looping.load(Ordering::Relaxed)
    }

    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::Relaxed);
    }
}

impl Default for SharedLooperState {
    fn default() -> Self {
        Self::new()
    }
}
