//! Background tick thread.
//!
//! [`LooperService`] owns a controller on a dedicated thread and ticks
//! it once per block period. Callers keep the handle and ports from
//! [`LooperParts`](crate::LooperParts); dropping the service flushes and
//! joins the thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use ostinato_core::StorageBackend;
use tracing::{debug, warn};

use crate::controller::LoopController;
use crate::error::Result;

pub struct LooperService {
    join: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl LooperService {
    /// Move `controller` onto a named thread and tick it at the block
    /// rate until shutdown.
    pub fn spawn<S>(mut controller: LoopController<S>) -> Result<Self>
    where
        S: StorageBackend + Send + 'static,
        S::Reader: Send + 'static,
        S::Writer: Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let period = controller.config().block_period();

        let join = thread::Builder::new()
            .name("ostinato-tick".to_string())
            .spawn(move || {
                debug!(period_us = period.as_micros() as u64, "tick thread started");
                let mut next = Instant::now() + period;
                while !flag.load(Ordering::Relaxed) {
                    controller.tick();
                    let now = Instant::now();
                    if next <= now {
                        // fell behind; realign rather than burst
                        next = now + period;
                    } else {
                        thread::sleep(next - now);
                        next += period;
                    }
                }
                // flush whatever the last pass captured
                controller.stop(false);
                debug!("tick thread stopped");
            })?;

        Ok(Self {
            join: Some(join),
            shutdown,
        })
    }

    /// Signal the tick thread and wait for it to flush and exit.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("tick thread panicked");
            }
        }
    }
}

impl Drop for LooperService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::LooperParts;
    use crate::mode::LoopMode;
    use ostinato_core::{LooperConfig, MemoryStorage};
    use std::time::Duration;

    fn spawn_looper() -> (LooperParts<MemoryStorage>, MemoryStorage) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let storage = MemoryStorage::new();
        let config = LooperConfig::with_block_samples(8).with_slots("a.raw", "b.raw");
        let parts = LoopController::new(storage.clone(), config);
        (parts, storage)
    }

    fn wait_for(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..500 {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_spawn_ticks_until_shutdown() {
        let (parts, _storage) = spawn_looper();
        let handle = parts.handle.clone();
        let mut service = LooperService::spawn(parts.controller).unwrap();

        assert!(wait_for(|| handle.metrics().ticks > 3));
        service.shutdown();

        // controller is gone once the thread has joined
        assert!(handle.begin_record().is_err());
    }

    #[test]
    fn test_commands_and_capture_flow_through_thread() {
        let (parts, storage) = spawn_looper();
        let handle = parts.handle;
        let mut input = parts.input;
        let pool = parts.pool;
        let _service = LooperService::spawn(parts.controller).unwrap();

        handle.begin_record().unwrap();
        assert!(wait_for(|| handle.mode() == LoopMode::RecordingInitial));

        for fill in [1i16, 2] {
            let mut block = pool.acquire().unwrap();
            block.fill(fill);
            input.try_send(block).unwrap();
        }
        assert!(wait_for(|| handle.metrics().blocks_captured == 2));

        handle.stop(false).unwrap();
        assert!(wait_for(|| handle.mode() == LoopMode::Stopped));
        assert_eq!(storage.contents("b.raw").unwrap().len(), 2 * 16);
    }
}
