//! Command queue between callers and the controller.
//!
//! Commands are applied at the start of the next tick, so every mode
//! change lands on a block boundary. The channel is bounded; a full
//! queue rejects the command instead of blocking the caller.

use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};

use crate::error::{Error, Result};
use crate::metrics::{LooperMetrics, LooperMetricsSnapshot};
use crate::mode::LoopMode;
use crate::state::SharedLooperState;

/// Control requests the tick loop consumes in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum LooperCommand {
    /// Bind the playback role to `name` and start playing it.
    Play { name: String, looping: bool },
    /// Start playing whatever the playback role currently names.
    PlayCurrent { looping: bool },
    /// Stop playback and recording. `reset_roles` also re-aims both
    /// roles at the primary slot.
    Stop { reset_roles: bool },
    BeginRecord,
    EndRecord,
    /// Jump playback to `fraction` of the stream, `0.0..=1.0`.
    Seek { fraction: f32 },
}

/// Cloneable front door to a running looper.
///
/// Sends are non-blocking; observers read the state mirror the
/// controller publishes each tick.
#[derive(Clone)]
pub struct LooperHandle {
    tx: Sender<LooperCommand>,
    shared: Arc<SharedLooperState>,
    metrics: Arc<LooperMetrics>,
    bytes_per_second: u64,
}

impl LooperHandle {
    pub(crate) fn new(
        tx: Sender<LooperCommand>,
        shared: Arc<SharedLooperState>,
        metrics: Arc<LooperMetrics>,
        bytes_per_second: u64,
    ) -> Self {
        Self {
            tx,
            shared,
            metrics,
            bytes_per_second,
        }
    }

    pub fn play(&self, name: impl Into<String>, looping: bool) -> Result<()> {
        self.send(LooperCommand::Play {
            name: name.into(),
            looping,
        })
    }

    pub fn play_current(&self, looping: bool) -> Result<()> {
        self.send(LooperCommand::PlayCurrent { looping })
    }

    pub fn stop(&self, reset_roles: bool) -> Result<()> {
        self.send(LooperCommand::Stop { reset_roles })
    }

    pub fn begin_record(&self) -> Result<()> {
        self.send(LooperCommand::BeginRecord)
    }

    pub fn end_record(&self) -> Result<()> {
        self.send(LooperCommand::EndRecord)
    }

    pub fn seek(&self, fraction: f32) -> Result<()> {
        self.send(LooperCommand::Seek { fraction })
    }

    fn send(&self, command: LooperCommand) -> Result<()> {
        self.tx.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => Error::CommandQueueFull,
            TrySendError::Disconnected(_) => Error::ControllerGone,
        })
    }

    pub fn mode(&self) -> LoopMode {
        self.shared.mode()
    }

    pub fn is_looping(&self) -> bool {
        self.shared.is_looping()
    }

    /// Playback position in milliseconds, 0 with no open stream.
    pub fn position_ms(&self) -> u64 {
        self.ms_from_bytes(self.shared.position_bytes())
    }

    /// Length of the stream behind the playback role in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.ms_from_bytes(self.shared.source_bytes())
    }

    pub fn metrics(&self) -> LooperMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn ms_from_bytes(&self, bytes: u64) -> u64 {
        if self.bytes_per_second == 0 {
            0
        } else {
            bytes.saturating_mul(1000) / self.bytes_per_second
        }
    }
}

impl std::fmt::Debug for LooperHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LooperHandle")
            .field("mode", &self.shared.mode())
            .field("bytes_per_second", &self.bytes_per_second)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn handle_with_queue(capacity: usize) -> (LooperHandle, crossbeam_channel::Receiver<LooperCommand>) {
        let (tx, rx) = bounded(capacity);
        let handle = LooperHandle::new(
            tx,
            Arc::new(SharedLooperState::new()),
            Arc::new(LooperMetrics::new()),
            88_200,
        );
        (handle, rx)
    }

    #[test]
    fn test_commands_arrive_in_order() {
        let (handle, rx) = handle_with_queue(8);
        handle.play("take.raw", true).unwrap();
        handle.begin_record().unwrap();
        handle.stop(false).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            LooperCommand::Play {
                name: "take.raw".into(),
                looping: true
            }
        );
        assert_eq!(rx.try_recv().unwrap(), LooperCommand::BeginRecord);
        assert_eq!(
            rx.try_recv().unwrap(),
            LooperCommand::Stop { reset_roles: false }
        );
    }

    #[test]
    fn test_full_queue_rejects() {
        let (handle, _rx) = handle_with_queue(1);
        handle.end_record().unwrap();
        let err = handle.end_record().unwrap_err();
        assert!(matches!(err, Error::CommandQueueFull));
    }

    #[test]
    fn test_disconnected_controller_reported() {
        let (handle, rx) = handle_with_queue(4);
        drop(rx);
        let err = handle.seek(0.5).unwrap_err();
        assert!(matches!(err, Error::ControllerGone));
    }

    #[test]
    fn test_time_queries_scale_by_rate() {
        let (handle, _rx) = handle_with_queue(4);
        handle.shared.set_progress(88_200, 176_400);
        assert_eq!(handle.position_ms(), 1000);
        assert_eq!(handle.duration_ms(), 2000);
    }
}
