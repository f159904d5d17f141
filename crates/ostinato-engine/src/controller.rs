//! The loop controller: mode handling, role swaps, and the per-tick
//! audio path.
//!
//! One controller owns both storage slots. While a loop runs, one slot
//! is read as the playback source and the other is rewritten with this
//! pass's capture; at each loop boundary the roles swap, so the file
//! just recorded becomes the next pass's source. Commands arrive over a
//! bounded queue and are applied at tick start, which keeps every mode
//! change on a block boundary.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use ostinato_core::{
    block_port, mix_saturating, BlockPool, BlockReceiver, BlockSender, CaptureQueue, LooperConfig,
    PooledBlock, StorageBackend,
};
use tracing::{debug, warn};

use crate::command::{LooperCommand, LooperHandle};
use crate::metrics::{LooperMetrics, LooperMetricsSnapshot};
use crate::mode::{transition, LoopEvent, LoopMode, ModeAction};
use crate::playback::{PlayStep, PlaybackEngine};
use crate::record::RecordEngine;
use crate::state::SharedLooperState;

/// Which stream each storage slot currently serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RoleAssignment {
    playback: String,
    record: String,
}

impl RoleAssignment {
    pub(crate) fn new(playback: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            playback: playback.into(),
            record: record.into(),
        }
    }

    pub(crate) fn playback(&self) -> &str {
        &self.playback
    }

    pub(crate) fn record(&self) -> &str {
        &self.record
    }

    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.playback, &mut self.record);
    }

    /// Point both roles at the primary slot.
    pub(crate) fn reset(&mut self, primary: &str) {
        self.playback.clear();
        self.playback.push_str(primary);
        self.record.clear();
        self.record.push_str(primary);
    }

    pub(crate) fn rearm(&mut self, playback: &str, record: &str) {
        self.playback.clear();
        self.playback.push_str(playback);
        self.record.clear();
        self.record.push_str(record);
    }

    pub(crate) fn set_playback(&mut self, name: &str) {
        self.playback.clear();
        self.playback.push_str(name);
    }
}

/// Everything [`LoopController::new`] hands back: the controller itself
/// plus the endpoints other threads keep.
pub struct LooperParts<S: StorageBackend> {
    pub controller: LoopController<S>,
    pub handle: LooperHandle,
    /// Live-input feed; the capture side pushes one block per period.
    pub input: BlockSender,
    /// Output tap; carries what the looper plays each tick.
    pub output: BlockReceiver,
    /// The block pool feeding `input`.
    pub pool: BlockPool,
}

/// Mode machine and tick driver over a storage backend.
pub struct LoopController<S: StorageBackend> {
    storage: S,
    config: LooperConfig,
    pool: BlockPool,
    playback: PlaybackEngine<S::Reader>,
    record: RecordEngine<S::Writer>,
    capture: CaptureQueue,
    live_in: BlockReceiver,
    out: BlockSender,
    /// Block played this tick, parked until the capture step consumes it.
    held: Option<PooledBlock>,
    mode: LoopMode,
    roles: RoleAssignment,
    looping: bool,
    pending_seek: Option<u64>,
    /// Set when the source ran out mid-block; the roles rotate at tick end
    /// so the padded final block still lands in the closing pass.
    swap_pending: bool,
    commands: Receiver<LooperCommand>,
    shared: Arc<SharedLooperState>,
    metrics: Arc<LooperMetrics>,
}

impl<S: StorageBackend> LoopController<S> {
    /// Build a controller and its endpoints. Nothing is opened until the
    /// first play or record command.
    pub fn new(storage: S, config: LooperConfig) -> LooperParts<S> {
        let pool = BlockPool::new(config.pool_blocks, config.block_samples);
        let (input, live_in) = block_port(config.input_capacity_blocks);
        let (out, output) = block_port(config.output_capacity_blocks);
        let (tx, commands) = bounded(config.command_capacity);
        let shared = Arc::new(SharedLooperState::new());
        let metrics = Arc::new(LooperMetrics::new());
        let handle = LooperHandle::new(
            tx,
            Arc::clone(&shared),
            Arc::clone(&metrics),
            config.bytes_per_second(),
        );

        let controller = LoopController {
            playback: PlaybackEngine::new(config.block_bytes()),
            record: RecordEngine::new(config.block_bytes(), config.write_batch_blocks),
            capture: CaptureQueue::with_capacity(config.capture_capacity_blocks),
            roles: RoleAssignment::new(&config.slot_a, &config.slot_b),
            pool: pool.clone(),
            storage,
            live_in,
            out,
            held: None,
            mode: LoopMode::Stopped,
            looping: false,
            pending_seek: None,
            swap_pending: false,
            commands,
            shared,
            metrics,
            config,
        };

        LooperParts {
            controller,
            handle,
            input,
            output,
            pool,
        }
    }

    /// Bind the playback role to `name` and start playing it.
    pub fn play(&mut self, name: &str, looping: bool) {
        self.start_playback(Some(name), looping);
    }

    /// Start playing whatever the playback role currently names.
    pub fn play_current(&mut self, looping: bool) {
        self.start_playback(None, looping);
    }

    fn start_playback(&mut self, name: Option<&str>, looping: bool) {
        let Some(step) = transition(self.mode, LoopEvent::Play) else {
            self.reject("play");
            return;
        };
        self.stop_active(false);
        if let Some(name) = name {
            self.roles.set_playback(name);
        }
        self.looping = looping;
        self.mode = if self.open_playback() {
            step.next
        } else {
            LoopMode::Stopped
        };
    }

    /// Stop playback and recording; pending capture is flushed first.
    pub fn stop(&mut self, reset_roles: bool) {
        let Some(step) = transition(self.mode, LoopEvent::Stop) else {
            self.reject("stop");
            return;
        };
        self.stop_active(reset_roles);
        self.looping = false;
        self.mode = step.next;
    }

    /// From `Stopped`: re-aim the roles and open the record target.
    /// From `RecordingWithPlayback`: start mixing live input in.
    pub fn begin_record(&mut self) {
        let Some(step) = transition(self.mode, LoopEvent::BeginRecord) else {
            self.reject("begin_record");
            return;
        };
        if step.action == ModeAction::OpenInitialRecord {
            self.roles.rearm(&self.config.slot_a, &self.config.slot_b);
            if self.open_record_target() {
                self.mode = step.next;
            } else {
                self.fail_to_stopped();
            }
        } else {
            self.mode = step.next;
        }
    }

    /// Close out the current recording pass. Ending the initial pass
    /// swaps the roles and starts the loop; ending an overdub drops back
    /// to plain loop recording.
    pub fn end_record(&mut self) {
        let Some(step) = transition(self.mode, LoopEvent::EndRecord) else {
            self.reject("end_record");
            return;
        };
        if step.action == ModeAction::FinishInitialSwap {
            if self.finish_pass_and_rearm() {
                self.mode = step.next;
            }
        } else {
            self.mode = step.next;
        }
    }

    /// Request a playback jump to `fraction` of the stream. The offset is
    /// aligned down to a block boundary and applied at the next tick.
    pub fn request_seek(&mut self, fraction: f32) {
        if self.mode != LoopMode::Playing || !self.playback.is_open() {
            warn!(mode = %self.mode, "seek ignored outside playback");
            return;
        }
        if fraction.is_nan() {
            warn!("seek fraction ignored");
            return;
        }
        let fraction = f64::from(fraction.clamp(0.0, 1.0));
        let stride = self.config.block_bytes() as u64;
        let target = (self.playback.size_bytes() as f64 * fraction) as u64;
        self.pending_seek = Some(target - target % stride);
    }

    /// Advance the looper by one block period.
    pub fn tick(&mut self) {
        self.metrics.record_tick();
        self.drain_commands();
        match self.mode {
            LoopMode::Stopped => {
                self.live_in.clear();
            }
            LoopMode::Playing => self.tick_playing(),
            LoopMode::RecordingInitial => self.tick_recording_initial(),
            LoopMode::RecordingWithPlayback => self.tick_record_playback(false),
            LoopMode::Overdubbing => self.tick_record_playback(true),
        }
        self.publish_state();
    }

    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Slot name currently serving playback.
    pub fn playback_slot(&self) -> &str {
        self.roles.playback()
    }

    /// Slot name currently serving capture.
    pub fn record_slot(&self) -> &str {
        self.roles.record()
    }

    pub fn position_ms(&self) -> u64 {
        self.config.ms_from_bytes(self.playback.position_bytes())
    }

    pub fn duration_ms(&self) -> u64 {
        self.config.ms_from_bytes(self.playback.size_bytes())
    }

    pub fn config(&self) -> &LooperConfig {
        &self.config
    }

    pub fn metrics(&self) -> LooperMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: LooperCommand) {
        match command {
            LooperCommand::Play { name, looping } => self.play(&name, looping),
            LooperCommand::PlayCurrent { looping } => self.play_current(looping),
            LooperCommand::Stop { reset_roles } => self.stop(reset_roles),
            LooperCommand::BeginRecord => self.begin_record(),
            LooperCommand::EndRecord => self.end_record(),
            LooperCommand::Seek { fraction } => self.request_seek(fraction),
        }
    }

    fn tick_playing(&mut self) {
        // input is ignored while only playing
        self.live_in.clear();

        if let Some(target) = self.pending_seek {
            if self.playback.seek(target) {
                self.pending_seek = None;
            }
        }

        let mut step = self.playback.step(&self.pool);
        if matches!(step, PlayStep::Inactive | PlayStep::Boundary) {
            if !self.restart_playback() {
                return;
            }
            step = self.playback.step(&self.pool);
        }
        match step {
            PlayStep::Produced { block, bytes, last } => {
                self.metrics.record_block_played(bytes as u64);
                self.emit(block);
                if last {
                    self.restart_playback();
                }
            }
            PlayStep::Skipped => self.metrics.record_pool_exhausted(),
            PlayStep::Inactive | PlayStep::Boundary => {
                // a zero-length source cannot advance; stop instead of
                // reopening it every tick
                warn!(source = self.roles.playback(), "playback source empty");
                self.fail_to_stopped();
            }
        }
    }

    fn tick_recording_initial(&mut self) {
        let mut received = false;
        while let Some(block) = self.live_in.try_recv() {
            received = true;
            self.monitor(&block);
            match self.capture.push(block) {
                Ok(()) => self.metrics.record_block_captured(),
                Err(_dropped) => self.metrics.record_capture_overflow(),
            }
        }
        if !received {
            self.metrics.record_input_starved();
        }
        self.record.step(&mut self.capture, &self.metrics);
    }

    fn tick_record_playback(&mut self, overdub: bool) {
        let mut step = self.playback.step(&self.pool);
        if matches!(step, PlayStep::Inactive | PlayStep::Boundary) {
            // loop boundary with nothing produced yet: rotate, then pull
            // the first block of the new pass in the same tick
            if !self.rotate_loop() {
                return;
            }
            step = self.playback.step(&self.pool);
        }
        match step {
            PlayStep::Produced { block, bytes, last } => {
                self.metrics.record_block_played(bytes as u64);
                self.stash_held(block);
                if last {
                    self.swap_pending = true;
                }
            }
            PlayStep::Skipped => {
                self.metrics.record_pool_exhausted();
                return;
            }
            PlayStep::Inactive | PlayStep::Boundary => {
                // zero-length loop, e.g. a recording pass that ended with
                // no input; nothing can play, so stop
                warn!(source = self.roles.playback(), "loop source empty after rotation");
                self.fail_to_stopped();
                return;
            }
        }

        self.capture_step(overdub);
        self.record.step(&mut self.capture, &self.metrics);

        if self.swap_pending {
            self.swap_pending = false;
            self.rotate_loop();
        }
    }

    /// Route the held block (and live input, when overdubbing) to the
    /// output tap and the capture queue.
    fn capture_step(&mut self, overdub: bool) {
        let live = self.live_in.try_recv();
        match (self.held.take(), live) {
            (Some(mut held), Some(live)) => {
                if overdub {
                    let clipped = mix_saturating(&mut held, &live);
                    if clipped > 0 {
                        self.metrics.record_clipped(clipped);
                    }
                }
                self.emit_and_capture(held);
            }
            (Some(held), None) => {
                // the loop carries on unchanged when input is late
                if overdub {
                    self.metrics.record_input_starved();
                }
                self.emit_and_capture(held);
            }
            (None, Some(live)) => {
                self.metrics.record_missing_held();
                if overdub {
                    self.emit_and_capture(live);
                }
            }
            (None, None) => {}
        }
    }

    fn stash_held(&mut self, block: PooledBlock) {
        if self.held.replace(block).is_some() {
            debug_assert!(false, "held block overwritten before capture");
            self.metrics.record_dropped_held();
            warn!("held block overwritten before capture");
        }
    }

    fn emit(&mut self, block: PooledBlock) {
        if self.out.try_send(block).is_err() {
            self.metrics.record_output_dropped();
        }
    }

    /// Copy `block` to the output tap, keeping the original for capture.
    /// When the pool cannot cover the copy, capture wins over output.
    fn monitor(&mut self, block: &PooledBlock) {
        match self.pool.duplicate(block) {
            Some(copy) => {
                if self.out.try_send(copy).is_err() {
                    self.metrics.record_output_dropped();
                }
            }
            None => self.metrics.record_pool_exhausted(),
        }
    }

    fn emit_and_capture(&mut self, block: PooledBlock) {
        self.monitor(&block);
        match self.capture.push(block) {
            Ok(()) => self.metrics.record_block_captured(),
            Err(_dropped) => self.metrics.record_capture_overflow(),
        }
    }

    /// End of stream while playing. Looping reopens the source and counts
    /// a cycle; otherwise the looper stops.
    fn restart_playback(&mut self) -> bool {
        self.playback.close();
        if !self.looping {
            debug!(source = self.roles.playback(), "playback finished");
            self.stop_active(false);
            self.mode = LoopMode::Stopped;
            return false;
        }
        if !self.open_playback() {
            self.fail_to_stopped();
            return false;
        }
        self.metrics.record_loop_cycle();
        true
    }

    /// Loop boundary in a recording mode: this pass's capture becomes the
    /// next pass's source.
    fn rotate_loop(&mut self) -> bool {
        if !self.finish_pass_and_rearm() {
            return false;
        }
        self.metrics.record_loop_cycle();
        true
    }

    /// Flush and close the record target, swap the roles, and reopen both
    /// streams. Any open failure stops the looper.
    fn finish_pass_and_rearm(&mut self) -> bool {
        self.record.drain_and_close(&mut self.capture, &self.metrics);
        self.playback.close();
        self.roles.swap();
        if !self.open_playback() {
            self.fail_to_stopped();
            return false;
        }
        if !self.open_record_target() {
            self.fail_to_stopped();
            return false;
        }
        true
    }

    fn open_playback(&mut self) -> bool {
        match self.storage.open_read(self.roles.playback()) {
            Ok(reader) => {
                self.playback.open(reader, self.roles.playback());
                true
            }
            Err(err) => {
                warn!(source = self.roles.playback(), %err, "open for playback failed");
                self.metrics.record_open_failure();
                false
            }
        }
    }

    /// Open the record role's slot as a fresh stream, clearing any stale
    /// contents first.
    fn open_record_target(&mut self) -> bool {
        let removed = if self.storage.exists(self.roles.record()) {
            self.storage.remove(self.roles.record())
        } else {
            Ok(())
        };
        let opened = removed.and_then(|()| self.storage.open_write(self.roles.record()));
        match opened {
            Ok(writer) => {
                self.record.open(writer, self.roles.record());
                true
            }
            Err(err) => {
                warn!(target = self.roles.record(), %err, "open for record failed");
                self.metrics.record_open_failure();
                false
            }
        }
    }

    /// Close both streams, flushing pending capture, and clear per-pass
    /// scratch state. Mode is left to the caller.
    fn stop_active(&mut self, reset_roles: bool) {
        self.record.drain_and_close(&mut self.capture, &self.metrics);
        self.playback.close();
        self.held = None;
        self.swap_pending = false;
        self.pending_seek = None;
        if reset_roles {
            self.roles.reset(&self.config.slot_a);
        }
    }

    fn fail_to_stopped(&mut self) {
        self.stop_active(false);
        self.mode = LoopMode::Stopped;
    }

    fn publish_state(&self) {
        self.shared.set_mode(self.mode);
        self.shared.set_looping(self.looping);
        if self.playback.is_open() {
            self.shared
                .set_progress(self.playback.position_bytes(), self.playback.size_bytes());
        } else {
            self.shared.set_progress(0, 0);
        }
    }

    fn reject(&self, command: &str) {
        warn!(mode = %self.mode, command, "transition rejected");
        self.metrics.record_invalid_transition();
    }
}
