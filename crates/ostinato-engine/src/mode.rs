//! Operating modes and the mode transition table.

use std::fmt;

/// The five operating modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopMode {
    /// No playback, no recording.
    Stopped = 0,
    /// Playback only, optionally looping.
    Playing = 1,
    /// First recording pass, no loop to play yet.
    RecordingInitial = 2,
    /// Plays the loop while re-capturing it verbatim.
    RecordingWithPlayback = 3,
    /// Plays the loop and mixes in live input, capturing the mix.
    Overdubbing = 4,
}

impl LoopMode {
    pub fn is_recording(self) -> bool {
        matches!(
            self,
            LoopMode::RecordingInitial | LoopMode::RecordingWithPlayback | LoopMode::Overdubbing
        )
    }

    pub fn has_playback(self) -> bool {
        matches!(
            self,
            LoopMode::Playing | LoopMode::RecordingWithPlayback | LoopMode::Overdubbing
        )
    }

    /// Decode a mode stored as a `u8`; unknown values read as `Stopped`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => LoopMode::Playing,
            2 => LoopMode::RecordingInitial,
            3 => LoopMode::RecordingWithPlayback,
            4 => LoopMode::Overdubbing,
            _ => LoopMode::Stopped,
        }
    }
}

impl From<LoopMode> for u8 {
    fn from(mode: LoopMode) -> u8 {
        mode as u8
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopMode::Stopped => "stopped",
            LoopMode::Playing => "playing",
            LoopMode::RecordingInitial => "recording (initial)",
            LoopMode::RecordingWithPlayback => "recording (playback)",
            LoopMode::Overdubbing => "overdubbing",
        };
        f.write_str(name)
    }
}

/// Events that drive mode changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Play,
    Stop,
    BeginRecord,
    EndRecord,
}

/// What the controller must do alongside a mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    /// Mode changes, streams stay as they are.
    None,
    /// Stop the active streams, then open the named source for playback.
    StartPlayback,
    /// Close whichever streams the current mode holds open.
    StopActive,
    /// Re-aim the slot roles and open the record target.
    OpenInitialRecord,
    /// Drain and close the record target, swap roles, reopen both streams.
    FinishInitialSwap,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeStep {
    pub next: LoopMode,
    pub action: ModeAction,
}

/// The (mode, event) table. `None` means the event is rejected in this
/// mode: no state changes, the controller reports an invalid transition.
pub fn transition(mode: LoopMode, event: LoopEvent) -> Option<ModeStep> {
    use LoopEvent::*;
    use LoopMode::*;

    let step = |next, action| Some(ModeStep { next, action });

    match (mode, event) {
        (_, Play) => step(Playing, ModeAction::StartPlayback),
        (_, Stop) => step(Stopped, ModeAction::StopActive),

        (Stopped, BeginRecord) => step(RecordingInitial, ModeAction::OpenInitialRecord),
        (RecordingWithPlayback, BeginRecord) => step(Overdubbing, ModeAction::None),
        (_, BeginRecord) => None,

        (RecordingInitial, EndRecord) => step(RecordingWithPlayback, ModeAction::FinishInitialSwap),
        (Overdubbing, EndRecord) => step(RecordingWithPlayback, ModeAction::None),
        (_, EndRecord) => None,
    }
}
