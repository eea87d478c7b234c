//! Playback state machine: pointer, play/pause, the timed advance loop,
//! navigation and progress bookkeeping.
//!
//! The controller never sleeps. It keeps at most one pending deadline
//! (`next_advance_ms`) and the host drives it with [`PlaybackController::step`]
//! or the split `begin_advance` / `emit_cue` / `complete_advance` sequence.

use log::{debug, info, warn};

use crate::{
    chapter::Chapter,
    content::Document,
    device::{AudioCue, WakeLock},
    error::{DocumentError, IngestError},
    fixation::{self, Alignment},
    input::ReaderCommand,
    pacing,
    render::{
        CONTEXT_RANGE, ChapterListView, ContextWindow, ContextWord, Notice, Presenter,
        ProgressReport, Screen,
    },
    settings::ReaderSettings,
    storage::{DocumentId, ProgressStore},
    text_policy::ceil_div,
    word_store::WordStore,
};

/// Words moved by one rewind or forward jump.
pub const JUMP_STEP: usize = 30;
/// Progress is persisted whenever the pointer reaches a multiple of this
/// while playing.
pub const CHECKPOINT_INTERVAL: usize = 50;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    /// No document loaded.
    #[default]
    Idle,
    Paused,
    Playing,
    /// Pointer reached the end of the document.
    Finished,
}

/// Claim on one in-flight advance, checked again after the audio cue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdvanceTicket {
    document: DocumentId,
    epoch: u64,
    pointer: usize,
}

impl AdvanceTicket {
    pub fn pointer(&self) -> usize {
        self.pointer
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdvanceOutcome {
    Scheduled { at_ms: u64 },
    Finished,
    /// Ticket went stale while the cue was playing.
    Discarded,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandOutcome {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AudioState {
    Uninitialized,
    Ready,
    Unavailable,
}

pub struct PlaybackController<P, S, A, W>
where
    P: Presenter,
    S: ProgressStore,
    A: AudioCue,
    W: WakeLock,
{
    presenter: P,
    store: S,
    audio: A,
    wake_lock: W,
    settings: ReaderSettings,
    words: WordStore,
    document: Option<DocumentId>,
    pointer: usize,
    phase: Phase,
    next_advance_ms: Option<u64>,
    epoch: u64,
    audio_state: AudioState,
    wake_lock_held: bool,
}

impl<P, S, A, W> PlaybackController<P, S, A, W>
where
    P: Presenter,
    S: ProgressStore,
    A: AudioCue,
    W: WakeLock,
{
    pub fn new(presenter: P, store: S, audio: A, wake_lock: W, settings: ReaderSettings) -> Self {
        Self {
            presenter,
            store,
            audio,
            wake_lock,
            settings: settings.sanitized(),
            words: WordStore::new(),
            document: None,
            pointer: 0,
            phase: Phase::Idle,
            next_advance_ms: None,
            epoch: 0,
            audio_state: AudioState::Uninitialized,
            wake_lock_held: false,
        }
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Deadline of the pending advance, if any.
    pub fn next_advance_ms(&self) -> Option<u64> {
        self.next_advance_ms
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document.as_ref()
    }

    pub fn words(&self) -> &WordStore {
        &self.words
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

include!("transport.rs");
include!("navigation.rs");
include!("session.rs");
include!("view.rs");

#[cfg(test)]
mod tests;
