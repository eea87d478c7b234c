//! Audio cue and power-management collaborators.
//!
//! Both are best-effort: failures are logged by the caller and never stop the
//! reading loop.

use core::{convert::Infallible, fmt};

/// Metronome tick emitted alongside every displayed word.
pub trait AudioCue {
    type Error: fmt::Debug;

    /// Prepare the output device. Called once, on first play.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Emit one tick. May suspend while a sleeping output device resumes.
    #[allow(async_fn_in_trait)]
    async fn tick(&mut self) -> Result<(), Self::Error>;
}

/// Keeps the screen awake while words are playing.
pub trait WakeLock {
    type Error: fmt::Debug;

    fn acquire(&mut self) -> Result<(), Self::Error>;
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// Silent cue for hosts without audio output.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAudio;

impl AudioCue for NoAudio {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn tick(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
