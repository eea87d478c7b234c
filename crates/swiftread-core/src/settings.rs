//! Reader configuration and its persistence abstraction.

use serde::{Deserialize, Serialize};

use crate::{fixation::Alignment, pacing::PacingConfig};

pub const DEFAULT_WPM: u16 = 350;
pub const DEFAULT_MIN_WPM: u16 = 100;
pub const DEFAULT_MAX_WPM: u16 = 1_000;
pub const WPM_STEP: u16 = 10;

/// User-tunable settings that survive restarts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    pub wpm: u16,
    pub min_wpm: u16,
    pub max_wpm: u16,
    pub alignment: Alignment,
    pub pacing: PacingConfig,
    pub audio_enabled: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            min_wpm: DEFAULT_MIN_WPM,
            max_wpm: DEFAULT_MAX_WPM,
            alignment: Alignment::Center,
            pacing: PacingConfig::default(),
            audio_enabled: false,
        }
    }
}

impl ReaderSettings {
    /// Restore the invariants: `1 <= min_wpm <= wpm <= max_wpm`, factors >= 1.
    pub fn sanitized(self) -> Self {
        let min_wpm = self.min_wpm.max(1);
        let max_wpm = self.max_wpm.max(min_wpm);
        Self {
            wpm: self.wpm.clamp(min_wpm, max_wpm),
            min_wpm,
            max_wpm,
            pacing: self.pacing.sanitized(),
            ..self
        }
    }

    pub fn clamp_wpm(&self, wpm: u16) -> u16 {
        wpm.clamp(self.min_wpm.max(1), self.max_wpm.max(self.min_wpm.max(1)))
    }

    pub const fn with_wpm(mut self, wpm: u16) -> Self {
        self.wpm = wpm;
        self
    }

    pub const fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Abstract settings persistence backend.
pub trait SettingsStore {
    type Error;

    fn load(&mut self) -> Result<Option<ReaderSettings>, Self::Error>;
    fn save(&mut self, settings: &ReaderSettings) -> Result<(), Self::Error>;
}
