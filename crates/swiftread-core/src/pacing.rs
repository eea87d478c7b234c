//! Per-word display duration.

use serde::{Deserialize, Serialize};

/// Pause multiplier for blank tokens (paragraph-break markers).
pub const BLANK_FACTOR: f64 = 3.0;
/// Words shorter than this pass faster.
pub const SHORT_WORD_MAX_EXCLUSIVE: usize = 4;
pub const SHORT_WORD_FACTOR: f64 = 0.8;
/// Words longer than this get `long_word_factor`.
pub const LONG_WORD_MIN_EXCLUSIVE: usize = 8;

const SENTENCE_END: [char; 3] = ['.', '?', '!'];

/// Pacing multipliers, all `>= 1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub long_word_factor: f64,
    pub sentence_end_factor: f64,
    pub comma_factor: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            long_word_factor: 1.5,
            sentence_end_factor: 2.3,
            comma_factor: 1.5,
        }
    }
}

impl PacingConfig {
    /// Replace non-finite factors with defaults and lift anything below 1.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            long_word_factor: sanitize_factor(self.long_word_factor, defaults.long_word_factor),
            sentence_end_factor: sanitize_factor(
                self.sentence_end_factor,
                defaults.sentence_end_factor,
            ),
            comma_factor: sanitize_factor(self.comma_factor, defaults.comma_factor),
        }
    }
}

fn sanitize_factor(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.max(1.0) } else { fallback }
}

/// Milliseconds `word` stays on screen at `wpm`.
///
/// Length and punctuation multipliers compose: `"elephant."` at 300 WPM is
/// `200 * long_word_factor * sentence_end_factor`.
pub fn duration_ms(word: &str, wpm: u16, config: &PacingConfig) -> f64 {
    let mut ms = 60_000.0 / f64::from(wpm.max(1));

    if word.trim().is_empty() {
        ms *= BLANK_FACTOR;
    } else {
        let len = word.chars().count();
        if len < SHORT_WORD_MAX_EXCLUSIVE {
            ms *= SHORT_WORD_FACTOR;
        } else if len > LONG_WORD_MIN_EXCLUSIVE {
            ms *= config.long_word_factor;
        }
    }

    if word.contains(SENTENCE_END) {
        ms *= config.sentence_end_factor;
    } else if word.contains(',') {
        ms *= config.comma_factor;
    }

    ms
}

/// Scheduling delay in whole milliseconds, never zero.
pub fn delay_ms(word: &str, wpm: u16, config: &PacingConfig) -> u64 {
    (duration_ms(word, wpm, config).round() as u64).max(1)
}
