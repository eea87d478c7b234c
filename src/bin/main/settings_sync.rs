use log::{info, warn};
use swiftread_core::settings::{ReaderSettings, SettingsStore};

use super::SETTINGS_SAVE_DEBOUNCE_MS;

pub(super) struct SettingsSyncState {
    last_saved: ReaderSettings,
    pending: Option<(ReaderSettings, u64)>,
}

impl SettingsSyncState {
    pub(super) fn new(initial: ReaderSettings) -> Self {
        Self {
            last_saved: initial,
            pending: None,
        }
    }

    pub(super) fn track_current(&mut self, current: ReaderSettings, now_ms: u64) {
        if current == self.last_saved {
            self.pending = None;
            return;
        }

        match self.pending.as_mut() {
            Some((pending, changed_at_ms)) => {
                if *pending != current {
                    *pending = current;
                    *changed_at_ms = now_ms;
                }
            }
            None => {
                self.pending = Some((current, now_ms));
            }
        }
    }

    /// Deadline of the pending save, if any.
    pub(super) fn due_at_ms(&self) -> Option<u64> {
        self.pending
            .map(|(_, changed_at_ms)| changed_at_ms.saturating_add(SETTINGS_SAVE_DEBOUNCE_MS))
    }

    pub(super) fn flush_if_due<S>(&mut self, store: &mut S, now_ms: u64)
    where
        S: SettingsStore,
        S::Error: core::fmt::Debug,
    {
        let Some((candidate, changed_at_ms)) = self.pending else {
            return;
        };

        if now_ms.saturating_sub(changed_at_ms) < SETTINGS_SAVE_DEBOUNCE_MS {
            return;
        }

        self.flush(store, candidate, now_ms);
    }

    /// Save anything pending right away, e.g. before exit.
    pub(super) fn flush_now<S>(&mut self, store: &mut S, now_ms: u64)
    where
        S: SettingsStore,
        S::Error: core::fmt::Debug,
    {
        if let Some((candidate, _)) = self.pending {
            self.flush(store, candidate, now_ms);
        }
    }

    fn flush<S>(&mut self, store: &mut S, candidate: ReaderSettings, now_ms: u64)
    where
        S: SettingsStore,
        S::Error: core::fmt::Debug,
    {
        match store.save(&candidate) {
            Ok(()) => {
                info!(
                    "settings-save: flushed wpm={} alignment={:?}",
                    candidate.wpm, candidate.alignment
                );
                self.last_saved = candidate;
                self.pending = None;
            }
            Err(err) => {
                warn!("settings-save: failed err={:?}", err);
                // Retry after another debounce window.
                self.pending = Some((candidate, now_ms));
            }
        }
    }
}
