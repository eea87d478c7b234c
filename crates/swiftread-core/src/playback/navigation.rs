impl<P, S, A, W> PlaybackController<P, S, A, W>
where
    P: Presenter,
    S: ProgressStore,
    A: AudioCue,
    W: WakeLock,
{
    /// Move the pointer to `index`, clamped to the document.
    pub fn seek(&mut self, index: usize) {
        if self.words.is_empty() {
            return;
        }

        self.settle_paused();
        self.pointer = index.min(self.words.len() - 1);
        debug!("playback: seek pointer={}", self.pointer);
        self.present_position();
        self.persist_pointer();
    }

    /// Move by `step` words without leaving the current chapter.
    pub fn jump_relative(&mut self, step: isize) {
        if self.words.is_empty() {
            return;
        }

        self.settle_paused();
        let bounds = self.words.bounds(self.pointer);
        self.pointer = bounds.clamp(self.pointer.saturating_add_signed(step));
        debug!(
            "playback: jump step={} pointer={} chapter={}",
            step, self.pointer, bounds.chapter_index
        );
        self.present_position();
        self.persist_pointer();
    }

    pub fn jump_back(&mut self) {
        self.jump_relative(-(JUMP_STEP as isize));
    }

    pub fn jump_forward(&mut self) {
        self.jump_relative(JUMP_STEP as isize);
    }

    /// Move to the first word of chapter `index`. Unknown chapters are
    /// ignored.
    pub fn select_chapter(&mut self, index: usize) {
        let Some(start) = self.words.chapter(index).map(|chapter| chapter.start_index) else {
            debug!(
                "playback: chapter ignored index={} chapters={}",
                index,
                self.words.chapters().len()
            );
            return;
        };

        self.settle_paused();
        self.pointer = start;
        info!("playback: chapter selected index={} pointer={}", index, start);
        self.present_position();
        self.persist_pointer();
    }

    /// Pause and list the chapters with the active one flagged.
    pub fn show_chapters(&mut self) {
        if self.is_playing() {
            self.pause();
        }
        self.presenter
            .present(Screen::Chapters(chapter_list(&self.words, self.pointer, self.settings.wpm)));
    }

    /// Set the reading speed, clamped to the configured range. Takes effect
    /// from the next computed delay.
    pub fn set_wpm(&mut self, wpm: u16) {
        let wpm = self.settings.clamp_wpm(wpm);
        if wpm == self.settings.wpm {
            return;
        }

        self.settings.wpm = wpm;
        info!("playback: wpm={}", wpm);
        if !self.is_playing() {
            self.present_progress();
        }
    }

    pub fn adjust_wpm(&mut self, delta: i32) {
        let target = (i32::from(self.settings.wpm) + delta).clamp(0, i32::from(u16::MAX));
        self.set_wpm(target as u16);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        if alignment == self.settings.alignment {
            return;
        }

        self.settings.alignment = alignment;
        debug!("playback: alignment={:?}", alignment);
        if !self.is_playing() {
            self.present_word();
        }
    }

    pub fn toggle_alignment(&mut self) {
        let next = match self.settings.alignment {
            Alignment::Center => Alignment::Edge,
            Alignment::Edge => Alignment::Center,
        };
        self.set_alignment(next);
    }

    /// Replace the settings wholesale, e.g. after loading them from disk.
    pub fn apply_settings(&mut self, settings: ReaderSettings) {
        self.settings = settings.sanitized();
        if self.settings.audio_enabled && self.is_playing() {
            self.init_audio();
        }
        if !self.is_playing() {
            self.present_word();
            self.present_progress();
        }
    }

    pub fn apply(&mut self, command: ReaderCommand, now_ms: u64) -> CommandOutcome {
        match command {
            ReaderCommand::TogglePlay => self.toggle(now_ms),
            ReaderCommand::Play => self.play(now_ms),
            ReaderCommand::Pause => self.pause(),
            ReaderCommand::Rewind => self.jump_back(),
            ReaderCommand::Forward => self.jump_forward(),
            ReaderCommand::Seek(index) => self.seek(index),
            ReaderCommand::SelectChapter(index) => self.select_chapter(index),
            ReaderCommand::ShowChapters => self.show_chapters(),
            ReaderCommand::SetWpm(wpm) => self.set_wpm(wpm),
            ReaderCommand::AdjustWpm(delta) => self.adjust_wpm(delta),
            ReaderCommand::ToggleAlignment => self.toggle_alignment(),
            ReaderCommand::Quit => {
                if self.is_playing() {
                    self.pause();
                } else {
                    self.checkpoint();
                }
                return CommandOutcome::Quit;
            }
        }
        CommandOutcome::Continue
    }
}
