impl<P, S, A, W> PlaybackController<P, S, A, W>
where
    P: Presenter,
    S: ProgressStore,
    A: AudioCue,
    W: WakeLock,
{
    /// Replace the word sequence and park at `resume_index` (clamped).
    ///
    /// An empty word list is refused and leaves the current session as it
    /// was, including a running playback.
    pub fn load_document(
        &mut self,
        id: DocumentId,
        words: Vec<String>,
        chapters: Vec<Chapter>,
        resume_index: usize,
    ) -> Result<(), DocumentError> {
        self.words.load(words, chapters)?;

        self.cancel_pending();
        self.release_wake_lock();
        self.pointer = resume_index.min(self.words.len() - 1);
        self.phase = Phase::Paused;
        info!(
            "playback: loaded document={} words={} chapters={} pointer={}",
            id,
            self.words.len(),
            self.words.chapters().len(),
            self.pointer
        );
        self.document = Some(id);
        Ok(())
    }

    /// Start the advance loop at `now_ms`. No-op unless paused.
    pub fn play(&mut self, now_ms: u64) {
        match self.phase {
            Phase::Paused => {}
            Phase::Idle => {
                self.present_notice(Notice::NoDocument);
                return;
            }
            Phase::Playing | Phase::Finished => return,
        }

        self.cancel_pending();
        self.phase = Phase::Playing;
        self.next_advance_ms = Some(now_ms);
        self.acquire_wake_lock();
        self.init_audio();
        info!(
            "playback: play pointer={} wpm={}",
            self.pointer, self.settings.wpm
        );
    }

    /// Stop the advance loop, persist the pointer and show the context view.
    /// No-op unless playing.
    pub fn pause(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }

        self.halt(Phase::Paused);
        info!("playback: pause pointer={}", self.pointer);
        self.present_context();
        self.present_progress();
    }

    pub fn toggle(&mut self, now_ms: u64) {
        if self.document.is_none() {
            self.present_notice(Notice::NoDocument);
            return;
        }

        if self.is_playing() {
            self.pause();
        } else {
            self.play(now_ms);
        }
    }

    /// Whether the pending advance is due at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.phase == Phase::Playing && self.next_advance_ms.is_some_and(|at| now_ms >= at)
    }

    /// Claim the due advance and render the current word.
    pub fn begin_advance(&mut self, now_ms: u64) -> Option<AdvanceTicket> {
        if !self.is_due(now_ms) {
            return None;
        }
        let document = self.document.clone()?;

        if self.pointer >= self.words.len() {
            self.finish();
            return None;
        }

        self.next_advance_ms = None;
        self.present_word();
        Some(AdvanceTicket {
            document,
            epoch: self.epoch,
            pointer: self.pointer,
        })
    }

    /// Metronome tick for the word just rendered. Failures skip the tick.
    pub async fn emit_cue(&mut self) {
        if !self.settings.audio_enabled {
            return;
        }
        self.init_audio();
        if self.audio_state != AudioState::Ready {
            return;
        }

        if let Err(err) = self.audio.tick().await {
            debug!("audio: tick skipped err={:?}", err);
        }
    }

    /// Commit an advance claimed by `begin_advance`. A ticket is stale when
    /// the document, the play session or the pointer changed meanwhile.
    pub fn complete_advance(&mut self, ticket: AdvanceTicket, now_ms: u64) -> AdvanceOutcome {
        if !self.ticket_is_current(&ticket) {
            debug!(
                "playback: stale advance discarded pointer={} epoch={}",
                ticket.pointer, ticket.epoch
            );
            return AdvanceOutcome::Discarded;
        }

        let delay_ms = self
            .words
            .get(ticket.pointer)
            .map(|word| pacing::delay_ms(word, self.settings.wpm, &self.settings.pacing))
            .unwrap_or(1);

        self.pointer += 1;
        if self.pointer % CHECKPOINT_INTERVAL == 0 {
            self.persist_pointer();
        }

        if self.pointer >= self.words.len() {
            self.finish();
            return AdvanceOutcome::Finished;
        }

        let at_ms = now_ms.saturating_add(delay_ms);
        self.next_advance_ms = Some(at_ms);
        AdvanceOutcome::Scheduled { at_ms }
    }

    /// Run one full advance if due: render, cue, commit.
    pub async fn step(&mut self, now_ms: u64) -> Option<AdvanceOutcome> {
        let ticket = self.begin_advance(now_ms)?;
        self.emit_cue().await;
        Some(self.complete_advance(ticket, now_ms))
    }

    /// Persist the pointer for the loaded document. Best-effort.
    pub fn checkpoint(&mut self) {
        self.persist_pointer();
    }

    fn ticket_is_current(&self, ticket: &AdvanceTicket) -> bool {
        self.phase == Phase::Playing
            && ticket.epoch == self.epoch
            && ticket.pointer == self.pointer
            && self.document.as_ref() == Some(&ticket.document)
    }

    fn finish(&mut self) {
        self.halt(Phase::Finished);
        info!("playback: finished words={}", self.words.len());
        self.present_context();
        self.present_progress();
    }

    fn halt(&mut self, phase: Phase) {
        self.cancel_pending();
        self.phase = phase;
        self.persist_pointer();
        self.release_wake_lock();
    }

    /// Drop the pending deadline and invalidate outstanding tickets.
    fn cancel_pending(&mut self) {
        self.next_advance_ms = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Leave `Playing`/`Finished` before moving the pointer by hand.
    fn settle_paused(&mut self) {
        match self.phase {
            Phase::Playing => self.pause(),
            Phase::Finished => self.phase = Phase::Paused,
            Phase::Idle | Phase::Paused => {}
        }
    }

    fn persist_pointer(&mut self) {
        let Some(id) = self.document.as_ref() else {
            return;
        };
        match self.store.set_last_position(id, self.pointer) {
            Ok(()) => debug!("store: position saved document={} pointer={}", id, self.pointer),
            Err(err) => warn!(
                "store: position save failed document={} pointer={} err={:?}",
                id, self.pointer, err
            ),
        }
    }

    fn init_audio(&mut self) {
        if !self.settings.audio_enabled || self.audio_state != AudioState::Uninitialized {
            return;
        }
        self.audio_state = match self.audio.init() {
            Ok(()) => {
                debug!("audio: cue ready");
                AudioState::Ready
            }
            Err(err) => {
                warn!("audio: cue unavailable err={:?}", err);
                AudioState::Unavailable
            }
        };
    }

    fn acquire_wake_lock(&mut self) {
        if self.wake_lock_held {
            return;
        }
        match self.wake_lock.acquire() {
            Ok(()) => self.wake_lock_held = true,
            Err(err) => debug!("power: wake lock unavailable err={:?}", err),
        }
    }

    fn release_wake_lock(&mut self) {
        if !self.wake_lock_held {
            return;
        }
        self.wake_lock_held = false;
        if let Err(err) = self.wake_lock.release() {
            debug!("power: wake lock release failed err={:?}", err);
        }
    }
}
