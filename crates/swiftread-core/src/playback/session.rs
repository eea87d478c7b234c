impl<P, S, A, W> PlaybackController<P, S, A, W>
where
    P: Presenter,
    S: ProgressStore,
    A: AudioCue,
    W: WakeLock,
{
    /// Full load flow for a freshly ingested document: resume at its stored
    /// position, make it the current-document slot and show the first word.
    pub fn open_document(&mut self, id: DocumentId, document: Document) -> Result<(), DocumentError> {
        self.pause();

        let resume_index = match self.store.last_position(&id) {
            Ok(position) => position.unwrap_or(0),
            Err(err) => {
                warn!("store: position lookup failed document={} err={:?}", id, err);
                0
            }
        };

        if let Err(err) = self.load_document(id, document.words, document.chapters, resume_index) {
            warn!("playback: document refused err={}", err);
            self.present_notice(Notice::EmptyDocument);
            return Err(err);
        }

        if let Some(id) = self.document.as_ref()
            && let Err(err) = self
                .store
                .save_document(id, self.words.words(), self.words.chapters())
        {
            warn!("store: document save failed document={} err={:?}", id, err);
        }

        self.present_word();
        self.present_progress();
        self.present_notice(Notice::DocumentLoaded);
        Ok(())
    }

    /// Surface an ingestion failure. The current document stays loaded.
    pub fn reject_document(&mut self, err: &IngestError) {
        warn!("content: ingest failed err={}", err);
        self.present_notice(Notice::from(err));
    }

    /// Reload the current-document slot from the store. Returns `true` when a
    /// session was restored.
    pub fn restore_session(&mut self) -> bool {
        let stored = match self.store.load_document() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("store: no session to restore");
                return false;
            }
            Err(err) => {
                warn!("store: session load failed err={:?}", err);
                return false;
            }
        };

        let resume_index = match self.store.last_position(&stored.id) {
            Ok(position) => position.unwrap_or(0),
            Err(err) => {
                warn!("store: position lookup failed document={} err={:?}", stored.id, err);
                0
            }
        };

        if let Err(err) =
            self.load_document(stored.id, stored.words, stored.chapters, resume_index)
        {
            warn!("store: stored session unusable err={}", err);
            return false;
        }

        self.present_word();
        self.present_progress();
        self.present_notice(Notice::SessionRestored);
        true
    }
}
