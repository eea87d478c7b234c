impl<P, S, A, W> PlaybackController<P, S, A, W>
where
    P: Presenter,
    S: ProgressStore,
    A: AudioCue,
    W: WakeLock,
{
    /// Up to `CONTEXT_RANGE` words around the pointer within its chapter.
    pub fn context_window(&self) -> Option<ContextWindow<'_>> {
        (!self.words.is_empty()).then(|| context_window(&self.words, self.pointer))
    }

    pub fn progress(&self) -> Option<ProgressReport<'_>> {
        (!self.words.is_empty())
            .then(|| progress_report(&self.words, self.pointer, self.settings.wpm))
    }

    pub fn chapter_list(&self) -> ChapterListView<'_> {
        chapter_list(&self.words, self.pointer, self.settings.wpm)
    }

    fn present_word(&mut self) {
        let Some(word) = self.words.get(self.pointer) else {
            return;
        };
        self.presenter
            .present(Screen::Word(fixation::align(word, self.settings.alignment)));
    }

    fn present_context(&mut self) {
        if self.words.is_empty() {
            return;
        }
        self.presenter
            .present(Screen::Context(context_window(&self.words, self.pointer)));
    }

    fn present_progress(&mut self) {
        if self.words.is_empty() {
            return;
        }
        self.presenter.present(Screen::Progress(progress_report(
            &self.words,
            self.pointer,
            self.settings.wpm,
        )));
    }

    fn present_position(&mut self) {
        self.present_word();
        self.present_context();
        self.present_progress();
    }

    fn present_notice(&mut self, notice: Notice) {
        self.presenter.present(Screen::Notice(notice));
    }
}

fn context_window(words: &WordStore, pointer: usize) -> ContextWindow<'_> {
    let bounds = words.bounds(pointer);
    let start = bounds.start.max(pointer.saturating_sub(CONTEXT_RANGE));
    let end = (bounds.end + 1)
        .min(pointer.saturating_add(CONTEXT_RANGE))
        .min(words.len());

    let mut window = ContextWindow {
        words: heapless::Vec::new(),
        center: pointer,
        range_before: pointer.saturating_sub(start),
        range_after: end.saturating_sub(pointer.saturating_add(1)),
    };
    for index in start..end {
        let Some(text) = words.get(index) else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let word = ContextWord {
            index,
            text,
            highlighted: index == pointer,
        };
        if window.words.push(word).is_err() {
            break;
        }
    }
    window
}

fn progress_report(words: &WordStore, pointer: usize, wpm: u16) -> ProgressReport<'_> {
    let bounds = words.bounds(pointer);
    let total_words = words.len();
    let wpm_divisor = u64::from(wpm.max(1));

    let chapter_span = bounds.end.saturating_sub(bounds.start).max(1);
    let chapter_done = pointer.saturating_sub(bounds.start);
    let chapter_percent = (chapter_done as f64 * 100.0 / chapter_span as f64)
        .round()
        .min(100.0) as u8;

    ProgressReport {
        pointer,
        total_words,
        wpm,
        chapter: bounds,
        chapter_title: active_chapter(words, pointer).map(|chapter| chapter.title.as_str()),
        chapter_percent,
        chapter_eta_minutes: ceil_div(bounds.end.saturating_sub(pointer) as u64, wpm_divisor),
        overall_permille: overall_permille(pointer, total_words),
        overall_eta_minutes: ceil_div(total_words.saturating_sub(pointer) as u64, wpm_divisor),
    }
}

fn chapter_list(words: &WordStore, pointer: usize, wpm: u16) -> ChapterListView<'_> {
    let total_words = words.len();
    ChapterListView {
        chapters: words.chapters(),
        active: active_chapter(words, pointer).map(|_| words.bounds(pointer).chapter_index),
        overall_permille: overall_permille(pointer, total_words),
        overall_eta_minutes: ceil_div(
            total_words.saturating_sub(pointer) as u64,
            u64::from(wpm.max(1)),
        ),
    }
}

/// Chapter containing `pointer`; `None` in a preamble or without chapters.
fn active_chapter(words: &WordStore, pointer: usize) -> Option<&Chapter> {
    let bounds = words.bounds(pointer);
    words
        .chapter(bounds.chapter_index)
        .filter(|chapter| chapter.start_index == bounds.start)
}

fn overall_permille(pointer: usize, total_words: usize) -> u16 {
    if total_words == 0 {
        return 0;
    }
    (pointer as f64 * 1000.0 / total_words as f64)
        .round()
        .min(1000.0) as u16
}
