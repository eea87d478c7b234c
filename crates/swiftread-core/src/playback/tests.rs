use core::convert::Infallible;

use embassy_futures::block_on;

use super::*;
use crate::{
    device::NoAudio,
    error::{AudioError, StoreError, WakeLockError},
    storage::{MemoryStore, StoredDocument},
};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Shown {
    Word(String),
    Context {
        indices: Vec<usize>,
        highlighted: Option<usize>,
    },
    Progress {
        pointer: usize,
        chapter_percent: u8,
        chapter_title: Option<String>,
    },
    Chapters {
        active: Option<usize>,
    },
    Notice(Notice),
}

#[derive(Default)]
struct RecordingPresenter {
    shown: Vec<Shown>,
}

impl RecordingPresenter {
    fn words(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|shown| match shown {
                Shown::Word(word) => Some(word.as_str()),
                _ => None,
            })
            .collect()
    }

    fn last_notice(&self) -> Option<Notice> {
        self.shown.iter().rev().find_map(|shown| match shown {
            Shown::Notice(notice) => Some(*notice),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, screen: Screen<'_>) {
        let shown = match screen {
            Screen::Word(split) => {
                Shown::Word(format!("{}[{}]{}", split.prefix, split.focus, split.suffix))
            }
            Screen::Context(window) => Shown::Context {
                indices: window.words.iter().map(|word| word.index).collect(),
                highlighted: window
                    .words
                    .iter()
                    .find(|word| word.highlighted)
                    .map(|word| word.index),
            },
            Screen::Progress(report) => Shown::Progress {
                pointer: report.pointer,
                chapter_percent: report.chapter_percent,
                chapter_title: report.chapter_title.map(str::to_owned),
            },
            Screen::Chapters(view) => Shown::Chapters {
                active: view.active,
            },
            Screen::Notice(notice) => Shown::Notice(notice),
        };
        self.shown.push(shown);
    }
}

/// Memory store that counts position writes.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    position_writes: Vec<usize>,
}

impl ProgressStore for CountingStore {
    type Error = Infallible;

    fn last_position(&mut self, id: &DocumentId) -> Result<Option<usize>, Self::Error> {
        self.inner.last_position(id)
    }

    fn set_last_position(&mut self, id: &DocumentId, position: usize) -> Result<(), Self::Error> {
        self.position_writes.push(position);
        self.inner.set_last_position(id, position)
    }

    fn save_document(
        &mut self,
        id: &DocumentId,
        words: &[String],
        chapters: &[Chapter],
    ) -> Result<(), Self::Error> {
        self.inner.save_document(id, words, chapters)
    }

    fn load_document(&mut self) -> Result<Option<StoredDocument>, Self::Error> {
        self.inner.load_document()
    }
}

#[derive(Default)]
struct CountingWakeLock {
    acquired: u32,
    released: u32,
}

impl WakeLock for CountingWakeLock {
    type Error = Infallible;

    fn acquire(&mut self) -> Result<(), Self::Error> {
        self.acquired += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.released += 1;
        Ok(())
    }
}

#[derive(Default)]
struct BrokenSpeaker {
    ticks: u32,
}

impl AudioCue for BrokenSpeaker {
    type Error = AudioError;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn tick(&mut self) -> Result<(), Self::Error> {
        self.ticks += 1;
        Err(AudioError::Unavailable)
    }
}

/// Store whose every call fails, like a read-only or full disk.
#[derive(Default)]
struct FailingStore {
    calls: u32,
}

impl FailingStore {
    fn fail(&mut self) -> StoreError {
        self.calls += 1;
        StoreError::Io(std::io::Error::other("disk unavailable"))
    }
}

impl ProgressStore for FailingStore {
    type Error = StoreError;

    fn last_position(&mut self, _id: &DocumentId) -> Result<Option<usize>, Self::Error> {
        Err(self.fail())
    }

    fn set_last_position(&mut self, _id: &DocumentId, _position: usize) -> Result<(), Self::Error> {
        Err(self.fail())
    }

    fn save_document(
        &mut self,
        _id: &DocumentId,
        _words: &[String],
        _chapters: &[Chapter],
    ) -> Result<(), Self::Error> {
        Err(self.fail())
    }

    fn load_document(&mut self) -> Result<Option<StoredDocument>, Self::Error> {
        Err(self.fail())
    }
}

struct UnsupportedWakeLock;

impl WakeLock for UnsupportedWakeLock {
    type Error = WakeLockError;

    fn acquire(&mut self) -> Result<(), Self::Error> {
        Err(WakeLockError::Unsupported)
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        Err(WakeLockError::Unsupported)
    }
}

type TestController =
    PlaybackController<RecordingPresenter, CountingStore, NoAudio, CountingWakeLock>;

fn controller_at(wpm: u16) -> TestController {
    PlaybackController::new(
        RecordingPresenter::default(),
        CountingStore::default(),
        NoAudio,
        CountingWakeLock::default(),
        ReaderSettings::default().with_wpm(wpm),
    )
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

fn numbered_words(count: usize) -> Vec<String> {
    (0..count).map(|index| format!("w{index}")).collect()
}

fn three_chapters() -> Vec<Chapter> {
    vec![
        Chapter::new("One", 0),
        Chapter::new("Two", 40),
        Chapter::new("Three", 80),
    ]
}

fn doc_id() -> DocumentId {
    DocumentId::from_file("book.txt", 100)
}

/// Drive the loop the way the host does: jump to each deadline and step.
fn run_until_idle(controller: &mut TestController, mut now_ms: u64) -> Vec<u64> {
    let mut advances = Vec::new();
    while let Some(at) = controller.next_advance_ms() {
        now_ms = now_ms.max(at);
        advances.push(now_ms);
        let outcome = block_on(controller.step(now_ms));
        assert!(outcome.is_some(), "due advance did not run at {now_ms}");
    }
    advances
}

#[test]
fn five_words_at_600_wpm_play_to_the_end() {
    let mut controller = controller_at(600);
    controller
        .load_document(doc_id(), words("one two three four five"), Vec::new(), 0)
        .unwrap();

    controller.play(0);
    let advances = run_until_idle(&mut controller, 0);

    assert_eq!(advances, [0, 80, 160, 260, 360]);
    assert_eq!(
        controller.presenter().words(),
        ["o[n]e", "t[w]o", "t[h]ree", "f[o]ur", "f[i]ve"]
    );
    assert_eq!(controller.pointer(), 5);
    assert_eq!(controller.phase(), Phase::Finished);
    assert_eq!(controller.next_advance_ms(), None);
    assert_eq!(controller.store().position_writes, [5]);
    assert_eq!(controller.wake_lock.acquired, 1);
    assert_eq!(controller.wake_lock.released, 1);

    controller.play(400);
    assert_eq!(controller.phase(), Phase::Finished);
    assert_eq!(controller.next_advance_ms(), None);
}

#[test]
fn advance_waits_for_its_deadline() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), words("alpha beta"), Vec::new(), 0)
        .unwrap();
    controller.play(1_000);

    assert_eq!(
        block_on(controller.step(1_000)),
        Some(AdvanceOutcome::Scheduled { at_ms: 1_200 })
    );
    assert_eq!(block_on(controller.step(1_199)), None);
    assert_eq!(controller.pointer(), 1);
    assert_eq!(
        block_on(controller.step(1_200)),
        Some(AdvanceOutcome::Finished)
    );
}

#[test]
fn pause_twice_is_pause_once() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 0)
        .unwrap();
    controller.play(0);
    block_on(controller.step(0));

    controller.pause();
    let shown_after_first = controller.presenter().shown.len();
    controller.pause();

    assert_eq!(controller.phase(), Phase::Paused);
    assert_eq!(controller.next_advance_ms(), None);
    assert_eq!(controller.store().position_writes, [1]);
    assert_eq!(controller.wake_lock.released, 1);
    assert_eq!(controller.presenter().shown.len(), shown_after_first);
}

#[test]
fn play_while_playing_keeps_one_deadline() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 0)
        .unwrap();

    controller.play(0);
    block_on(controller.step(0));
    let pending = controller.next_advance_ms();
    controller.play(50);

    assert_eq!(controller.next_advance_ms(), pending);
    assert_eq!(controller.wake_lock.acquired, 1);
}

#[test]
fn jumps_never_leave_the_current_chapter() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(100), three_chapters(), 0)
        .unwrap();

    controller.seek(45);
    controller.jump_back();
    assert_eq!(controller.pointer(), 40);

    controller.jump_forward();
    assert_eq!(controller.pointer(), 70);
    controller.jump_forward();
    assert_eq!(controller.pointer(), 79);

    controller.seek(95);
    controller.jump_forward();
    assert_eq!(controller.pointer(), 99);
    controller.jump_relative(-1_000);
    assert_eq!(controller.pointer(), 80);
}

#[test]
fn jump_while_playing_pauses_first() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(100), three_chapters(), 50)
        .unwrap();
    controller.play(0);
    block_on(controller.step(0));

    controller.jump_back();

    assert_eq!(controller.phase(), Phase::Paused);
    assert_eq!(controller.next_advance_ms(), None);
    assert_eq!(controller.pointer(), 40);
    assert_eq!(controller.store().position_writes, [51, 40]);
}

#[test]
fn stale_ticket_after_pause_is_discarded() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 0)
        .unwrap();
    controller.play(0);

    let ticket = controller.begin_advance(0).unwrap();
    controller.pause();
    controller.play(10);

    assert_eq!(
        controller.complete_advance(ticket, 20),
        AdvanceOutcome::Discarded
    );
    assert_eq!(controller.pointer(), 0);
    assert_eq!(controller.next_advance_ms(), Some(10));
}

#[test]
fn stale_ticket_after_reload_is_discarded() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 3)
        .unwrap();
    controller.play(0);
    let ticket = controller.begin_advance(0).unwrap();

    let other = DocumentId::from_file("other.txt", 7);
    controller
        .load_document(other.clone(), words("fresh words here"), Vec::new(), 0)
        .unwrap();

    assert_eq!(
        controller.complete_advance(ticket, 5),
        AdvanceOutcome::Discarded
    );
    assert_eq!(controller.document_id(), Some(&other));
    assert_eq!(controller.pointer(), 0);
    assert_eq!(controller.phase(), Phase::Paused);
    assert_eq!(controller.wake_lock.released, 1);
}

#[test]
fn empty_load_keeps_the_previous_document() {
    let mut controller = controller_at(300);
    assert_eq!(
        controller.load_document(doc_id(), Vec::new(), Vec::new(), 0),
        Err(DocumentError::Empty)
    );
    assert_eq!(controller.phase(), Phase::Idle);

    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 4)
        .unwrap();
    assert_eq!(
        controller.load_document(DocumentId::new("x"), Vec::new(), Vec::new(), 0),
        Err(DocumentError::Empty)
    );

    assert_eq!(controller.document_id(), Some(&doc_id()));
    assert_eq!(controller.pointer(), 4);
    assert_eq!(controller.phase(), Phase::Paused);
    assert_eq!(controller.words().len(), 10);
}

#[test]
fn resume_index_is_clamped() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(5), Vec::new(), 99)
        .unwrap();
    assert_eq!(controller.pointer(), 4);
}

#[test]
fn progress_is_checkpointed_every_fifty_words() {
    let mut controller = controller_at(1_000);
    controller
        .load_document(doc_id(), numbered_words(120), Vec::new(), 0)
        .unwrap();
    controller.play(0);

    let mut now_ms = 0;
    while controller.pointer() < 101 {
        let at = controller.next_advance_ms().unwrap();
        now_ms = now_ms.max(at);
        block_on(controller.step(now_ms));
    }
    assert_eq!(controller.store().position_writes, [50, 100]);

    controller.pause();
    assert_eq!(controller.store().position_writes, [50, 100, 101]);
}

#[test]
fn play_without_document_shows_notice() {
    let mut controller = controller_at(300);

    controller.play(0);
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.presenter().last_notice(), Some(Notice::NoDocument));

    controller.presenter_mut().shown.clear();
    controller.toggle(0);
    assert_eq!(controller.presenter().last_notice(), Some(Notice::NoDocument));
    assert_eq!(controller.next_advance_ms(), None);
}

#[test]
fn context_is_clipped_to_chapter_and_skips_blanks() {
    let mut controller = controller_at(300);
    let mut text = numbered_words(100);
    text[42] = " ".to_owned();
    controller
        .load_document(doc_id(), text, three_chapters(), 45)
        .unwrap();

    let window = controller.context_window().unwrap();
    let indices: Vec<usize> = window.words.iter().map(|word| word.index).collect();

    let expected: Vec<usize> = (40..63).filter(|index| *index != 42).collect();
    assert_eq!(indices, expected);
    assert_eq!(window.range_before, 5);
    assert_eq!(window.range_after, 17);
    assert!(
        window
            .words
            .iter()
            .all(|word| word.highlighted == (word.index == 45))
    );
}

#[test]
fn progress_report_matches_chapter_and_overall_figures() {
    let mut controller = controller_at(100);
    controller
        .load_document(
            doc_id(),
            numbered_words(1_000),
            vec![Chapter::new("First", 0), Chapter::new("Second", 500)],
            250,
        )
        .unwrap();

    let report = controller.progress().unwrap();
    assert_eq!(report.chapter.start, 0);
    assert_eq!(report.chapter.end, 499);
    assert_eq!(report.chapter_title, Some("First"));
    assert_eq!(report.chapter_percent, 50);
    assert_eq!(report.chapter_eta_minutes, 3);
    assert_eq!(report.overall_permille, 250);
    assert_eq!(report.overall_eta_minutes, 8);
}

#[test]
fn preamble_has_no_chapter_title() {
    let mut controller = controller_at(300);
    controller
        .load_document(
            doc_id(),
            numbered_words(20),
            vec![Chapter::new("Late start", 10)],
            3,
        )
        .unwrap();

    let report = controller.progress().unwrap();
    assert_eq!(report.chapter.end, 9);
    assert_eq!(report.chapter_title, None);
    assert_eq!(controller.chapter_list().active, None);
}

#[test]
fn select_chapter_moves_to_its_start() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(100), three_chapters(), 0)
        .unwrap();

    controller.select_chapter(2);
    assert_eq!(controller.pointer(), 80);
    assert_eq!(controller.store().position_writes, [80]);

    controller.select_chapter(7);
    assert_eq!(controller.pointer(), 80);

    controller.show_chapters();
    assert_eq!(
        controller.presenter().shown.last(),
        Some(&Shown::Chapters { active: Some(2) })
    );
}

#[test]
fn wpm_changes_are_clamped() {
    let mut controller = controller_at(300);
    controller.set_wpm(5_000);
    assert_eq!(controller.settings().wpm, 1_000);

    controller.adjust_wpm(-10);
    assert_eq!(controller.settings().wpm, 990);

    controller.set_wpm(0);
    assert_eq!(controller.settings().wpm, 100);
    controller.adjust_wpm(-1_000_000);
    assert_eq!(controller.settings().wpm, 100);
}

#[test]
fn alignment_change_rerenders_when_paused() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), words("reading"), Vec::new(), 0)
        .unwrap();

    controller.set_alignment(Alignment::Edge);
    controller.toggle_alignment();

    assert_eq!(controller.presenter().words(), ["[reading]", "re[a]ding"]);
}

#[test]
fn open_document_resumes_and_saves_the_slot() {
    let mut controller = controller_at(300);
    let id = doc_id();
    controller.store_mut().inner.set_last_position(&id, 7).unwrap();

    let document = Document {
        words: numbered_words(10),
        chapters: vec![Chapter::new("A", 0), Chapter::new("B", 0)],
    };
    controller.open_document(id.clone(), document).unwrap();

    assert_eq!(controller.pointer(), 7);
    assert_eq!(controller.presenter().last_notice(), Some(Notice::DocumentLoaded));

    let stored = controller.store_mut().load_document().unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.chapters, [Chapter::new("B", 0)]);
}

#[test]
fn failed_ingestion_keeps_current_document() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 2)
        .unwrap();

    controller.reject_document(&IngestError::ProtectedContent);

    assert_eq!(
        controller.presenter().last_notice(),
        Some(Notice::ProtectedContent)
    );
    assert_eq!(controller.document_id(), Some(&doc_id()));
    assert_eq!(controller.pointer(), 2);
}

#[test]
fn session_restores_from_store() {
    let mut store = CountingStore::default();
    let id = DocumentId::from_file("saved.txt", 64);
    store
        .inner
        .save_document(&id, &numbered_words(30), &[Chapter::new("Only", 0)])
        .unwrap();
    store.inner.set_last_position(&id, 12).unwrap();

    let mut controller = PlaybackController::new(
        RecordingPresenter::default(),
        store,
        NoAudio,
        CountingWakeLock::default(),
        ReaderSettings::default(),
    );

    assert!(controller.restore_session());
    assert_eq!(controller.document_id(), Some(&id));
    assert_eq!(controller.pointer(), 12);
    assert_eq!(controller.phase(), Phase::Paused);
    assert_eq!(
        controller.presenter().last_notice(),
        Some(Notice::SessionRestored)
    );
}

#[test]
fn nothing_to_restore_stays_idle() {
    let mut controller = controller_at(300);
    assert!(!controller.restore_session());
    assert_eq!(controller.phase(), Phase::Idle);
}

#[test]
fn failing_audio_does_not_stop_playback() {
    let mut controller = PlaybackController::new(
        RecordingPresenter::default(),
        CountingStore::default(),
        BrokenSpeaker::default(),
        CountingWakeLock::default(),
        ReaderSettings {
            audio_enabled: true,
            ..ReaderSettings::default().with_wpm(600)
        },
    );
    controller
        .load_document(doc_id(), words("one two three"), Vec::new(), 0)
        .unwrap();
    controller.play(0);

    let mut now_ms = 0;
    while let Some(at) = controller.next_advance_ms() {
        now_ms = now_ms.max(at);
        block_on(controller.step(now_ms));
    }

    assert_eq!(controller.audio.ticks, 3);
    assert_eq!(controller.pointer(), 3);
    assert_eq!(controller.phase(), Phase::Finished);
}

#[test]
fn failing_store_and_wake_lock_do_not_stop_playback() {
    let mut controller = PlaybackController::new(
        RecordingPresenter::default(),
        FailingStore::default(),
        NoAudio,
        UnsupportedWakeLock,
        ReaderSettings::default().with_wpm(1000),
    );

    let document = Document {
        words: numbered_words(120),
        chapters: Vec::new(),
    };
    controller.open_document(doc_id(), document).unwrap();
    assert_eq!(controller.pointer(), 0);
    assert_eq!(
        controller.presenter().last_notice(),
        Some(Notice::DocumentLoaded)
    );

    controller.play(0);
    assert_eq!(controller.phase(), Phase::Playing);

    let mut now_ms = 0;
    while let Some(at) = controller.next_advance_ms() {
        now_ms = now_ms.max(at);
        block_on(controller.step(now_ms));
    }

    assert_eq!(controller.pointer(), 120);
    assert_eq!(controller.phase(), Phase::Finished);
    // Lookup and slot save on open, two checkpoints, then the final save.
    assert!(controller.store().calls >= 4);
    assert!(!controller.restore_session());
}

#[test]
fn quit_persists_position() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(10), Vec::new(), 6)
        .unwrap();

    assert_eq!(
        controller.apply(ReaderCommand::Quit, 0),
        CommandOutcome::Quit
    );
    assert_eq!(controller.store().position_writes, [6]);
}

#[test]
fn commands_drive_the_controller() {
    let mut controller = controller_at(300);
    controller
        .load_document(doc_id(), numbered_words(100), three_chapters(), 0)
        .unwrap();

    assert_eq!(
        controller.apply(ReaderCommand::TogglePlay, 0),
        CommandOutcome::Continue
    );
    assert!(controller.is_playing());

    controller.apply(ReaderCommand::TogglePlay, 10);
    assert_eq!(controller.phase(), Phase::Paused);

    controller.apply(ReaderCommand::SelectChapter(1), 20);
    controller.apply(ReaderCommand::Forward, 30);
    assert_eq!(controller.pointer(), 70);

    controller.apply(ReaderCommand::AdjustWpm(20), 40);
    assert_eq!(controller.settings().wpm, 320);

    controller.apply(ReaderCommand::Seek(3), 50);
    assert_eq!(controller.pointer(), 3);
}
