use std::io::{self, IsTerminal, Stdout, Write};

use log::{debug, warn};
use swiftread_core::{
    device::{AudioCue, WakeLock},
    error::{AudioError, WakeLockError},
    fixation::FixationSplit,
    render::{ChapterListView, ContextWindow, Notice, Presenter, ProgressReport, Screen},
    text_policy::{permille_label, remaining_time_label},
};

/// Column the focus character is pinned to.
const ANCHOR_COLUMN: usize = 24;

const CLEAR_LINE: &str = "\r\x1b[2K";
const FOCUS_STYLE: &str = "\x1b[1;31m";
const HIGHLIGHT_STYLE: &str = "\x1b[7m";
const DIM_STYLE: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// ANSI presenter: the current word is redrawn in place, everything else is
/// printed below it.
pub(super) struct TerminalPresenter {
    out: Stdout,
    word_line_open: bool,
}

impl TerminalPresenter {
    pub(super) fn new() -> Self {
        Self {
            out: io::stdout(),
            word_line_open: false,
        }
    }

    fn draw_word(&mut self, split: FixationSplit<'_>) -> io::Result<()> {
        let mut out = self.out.lock();
        // Edge alignment hands over the whole word as focus.
        if split.prefix.is_empty() && split.suffix.is_empty() && split.focus.chars().count() > 1
        {
            write!(out, "{CLEAR_LINE}{:ANCHOR_COLUMN$}{}", "", split.focus)?;
        } else {
            let pad = ANCHOR_COLUMN.saturating_sub(split.prefix.chars().count());
            write!(
                out,
                "{CLEAR_LINE}{:pad$}{}{FOCUS_STYLE}{}{RESET}{}",
                "", split.prefix, split.focus, split.suffix
            )?;
        }
        out.flush()
    }

    fn draw_context(&mut self, window: &ContextWindow<'_>) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out)?;
        for word in &window.words {
            if word.highlighted {
                write!(out, "{HIGHLIGHT_STYLE}{}{RESET} ", word.text)?;
            } else {
                write!(out, "{} ", word.text)?;
            }
        }
        writeln!(out)?;
        out.flush()
    }

    fn draw_progress(&mut self, report: &ProgressReport<'_>) -> io::Result<()> {
        let mut out = self.out.lock();
        write!(
            out,
            "{DIM_STYLE}{} wpm | word {}/{} | ",
            report.wpm,
            report.pointer.saturating_add(1).min(report.total_words),
            report.total_words
        )?;
        if let Some(title) = report.chapter_title {
            write!(out, "{title} ")?;
        }
        writeln!(
            out,
            "{}% ({} left) | book {} ({} left){RESET}",
            report.chapter_percent,
            remaining_time_label(report.chapter_eta_minutes),
            permille_label(report.overall_permille),
            remaining_time_label(report.overall_eta_minutes)
        )?;
        out.flush()
    }

    fn draw_chapters(&mut self, view: &ChapterListView<'_>) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out)?;
        if view.chapters.is_empty() {
            writeln!(out, "  (no chapters)")?;
        }
        for (index, chapter) in view.chapters.iter().enumerate() {
            let marker = if view.active == Some(index) { '>' } else { ' ' };
            writeln!(out, "{marker} {:>3}. {}", index + 1, chapter.title)?;
        }
        writeln!(
            out,
            "{DIM_STYLE}book {} ({} left){RESET}",
            permille_label(view.overall_permille),
            remaining_time_label(view.overall_eta_minutes)
        )?;
        out.flush()
    }

    fn draw_notice(&mut self, notice: Notice) -> io::Result<()> {
        let mut out = self.out.lock();
        let tag = if notice.is_error() { "!" } else { "*" };
        writeln!(out, "\n[{tag}] {}", notice.message())?;
        out.flush()
    }

    fn end_word_line(&mut self) -> io::Result<()> {
        if !self.word_line_open {
            return Ok(());
        }
        self.word_line_open = false;
        writeln!(self.out)
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, screen: Screen<'_>) {
        let result = match screen {
            Screen::Word(split) => {
                self.word_line_open = true;
                self.draw_word(split)
            }
            Screen::Context(window) => self
                .end_word_line()
                .and_then(|()| self.draw_context(&window)),
            Screen::Progress(report) => self
                .end_word_line()
                .and_then(|()| self.draw_progress(&report)),
            Screen::Chapters(view) => self
                .end_word_line()
                .and_then(|()| self.draw_chapters(&view)),
            Screen::Notice(notice) => self
                .end_word_line()
                .and_then(|()| self.draw_notice(notice)),
        };

        if let Err(err) = result {
            warn!("terminal: draw failed err={}", err);
        }
    }
}

/// Metronome tick through the terminal bell.
pub(super) struct BellCue {
    out: Stdout,
}

impl BellCue {
    pub(super) fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl AudioCue for BellCue {
    type Error = AudioError;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.out.is_terminal() {
            Ok(())
        } else {
            Err(AudioError::Unavailable)
        }
    }

    async fn tick(&mut self) -> Result<(), Self::Error> {
        let mut out = self.out.lock();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|_| AudioError::Unavailable)
    }
}

/// Terminals cannot hold the screen awake; acquiring reports that so the
/// controller never tracks a held lock.
#[derive(Default)]
pub(super) struct TerminalWakeLock;

impl WakeLock for TerminalWakeLock {
    type Error = WakeLockError;

    fn acquire(&mut self) -> Result<(), Self::Error> {
        Err(WakeLockError::Unsupported)
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        debug!("power: wake lock released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_lock_is_reported_unsupported() {
        let mut lock = TerminalWakeLock;
        assert_eq!(lock.acquire(), Err(WakeLockError::Unsupported));
        assert_eq!(lock.release(), Ok(()));
    }
}
