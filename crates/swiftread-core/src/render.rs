//! View models handed to the presentation layer.

use heapless::Vec;

use crate::{
    chapter::{Chapter, ChapterBounds},
    error::IngestError,
    fixation::FixationSplit,
};

/// Words shown on each side of the pointer in the context view.
pub const CONTEXT_RANGE: usize = 18;
pub const CONTEXT_CAPACITY: usize = CONTEXT_RANGE * 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContextWord<'a> {
    /// Position in the word sequence; a presenter can seek back to it.
    pub index: usize,
    pub text: &'a str,
    pub highlighted: bool,
}

/// Surrounding words of the pointer, clipped to the current chapter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextWindow<'a> {
    pub words: Vec<ContextWord<'a>, CONTEXT_CAPACITY>,
    pub center: usize,
    pub range_before: usize,
    pub range_after: usize,
}

/// HUD figures for the current position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProgressReport<'a> {
    pub pointer: usize,
    pub total_words: usize,
    pub wpm: u16,
    pub chapter: ChapterBounds,
    pub chapter_title: Option<&'a str>,
    /// 0..=100
    pub chapter_percent: u8,
    pub chapter_eta_minutes: u64,
    /// Tenths of a percent, 0..=1000.
    pub overall_permille: u16,
    pub overall_eta_minutes: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChapterListView<'a> {
    pub chapters: &'a [Chapter],
    pub active: Option<usize>,
    pub overall_permille: u16,
    pub overall_eta_minutes: u64,
}

/// Transient user-facing notification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notice {
    DocumentLoaded,
    SessionRestored,
    NoDocument,
    EmptyDocument,
    UnsupportedFormat,
    ProtectedContent,
}

impl Notice {
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::EmptyDocument | Self::UnsupportedFormat | Self::ProtectedContent
        )
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::DocumentLoaded => "Document loaded",
            Self::SessionRestored => "Previous session restored",
            Self::NoDocument => "Open a document to start reading",
            Self::EmptyDocument => "Empty file or invalid format",
            Self::UnsupportedFormat => "Unsupported file format",
            Self::ProtectedContent => "Protected or empty document",
        }
    }
}

impl From<&IngestError> for Notice {
    fn from(value: &IngestError) -> Self {
        match value {
            IngestError::Empty => Self::EmptyDocument,
            IngestError::UnsupportedFormat { .. } => Self::UnsupportedFormat,
            IngestError::ProtectedContent => Self::ProtectedContent,
        }
    }
}

/// App-level view model consumed by the presenter.
pub enum Screen<'a> {
    Word(FixationSplit<'a>),
    Context(ContextWindow<'a>),
    Progress(ProgressReport<'a>),
    Chapters(ChapterListView<'a>),
    Notice(Notice),
}

/// Rendering collaborator.
pub trait Presenter {
    fn present(&mut self, screen: Screen<'_>);
}
