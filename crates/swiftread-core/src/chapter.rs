//! Chapter markers and pointer → chapter boundary lookup.

use serde::{Deserialize, Serialize};

/// A labeled contiguous sub-range of the word sequence, starting at
/// `start_index` and running until the next chapter starts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub start_index: usize,
}

impl Chapter {
    pub fn new(title: impl Into<String>, start_index: usize) -> Self {
        Self {
            title: title.into(),
            start_index,
        }
    }
}

/// Inclusive word range of the chapter containing a pointer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChapterBounds {
    pub start: usize,
    pub end: usize,
    pub chapter_index: usize,
}

impl ChapterBounds {
    pub fn clamp(&self, pointer: usize) -> usize {
        pointer.clamp(self.start, self.end)
    }
}

/// Locate the chapter containing `pointer`.
///
/// Without chapters the whole document is one chapter. A pointer equal to a
/// chapter's `start_index` belongs to that chapter. Words before the first
/// chapter marker form a preamble reported as chapter 0.
pub fn locate(pointer: usize, chapters: &[Chapter], total_len: usize) -> ChapterBounds {
    let last_word = total_len.saturating_sub(1);

    if chapters.is_empty() {
        return ChapterBounds {
            start: 0,
            end: last_word,
            chapter_index: 0,
        };
    }

    let Some(chapter_index) = chapters
        .iter()
        .rposition(|chapter| chapter.start_index <= pointer)
    else {
        return ChapterBounds {
            start: 0,
            end: chapters[0].start_index.saturating_sub(1),
            chapter_index: 0,
        };
    };

    let start = chapters[chapter_index].start_index;
    let end = chapters
        .get(chapter_index + 1)
        .map(|next| next.start_index.saturating_sub(1))
        .unwrap_or(last_word);

    ChapterBounds {
        start,
        end: end.max(start),
        chapter_index,
    }
}
