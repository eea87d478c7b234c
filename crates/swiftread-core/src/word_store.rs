//! Immutable-per-load word sequence plus chapter index.

use log::debug;

use crate::{
    chapter::{self, Chapter, ChapterBounds},
    error::DocumentError,
};

/// Ordered words of the loaded document and its chapter markers.
///
/// Contents are replaced wholesale by [`WordStore::load`] and never partially
/// mutated.
#[derive(Clone, Debug, Default)]
pub struct WordStore {
    words: Vec<String>,
    chapters: Vec<Chapter>,
}

impl WordStore {
    pub const fn new() -> Self {
        Self {
            words: Vec::new(),
            chapters: Vec::new(),
        }
    }

    /// Replace the whole sequence. An empty word list is refused and leaves
    /// the previous contents in place.
    pub fn load(&mut self, words: Vec<String>, chapters: Vec<Chapter>) -> Result<(), DocumentError> {
        if words.is_empty() {
            return Err(DocumentError::Empty);
        }

        let chapters = normalize_chapters(chapters, words.len());
        debug!(
            "word-store: loaded words={} chapters={}",
            words.len(),
            chapters.len()
        );

        self.words = words;
        self.chapters = chapters;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.chapters.clear();
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn bounds(&self, pointer: usize) -> ChapterBounds {
        chapter::locate(pointer, &self.chapters, self.words.len())
    }
}

/// Sort markers, drop the ones past the end and keep only the last marker for
/// any repeated start index (sections without words collapse onto the next).
fn normalize_chapters(mut chapters: Vec<Chapter>, total_len: usize) -> Vec<Chapter> {
    chapters.retain(|chapter| chapter.start_index < total_len);
    chapters.sort_by_key(|chapter| chapter.start_index);

    let mut normalized: Vec<Chapter> = Vec::with_capacity(chapters.len());
    for chapter in chapters {
        match normalized.last_mut() {
            Some(last) if last.start_index == chapter.start_index => *last = chapter,
            _ => normalized.push(chapter),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn refuses_empty_document_and_keeps_previous() {
        let mut store = WordStore::new();
        store
            .load(words("one two three"), vec![Chapter::new("All", 0)])
            .unwrap();

        assert_eq!(store.load(Vec::new(), Vec::new()), Err(DocumentError::Empty));
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2), Some("three"));
        assert_eq!(store.get(3), None);
    }

    #[test]
    fn collapses_repeated_and_out_of_range_markers() {
        let mut store = WordStore::new();
        store
            .load(
                words("a b c d e"),
                vec![
                    Chapter::new("Cover", 0),
                    Chapter::new("Intro", 0),
                    Chapter::new("Body", 2),
                    Chapter::new("Empty tail", 5),
                ],
            )
            .unwrap();

        let titles: Vec<&str> = store.chapters().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Intro", "Body"]);
        assert_eq!(store.bounds(4).chapter_index, 1);
        assert_eq!(store.bounds(1).end, 1);
    }
}
