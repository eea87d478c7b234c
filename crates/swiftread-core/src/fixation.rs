//! Optical-center split of a word around its fixation character.

use serde::{Deserialize, Serialize};

/// Glyph shown in place of a blank token.
pub const PLACEHOLDER: &str = "\u{2014}";

/// Medium-length words (`BIAS_MIN_EXCLUSIVE < len < BIAS_MAX_EXCLUSIVE`) move
/// their fixation one character left of the arithmetic center. Empirical
/// tuning constant; keep as is.
pub const BIAS_MIN_EXCLUSIVE: usize = 3;
pub const BIAS_MAX_EXCLUSIVE: usize = 20;

/// Punctuation ignored when measuring a word's readable length.
const STRIPPED_PUNCTUATION: [char; 14] = [
    '.', ',', '?', '!', ':', ';', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Horizontal anchoring of the displayed word.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Fixation character pinned to the optical point.
    #[default]
    Center,
    /// Whole word shown left-justified against an external anchor.
    Edge,
}

/// Word split around its focus character. `prefix + focus + suffix` is the
/// original word for every non-blank input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixationSplit<'a> {
    pub prefix: &'a str,
    pub focus: &'a str,
    pub suffix: &'a str,
}

impl FixationSplit<'static> {
    pub const fn placeholder() -> Self {
        Self {
            prefix: "",
            focus: PLACEHOLDER,
            suffix: "",
        }
    }
}

pub fn align(word: &str, mode: Alignment) -> FixationSplit<'_> {
    if word.trim().is_empty() {
        return FixationSplit::placeholder();
    }

    let whole = FixationSplit {
        prefix: "",
        focus: word,
        suffix: "",
    };

    if mode == Alignment::Edge {
        return whole;
    }

    let Some((start, ch)) = word.char_indices().nth(focus_index(word)) else {
        return whole;
    };
    let end = start + ch.len_utf8();

    FixationSplit {
        prefix: &word[..start],
        focus: &word[start..end],
        suffix: &word[end..],
    }
}

/// Character index of the fixation point, clamped to the last character.
pub fn focus_index(word: &str) -> usize {
    let last = word.chars().count().saturating_sub(1);
    let index = leading_punctuation_len(word) + center_offset(clean_len(word));
    index.min(last)
}

/// Count of leading characters that are not letters or digits.
pub fn leading_punctuation_len(word: &str) -> usize {
    word.chars().take_while(|c| !c.is_alphanumeric()).count()
}

/// Character length with the stripped punctuation set removed anywhere.
pub fn clean_len(word: &str) -> usize {
    word.chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .count()
}

fn center_offset(clean_len: usize) -> usize {
    let offset = clean_len / 2;
    if clean_len > BIAS_MIN_EXCLUSIVE && clean_len < BIAS_MAX_EXCLUSIVE {
        offset.saturating_sub(1)
    } else {
        offset
    }
}
