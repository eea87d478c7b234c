//! Text extraction from one (X)HTML section.

use super::{
    html_entities::push_decoded,
    scan::{TagInfo, parse_tag_info},
};
use crate::text_policy::chapter_title_label;

const TEXT_BLOCK_TAGS: [&[u8]; 6] = [b"p", b"h1", b"h2", b"h3", b"li", b"blockquote"];
const TITLE_TAGS: [&[u8]; 3] = [b"h1", b"h2", b"title"];
const BREAK_TAGS: [&[u8]; 18] = [
    b"br", b"div", b"section", b"article", b"aside", b"header", b"footer", b"nav", b"ul", b"ol",
    b"table", b"tr", b"td", b"th", b"h4", b"h5", b"h6", b"hr",
];

const FLAG_IN_HEAD: u8 = 1 << 0;
const FLAG_IN_BODY: u8 = 1 << 1;
const FLAG_BODY_SEEN: u8 = 1 << 2;
const FLAG_IN_SCRIPT: u8 = 1 << 3;
const FLAG_IN_STYLE: u8 = 1 << 4;

#[derive(Clone, Copy, Debug, Default)]
struct ParseState {
    flags: u8,
    block_depth: usize,
}

impl ParseState {
    fn has(self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    fn set(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    fn is_hidden(self) -> bool {
        self.has(FLAG_IN_SCRIPT) || self.has(FLAG_IN_STYLE)
    }

    fn emits_body_text(self) -> bool {
        if self.is_hidden() {
            return false;
        }
        if self.has(FLAG_BODY_SEEN) {
            return self.has(FLAG_IN_BODY);
        }
        !self.has(FLAG_IN_HEAD)
    }

    fn apply_structural_tag(&mut self, tag: TagInfo<'_>) {
        let opening = !tag.is_closing && !tag.is_self_closing;

        if tag.is(b"head") {
            self.set(FLAG_IN_HEAD, opening);
        } else if tag.is(b"body") {
            if tag.is_closing {
                self.set(FLAG_IN_BODY, false);
            } else {
                self.set(FLAG_BODY_SEEN, true);
                self.set(FLAG_IN_HEAD, false);
                self.set(FLAG_IN_BODY, opening);
            }
        } else if tag.is(b"script") {
            self.set(FLAG_IN_SCRIPT, opening);
        } else if tag.is(b"style") {
            self.set(FLAG_IN_STYLE, opening);
        }
    }
}

/// Words and heading of one markup document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(super) struct MarkupSection {
    pub title: Option<String>,
    pub words: Vec<String>,
}

/// Title comes from the first non-empty `h1`/`h2`/`title` in document order.
/// Words come from text-block elements, or from the whole body when the
/// document has none.
pub(super) fn extract_section(markup: &str) -> MarkupSection {
    let mut state = ParseState::default();
    let mut block_text = String::new();
    let mut body_text = String::new();
    let mut saw_text_block = false;

    let mut title: Option<String> = None;
    let mut title_capture: Option<(&[u8], String)> = None;

    let bytes = markup.as_bytes();
    let mut cursor = 0usize;
    while cursor < markup.len() {
        let Some(lt) = markup[cursor..].find('<').map(|rel| cursor + rel) else {
            push_text(
                &markup[cursor..],
                state,
                &mut title_capture,
                &mut block_text,
                &mut body_text,
            );
            break;
        };
        push_text(
            &markup[cursor..lt],
            state,
            &mut title_capture,
            &mut block_text,
            &mut body_text,
        );

        if bytes[lt..].starts_with(b"<!--") {
            cursor = markup[lt + 4..]
                .find("-->")
                .map_or(markup.len(), |rel| lt + 4 + rel + 3);
            continue;
        }

        let Some(gt) = markup[lt..].find('>').map(|rel| lt + rel) else {
            break;
        };
        cursor = gt + 1;

        let Some(tag) = parse_tag_info(&bytes[lt + 1..gt]) else {
            continue;
        };
        state.apply_structural_tag(tag);

        if tag.is_any(&TITLE_TAGS) && !tag.is_self_closing {
            if tag.is_closing {
                if let Some((_, text)) = title_capture.take_if(|(name, _)| tag.is(name)) {
                    let label = chapter_title_label(&text);
                    if !label.is_empty() {
                        title = Some(label);
                    }
                }
            } else if title.is_none() && title_capture.is_none() {
                title_capture = Some((tag.local_name, String::new()));
            }
        }

        if tag.is_any(&TEXT_BLOCK_TAGS) {
            block_text.push(' ');
            body_text.push(' ');
            if tag.is_self_closing {
                continue;
            }
            if tag.is_closing {
                state.block_depth = state.block_depth.saturating_sub(1);
            } else if state.emits_body_text() {
                saw_text_block = true;
                state.block_depth += 1;
            }
        } else if tag.is_any(&BREAK_TAGS) {
            block_text.push(' ');
            body_text.push(' ');
        }
    }

    let source = if saw_text_block { &block_text } else { &body_text };
    MarkupSection {
        title,
        words: source.split_whitespace().map(str::to_owned).collect(),
    }
}

fn push_text(
    raw: &str,
    state: ParseState,
    title_capture: &mut Option<(&[u8], String)>,
    block_text: &mut String,
    body_text: &mut String,
) {
    if raw.is_empty() || state.is_hidden() {
        return;
    }

    let mut decoded = String::new();
    push_decoded(raw, &mut decoded);

    if let Some((_, title)) = title_capture.as_mut() {
        title.push_str(&decoded);
    }
    if state.block_depth > 0 {
        block_text.push_str(&decoded);
    }
    if state.emits_body_text() {
        body_text.push_str(&decoded);
    }
}
