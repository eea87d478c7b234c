//! Shared text shaping and truncation policies for compact UI surfaces.

use core::fmt::Write;

use heapless::String;

pub const CHAPTER_TITLE_MAX_CHARS: usize = 35;

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(source: &str) -> std::string::String {
    source.split_whitespace().collect::<std::vec::Vec<_>>().join(" ")
}

/// First `max_chars` characters of `source`, on a char boundary.
pub fn truncate_chars(source: &str, max_chars: usize) -> &str {
    match source.char_indices().nth(max_chars) {
        Some((end, _)) => &source[..end],
        None => source,
    }
}

/// Display label for a chapter heading.
pub fn chapter_title_label(source: &str) -> std::string::String {
    let collapsed = collapse_whitespace(source);
    truncate_chars(&collapsed, CHAPTER_TITLE_MAX_CHARS).to_owned()
}

/// `"2h 5m"` or `"5m"`.
pub fn remaining_time_label(minutes: u64) -> String<24> {
    let mut out = String::new();
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        let _ = write!(out, "{hours}h {rest}m");
    } else {
        let _ = write!(out, "{rest}m");
    }
    out
}

/// `"12.3%"` from tenths of a percent.
pub fn permille_label(permille: u16) -> String<8> {
    let mut out = String::new();
    let _ = write!(out, "{}.{}%", permille / 10, permille % 10);
    out
}

pub fn ceil_div(value: u64, divisor: u64) -> u64 {
    value.div_ceil(divisor.max(1))
}
