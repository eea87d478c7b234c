//! Byte-level helpers for the markup scanner and zip entry lookup.

pub(super) fn eq_ascii_case_insensitive(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

pub(super) fn ends_with_ascii_case_insensitive(bytes: &[u8], suffix: &[u8]) -> bool {
    suffix.len() <= bytes.len()
        && eq_ascii_case_insensitive(&bytes[bytes.len() - suffix.len()..], suffix)
}

pub(super) fn trim_ascii(slice: &[u8]) -> &[u8] {
    let mut start = 0usize;
    let mut end = slice.len();
    while start < end && slice[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && slice[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &slice[start..end]
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct TagInfo<'a> {
    /// Element name without namespace prefix.
    pub local_name: &'a [u8],
    pub is_closing: bool,
    pub is_self_closing: bool,
}

impl TagInfo<'_> {
    pub(super) fn is(&self, name: &[u8]) -> bool {
        eq_ascii_case_insensitive(self.local_name, name)
    }

    pub(super) fn is_any(&self, names: &[&[u8]]) -> bool {
        names.iter().any(|name| self.is(name))
    }
}

/// Parse the inside of `<...>`. Comments, doctypes and processing
/// instructions yield `None`.
pub(super) fn parse_tag_info(tag: &[u8]) -> Option<TagInfo<'_>> {
    let tag = trim_ascii(tag);
    if tag.is_empty() || tag.starts_with(b"!") || tag.starts_with(b"?") {
        return None;
    }

    let (is_closing, rest) = match tag.strip_prefix(b"/") {
        Some(rest) => (true, trim_ascii(rest)),
        None => (false, tag),
    };
    if rest.is_empty() {
        return None;
    }

    let is_self_closing = rest.ends_with(b"/");
    let name_end = rest
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'/' || *b == b'>')
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }

    let name = &rest[..name_end];
    let local_name = name
        .iter()
        .rposition(|b| *b == b':')
        .map(|idx| &name[idx + 1..])
        .unwrap_or(name);

    Some(TagInfo {
        local_name,
        is_closing,
        is_self_closing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_info_strips_namespace_and_flags() {
        let info = parse_tag_info(b"opf:item id=\"c1\" /").unwrap();
        assert_eq!(info.local_name, b"item");
        assert!(!info.is_closing);
        assert!(info.is_self_closing);

        let closing = parse_tag_info(b"/ P").unwrap();
        assert!(closing.is(b"p"));
        assert!(closing.is_closing);

        assert_eq!(parse_tag_info(b"!DOCTYPE html"), None);
        assert_eq!(parse_tag_info(b"?xml version=\"1.0\"?"), None);
    }
}
