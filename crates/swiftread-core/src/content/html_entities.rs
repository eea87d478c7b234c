/// Decode the name between `&` and `;`.
pub(super) fn decode_html_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    let ch = match entity {
        "amp" | "AMP" => '&',
        "lt" | "LT" => '<',
        "gt" | "GT" => '>',
        "quot" | "QUOT" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "shy" => '\u{ad}',
        "iexcl" => '\u{a1}',
        "iquest" => '\u{bf}',
        "aacute" => 'á',
        "Aacute" => 'Á',
        "eacute" => 'é',
        "Eacute" => 'É',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "agrave" => 'à',
        "Agrave" => 'À',
        "egrave" => 'è',
        "igrave" => 'ì',
        "ograve" => 'ò',
        "ugrave" => 'ù',
        "acirc" => 'â',
        "ecirc" => 'ê',
        "ocirc" => 'ô',
        "atilde" => 'ã',
        "Atilde" => 'Ã',
        "otilde" => 'õ',
        "Otilde" => 'Õ',
        "ntilde" => 'ñ',
        "Ntilde" => 'Ñ',
        "ccedil" => 'ç',
        "Ccedil" => 'Ç',
        "uuml" => 'ü',
        "ouml" => 'ö',
        "auml" => 'ä',
        "szlig" => 'ß',
        _ => return None,
    };
    Some(ch)
}

fn decode_numeric_entity(digits: &str) -> Option<char> {
    let value = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}

/// Longest entity name worth looking for before giving up on a `&`.
const ENTITY_MAX_BYTES: usize = 12;

/// Append `text` to `out` with character references decoded. Unknown or
/// unterminated references are kept verbatim.
pub(super) fn push_decoded(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .char_indices()
            .take(ENTITY_MAX_BYTES)
            .find(|(_, ch)| *ch == ';')
            .and_then(|(semi, _)| Some((semi, decode_html_entity(&after[..semi])?)));

        match decoded {
            Some((semi, ch)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
}
