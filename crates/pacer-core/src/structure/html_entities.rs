use std::borrow::Cow;

const MAX_ENTITY_LEN: usize = 12;

/// Replaces `&name;` and `&#NN;` references with their character.
///
/// Unknown named references become a space; an `&` that does not start a
/// well-formed reference is kept as-is.
pub(super) fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let reference = after
            .find(';')
            .filter(|end| (1..=MAX_ENTITY_LEN).contains(end))
            .map(|end| &after[..end])
            .filter(|name| {
                name.bytes()
                    .all(|byte| byte.is_ascii_alphanumeric() || byte == b'#')
            });

        match reference {
            Some(name) => {
                out.push(decode_entity(name).unwrap_or(' '));
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    if name.starts_with('#') {
        return decode_numeric_entity(&name[1..]);
    }

    let ch = match name.to_ascii_lowercase().as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" | "ldquo" | "rdquo" | "laquo" | "raquo" => '"',
        "apos" | "lsquo" | "rsquo" => '\'',
        "nbsp" | "ensp" | "emsp" | "thinsp" => ' ',
        "ndash" | "mdash" | "minus" => '-',
        "hellip" => '.',
        "aacute" => 'á',
        "eacute" => 'é',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "ntilde" => 'ñ',
        "uuml" => 'ü',
        "ouml" => 'ö',
        "auml" => 'ä',
        "ccedil" => 'ç',
        "szlig" => 'ß',
        _ => return None,
    };
    Some(ch)
}

fn decode_numeric_entity(digits: &str) -> Option<char> {
    let (digits, radix) = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    if digits.is_empty() {
        return None;
    }

    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
}
