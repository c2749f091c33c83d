use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::html_entities::decode_entities;

/// Punctuation that survives cleaning, on top of word characters and spaces.
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '-'];
/// Dropped like other symbols, but they still separate the words around them.
const SEPARATING_SYMBOLS: &[char] = &['<', '>'];

static INLINE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```.*?```").expect("inline fence pattern"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("image pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("link pattern"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)</?(?:a|abbr|b|br|cite|code|del|div|em|hr|i|img|ins|kbd|mark|p|q|s|small|span|strong|sub|sup|u)(?:\s+[a-z][\w:-]*\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))*\s*/?>"#,
    )
    .expect("html tag pattern")
});
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*\*(.+?)\*\*\*|\*\*(.+?)\*\*|\*(.+?)\*|\b___(.+?)___\b|\b__(.+?)__\b|\b_(.+?)_\b|~~(.+?)~~",
    )
    .expect("emphasis pattern")
});

/// Removes inline markup, keeping the visible text of links, code spans and
/// emphasis. Images and inline fenced code disappear entirely.
pub(super) fn strip_inline_markup(line: &str) -> String {
    let decoded = decode_entities(line);
    let text = INLINE_FENCE.replace_all(&decoded, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = IMAGE.replace_all(&text, " ");
    let text = LINK.replace_all(&text, "$1");
    EMPHASIS
        .replace_all(&text, |caps: &Captures<'_>| {
            caps.iter()
                .skip(1)
                .flatten()
                .next()
                .map(|inner| inner.as_str().to_owned())
                .unwrap_or_default()
        })
        .into_owned()
}

pub(super) fn is_allowed_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch.is_whitespace() || ALLOWED_PUNCTUATION.contains(&ch)
}

/// Applies the allow-list and collapses whitespace.
///
/// Returns `None` when nothing readable is left: empty text, or text made of
/// punctuation only.
pub(super) fn finish_text(text: &str) -> Option<String> {
    let filtered: String = text
        .chars()
        .map(|ch| if SEPARATING_SYMBOLS.contains(&ch) { ' ' } else { ch })
        .filter(|ch| is_allowed_char(*ch))
        .collect();

    let mut out = String::with_capacity(filtered.len());
    for word in filtered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    out.chars().any(char::is_alphanumeric).then_some(out)
}
