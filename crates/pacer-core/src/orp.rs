//! Optimal recognition point (ORP) split of a single word.

/// Position of the pivot letter as a percentage of the word length.
pub const ORP_PIVOT_PERCENT: usize = 38;

/// A word split around its fixation letter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrpWord<'a> {
    /// Words of at most one character carry no split.
    Whole(&'a str),
    Split {
        pre: &'a str,
        pivot: char,
        post: &'a str,
    },
}

impl OrpWord<'_> {
    /// Number of characters drawn before the pivot letter.
    pub fn lead_chars(&self) -> usize {
        match self {
            Self::Whole(_) => 0,
            Self::Split { pre, .. } => pre.chars().count(),
        }
    }

    pub fn pivot(&self) -> Option<char> {
        match self {
            Self::Whole(_) => None,
            Self::Split { pivot, .. } => Some(*pivot),
        }
    }
}

/// Character index of the pivot for a word of `char_count` characters.
///
/// Integer form of `floor(char_count * 0.38)`.
pub const fn pivot_index(char_count: usize) -> usize {
    char_count * ORP_PIVOT_PERCENT / 100
}

/// Splits `word` at its recognition point. Never fails.
pub fn render_word(word: &str) -> OrpWord<'_> {
    let char_count = word.chars().count();
    if char_count <= 1 {
        return OrpWord::Whole(word);
    }

    let Some((start, pivot)) = word.char_indices().nth(pivot_index(char_count)) else {
        return OrpWord::Whole(word);
    };
    let end = start + pivot.len_utf8();

    OrpWord::Split {
        pre: &word[..start],
        pivot,
        post: &word[end..],
    }
}

/// Splits every whitespace-delimited word of a multi-word chunk.
pub fn render_chunk(text: &str) -> impl Iterator<Item = OrpWord<'_>> {
    text.split_whitespace().map(render_word)
}
