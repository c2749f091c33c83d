//! Chunk segmentation of structural units.

use log::debug;

use crate::structure::StructuralUnit;

/// One presentable step of the playback sequence.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Chunk {
    Title { level: u8, text: String },
    Body { text: String },
    /// Timing gap after a title. Never delivered to the display.
    Pause { duration_ms: u32 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ChunkKind {
    Title,
    Body,
    Pause,
}

impl Chunk {
    pub const fn kind(&self) -> ChunkKind {
        match self {
            Self::Title { .. } => ChunkKind::Title,
            Self::Body { .. } => ChunkKind::Body,
            Self::Pause { .. } => ChunkKind::Pause,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Title { text, .. } | Self::Body { text } => Some(text),
            Self::Pause { .. } => None,
        }
    }

    pub const fn level(&self) -> Option<u8> {
        match self {
            Self::Title { level, .. } => Some(*level),
            Self::Body { .. } | Self::Pause { .. } => None,
        }
    }

    pub const fn is_pause(&self) -> bool {
        matches!(self, Self::Pause { .. })
    }

    /// Reading positions covered by this chunk: one per title, one per body
    /// word, none for pauses.
    fn position_span(&self) -> usize {
        match self {
            Self::Title { .. } => 1,
            Self::Body { text } => text.split_whitespace().count(),
            Self::Pause { .. } => 0,
        }
    }
}

/// Builds the chunk sequence for `units`.
///
/// Titles stay whole and are followed by one pause chunk; body text is cut
/// into runs of `chunk_size` words (a zero size is treated as one). The
/// result depends only on the arguments.
pub fn segment(units: &[StructuralUnit], chunk_size: usize, pause_duration_ms: u32) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();

    for unit in units {
        match unit {
            StructuralUnit::Title { level, text } => {
                chunks.push(Chunk::Title {
                    level: *level,
                    text: text.clone(),
                });
                chunks.push(Chunk::Pause {
                    duration_ms: pause_duration_ms,
                });
            }
            StructuralUnit::Body { text } => {
                chunks.extend(
                    chunk_text(text, chunk_size)
                        .into_iter()
                        .map(|text| Chunk::Body { text }),
                );
            }
        }
    }

    debug!(
        "segment: units={} chunk_size={} pause_ms={} chunks={}",
        units.len(),
        chunk_size,
        pause_duration_ms,
        chunks.len()
    );
    chunks
}

/// Groups the whitespace-separated words of `text` into runs of
/// `words_per_chunk`, joined by single spaces.
pub fn chunk_text(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(words_per_chunk.max(1))
        .map(|group| group.join(" "))
        .collect()
}

/// Titles and words shown before `cursor`.
pub fn reading_position(chunks: &[Chunk], cursor: usize) -> usize {
    chunks
        .iter()
        .take(cursor)
        .map(Chunk::position_span)
        .sum()
}

/// Index of the chunk that shows reading position `position`.
///
/// Returns `chunks.len()` when the position lies past the last chunk.
pub fn cursor_for_position(chunks: &[Chunk], position: usize) -> usize {
    let mut covered = 0usize;
    for (index, chunk) in chunks.iter().enumerate() {
        let span = chunk.position_span();
        if span > 0 && position < covered + span {
            return index;
        }
        covered += span;
    }
    chunks.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_words(chunks: &[Chunk]) -> Vec<String> {
        chunks
            .iter()
            .filter(|chunk| chunk.kind() == ChunkKind::Body)
            .flat_map(|chunk| chunk.text().unwrap_or_default().split_whitespace())
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn chunk_text_groups_pairs() {
        assert_eq!(
            chunk_text("one two three four five six", 2),
            vec!["one two", "three four", "five six"]
        );
    }

    #[test]
    fn chunk_text_collapses_runs_of_whitespace() {
        assert_eq!(chunk_text("one    two\n\tthree", 2), vec!["one two", "three"]);
        assert!(chunk_text("   ", 3).is_empty());
    }

    #[test]
    fn title_then_body_with_pause() {
        let units = [
            StructuralUnit::title(1, "Title"),
            StructuralUnit::body("Body line"),
        ];
        assert_eq!(
            segment(&units, 1, 500),
            vec![
                Chunk::Title {
                    level: 1,
                    text: "Title".into()
                },
                Chunk::Pause { duration_ms: 500 },
                Chunk::Body {
                    text: "Body".into()
                },
                Chunk::Body {
                    text: "line".into()
                },
            ]
        );
    }

    #[test]
    fn body_groups_are_full_except_the_last() {
        let text = "a b c d e f g h i j k";
        for size in 1..=5 {
            let chunks = segment(&[StructuralUnit::body(text)], size, 0);
            let (last, full) = chunks.split_last().unwrap();
            for chunk in full {
                assert_eq!(chunk.position_span(), size);
            }
            assert!((1..=size).contains(&last.position_span()));
            assert_eq!(
                body_words(&chunks),
                text.split_whitespace().map(str::to_owned).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn long_titles_are_never_split() {
        let units = [
            StructuralUnit::title(2, "A rather long heading with many words"),
            StructuralUnit::body("x"),
            StructuralUnit::title(3, "Next"),
        ];
        let chunks = segment(&units, 1, 250);
        assert_eq!(chunks.len(), 5);
        for (index, chunk) in chunks.iter().enumerate() {
            if chunk.kind() == ChunkKind::Title {
                assert_eq!(chunks[index + 1], Chunk::Pause { duration_ms: 250 });
            }
        }
        assert_eq!(
            chunks[0].text(),
            Some("A rather long heading with many words")
        );
    }

    #[test]
    fn segmentation_is_deterministic() {
        let units = [
            StructuralUnit::title(1, "T"),
            StructuralUnit::body("one two three"),
        ];
        assert_eq!(segment(&units, 2, 500), segment(&units, 2, 500));
    }

    #[test]
    fn zero_chunk_size_acts_as_one() {
        let chunks = segment(&[StructuralUnit::body("a b")], 0, 0);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn reading_position_survives_resegmentation() {
        let units = [
            StructuralUnit::title(1, "Intro"),
            StructuralUnit::body("one two three four five six seven"),
        ];
        let by_one = segment(&units, 1, 500);
        let by_three = segment(&units, 3, 500);

        // by_one: [Intro, pause, one, two, three, four, ...]; cursor 5 -> "four"
        let position = reading_position(&by_one, 5);
        assert_eq!(position, 4);

        let cursor = cursor_for_position(&by_three, position);
        // by_three: [Intro, pause, "one two three", "four five six", "seven"]
        assert_eq!(cursor, 3);
        assert_eq!(by_three[cursor].text(), Some("four five six"));
    }

    #[test]
    fn position_past_end_maps_to_len() {
        let chunks = segment(&[StructuralUnit::body("a b c")], 2, 0);
        assert_eq!(cursor_for_position(&chunks, 3), chunks.len());
        assert_eq!(cursor_for_position(&chunks, 0), 0);
    }
}
