use std::sync::LazyLock;

use regex::Regex;

use super::{
    StructuralUnit,
    clean::{finish_text, strip_inline_markup},
};

static ATX_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").expect("atx heading pattern")
});
static BLOCK_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:>\s?)+").expect("block quote pattern"));
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[*+-]|\d{1,9}[.)])\s+").expect("list marker pattern"));

const FENCE_MARKERS: [&str; 2] = ["```", "~~~"];

pub(super) fn structure_markdown(text: &str) -> Vec<StructuralUnit> {
    let mut units = Vec::new();
    let mut open_fence: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if let Some(marker) = open_fence {
            if trimmed.starts_with(marker) {
                open_fence = None;
            }
            continue;
        }

        if let Some(marker) = fence_opened_by(trimmed) {
            open_fence = Some(marker);
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        if let Some(unit) = classify_line(line) {
            units.push(unit);
        }
    }

    units
}

/// Returns the fence marker when `trimmed` opens a block that is not closed
/// on the same line.
fn fence_opened_by(trimmed: &str) -> Option<&'static str> {
    FENCE_MARKERS.into_iter().find(|marker| {
        trimmed
            .strip_prefix(marker)
            .is_some_and(|rest| !rest.contains(marker))
    })
}

fn classify_line(line: &str) -> Option<StructuralUnit> {
    if let Some(caps) = ATX_HEADING.captures(line) {
        let level = caps[1].len() as u8;
        let text = finish_text(&strip_inline_markup(&caps[2]))?;
        return Some(StructuralUnit::title(level, text));
    }

    let line = BLOCK_QUOTE.replace(line, "");
    let line = LIST_MARKER.replace(&line, "");
    finish_text(&strip_inline_markup(&line)).map(StructuralUnit::body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles_and_bodies(text: &str) -> Vec<(Option<u8>, String)> {
        structure_markdown(text)
            .into_iter()
            .map(|unit| match unit {
                StructuralUnit::Title { level, text } => (Some(level), text),
                StructuralUnit::Body { text } => (None, text),
            })
            .collect()
    }

    #[test]
    fn heading_levels_follow_hash_count() {
        let units = titles_and_bodies("# One\n## Two\n###### Six\n####### Seven");
        assert_eq!(
            units,
            vec![
                (Some(1), "One".into()),
                (Some(2), "Two".into()),
                (Some(6), "Six".into()),
                (None, "Seven".into()),
            ]
        );
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert_eq!(
            titles_and_bodies("#hashtag here"),
            vec![(None, "hashtag here".into())]
        );
    }

    #[test]
    fn heading_text_is_cleaned() {
        assert_eq!(
            titles_and_bodies("## The **[Road](http://x.y)** Ahead ##"),
            vec![(Some(2), "The Road Ahead".into())]
        );
    }

    #[test]
    fn heading_that_cleans_to_nothing_is_dropped() {
        assert!(structure_markdown("# ![only](image.png)\n#  ").is_empty());
    }

    #[test]
    fn fenced_blocks_are_skipped() {
        let text = "before\n```rust\nfn main() {}\n```\nafter\n~~~\nhidden\n~~~";
        assert_eq!(
            titles_and_bodies(text),
            vec![(None, "before".into()), (None, "after".into())]
        );
    }

    #[test]
    fn unterminated_fence_swallows_the_rest() {
        assert_eq!(
            titles_and_bodies("intro\n```\nnever shown"),
            vec![(None, "intro".into())]
        );
    }

    #[test]
    fn list_and_quote_markers_are_stripped() {
        let text = "- first item\n* second\n12. numbered\n> quoted line\n> - quoted item";
        assert_eq!(
            titles_and_bodies(text),
            vec![
                (None, "first item".into()),
                (None, "second".into()),
                (None, "numbered".into()),
                (None, "quoted line".into()),
                (None, "quoted item".into()),
            ]
        );
    }

    #[test]
    fn blank_lines_and_rules_produce_no_units() {
        let text = "para one\n\n   \n---\n***\npara two";
        assert_eq!(
            titles_and_bodies(text),
            vec![(None, "para one".into()), (None, "para two".into())]
        );
    }

    #[test]
    fn hyphen_inside_text_is_kept() {
        assert_eq!(
            titles_and_bodies("well-known - fact"),
            vec![(None, "well-known - fact".into())]
        );
    }
}
