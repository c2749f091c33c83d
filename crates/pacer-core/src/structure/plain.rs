use super::{StructuralUnit, clean::finish_text};

const SHOUTED_TITLE_MIN_CHARS: usize = 3;
const LABEL_TITLE_MAX_CHARS: usize = 100;
const CAPS_TITLE_MIN_CHARS: usize = 5;
const CAPS_TITLE_MAX_CHARS: usize = 80;

/// Heuristic structuring for text with no markup.
///
/// These rules are approximate on purpose: a short acronym line in running
/// text may come out as a title.
pub(super) fn structure_plain(text: &str) -> Vec<StructuralUnit> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(classify_line)
        .collect()
}

fn classify_line(line: &str) -> Option<StructuralUnit> {
    let char_count = line.chars().count();

    if char_count > SHOUTED_TITLE_MIN_CHARS && is_upper_alpha(line) {
        return finish_text(line).map(|text| StructuralUnit::title(1, text));
    }

    if let Some(label) = line.strip_suffix(':')
        && char_count < LABEL_TITLE_MAX_CHARS
        && !line.contains(['.', '!', '?'])
    {
        return finish_text(label).map(|text| StructuralUnit::title(2, text));
    }

    if char_count > CAPS_TITLE_MIN_CHARS
        && char_count < CAPS_TITLE_MAX_CHARS
        && !line.chars().any(char::is_lowercase)
    {
        return finish_text(line).map(|text| StructuralUnit::title(3, text));
    }

    finish_text(line).map(StructuralUnit::body)
}

/// Upper-case letters and spaces only.
fn is_upper_alpha(line: &str) -> bool {
    line.chars()
        .all(|ch| ch.is_whitespace() || (ch.is_alphabetic() && ch.is_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<StructuralUnit> {
        classify_line(line)
    }

    #[test]
    fn shouted_line_is_level_one() {
        assert_eq!(
            classify("THE BEGINNING"),
            Some(StructuralUnit::title(1, "THE BEGINNING"))
        );
    }

    #[test]
    fn short_shouted_line_is_not_level_one() {
        // 3 chars fails rule one and is too short for rule three.
        assert_eq!(classify("ABC"), Some(StructuralUnit::body("ABC")));
    }

    #[test]
    fn colon_label_is_level_two_without_colon() {
        assert_eq!(
            classify("Ingredients for the soup:"),
            Some(StructuralUnit::title(2, "Ingredients for the soup"))
        );
    }

    #[test]
    fn colon_line_with_sentence_punctuation_is_body() {
        assert_eq!(
            classify("He said. Then:"),
            Some(StructuralUnit::body("He said. Then:"))
        );
    }

    #[test]
    fn long_colon_line_is_body() {
        let line = format!("{}:", "word ".repeat(25).trim_end());
        assert!(line.chars().count() >= LABEL_TITLE_MAX_CHARS);
        assert!(matches!(classify(&line), Some(StructuralUnit::Body { .. })));
    }

    #[test]
    fn caps_with_digits_is_level_three() {
        assert_eq!(
            classify("CHAPTER 12"),
            Some(StructuralUnit::title(3, "CHAPTER 12"))
        );
    }

    #[test]
    fn ordinary_sentence_is_body_with_symbols_stripped() {
        assert_eq!(
            classify("It costs $5 (roughly)."),
            Some(StructuralUnit::body("It costs 5 roughly."))
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let units = structure_plain("INTRODUCTION\n\n   \nSome text here.\n");
        assert_eq!(
            units,
            vec![
                StructuralUnit::title(1, "INTRODUCTION"),
                StructuralUnit::body("Some text here."),
            ]
        );
    }

    #[test]
    fn symbol_only_line_produces_nothing() {
        assert_eq!(classify("* * *"), None);
    }
}
