//! Line-oriented structuring of raw text into titles and body lines.

use core::fmt;

use log::debug;

use crate::error::LoadError;

mod clean;
mod html_entities;
mod markdown;
mod plain;

pub const MIN_TITLE_LEVEL: u8 = 1;
pub const MAX_TITLE_LEVEL: u8 = 6;

/// One classified line of source text.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum StructuralUnit {
    /// Heading text. Never subdivided by the segmenter.
    Title { level: u8, text: String },
    /// Running text, split into word groups by the segmenter.
    Body { text: String },
}

impl StructuralUnit {
    pub fn title(level: u8, text: impl Into<String>) -> Self {
        Self::Title {
            level: level.clamp(MIN_TITLE_LEVEL, MAX_TITLE_LEVEL),
            text: text.into(),
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::Body { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Title { text, .. } | Self::Body { text } => text,
        }
    }
}

/// Parsing strategy for [`structure`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormatHint {
    Markdown,
    PlainHeuristic,
}

/// Format tag attached to raw text by the extraction collaborator.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FormatTag {
    Markdown,
    PlainText,
    /// Binary document whose text was not extracted.
    Opaque,
}

impl FormatTag {
    pub const fn structure_hint(self) -> Option<FormatHint> {
        match self {
            Self::Markdown => Some(FormatHint::Markdown),
            Self::PlainText => Some(FormatHint::PlainHeuristic),
            Self::Opaque => None,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::PlainText => "plaintext",
            Self::Opaque => "opaque",
        })
    }
}

/// Classifies every non-blank line of `text`.
///
/// Never fails: markup and punctuation that cannot be read are dropped.
pub fn structure(text: &str, hint: FormatHint) -> Vec<StructuralUnit> {
    let units = match hint {
        FormatHint::Markdown => markdown::structure_markdown(text),
        FormatHint::PlainHeuristic => plain::structure_plain(text),
    };

    debug!(
        "structure: hint={:?} input_bytes={} units={} titles={}",
        hint,
        text.len(),
        units.len(),
        units
            .iter()
            .filter(|unit| matches!(unit, StructuralUnit::Title { .. }))
            .count()
    );
    units
}

/// Structures text according to its collaborator-supplied format tag.
///
/// Fails fast on a tag with no structurer path, and when nothing readable
/// remains after cleaning.
pub fn structure_tagged(text: &str, format: FormatTag) -> Result<Vec<StructuralUnit>, LoadError> {
    let hint = format
        .structure_hint()
        .ok_or(LoadError::UnsupportedFormat(format))?;

    let units = structure(text, hint);
    if units.is_empty() {
        return Err(LoadError::EmptyContent);
    }
    Ok(units)
}
