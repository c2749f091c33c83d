//! Load-time failures surfaced to the caller.

use thiserror::Error;

use crate::structure::FormatTag;

/// Reasons a source could not be turned into a chunk sequence.
///
/// Markup problems and out-of-range navigation have no variant: the
/// structurer strips what it cannot read and the player clamps cursor moves.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LoadError {
    #[error("no content to read")]
    EmptyContent,
    #[error("unsupported format: {0}")]
    UnsupportedFormat(FormatTag),
    #[error("failed to read source: {0}")]
    Source(String),
    #[error("no source at index {0}")]
    UnknownSource(usize),
    #[error("no source selected")]
    NoSource,
}
