//! Active set of readable sources.

use core::fmt;

use heapless::{String, Vec};
use log::debug;

pub const MAX_SOURCES: usize = 64;
pub const SOURCE_LABEL_BYTES: usize = 48;

/// Stable identity of a source, typically its path.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SourceId(std::string::String);

impl SourceId {
    pub fn new(id: impl Into<std::string::String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which playback state for this source is persisted.
    pub fn state_key(&self) -> std::string::String {
        format!("pacer.state.{}", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceEntry {
    pub id: SourceId,
    pub label: String<SOURCE_LABEL_BYTES>,
    pub progress_percent: f32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatalogLoadResult {
    pub loaded: u16,
    pub truncated: bool,
}

/// Ordered, duplicate-free list of sources with one active entry.
#[derive(Clone, Debug, Default)]
pub struct SourceCatalog {
    entries: Vec<SourceEntry, MAX_SOURCES>,
    active: Option<usize>,
}

impl SourceCatalog {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_entry(&self) -> Option<&SourceEntry> {
        self.active.and_then(|index| self.entries.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&SourceEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn index_of(&self, id: &SourceId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == *id)
    }

    /// Replaces the whole set. The first entry becomes active.
    pub fn replace<I>(&mut self, ids: I) -> CatalogLoadResult
    where
        I: IntoIterator<Item = SourceId>,
    {
        self.entries.clear();
        self.active = None;
        let result = self.append(ids);
        self.active = (!self.entries.is_empty()).then_some(0);
        result
    }

    /// Adds ids not already present, in order. The active entry is kept, or
    /// set to the first entry when there was none.
    pub fn append<I>(&mut self, ids: I) -> CatalogLoadResult
    where
        I: IntoIterator<Item = SourceId>,
    {
        let mut loaded = 0u16;
        let mut truncated = false;

        for id in ids {
            if self.index_of(&id).is_some() {
                continue;
            }

            let entry = SourceEntry {
                label: label_for(&id),
                id,
                progress_percent: 0.0,
            };
            if self.entries.push(entry).is_err() {
                truncated = true;
                break;
            }
            loaded = loaded.saturating_add(1);
        }

        if self.active.is_none() && !self.entries.is_empty() {
            self.active = Some(0);
        }

        debug!(
            "catalog: append loaded={} truncated={} total={}",
            loaded,
            truncated,
            self.entries.len()
        );
        CatalogLoadResult { loaded, truncated }
    }

    /// Drops the entry at `index`.
    ///
    /// An active entry that is removed hands over to the entry now at its
    /// index, or to the new last entry.
    pub fn remove(&mut self, index: usize) -> Option<SourceEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);

        self.active = match self.active {
            _ if self.entries.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) if active == index => Some(active.min(self.entries.len() - 1)),
            other => other,
        };

        debug!(
            "catalog: remove index={} id={} active={:?}",
            index, removed.id, self.active
        );
        Some(removed)
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    pub fn set_progress(&mut self, index: usize, progress_percent: f32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.progress_percent = progress_percent.clamp(0.0, 100.0);
        }
    }
}

/// Display label from the last path segment, extension dropped and
/// separators turned into spaces.
fn label_for(id: &SourceId) -> String<SOURCE_LABEL_BYTES> {
    let name = id
        .as_str()
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };

    let mut label = String::new();
    for word in stem.split(['_', '-', ' ']).filter(|word| !word.is_empty()) {
        if !label.is_empty() && label.push(' ').is_err() {
            break;
        }
        for ch in word.chars() {
            if label.push(ch).is_err() {
                return label;
            }
        }
    }
    label
}
