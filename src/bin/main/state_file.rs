use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use pacer_core::state::{PersistedState, StateStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub(super) enum StateFileError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Playback positions kept in one JSON object, keyed by source state key.
///
/// Every change rewrites the whole file through a temporary sibling.
pub(super) struct JsonStateStore {
    path: PathBuf,
    entries: BTreeMap<String, PersistedState>,
}

impl JsonStateStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub(super) fn open(path: impl Into<PathBuf>) -> Result<Self, StateFileError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        info!(
            "state: open path={} entries={}",
            path.display(),
            entries.len()
        );
        Ok(Self { path, entries })
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StateFileError> {
        let raw = serde_json::to_string_pretty(&self.entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw)?;
        fs::rename(&staging, &self.path)?;
        debug!(
            "state: flush path={} entries={}",
            self.path.display(),
            self.entries.len()
        );
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    type Error = StateFileError;

    fn load(&mut self, key: &str) -> Result<Option<PersistedState>, Self::Error> {
        Ok(self.entries.get(key).copied())
    }

    fn save(&mut self, key: &str, state: &PersistedState) -> Result<(), Self::Error> {
        if self.entries.get(key) == Some(state) {
            return Ok(());
        }
        self.entries.insert(key.to_owned(), *state);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cursor: usize) -> PersistedState {
        PersistedState {
            cursor,
            wpm: 450,
            chunk_size: 2,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(store.load("pacer.state.a").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn saved_positions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonStateStore::open(&path).unwrap();
        store.save("pacer.state.a", &sample(7)).unwrap();
        store.save("pacer.state.b", &sample(9)).unwrap();
        store.remove("pacer.state.b").unwrap();

        let mut reopened = JsonStateStore::open(&path).unwrap();
        assert_eq!(reopened.load("pacer.state.a").unwrap(), Some(sample(7)));
        assert_eq!(reopened.load("pacer.state.b").unwrap(), None);
    }

    #[test]
    fn file_uses_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = JsonStateStore::open(&path).unwrap();
        store.save("pacer.state.a", &sample(3)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &raw["pacer.state.a"];
        assert_eq!(entry["currentIndex"], 3);
        assert_eq!(entry["chunkSize"], 2);
        assert_eq!(entry["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonStateStore::open(&path),
            Err(StateFileError::Json(_))
        ));
    }

    #[test]
    fn unwritable_location_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::open(dir.path().join("no/such/dir/state.json")).unwrap();
        assert!(matches!(
            store.save("k", &sample(1)),
            Err(StateFileError::Io(_))
        ));
    }
}
