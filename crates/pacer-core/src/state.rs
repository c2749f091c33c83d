//! Persisted playback state abstraction.

use core::{convert::Infallible, fmt};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reading position saved per source.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(rename = "currentIndex")]
    pub cursor: usize,
    pub wpm: u16,
    pub chunk_size: usize,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
}

/// Abstract key/value persistence backend.
///
/// Writes are best effort from the player's point of view: errors are logged
/// and playback carries on.
pub trait StateStore {
    type Error: fmt::Display;

    fn load(&mut self, key: &str) -> Result<Option<PersistedState>, Self::Error>;
    fn save(&mut self, key: &str, state: &PersistedState) -> Result<(), Self::Error>;
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStateStore {
    entries: HashMap<String, PersistedState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PersistedState> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryStateStore {
    type Error = Infallible;

    fn load(&mut self, key: &str) -> Result<Option<PersistedState>, Self::Error> {
        Ok(self.entries.get(key).copied())
    }

    fn save(&mut self, key: &str, state: &PersistedState) -> Result<(), Self::Error> {
        self.entries.insert(key.to_owned(), *state);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_per_key() {
        let mut store = MemoryStateStore::new();
        let state = PersistedState {
            cursor: 12,
            wpm: 500,
            chunk_size: 2,
            timestamp_ms: 9,
        };

        store.save("a", &state).unwrap();
        assert_eq!(store.load("a").unwrap(), Some(state));
        assert_eq!(store.load("b").unwrap(), None);

        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}
