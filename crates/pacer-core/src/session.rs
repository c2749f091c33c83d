//! Registry of live playback sessions.

use std::collections::BTreeMap;

use log::info;

/// Stable identity handed out by [`SessionRegistry::create`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Owns sessions between explicit create and dispose calls.
///
/// Ids are never reused, so a disposed id cannot reach a newer session.
#[derive(Debug)]
pub struct SessionRegistry<P> {
    sessions: BTreeMap<SessionId, P>,
    next_id: u64,
}

impl<P> Default for SessionRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SessionRegistry<P> {
    pub const fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn create(&mut self, session: P) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, session);
        info!("session: create id={} live={}", id.0, self.sessions.len());
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&P> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut P> {
        self.sessions.get_mut(&id)
    }

    /// Removes and returns the session, handing its teardown to the caller.
    pub fn dispose(&mut self, id: SessionId) -> Option<P> {
        let session = self.sessions.remove(&id);
        if session.is_some() {
            info!("session: dispose id={} live={}", id.0, self.sessions.len());
        }
        session
    }

    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_dispose() {
        let mut registry = SessionRegistry::new();
        let first = registry.create("first");
        let second = registry.create("second");

        assert_ne!(first, second);
        assert_eq!(registry.get(second), Some(&"second"));
        assert_eq!(registry.dispose(first), Some("first"));
        assert_eq!(registry.dispose(first), None);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn disposed_ids_are_not_reused() {
        let mut registry = SessionRegistry::new();
        let old = registry.create(1);
        registry.dispose(old);
        let new = registry.create(2);

        assert_ne!(old, new);
        assert!(registry.get(old).is_none());
        if let Some(value) = registry.get_mut(new) {
            *value += 1;
        }
        assert_eq!(registry.get(new), Some(&3));
    }
}
