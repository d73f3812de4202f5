use std::collections::HashMap;

use tuio_types::{SessionId, TrackedObject};

/// Authoritative mapping from session id to tracked object.
///
/// The store itself is not synchronized; [`TuioClient`](crate::TuioClient)
/// keeps it behind the same lock as the frame stage. Mutation is reserved for
/// the frame committer, so every entry reflects the last accepted commit and
/// no entry is ever tagged removed: removed sessions are erased.
#[derive(Clone, Default)]
pub struct ObjectStore {
    objects: HashMap<SessionId, TrackedObject>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: SessionId) -> Option<&TrackedObject> {
        self.objects.get(&id)
    }

    /// Iterate over all objects in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// Copy of every object, in unspecified order.
    pub fn all(&self) -> Vec<TrackedObject> {
        self.objects.values().cloned().collect()
    }

    /// Insert or replace the object keyed by its session id.
    pub(crate) fn insert(&mut self, object: TrackedObject) -> Option<TrackedObject> {
        self.objects.insert(object.session_id, object)
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut TrackedObject> {
        self.objects.get_mut(&id)
    }

    /// Remove the object. Returns `None` if the session was not present.
    pub(crate) fn erase(&mut self, id: SessionId) -> Option<TrackedObject> {
        self.objects.remove(&id)
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("object_count", &self.objects.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_types::{Position, SymbolId, TuioState};

    fn object(session: i64, symbol: i32) -> TrackedObject {
        TrackedObject::new(
            SessionId::new(session),
            SymbolId::new(symbol),
            Position::new(0.5, 0.5),
            0.0,
        )
        .with_state(TuioState::Added)
    }

    #[test]
    fn insert_and_get() {
        let mut store = ObjectStore::new();
        assert!(store.insert(object(1, 10)).is_none());
        let read_back = store.get(SessionId::new(1)).expect("should exist");
        assert_eq!(read_back.symbol_id, SymbolId::new(10));
        assert!(store.get(SessionId::new(1)).is_some());
    }

    #[test]
    fn insert_replaces_same_session() {
        let mut store = ObjectStore::new();
        store.insert(object(1, 10));
        let previous = store.insert(object(1, 11)).expect("replaced");
        assert_eq!(previous.symbol_id, SymbolId::new(10));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn erase_present_and_missing() {
        let mut store = ObjectStore::new();
        store.insert(object(1, 10));
        assert!(store.erase(SessionId::new(1)).is_some());
        assert!(store.erase(SessionId::new(1)).is_none());
        assert!(store.erase(SessionId::new(99)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn all_is_a_detached_copy() {
        let mut store = ObjectStore::new();
        store.insert(object(1, 10));
        let copy = store.all();
        store.erase(SessionId::new(1));
        assert_eq!(copy.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn debug_format() {
        let mut store = ObjectStore::new();
        store.insert(object(1, 1));
        let debug = format!("{store:?}");
        assert!(debug.contains("ObjectStore"));
        assert!(debug.contains("object_count"));
    }
}
