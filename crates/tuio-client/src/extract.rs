use tuio_types::{Snapshot, TrackedObject, TuioState, VisibleObject};

/// Build the by-symbol view of `objects`.
///
/// Objects tagged removed are excluded. When several sessions share a symbol
/// id, the first one yielded by `objects` is kept. For an
/// [`ObjectStore`](crate::ObjectStore) that order is hash-map iteration order,
/// so which session wins is unspecified and may differ between runs.
pub fn extract<'a>(objects: impl IntoIterator<Item = &'a TrackedObject>) -> Snapshot {
    objects
        .into_iter()
        .filter(|obj| obj.state != TuioState::Removed)
        .map(VisibleObject::from)
        .collect()
}
