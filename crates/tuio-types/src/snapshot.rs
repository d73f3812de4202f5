//! The externally consumed view of the tracked-object set.
//!
//! A [`Snapshot`] is produced once per decode cycle. It is keyed by symbol id,
//! so at most one object per marker is visible, and it only ever reflects
//! committed frames.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::ids::SymbolId;
use crate::object::{Position, TrackedObject};

/// One visible object as seen by consumers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleObject {
    pub symbol_id: SymbolId,
    /// Orientation in degrees.
    pub angle: f32,
    /// Normalized surface position, unchanged from the tracker.
    pub position: Position,
}

impl From<&TrackedObject> for VisibleObject {
    fn from(obj: &TrackedObject) -> Self {
        Self {
            symbol_id: obj.symbol_id,
            angle: obj.angle_degrees(),
            position: obj.position,
        }
    }
}

/// Point-in-time mapping from symbol id to visible object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    objects: BTreeMap<SymbolId, VisibleObject>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `object` unless its symbol is already present.
    ///
    /// Returns `true` if the object was inserted. First insertion wins.
    pub fn insert_first(&mut self, object: VisibleObject) -> bool {
        match self.objects.entry(object.symbol_id) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(object);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, symbol: SymbolId) -> Option<&VisibleObject> {
        self.objects.get(&symbol)
    }

    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.objects.contains_key(&symbol)
    }

    /// Visible symbol ids in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.objects.keys().copied()
    }

    /// Visible objects in ascending symbol order.
    pub fn objects(&self) -> impl Iterator<Item = &VisibleObject> {
        self.objects.values()
    }

    /// Compare against the snapshot a consumer saw before this one.
    pub fn delta(&self, previous: &Snapshot) -> SnapshotDelta {
        let mut delta = SnapshotDelta::default();
        for (symbol, current) in &self.objects {
            match previous.objects.get(symbol) {
                None => delta.appeared.push(*symbol),
                Some(before) if before != current => delta.moved.push(*symbol),
                Some(_) => {}
            }
        }
        delta.vanished = previous
            .objects
            .keys()
            .filter(|symbol| !self.objects.contains_key(symbol))
            .copied()
            .collect();
        delta
    }
}

impl FromIterator<VisibleObject> for Snapshot {
    fn from_iter<I: IntoIterator<Item = VisibleObject>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for object in iter {
            snapshot.insert_first(object);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a SymbolId, &'a VisibleObject);
    type IntoIter = btree_map::Iter<'a, SymbolId, VisibleObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Symbol-level changes between two consecutive snapshots.
///
/// Consumers that spawn one scene object per visible marker use `appeared`
/// to instantiate, `vanished` to destroy, and `moved` to reposition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    pub appeared: Vec<SymbolId>,
    pub vanished: Vec<SymbolId>,
    pub moved: Vec<SymbolId>,
}

impl SnapshotDelta {
    /// Returns `true` if nothing appeared, vanished or moved.
    pub fn is_empty(&self) -> bool {
        self.appeared.is_empty() && self.vanished.is_empty() && self.moved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SessionId;

    fn visible(symbol: i32, x: f32, angle: f32) -> VisibleObject {
        VisibleObject {
            symbol_id: SymbolId::new(symbol),
            angle,
            position: Position::new(x, 0.5),
        }
    }

    #[test]
    fn visible_object_converts_angle_to_degrees() {
        let obj = TrackedObject::new(
            SessionId::new(3),
            SymbolId::new(8),
            Position::new(0.25, 0.75),
            std::f32::consts::FRAC_PI_2,
        );
        let vis = VisibleObject::from(&obj);
        assert_eq!(vis.symbol_id, SymbolId::new(8));
        assert_eq!(vis.position, Position::new(0.25, 0.75));
        assert!((vis.angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn first_insert_wins() {
        let mut snap = Snapshot::new();
        assert!(snap.insert_first(visible(1, 0.1, 0.0)));
        assert!(!snap.insert_first(visible(1, 0.9, 0.0)));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get(SymbolId::new(1)).unwrap().position.x, 0.1);
    }

    #[test]
    fn symbols_are_sorted() {
        let snap: Snapshot = [visible(5, 0.0, 0.0), visible(2, 0.0, 0.0), visible(9, 0.0, 0.0)]
            .into_iter()
            .collect();
        let symbols: Vec<i32> = snap.symbols().map(SymbolId::get).collect();
        assert_eq!(symbols, vec![2, 5, 9]);
    }

    #[test]
    fn delta_reports_appeared_vanished_moved() {
        let before: Snapshot = [visible(1, 0.1, 0.0), visible(2, 0.2, 0.0), visible(3, 0.3, 0.0)]
            .into_iter()
            .collect();
        let after: Snapshot = [visible(2, 0.2, 0.0), visible(3, 0.35, 0.0), visible(4, 0.4, 0.0)]
            .into_iter()
            .collect();
        let delta = after.delta(&before);
        assert_eq!(delta.appeared, vec![SymbolId::new(4)]);
        assert_eq!(delta.vanished, vec![SymbolId::new(1)]);
        assert_eq!(delta.moved, vec![SymbolId::new(3)]);
        assert!(!delta.is_empty());
    }

    #[test]
    fn delta_of_identical_snapshots_is_empty() {
        let snap: Snapshot = [visible(1, 0.1, 45.0)].into_iter().collect();
        assert!(snap.delta(&snap.clone()).is_empty());
    }

    #[test]
    fn json_is_keyed_by_symbol() {
        let snap: Snapshot = [visible(100, 0.5, 0.0)].into_iter().collect();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["100"]["symbol_id"], 100);
        assert_eq!(json["100"]["position"]["x"], 0.5);
        let parsed: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snap);
    }
}
