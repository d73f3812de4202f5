//! The in-flight frame: pending mutations and alive-set bookkeeping.

use std::collections::HashSet;

use tuio_types::{Motion, Position, SessionId, SymbolId};

/// One pending change to the object store.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// A session seen for the first time. Motion starts at zero.
    Add {
        session_id: SessionId,
        symbol_id: SymbolId,
        position: Position,
        angle: f32,
    },
    /// New field values for a known session.
    Update {
        session_id: SessionId,
        position: Position,
        angle: f32,
        motion: Motion,
    },
    /// A session that dropped out of the alive set.
    Remove { session_id: SessionId },
}

/// Scratch area accumulating one frame before its `fseq` arrives.
///
/// Mutations keep arrival order: when two mutations target the same session,
/// the later one is applied last and wins. `current_alive` is `None` until an
/// `alive` message arrives in the frame; `previous_alive` is the alive set of
/// the last accepted frame.
#[derive(Debug, Default)]
pub struct FrameStage {
    mutations: Vec<Mutation>,
    current_alive: Option<Vec<SessionId>>,
    previous_alive: Vec<SessionId>,
    pending_removals: HashSet<SessionId>,
}

impl FrameStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn previous_alive(&self) -> &[SessionId] {
        &self.previous_alive
    }

    /// Record the alive list of this frame.
    ///
    /// Returns the sessions present in the previous alive set but missing
    /// from `ids`, in previous-set order. A session is returned at most once
    /// per frame even if several `alive` messages arrive.
    pub fn record_alive(&mut self, ids: Vec<SessionId>) -> Vec<SessionId> {
        let present: HashSet<SessionId> = ids.iter().copied().collect();
        let pending = &mut self.pending_removals;
        let lost = self
            .previous_alive
            .iter()
            .copied()
            .filter(|id| !present.contains(id))
            .filter(|id| pending.insert(*id))
            .collect();
        self.current_alive = Some(ids);
        lost
    }

    /// Hand the staged mutations to the committer, leaving the list empty.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Close an accepted frame.
    ///
    /// The current alive set becomes the previous one. A frame that carried
    /// no `alive` message keeps the previous set.
    pub fn finish_accepted(&mut self) {
        if let Some(current) = self.current_alive.take() {
            self.previous_alive = current;
        }
        self.mutations.clear();
        self.pending_removals.clear();
    }

    /// Drop everything staged for the in-flight frame.
    ///
    /// The committed alive set is left untouched.
    pub fn discard(&mut self) {
        self.mutations.clear();
        self.current_alive = None;
        self.pending_removals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<SessionId> {
        raw.iter().copied().map(SessionId::new).collect()
    }

    fn remove(id: i64) -> Mutation {
        Mutation::Remove {
            session_id: SessionId::new(id),
        }
    }

    #[test]
    fn mutations_keep_arrival_order() {
        let mut stage = FrameStage::new();
        stage.push(remove(2));
        stage.push(remove(1));
        assert_eq!(stage.len(), 2);
        assert_eq!(stage.take_mutations(), vec![remove(2), remove(1)]);
    }

    #[test]
    fn first_alive_loses_nothing() {
        let mut stage = FrameStage::new();
        assert!(stage.record_alive(ids(&[1, 2])).is_empty());
        stage.finish_accepted();
        assert_eq!(stage.previous_alive(), ids(&[1, 2]).as_slice());
    }

    #[test]
    fn alive_diff_against_previous() {
        let mut stage = FrameStage::new();
        stage.record_alive(ids(&[1, 2, 3]));
        stage.finish_accepted();
        assert_eq!(stage.previous_alive(), ids(&[1, 2, 3]).as_slice());

        let lost = stage.record_alive(ids(&[2, 4]));
        assert_eq!(lost, ids(&[1, 3]));
    }

    #[test]
    fn repeated_alive_reports_each_loss_once() {
        let mut stage = FrameStage::new();
        stage.record_alive(ids(&[1, 2]));
        stage.finish_accepted();

        assert_eq!(stage.record_alive(ids(&[2])), ids(&[1]));
        assert_eq!(stage.record_alive(ids(&[])), ids(&[2]));
        stage.finish_accepted();
        assert!(stage.previous_alive().is_empty());
    }

    #[test]
    fn accepted_frame_without_alive_keeps_previous() {
        let mut stage = FrameStage::new();
        stage.record_alive(ids(&[7]));
        stage.finish_accepted();
        stage.push(remove(7));
        stage.finish_accepted();
        assert_eq!(stage.previous_alive(), ids(&[7]).as_slice());
        assert!(stage.is_empty());
    }

    #[test]
    fn discard_leaves_previous_alive() {
        let mut stage = FrameStage::new();
        stage.record_alive(ids(&[1]));
        stage.finish_accepted();

        stage.record_alive(ids(&[]));
        stage.push(remove(1));
        stage.discard();

        assert!(stage.is_empty());
        assert_eq!(stage.previous_alive(), ids(&[1]).as_slice());
        // The removal can be staged again in the next frame.
        assert_eq!(stage.record_alive(ids(&[])), ids(&[1]));
    }

    #[test]
    fn take_mutations_empties_the_list() {
        let mut stage = FrameStage::new();
        stage.push(remove(1));
        let taken = stage.take_mutations();
        assert_eq!(taken.len(), 1);
        assert!(stage.is_empty());
    }
}
