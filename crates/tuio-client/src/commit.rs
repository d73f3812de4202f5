//! Applying an accepted frame to the object store.

use tracing::debug;
use tuio_types::{TrackedObject, TuioState, TuioTime};

use crate::sequence::FrameVerdict;
use crate::stage::Mutation;
use crate::store::ObjectStore;

/// Summary of one `fseq` decision and what it did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitReport {
    /// The `fseq` value that closed the frame.
    pub frame: i32,
    pub verdict: FrameVerdict,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    /// Updates or removals whose session was no longer in the store.
    pub skipped: usize,
}

impl CommitReport {
    fn empty(frame: i32, verdict: FrameVerdict) -> Self {
        Self {
            frame,
            verdict,
            added: 0,
            updated: 0,
            removed: 0,
            skipped: 0,
        }
    }

    /// Report for a frame rejected as late. `discarded` is the number of
    /// staged mutations that were dropped.
    pub fn late(frame: i32, discarded: usize) -> Self {
        Self {
            skipped: discarded,
            ..Self::empty(frame, FrameVerdict::Late)
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == FrameVerdict::Accepted
    }

    /// Number of mutations that changed the store.
    pub fn applied(&self) -> usize {
        self.added + self.updated + self.removed
    }
}

/// Apply the mutations of an accepted frame in staged order.
///
/// - `Remove` erases the session; an absent session is skipped.
/// - `Add` inserts a new object tagged added and stamped with `time`.
/// - `Update` moves the stored object. If the position changed on an axis
///   whose stored speed is exactly zero, only position and angle are applied;
///   otherwise position, angle and all motion terms are replaced. An absent
///   session is skipped.
///
/// The caller holds the lock covering `store` for the whole call, so readers
/// never see a half-applied frame.
pub fn commit(frame: i32, mutations: Vec<Mutation>, store: &mut ObjectStore, time: TuioTime) -> CommitReport {
    let mut report = CommitReport::empty(frame, FrameVerdict::Accepted);

    for mutation in mutations {
        match mutation {
            Mutation::Remove { session_id } => match store.erase(session_id) {
                Some(_) => report.removed += 1,
                None => report.skipped += 1,
            },
            Mutation::Add {
                session_id,
                symbol_id,
                position,
                angle,
            } => {
                let object = TrackedObject::new(session_id, symbol_id, position, angle)
                    .with_state(TuioState::Added)
                    .with_time(time);
                store.insert(object);
                report.added += 1;
            }
            Mutation::Update {
                session_id,
                position,
                angle,
                motion,
            } => {
                let Some(stored) = store.get_mut(session_id) else {
                    report.skipped += 1;
                    continue;
                };
                let jumped_x = position.x != stored.position.x && stored.motion.x_speed == 0.0;
                let jumped_y = position.y != stored.position.y && stored.motion.y_speed == 0.0;
                if jumped_x || jumped_y {
                    stored.update_position(time, position, angle);
                } else {
                    stored.update_full(time, position, angle, motion);
                }
                report.updated += 1;
            }
        }
    }

    debug!(
        frame,
        added = report.added,
        updated = report.updated,
        removed = report.removed,
        skipped = report.skipped,
        objects = store.len(),
        "frame committed"
    );
    report
}
