//! The decoder instance: message dispatch over shared, lock-protected state.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;
use tuio_osc::{OscMessage, OscPacket};
use tuio_types::{MonotonicClock, SessionClock, SessionId, Snapshot, TrackedObject, TuioTime};

use crate::commit::{commit, CommitReport};
use crate::error::ClientResult;
use crate::extract::extract;
use crate::message::{SetMessage, TuioMessage};
use crate::sequence::{FrameSequencer, FrameVerdict};
use crate::stage::{FrameStage, Mutation};
use crate::store::ObjectStore;

/// Running counters of one decoder instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub frames_accepted: u64,
    pub frames_late: u64,
    /// Messages for other profiles or unhandled commands.
    pub messages_ignored: u64,
    /// Messages under a handled command with bad arguments.
    pub messages_malformed: u64,
}

#[derive(Default)]
struct ClientState {
    store: ObjectStore,
    stage: FrameStage,
    sequencer: FrameSequencer,
    stats: ClientStats,
}

/// TUIO 2D object decoder.
///
/// One mutex covers the object store, the frame stage and the sequencer. The
/// decode loop takes it once per message, and an accepted frame is committed
/// under a single acquisition, so concurrent readers see either the previous
/// frame or the new one and never a mix.
///
/// # Example
///
/// ```
/// use tuio_client::{SetMessage, TuioClient, TuioMessage};
/// use tuio_types::{Motion, Position, SessionId, SymbolId};
///
/// let client = TuioClient::new();
/// client.handle(TuioMessage::Set(SetMessage {
///     session_id: SessionId::new(1),
///     symbol_id: SymbolId::new(100),
///     position: Position::new(0.5, 0.5),
///     angle: 0.0,
///     motion: Motion::ZERO,
/// }));
/// client.handle(TuioMessage::Alive(vec![SessionId::new(1)]));
/// client.handle(TuioMessage::Fseq(1));
///
/// assert!(client.snapshot().contains(SymbolId::new(100)));
/// ```
pub struct TuioClient<C: SessionClock = MonotonicClock> {
    clock: C,
    state: Mutex<ClientState>,
}

impl TuioClient {
    /// Decoder whose session clock starts now.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for TuioClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SessionClock> TuioClient<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: Mutex::new(ClientState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().expect("client state lock poisoned")
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// Parse and handle one OSC message.
    ///
    /// Returns the commit report when the message was an `fseq`. Messages
    /// for other profiles and unknown commands are ignored. A malformed
    /// message is counted and returned as an error without touching the
    /// frame.
    pub fn dispatch(&self, msg: &OscMessage) -> ClientResult<Option<CommitReport>> {
        match TuioMessage::parse(msg) {
            Ok(Some(parsed)) => Ok(self.handle(parsed)),
            Ok(None) => {
                self.lock().stats.messages_ignored += 1;
                Ok(None)
            }
            Err(err) => {
                self.lock().stats.messages_malformed += 1;
                Err(err)
            }
        }
    }

    /// Stage or commit one typed message.
    pub fn handle(&self, msg: TuioMessage) -> Option<CommitReport> {
        match msg {
            TuioMessage::Set(set) => {
                self.handle_set(set);
                None
            }
            TuioMessage::Alive(ids) => {
                self.handle_alive(ids);
                None
            }
            TuioMessage::Fseq(frame) => Some(self.handle_fseq(frame)),
        }
    }

    /// Dispatch every message of `packet` in transport order, then extract.
    ///
    /// A malformed message is logged and skipped; the rest of the packet is
    /// still processed.
    pub fn process_packet(&self, packet: &OscPacket) -> Snapshot {
        for msg in packet.messages() {
            if let Err(err) = self.dispatch(msg) {
                debug!(address = %msg.address, error = %err, "skipping malformed message");
            }
        }
        self.snapshot()
    }

    fn handle_set(&self, set: SetMessage) {
        let mut state = self.lock();
        let mutation = match state.store.get(set.session_id) {
            None => Mutation::Add {
                session_id: set.session_id,
                symbol_id: set.symbol_id,
                position: set.position,
                angle: set.angle,
            },
            Some(stored) if stored.fields_equal(set.position, set.angle, &set.motion) => return,
            Some(_) => Mutation::Update {
                session_id: set.session_id,
                position: set.position,
                angle: set.angle,
                motion: set.motion,
            },
        };
        state.stage.push(mutation);
    }

    fn handle_alive(&self, ids: Vec<SessionId>) {
        let mut state = self.lock();
        let state = &mut *state;
        // Staged even when the store lacks the session: an `Add` earlier in
        // this frame may precede it. The commit skips absent sessions.
        for session_id in state.stage.record_alive(ids) {
            state.stage.push(Mutation::Remove { session_id });
        }
    }

    fn handle_fseq(&self, frame: i32) -> CommitReport {
        let now = self.clock.now();
        let mut state = self.lock();
        let state = &mut *state;
        match state.sequencer.evaluate(frame, now) {
            FrameVerdict::Accepted => {
                let mutations = state.stage.take_mutations();
                let report = commit(frame, mutations, &mut state.store, state.sequencer.current_time());
                state.stage.finish_accepted();
                state.stats.frames_accepted += 1;
                report
            }
            FrameVerdict::Late => {
                let discarded = state.stage.len();
                state.stage.discard();
                state.stats.frames_late += 1;
                debug!(
                    frame,
                    current_frame = state.sequencer.current_frame(),
                    discarded,
                    "late frame discarded"
                );
                CommitReport::late(frame, discarded)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Copy of every committed object, in unspecified order.
    pub fn objects(&self) -> Vec<TrackedObject> {
        self.lock().store.all()
    }

    pub fn object(&self, id: SessionId) -> Option<TrackedObject> {
        self.lock().store.get(id).cloned()
    }

    /// The by-symbol view of the committed store.
    pub fn snapshot(&self) -> Snapshot {
        extract(self.lock().store.iter())
    }

    /// Alive set of the last accepted frame that carried an `alive` message.
    pub fn alive_ids(&self) -> Vec<SessionId> {
        self.lock().stage.previous_alive().to_vec()
    }

    pub fn current_frame(&self) -> i32 {
        self.lock().sequencer.current_frame()
    }

    pub fn current_time(&self) -> TuioTime {
        self.lock().sequencer.current_time()
    }

    /// Number of mutations staged for the in-flight frame.
    pub fn pending_mutations(&self) -> usize {
        self.lock().stage.len()
    }

    /// Drop the in-flight frame, as on shutdown. The store is untouched.
    pub fn discard_pending(&self) {
        let mut state = self.lock();
        let discarded = state.stage.len();
        state.stage.discard();
        if discarded > 0 {
            debug!(discarded, "pending frame discarded");
        }
    }

    pub fn stats(&self) -> ClientStats {
        self.lock().stats
    }
}

impl<C: SessionClock> std::fmt::Debug for TuioClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("TuioClient")
            .field("object_count", &state.store.len())
            .field("current_frame", &state.sequencer.current_frame())
            .field("pending_mutations", &state.stage.len())
            .finish()
    }
}
