//! TUIO 2D object-profile decoder.
//!
//! Reconstructs a consistent set of tracked objects from an unordered, lossy
//! stream of `/tuio/2Dobj` messages. Messages are staged per frame and only
//! committed when the terminating `fseq` message is accepted by the
//! frame-sequence rule, so readers never observe a half-applied frame.
//!
//! # Pipeline
//!
//! 1. [`TuioMessage`] -- typed parse of one OSC message (`set`, `alive`, `fseq`)
//! 2. [`FrameStage`] -- ordered pending mutations plus current/previous alive sets
//! 3. [`FrameSequencer`] -- accept-or-reject decision for each `fseq`
//! 4. [`commit`] -- applies staged mutations to the [`ObjectStore`]
//! 5. [`extract`] -- deduplicated by-symbol [`Snapshot`](tuio_types::Snapshot)
//!
//! [`TuioClient`] wires these together behind a single lock.

pub mod client;
pub mod commit;
pub mod error;
pub mod extract;
pub mod message;
pub mod sequence;
pub mod stage;
pub mod store;

pub use client::{ClientStats, TuioClient};
pub use commit::{commit, CommitReport};
pub use error::{ClientError, ClientResult};
pub use extract::extract;
pub use message::{SetMessage, TuioMessage, OBJECT_2D_ADDRESS};
pub use sequence::{FrameSequencer, FrameVerdict, LEGACY_REFRESH_MS, RESET_GAP};
pub use stage::{FrameStage, Mutation};
pub use store::ObjectStore;
