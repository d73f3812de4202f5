//! Foundation types for the TUIO object decoder.
//!
//! This crate provides the value types shared by every other crate in the
//! workspace. It has no knowledge of the wire format or of frame commits.
//!
//! # Key Types
//!
//! - [`SessionId`] -- Identity of one physical tracked instance for its lifetime
//! - [`SymbolId`] -- Marker/class identifier, not unique across sessions
//! - [`TrackedObject`] -- Full kinematic state of a tracked object
//! - [`TuioState`] -- Transient lifecycle tag (added, updated, removed, idle)
//! - [`TuioTime`] -- Millisecond timestamp on the decoder's session clock
//! - [`Snapshot`] -- The deduplicated, by-symbol view handed to consumers

pub mod ids;
pub mod object;
pub mod snapshot;
pub mod time;

pub use ids::{SessionId, SymbolId};
pub use object::{Motion, Position, TrackedObject, TuioState};
pub use snapshot::{Snapshot, SnapshotDelta, VisibleObject};
pub use time::{ManualClock, MonotonicClock, SessionClock, TuioTime};
