//! Message-bundle transport codec for the TUIO decoder.
//!
//! TUIO is carried over Open Sound Control. This crate decodes the subset of
//! OSC 1.0 that TUIO trackers emit (messages, possibly nested bundles, and the
//! standard argument types) and encodes the same subset for simulators and
//! tests. It does not implement address pattern matching or time-tag
//! scheduling.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{OscCodec, MAX_BUNDLE_DEPTH, MAX_PACKET_SIZE};
pub use error::{OscError, OscResult};
pub use message::{OscArg, OscBundle, OscMessage, OscPacket, OscTimeTag};
