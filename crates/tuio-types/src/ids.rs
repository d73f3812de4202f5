use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one physical tracked-object instance.
///
/// A session id is assigned by the tracker when an object is first seen and
/// stays fixed until the object leaves the surface. It is the primary key of
/// the object store. The wire carries it as int32; it is widened to `i64`
/// so that trackers numbering past `i32::MAX` in other profiles still fit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<i32> for SessionId {
    fn from(raw: i32) -> Self {
        Self(i64::from(raw))
    }
}

impl From<i64> for SessionId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Identifier of the fiducial marker (or object class) a session represents.
///
/// Several concurrently active sessions may share one symbol id, e.g. two
/// copies of the same printed marker on the table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(i32);

impl SymbolId {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i32> for SymbolId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}
