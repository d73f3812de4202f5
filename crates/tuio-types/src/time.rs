use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Timestamp on a decoder's session clock, in milliseconds.
///
/// Session time starts at zero when the decoder is created and is unrelated
/// to wall-clock time. Commits stamp objects with the session time of the
/// frame that produced them.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TuioTime {
    millis: u64,
}

impl TuioTime {
    /// The start of the session.
    pub const fn zero() -> Self {
        Self { millis: 0 }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn since(&self, earlier: TuioTime) -> u64 {
        self.millis.saturating_sub(earlier.millis)
    }
}

impl fmt::Debug for TuioTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TuioTime({}ms)", self.millis)
    }
}

impl fmt::Display for TuioTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.millis)
    }
}

/// Source of session time for a decoder.
///
/// Implementations must be monotonic: `now()` never returns a value smaller
/// than a previous call on the same clock.
pub trait SessionClock: Send + Sync {
    fn now(&self) -> TuioTime;
}

/// Session clock backed by [`Instant`], measured from construction.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock for MonotonicClock {
    fn now(&self) -> TuioTime {
        TuioTime::from_millis(self.started.elapsed().as_millis() as u64)
    }
}

/// Explicitly advanced session clock.
///
/// Clones share the same underlying counter, so a test can keep one handle
/// while the decoder owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl SessionClock for ManualClock {
    fn now(&self) -> TuioTime {
        TuioTime::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_saturates() {
        let early = TuioTime::from_millis(100);
        let late = TuioTime::from_millis(250);
        assert_eq!(late.since(early), 150);
        assert_eq!(early.since(late), 0);
    }

    #[test]
    fn ordering() {
        let a = TuioTime::from_millis(1);
        let b = TuioTime::from_millis(2);
        assert!(b > a);
        assert!(TuioTime::zero() < a);
    }

    #[test]
    fn display_format() {
        assert_eq!(TuioTime::from_millis(1500).to_string(), "1500ms");
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(40);
        assert_eq!(clock.now(), TuioTime::from_millis(40));
    }

    #[test]
    fn monotonic_clock_is_non_decreasing() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now();
        for _ in 0..1000 {
            let next = clock.now();
            assert!(next >= prev);
            prev = next;
        }
    }
}
