use std::fmt;

use tuio_types::TuioTime;

/// A frame this far behind the current one is treated as a sequence reset.
pub const RESET_GAP: i64 = 100;

/// With unnumbered frames, the frame time is refreshed at most this often.
pub const LEGACY_REFRESH_MS: u64 = 100;

/// Outcome of one `fseq` message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameVerdict {
    /// The staged frame is committed.
    Accepted,
    /// The frame arrived out of order and is discarded.
    Late,
}

impl fmt::Display for FrameVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Late => write!(f, "late"),
        }
    }
}

/// Frame-sequence state: the last accepted frame number and its session time.
///
/// # Acceptance rule
///
/// For `fseq > 0`:
/// - a newer frame (`fseq > current_frame`) refreshes the frame time;
/// - the frame is accepted if `fseq >= current_frame`, or if it lags by more
///   than [`RESET_GAP`] (the tracker restarted its numbering), and
///   `current_frame` advances to `fseq`;
/// - otherwise it is late.
///
/// For `fseq <= 0` (trackers that do not number frames) every frame is
/// accepted, and the frame time is refreshed once more than
/// [`LEGACY_REFRESH_MS`] have elapsed since the last refresh.
#[derive(Clone, Debug, Default)]
pub struct FrameSequencer {
    current_frame: i32,
    current_time: TuioTime,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Session time that the next commit stamps on objects.
    pub fn current_time(&self) -> TuioTime {
        self.current_time
    }

    /// Classify frame `fseq`, observed at session time `now`.
    ///
    /// A late verdict leaves both the frame number and frame time unchanged.
    pub fn evaluate(&mut self, fseq: i32, now: TuioTime) -> FrameVerdict {
        if fseq > 0 {
            if fseq > self.current_frame {
                self.current_time = now;
            }
            let lag = i64::from(self.current_frame) - i64::from(fseq);
            if fseq >= self.current_frame || lag > RESET_GAP {
                self.current_frame = fseq;
                FrameVerdict::Accepted
            } else {
                FrameVerdict::Late
            }
        } else {
            if now.since(self.current_time) > LEGACY_REFRESH_MS {
                self.current_time = now;
            }
            FrameVerdict::Accepted
        }
    }
}
