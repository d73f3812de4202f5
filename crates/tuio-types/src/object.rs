use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{SessionId, SymbolId};
use crate::time::TuioTime;

/// Normalized surface position. Both axes run from 0.0 to 1.0.
///
/// Equality is exact float equality: the decoder's idempotence rule treats
/// any bit-level change as a change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Velocity and acceleration terms reported with each `set` message.
///
/// Speeds are in normalized units (or radians) per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub x_speed: f32,
    pub y_speed: f32,
    pub rotation_speed: f32,
    pub motion_accel: f32,
    pub rotation_accel: f32,
}

impl Motion {
    pub const ZERO: Motion = Motion {
        x_speed: 0.0,
        y_speed: 0.0,
        rotation_speed: 0.0,
        motion_accel: 0.0,
        rotation_accel: 0.0,
    };
}

/// Transient lifecycle tag of a tracked object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuioState {
    /// First committed in the most recent frame that touched it.
    Added,
    /// Changed by the most recent frame that touched it.
    Updated,
    /// Scheduled for erasure. Never present in a committed store.
    Removed,
    /// Constructed but not yet committed.
    #[default]
    Idle,
}

impl fmt::Display for TuioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::Idle => "idle",
        };
        write!(f, "{s}")
    }
}

/// Kinematic state of one tracked object instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub session_id: SessionId,
    pub symbol_id: SymbolId,
    pub position: Position,
    /// Orientation in radians.
    pub angle: f32,
    pub motion: Motion,
    pub state: TuioState,
    /// Session time of the last commit that touched this object.
    pub last_update: TuioTime,
}

impl TrackedObject {
    /// An idle object at rest, stamped at session start.
    pub fn new(session_id: SessionId, symbol_id: SymbolId, position: Position, angle: f32) -> Self {
        Self {
            session_id,
            symbol_id,
            position,
            angle,
            motion: Motion::ZERO,
            state: TuioState::Idle,
            last_update: TuioTime::zero(),
        }
    }

    /// Builder-style override of the state tag.
    pub fn with_state(mut self, state: TuioState) -> Self {
        self.state = state;
        self
    }

    /// Builder-style override of the commit timestamp.
    pub fn with_time(mut self, time: TuioTime) -> Self {
        self.last_update = time;
        self
    }

    /// Move the object without touching its motion terms.
    pub fn update_position(&mut self, time: TuioTime, position: Position, angle: f32) {
        self.position = position;
        self.angle = angle;
        self.last_update = time;
        self.state = TuioState::Updated;
    }

    /// Replace position, angle and all motion terms.
    pub fn update_full(&mut self, time: TuioTime, position: Position, angle: f32, motion: Motion) {
        self.position = position;
        self.angle = angle;
        self.motion = motion;
        self.last_update = time;
        self.state = TuioState::Updated;
    }

    pub fn mark_removed(&mut self, time: TuioTime) {
        self.last_update = time;
        self.state = TuioState::Removed;
    }

    /// Orientation in degrees, in the range the tracker reported (no wrapping).
    pub fn angle_degrees(&self) -> f32 {
        self.angle.to_degrees()
    }

    /// Compare the eight fields carried by a `set` message.
    ///
    /// Symbol id, tag and timestamp are not part of the comparison.
    pub fn fields_equal(&self, position: Position, angle: f32, motion: &Motion) -> bool {
        self.position == position && self.angle == angle && self.motion == *motion
    }
}
