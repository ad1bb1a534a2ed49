//! Page rotation angle
//!
//! Angles are stored in whole degrees, normalized to `[0, 360)`. Positive
//! deltas turn the page clockwise, the same direction the preview uses.

use serde::{Deserialize, Serialize};

/// Degrees of a single rotate button press
pub const QUARTER_TURN: i32 = 90;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Rotation(i32);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// Create a rotation, normalizing any integer angle into `[0, 360)`.
    pub fn from_degrees(degrees: i32) -> Self {
        Rotation(degrees.rem_euclid(360))
    }

    pub fn degrees(self) -> i32 {
        self.0
    }

    pub fn radians(self) -> f64 {
        (self.0 as f64).to_radians()
    }

    /// Add a delta, wrapping modulo 360.
    pub fn rotated_by(self, delta: i32) -> Self {
        // Widen so extreme deltas cannot overflow before the modulo
        let sum = self.0 as i64 + delta as i64;
        Rotation(sum.rem_euclid(360) as i32)
    }

    /// True for 90 and 270 degrees, where width and height swap.
    pub fn is_quarter_turn(self) -> bool {
        self.0 == 90 || self.0 == 270
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}
