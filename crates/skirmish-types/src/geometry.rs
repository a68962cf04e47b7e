//! World coordinates.

use serde::{Deserialize, Serialize};

/// A point in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Facing angle in radians.
    #[serde(default)]
    pub orientation: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            orientation: 0.0,
        }
    }

    /// Returns a copy facing `orientation` radians.
    pub const fn facing(mut self, orientation: f32) -> Self {
        self.orientation = orientation;
        self
    }

    /// Straight-line distance, ignoring orientation.
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Returns `true` if `other` lies within `radius` (inclusive).
    pub fn within(&self, other: &Position, radius: f32) -> bool {
        self.distance(other) <= radius
    }
}
