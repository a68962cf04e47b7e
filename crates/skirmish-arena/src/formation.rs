//! Fixed spawn slots for both teams.

use std::f32::consts::PI;

use skirmish_types::{Position, Side};

use crate::ArenaConfig;

/// Where each familiar stands when it is summoned.
///
/// The two teams face each other across the arena center along the x axis.
/// Side A lines up at `center.x - separation` facing +x, side B at
/// `center.x + separation` facing -x. Within a line, slots are spread along
/// y and centered on `center.y`:
///
/// ```text
///        A0          B0
///   A1 ──┼── center ─┼── B1      (team_size = 3)
///        A2          B2
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Formation {
    center: Position,
    spacing: f32,
    separation: f32,
    team_size: usize,
}

impl Formation {
    pub fn new(center: Position, spacing: f32, separation: f32, team_size: usize) -> Self {
        Self {
            center,
            spacing,
            separation,
            team_size,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(
            config.arena_center,
            config.slot_spacing,
            config.team_separation,
            config.team_size,
        )
    }

    /// Position of slot `index` on `side`.
    pub fn slot(&self, side: Side, index: usize) -> Position {
        let middle = (self.team_size.saturating_sub(1)) as f32 / 2.0;
        let y = self.center.y + (index as f32 - middle) * self.spacing;
        let (x, facing) = match side {
            Side::A => (self.center.x - self.separation, 0.0),
            Side::B => (self.center.x + self.separation, PI),
        };
        Position::new(x, y, self.center.z).facing(facing)
    }

    /// Every slot on `side`, in spawn order.
    pub fn slots(&self, side: Side) -> Vec<Position> {
        (0..self.team_size).map(|i| self.slot(side, i)).collect()
    }

    pub fn center(&self) -> Position {
        self.center
    }
}
