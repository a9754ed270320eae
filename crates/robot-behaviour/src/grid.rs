//! Scoring grid slots along the driver-station wall.
//!
//! Slots run from the wall (inner 1) to the enemy loading zone (outer 3),
//! one metre apart at x = 1 m, all facing 0 rad.

use core::fmt;

use robot_model::Pose;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the nine scoring slots.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridSlot {
    /// Closest to the wall.
    Inner1,
    /// Second from the wall.
    Inner2,
    /// Centremost inner slot.
    Inner3,
    /// Wall side of the centre section.
    Centre1,
    /// Middle of the whole grid.
    Centre2,
    /// Loading-zone side of the centre section.
    Centre3,
    /// Centremost outer slot.
    Outer1,
    /// Second from the enemy loading zone.
    Outer2,
    /// Closest to the enemy loading zone.
    Outer3,
}

impl GridSlot {
    /// Every slot, ordered from the wall.
    pub const ALL: [GridSlot; 9] = [
        GridSlot::Inner1,
        GridSlot::Inner2,
        GridSlot::Inner3,
        GridSlot::Centre1,
        GridSlot::Centre2,
        GridSlot::Centre3,
        GridSlot::Outer1,
        GridSlot::Outer2,
        GridSlot::Outer3,
    ];

    /// 1-based position from the wall.
    pub const fn index(self) -> usize {
        self as usize + 1
    }

    /// Field pose in front of the slot.
    pub const fn pose(self) -> Pose {
        Pose::from_xy(1.0, self.index() as f64, 0.0)
    }
}

impl fmt::Display for GridSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (section, n) = match self.index() {
            i @ 1..=3 => ("inner", i),
            i @ 4..=6 => ("centre", i - 3),
            i => ("outer", i - 6),
        };
        write!(f, "{section} {n}")
    }
}
