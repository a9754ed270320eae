//! Field coordinate convention.
//!
//! ```text
//!   -x => +x
//!   -y ^  +y
//! ```
//!
//! x grows to the right and y grows upward when the field is drawn from
//! above. Angles are radians measured counter-clockwise from +x.

use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two field axes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left to right.
    X,
    /// Bottom to top.
    Y,
}

impl Axis {
    /// Unit vector of the axis in field coordinates.
    pub const fn unit(self) -> (f64, f64) {
        match self {
            Axis::X => AXIS_X,
            Axis::Y => AXIS_Y,
        }
    }
}

/// Positive x direction.
pub const AXIS_X: (f64, f64) = (1.0, 0.0);
/// Positive y direction.
pub const AXIS_Y: (f64, f64) = (0.0, 1.0);

/// Rotate a vector counter-clockwise by `angle` radians.
///
/// Used to carry body-frame offsets (such as the centre of mass) into the
/// field frame.
pub fn rotate(x: f64, y: f64, angle: f64) -> (f64, f64) {
    let (s, c) = (sin(angle), cos(angle));
    (x * c - y * s, x * s + y * c)
}
