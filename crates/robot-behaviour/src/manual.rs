//! Joystick teleoperation.
//!
//! Stick axes are shaped with a deadzone and a sign-preserving square before
//! being scaled to drive speeds. The left stick's vertical axis drives field
//! x because the driver stands looking along x.

use core::f64::consts::TAU;

use tracing::info;

use crate::{Behaviour, BehaviourError, DriveCommand, TickContext, Velocity, check_dt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stick deadzone for translation.
pub const DRIVER_DEADZONE: f64 = 0.08;
/// Stick deadzone for rotation.
pub const TURNING_DEADZONE: f64 = 0.1;
/// 6.5 ft/s in m/s.
pub const MAX_SPEED: f64 = 6.5 * 0.3048;
/// One turn per second.
pub const MAX_TURN_RATE: f64 = TAU;

/// One sample of the driver's controller, axes in `[-1, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriverInput {
    /// Left stick, right positive. Strafes.
    pub left_x: f64,
    /// Left stick, down positive. Drives forward when pushed up.
    pub left_y: f64,
    /// Right stick, right positive. Turns.
    pub right_x: f64,
    /// Rising edge of the field-orientation toggle button.
    pub toggle_field_oriented: bool,
}

/// Zero inside `(-dz, dz)`, unchanged elsewhere.
pub fn deadzone(value: f64, dz: f64) -> f64 {
    if value.abs() < dz { 0.0 } else { value }
}

/// Square keeping the sign.
pub fn spow2(value: f64) -> f64 {
    value * value.abs()
}

/// Teleop driving. Starts field oriented.
#[derive(Debug, Clone)]
pub struct ManualDrive {
    field_oriented: bool,
}

impl Default for ManualDrive {
    fn default() -> Self {
        Self {
            field_oriented: true,
        }
    }
}

impl ManualDrive {
    /// Field oriented, waiting for input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether stick input is read in the field frame.
    pub fn is_field_oriented(&self) -> bool {
        self.field_oriented
    }

    /// Shaped velocity for a controller sample.
    pub fn shape(input: &DriverInput) -> Velocity {
        let vx = spow2(-deadzone(input.left_y, DRIVER_DEADZONE));
        let vy = spow2(-deadzone(input.left_x, DRIVER_DEADZONE));
        let omega = spow2(-deadzone(input.right_x, TURNING_DEADZONE));
        Velocity::new(vx * MAX_SPEED, vy * MAX_SPEED, omega * MAX_TURN_RATE)
    }
}

impl Behaviour for ManualDrive {
    fn name(&self) -> &str {
        "manual"
    }

    fn on_tick(&mut self, ctx: &TickContext, dt: f64) -> Result<DriveCommand, BehaviourError> {
        check_dt(dt)?;
        let input = ctx
            .input
            .ok_or(BehaviourError::MissingInput("no controller sample this tick"))?;

        if input.toggle_field_oriented {
            self.field_oriented = !self.field_oriented;
            info!(field_oriented = self.field_oriented, "Toggled drive orientation");
        }

        let velocity = Self::shape(&input);
        Ok(if self.field_oriented {
            DriveCommand::FieldRelative(velocity)
        } else {
            DriveCommand::RobotRelative(velocity)
        })
    }
}
