//! Drive commands produced by behaviours.

use core::fmt;

use robot_model::frame;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A holonomic velocity: translation in m/s and rotation in rad/s.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// Velocity along x (m/s).
    pub vx: f64,
    /// Velocity along y (m/s).
    pub vy: f64,
    /// Angular velocity, counter-clockwise positive (rad/s).
    pub omega: f64,
}

impl Velocity {
    /// Construct a new velocity.
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Velocity { vx, vy, omega }
    }

    /// Express a field-relative velocity in the frame of a robot facing `heading`.
    pub fn field_to_robot(self, heading: f64) -> Self {
        let (vx, vy) = frame::rotate(self.vx, self.vy, -heading);
        Velocity::new(vx, vy, self.omega)
    }

    /// Express a robot-relative velocity in the field frame.
    pub fn robot_to_field(self, heading: f64) -> Self {
        let (vx, vy) = frame::rotate(self.vx, self.vy, heading);
        Velocity::new(vx, vy, self.omega)
    }

    /// Translational speed (m/s).
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(vx: {:.2} m/s, vy: {:.2} m/s, ω: {:.2} rad/s)",
            self.vx, self.vy, self.omega
        )
    }
}

/// A fully specified field pose for the drivebase to move to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetPose {
    /// Field x (m).
    pub x: f64,
    /// Field y (m).
    pub y: f64,
    /// Heading (rad). Not normalized, so it can carry whole turns.
    pub angle: f64,
}

/// What a behaviour asks the drivebase to do for one tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DriveCommand {
    /// Velocity in the field frame.
    FieldRelative(Velocity),
    /// Velocity in the robot frame.
    RobotRelative(Velocity),
    /// Drive to and hold a pose.
    PoseTarget(TargetPose),
    /// Point the wheels into an X to resist being pushed.
    XLock,
    /// Zero output.
    #[default]
    Stop,
}

impl DriveCommand {
    /// Field-frame velocity this command asks for, given the robot heading.
    ///
    /// Returns `None` for pose targets, which the drivebase resolves itself.
    pub fn field_velocity(&self, heading: f64) -> Option<Velocity> {
        match *self {
            DriveCommand::FieldRelative(v) => Some(v),
            DriveCommand::RobotRelative(v) => Some(v.robot_to_field(heading)),
            DriveCommand::XLock | DriveCommand::Stop => Some(Velocity::default()),
            DriveCommand::PoseTarget(_) => None,
        }
    }
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveCommand::FieldRelative(v) => write!(f, "field {}", v),
            DriveCommand::RobotRelative(v) => write!(f, "robot {}", v),
            DriveCommand::PoseTarget(t) => {
                write!(f, "pose (x: {:.2}, y: {:.2}, θ: {:.2} rad)", t.x, t.y, t.angle)
            }
            DriveCommand::XLock => f.write_str("x-lock"),
            DriveCommand::Stop => f.write_str("stop"),
        }
    }
}
