//! Drive to a field pose and optionally keep holding it.

use core::f64::consts::TAU;

use robot_model::Pose;
use tracing::{debug, info};

use crate::{Behaviour, BehaviourError, DriveCommand, TargetPose, TickContext, check_dt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How close counts as "at the pose".
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTolerance {
    /// Position tolerance (m).
    pub distance: f64,
    /// Heading tolerance (rad).
    pub angle: f64,
}

impl Default for PoseTolerance {
    fn default() -> Self {
        Self {
            distance: 0.05,
            angle: 2.0_f64.to_radians(),
        }
    }
}

/// Drives to a target pose, then either finishes or keeps holding it.
#[derive(Debug, Clone)]
pub struct PoseHold {
    x: f64,
    y: f64,
    angle: f64,
    hold: bool,
    tolerance: PoseTolerance,
    done: bool,
}

impl PoseHold {
    /// Target `target`, holding it after arrival when `hold` is set.
    ///
    /// # Errors
    ///
    /// Returns `Err(BehaviourError::IncompletePose)` if any part of `target` is unset.
    pub fn new(target: Pose, hold: bool, tolerance: PoseTolerance) -> Result<Self, BehaviourError> {
        let (x, y, angle) = target.components()?;
        Ok(Self {
            x,
            y,
            angle,
            hold,
            tolerance,
            done: false,
        })
    }

    /// Target heading with the current number of whole turns kept, so the
    /// robot never unwinds a full rotation to reach it.
    pub fn adjusted_angle(&self, current: f64) -> f64 {
        current - current % TAU + self.angle
    }
}

impl Behaviour for PoseHold {
    fn name(&self) -> &str {
        "pose"
    }

    fn on_start(&mut self) {
        info!(x = self.x, y = self.y, angle = self.angle, hold = self.hold, "Driving to pose");
        self.done = false;
    }

    fn on_tick(&mut self, ctx: &TickContext, dt: f64) -> Result<DriveCommand, BehaviourError> {
        check_dt(dt)?;
        let (x, y, heading) = ctx.robot.current_position.components()?;
        let target = TargetPose {
            x: self.x,
            y: self.y,
            angle: self.adjusted_angle(heading),
        };

        let distance = (target.x - x).hypot(target.y - y);
        let angle_error = Pose::normalize_angle(target.angle - heading).abs();
        let at_pose = distance <= self.tolerance.distance && angle_error <= self.tolerance.angle;
        debug!(distance, angle_error, at_pose, "Pose hold");

        if at_pose && !self.hold && !self.done {
            info!("Reached pose");
            self.done = true;
        }
        Ok(DriveCommand::PoseTarget(target))
    }

    fn is_done(&self) -> bool {
        self.done
    }
}
