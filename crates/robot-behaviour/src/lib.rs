//! Drive behaviours for a swerve robot.
//!
//! A behaviour is ticked at a fixed rate with a [`TickContext`] (the robot
//! state, the gyro tilt and any driver input) and answers with a
//! [`DriveCommand`] for the drivebase.

#![warn(missing_docs)]

pub mod balance;
pub mod command;
pub mod convergence;
pub mod error;
pub mod grid;
pub mod manual;
pub mod pid;
pub mod pose_hold;
pub mod x_lock;

pub use balance::{Balance, BalanceConfig};
pub use command::{DriveCommand, TargetPose, Velocity};
pub use convergence::{Convergence, ConvergenceConfig};
pub use error::BehaviourError;
pub use grid::GridSlot;
pub use manual::{DriverInput, ManualDrive};
pub use pid::{Pid, PidGains};
pub use pose_hold::{PoseHold, PoseTolerance};
pub use x_lock::XLock;

use robot_model::Robot;

/// Everything a behaviour can observe on one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickContext {
    /// Latest robot state from the drivebase.
    pub robot: Robot,
    /// Gyro pitch (rad), nose up positive.
    pub pitch: f64,
    /// Gyro roll (rad), right side down positive.
    pub roll: f64,
    /// Driver controller sample, if a driver is attached.
    pub input: Option<DriverInput>,
}

/// A drivebase behaviour.
pub trait Behaviour: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called once before the first tick.
    fn on_start(&mut self) {}

    /// Compute the command for this tick. `dt` is the time since the last tick in seconds.
    fn on_tick(&mut self, ctx: &TickContext, dt: f64) -> Result<DriveCommand, BehaviourError>;

    /// Returns `true` once the behaviour has nothing left to do.
    fn is_done(&self) -> bool {
        false
    }
}

pub(crate) fn check_dt(dt: f64) -> Result<(), BehaviourError> {
    if dt < 0.0 {
        return Err(BehaviourError::NegativeTimeDelta("must be non-negative"));
    }
    Ok(())
}
