//! Level the robot on a tilting platform.
//!
//! Two PID loops hold pitch and roll at zero: pitch drives the robot along
//! its x axis and roll drives it sideways. Gains are in m/s per degree of
//! tilt.

use tracing::debug;

use crate::{
    Behaviour, BehaviourError, DriveCommand, Pid, PidGains, TickContext, Velocity, check_dt,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning for [`Balance`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceConfig {
    /// m/s per degree.
    pub kp: f64,
    /// m/s per degree-second.
    pub ki: f64,
    /// m/s per degree per second.
    pub kd: f64,
}

impl Default for BalanceConfig {
    /// 0.7 m/s for every 10 degrees of tilt.
    fn default() -> Self {
        Self {
            kp: 0.07,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

impl BalanceConfig {
    fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }
}

/// Drives downhill on both axes until the gyro reads level. Never finishes on its own.
#[derive(Debug, Clone)]
pub struct Balance {
    lateral: Pid,
    sideways: Pid,
}

impl Balance {
    /// Both axes share `config`.
    pub fn new(config: BalanceConfig) -> Self {
        Self {
            lateral: Pid::new(config.gains(), 0.0),
            sideways: Pid::new(config.gains(), 0.0),
        }
    }
}

impl Behaviour for Balance {
    fn name(&self) -> &str {
        "balance"
    }

    fn on_start(&mut self) {
        self.lateral.reset();
        self.sideways.reset();
    }

    fn on_tick(&mut self, ctx: &TickContext, dt: f64) -> Result<DriveCommand, BehaviourError> {
        check_dt(dt)?;
        let lateral = self.lateral.calculate(ctx.pitch.to_degrees(), dt)?;
        let sideways = self.sideways.calculate(-ctx.roll.to_degrees(), dt)?;

        debug!(
            pitch_deg = ctx.pitch.to_degrees(),
            roll_deg = ctx.roll.to_degrees(),
            lateral,
            sideways,
            "Balance speeds"
        );
        Ok(DriveCommand::RobotRelative(Velocity::new(lateral, sideways, 0.0)))
    }
}
