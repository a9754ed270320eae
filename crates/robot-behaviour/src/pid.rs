//! PID control with an explicit time step.

use crate::BehaviourError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// PID gains.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (per second).
    pub ki: f64,
    /// Derivative gain (seconds).
    pub kd: f64,
}

impl PidGains {
    /// Construct gains from their three terms.
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Time-aware PID controller driving a measurement towards a setpoint.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    setpoint: f64,
    integral: f64,
    prev_error: Option<f64>,
}

impl Pid {
    /// A fresh controller holding `setpoint`.
    pub fn new(gains: PidGains, setpoint: f64) -> Self {
        Self {
            gains,
            setpoint,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// Current setpoint.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Move the setpoint. Accumulated state is kept.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Output for `measurement` after `dt` seconds.
    ///
    /// The derivative term is zero on the first call and when `dt` is zero.
    pub fn calculate(&mut self, measurement: f64, dt: f64) -> Result<f64, BehaviourError> {
        if dt < 0.0 {
            return Err(BehaviourError::NegativeTimeDelta("must be non-negative"));
        }

        let error = self.setpoint - measurement;
        self.integral += error * dt;

        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        Ok(error * self.gains.kp + self.integral * self.gains.ki + derivative * self.gains.kd)
    }

    /// Forget the integral and the previous error.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}
