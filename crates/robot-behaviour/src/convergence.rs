//! Drive the robot onto its convergence point.
//!
//! Far from the point the robot drives at `max_speed` along the bearing to
//! it. Inside `max_distance` each axis is driven by a sigmoid of its own
//! error, which is zero on target and saturates at `max_speed`. Axes the
//! convergence point leaves unset are not driven.

use robot_model::Position2D;
use tracing::debug;

use crate::{Behaviour, BehaviourError, DriveCommand, TickContext, Velocity, check_dt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning for [`Convergence`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceConfig {
    /// Radius (m) inside which the sigmoid approach takes over.
    pub max_distance: f64,
    /// Speed cap (m/s).
    pub max_speed: f64,
    /// Steepness of the sigmoid (1/m).
    pub sigmoid_gain: f64,
    /// Measure from the centre of mass instead of the robot centre.
    pub measure_from_centre_of_mass: bool,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_distance: 0.3,
            max_speed: 0.3,
            sigmoid_gain: 0.15,
            measure_from_centre_of_mass: false,
        }
    }
}

impl ConvergenceConfig {
    /// Every tuning value must be finite and positive.
    pub fn validate(&self) -> Result<(), BehaviourError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.max_distance) {
            return Err(BehaviourError::InvalidConfig("max_distance must be positive"));
        }
        if !positive(self.max_speed) {
            return Err(BehaviourError::InvalidConfig("max_speed must be positive"));
        }
        if !positive(self.sigmoid_gain) {
            return Err(BehaviourError::InvalidConfig("sigmoid_gain must be positive"));
        }
        Ok(())
    }

    /// Sigmoid approach speed for an axis error `d`, in `(-max_speed, max_speed)`.
    pub fn approach_speed(&self, d: f64) -> f64 {
        2.0 * self.max_speed / (1.0 + (-self.sigmoid_gain * d).exp()) - self.max_speed
    }
}

/// Converges on `Robot::convergence_point`. Never finishes on its own.
#[derive(Debug, Clone)]
pub struct Convergence {
    config: ConvergenceConfig,
}

impl Convergence {
    /// # Errors
    ///
    /// Returns `Err(BehaviourError::InvalidConfig)` if `config` does not validate.
    pub fn new(config: ConvergenceConfig) -> Result<Self, BehaviourError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active tuning.
    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Field velocity that moves `measured` towards `target`.
    pub fn velocity_towards(&self, measured: &Position2D, target: &Position2D) -> Velocity {
        let (dx, dy) = measured.offset_to(target);
        let ex = dx.unwrap_or(0.0);
        let ey = dy.unwrap_or(0.0);
        let distance = ex.hypot(ey);

        if distance < self.config.max_distance {
            let axis = |d: Option<f64>| d.map_or(0.0, |d| self.config.approach_speed(d));
            return Velocity::new(axis(dx), axis(dy), 0.0);
        }

        let scale = self.config.max_speed / distance;
        Velocity::new(ex * scale, ey * scale, 0.0)
    }
}

impl Behaviour for Convergence {
    fn name(&self) -> &str {
        "converge"
    }

    fn on_tick(&mut self, ctx: &TickContext, dt: f64) -> Result<DriveCommand, BehaviourError> {
        check_dt(dt)?;
        let robot = &ctx.robot;
        let measured = if self.config.measure_from_centre_of_mass {
            robot.centre_of_mass_world()?
        } else {
            robot.current_position.position()?
        };
        // A measured point with an unset axis would silently leave that axis uncontrolled.
        let (x, y) = measured.coordinates()?;
        let measured = Position2D::new(x, y);

        let target = robot.convergence_point;
        if target.x.is_none() && target.y.is_none() {
            debug!("Convergence point fully unset, holding still");
            return Ok(DriveCommand::Stop);
        }

        let velocity = self.velocity_towards(&measured, &target);
        debug!(vx = velocity.vx, vy = velocity.vy, %measured, %target, "Convergence velocity");
        Ok(DriveCommand::FieldRelative(velocity))
    }
}
