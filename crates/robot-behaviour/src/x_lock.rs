//! Wheel lock behaviour.

use crate::{Behaviour, BehaviourError, DriveCommand, TickContext, check_dt};

/// Holds the wheels in an X so the robot resists being pushed.
#[derive(Debug, Clone, Default)]
pub struct XLock;

impl Behaviour for XLock {
    fn name(&self) -> &str {
        "x_lock"
    }

    fn on_tick(&mut self, _ctx: &TickContext, dt: f64) -> Result<DriveCommand, BehaviourError> {
        check_dt(dt)?;
        Ok(DriveCommand::XLock)
    }
}
