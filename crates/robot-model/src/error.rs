//! Error types for the robot model.
//!
//! Construction of the model types never fails; these errors come from the
//! geometry helpers that need coordinates which may still be unset.

use core::fmt;

/// Errors that can occur when deriving geometry from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A position was needed but one or both of its coordinates are unset.
    UnsetCoordinate(&'static str),
    /// A pose was needed but its position or angle is unset.
    IncompletePose(&'static str),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnsetCoordinate(msg) => write!(f, "Unset coordinate: {}", msg),
            ModelError::IncompletePose(msg) => write!(f, "Incomplete pose: {}", msg),
        }
    }
}

impl core::error::Error for ModelError {}
