//! This module defines the error types used by the `robot-behaviour` crate.

#![warn(missing_docs)]

use robot_model::ModelError;

/// Error type for behaviour ticks and construction.
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviourError {
    /// A negative time delta was passed to a tick or controller.
    NegativeTimeDelta(&'static str),
    /// A pose, or part of one, that the behaviour needs is unset.
    IncompletePose(&'static str),
    /// The behaviour reads driver input but none was supplied.
    MissingInput(&'static str),
    /// A configuration value is out of range.
    InvalidConfig(&'static str),
}

impl core::fmt::Display for BehaviourError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BehaviourError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
            BehaviourError::IncompletePose(msg) => write!(f, "Incomplete pose: {}", msg),
            BehaviourError::MissingInput(msg) => write!(f, "Missing driver input: {}", msg),
            BehaviourError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl core::error::Error for BehaviourError {}

impl From<ModelError> for BehaviourError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnsetCoordinate(msg) | ModelError::IncompletePose(msg) => {
                BehaviourError::IncompletePose(msg)
            }
        }
    }
}
