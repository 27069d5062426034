//! Error types for assembly (building a design from configuration) and for the numeric core.
//! Assembly errors are raised before any simulation step; numeric errors abort the run they occur in.
use std::fmt::Display;

use tvc_utils::QuaternionError;

use crate::design::ElementId;

#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    UnknownDesignation(String),
}

impl Display for MotorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDesignation(d) => write!(f, "no thrust curve for motor designation {d:?}"),
        }
    }
}

impl std::error::Error for MotorError {}

/// malformed or physically inconsistent element configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    InvalidMass { element: String, mass: f64 },
    InvalidDimension { element: String, reason: &'static str },
    DegenerateInertia { element: String },
    /// a dynamic entry must name the motor that drives its depletion.
    MissingMotor { element: String },
    /// a static entry cannot name a motor.
    UnexpectedMotor { element: String },
    Motor { element: String, source: MotorError },
    Design(DesignError),
}

impl Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMass { element, mass } => {
                write!(f, "element {element:?} has invalid mass {mass}")
            }
            Self::InvalidDimension { element, reason } => {
                write!(f, "element {element:?} has invalid dimensions: {reason}")
            }
            Self::DegenerateInertia { element } => {
                write!(f, "element {element:?} produced a non positive-semidefinite inertia tensor")
            }
            Self::MissingMotor { element } => {
                write!(f, "dynamic element {element:?} does not name a motor")
            }
            Self::UnexpectedMotor { element } => {
                write!(f, "static element {element:?} cannot carry a motor")
            }
            Self::Motor { element, source } => write!(f, "element {element:?}: {source}"),
            Self::Design(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Motor { source, .. } => Some(source),
            Self::Design(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DesignError> for BuildError {
    fn from(value: DesignError) -> Self {
        Self::Design(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesignError {
    UnknownElement(ElementId),
    /// static elements are frozen once consolidated.
    Consolidated(ElementId),
    NotDynamic(ElementId),
}

impl Display for DesignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "no element with id {id}"),
            Self::Consolidated(id) => {
                write!(f, "element {id} is static and has already been consolidated")
            }
            Self::NotDynamic(id) => write!(f, "element {id} is not a dynamic element"),
        }
    }
}

impl std::error::Error for DesignError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegratorError {
    /// incoming orientation had drifted this far from unit length.
    QuaternionDrift(f64),
    Degenerate,
    NonFinite,
}

impl From<QuaternionError> for IntegratorError {
    fn from(_value: QuaternionError) -> Self {
        Self::Degenerate
    }
}

impl Display for IntegratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuaternionDrift(norm) => {
                write!(f, "orientation quaternion drifted to norm {norm}")
            }
            Self::Degenerate => write!(f, "orientation quaternion collapsed to zero"),
            Self::NonFinite => write!(f, "non-finite angular state"),
        }
    }
}

impl std::error::Error for IntegratorError {}
