//! Rigid-body model of a variable-mass vehicle: elements and their shapes, the design that folds
//! them into one body, the motor depletion model and the attitude integrator.
pub mod builder;
pub mod design;
pub mod element;
pub mod error;
pub mod integrator;
pub mod mass;
pub mod motor;
pub mod shapes;

pub use builder::{Builder, ElementConfig, PartNumbers, VehicleConfig};
pub use design::{Design, ElementId, KinematicData};
pub use element::{Element, ElementRole};
pub use error::{BuildError, DesignError, IntegratorError, MotorError};
pub use mass::{DynamicAggregate, MassProperties, StaticAggregate};
pub use motor::{MotorManager, ThrustCurve, MOTOR_ELEMENT_NAME};
pub use shapes::Shape;
