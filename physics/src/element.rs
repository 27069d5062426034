//! A single rigid sub-element of the vehicle: mass, inertia about its own centroid, and where it
//! sits (and how it is turned) in the body frame.
use tvc_utils::inertia::{self, InertiaTensor};
use tvc_utils::{Quaternion, Vec3D};

use crate::error::BuildError;
use crate::mass::MassProperties;
use crate::motor::MotorManager;
use crate::shapes::Shape;

const PSD_EPSILON: f64 = 1e-12;

/// what drives an element's mass over time.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRole {
    /// fixed mass for the whole flight.
    Static,
    /// mass follows the burn of the attached motor.
    Dynamic(MotorManager),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    /// `None` for elements given an explicit tensor.
    shape: Option<Shape>,
    mass: f64,
    local_inertia: InertiaTensor,
    offset_position: Vec3D,
    offset_orientation: Quaternion,
    role: ElementRole,
}

impl Element {
    pub fn new_static(name: impl Into<String>, shape: Shape, mass: f64) -> Result<Self, BuildError> {
        Self::checked(name.into(), shape, mass, ElementRole::Static)
    }

    pub fn new_dynamic(
        name: impl Into<String>,
        shape: Shape,
        motor: MotorManager,
    ) -> Result<Self, BuildError> {
        Self::checked(name.into(), shape, motor.mass(), ElementRole::Dynamic(motor))
    }

    fn checked(name: String, shape: Shape, mass: f64, role: ElementRole) -> Result<Self, BuildError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(BuildError::InvalidMass { element: name, mass });
        }
        if let Err(reason) = shape.validate() {
            return Err(BuildError::InvalidDimension {
                element: name,
                reason,
            });
        }
        let local_inertia = shape.inertia(mass);
        if !inertia::is_positive_semidefinite(&local_inertia, PSD_EPSILON) {
            return Err(BuildError::DegenerateInertia { element: name });
        }
        Ok(Self {
            name,
            shape: Some(shape),
            mass,
            local_inertia,
            offset_position: Vec3D::new(),
            offset_orientation: Quaternion::identity(),
            role,
        })
    }

    /// a bare element with an explicit inertia tensor, bypassing the shape catalog.
    pub fn with_inertia(
        name: impl Into<String>,
        mass: f64,
        local_inertia: InertiaTensor,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        if !mass.is_finite() || mass < 0.0 {
            return Err(BuildError::InvalidMass { element: name, mass });
        }
        if !inertia::is_positive_semidefinite(&local_inertia, PSD_EPSILON) {
            return Err(BuildError::DegenerateInertia { element: name });
        }
        Ok(Self {
            name,
            shape: None,
            mass,
            local_inertia,
            offset_position: Vec3D::new(),
            offset_orientation: Quaternion::identity(),
            role: ElementRole::Static,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn local_inertia(&self) -> &InertiaTensor {
        &self.local_inertia
    }

    pub fn offset_position(&self) -> Vec3D {
        self.offset_position
    }

    pub fn offset_orientation(&self) -> Quaternion {
        self.offset_orientation
    }

    pub fn role(&self) -> &ElementRole {
        &self.role
    }

    pub fn is_static(&self) -> bool {
        matches!(self.role, ElementRole::Static)
    }

    pub fn motor(&self) -> Option<&MotorManager> {
        match &self.role {
            ElementRole::Dynamic(motor) => Some(motor),
            ElementRole::Static => None,
        }
    }

    /// builder-style placement, used when assembling by hand.
    pub fn at(mut self, position: Vec3D) -> Self {
        self.offset_position = position;
        self
    }

    pub fn oriented(mut self, orientation: Quaternion) -> Self {
        self.offset_orientation = orientation;
        self
    }

    pub(crate) fn set_offset_position(&mut self, position: Vec3D) {
        self.offset_position = position;
    }

    pub(crate) fn set_offset_orientation(&mut self, orientation: Quaternion) {
        self.offset_orientation = orientation;
    }

    /// local inertia re-expressed along the body axes, still about the element's centroid.
    pub fn body_inertia(&self) -> InertiaTensor {
        inertia::rotate_inertia(&self.offset_orientation, &self.local_inertia)
    }

    pub fn mass_properties(&self) -> MassProperties {
        MassProperties {
            mass: self.mass,
            cg: self.offset_position,
            inertia: self.body_inertia(),
        }
    }

    /// steps the depletion model by `dt` and refreshes mass and inertia. Static elements ignore this.
    pub fn advance(&mut self, dt: f64) {
        if let ElementRole::Dynamic(motor) = &mut self.role {
            motor.advance(dt);
            self.mass = motor.mass();
            if let Some(shape) = &self.shape {
                self.local_inertia = shape.inertia(self.mass);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn cylinder() -> Shape {
        Shape::Cylinder {
            radius: 0.072,
            height: 0.12,
        }
    }

    #[test]
    fn negative_mass_rejected() {
        assert_eq!(
            Element::new_static("flight_computer", cylinder(), -0.18),
            Err(BuildError::InvalidMass {
                element: "flight_computer".to_owned(),
                mass: -0.18
            })
        );
    }

    #[test]
    fn degenerate_inertia_rejected() {
        let bad = inertia::diagonal(1.0, -1.0, 1.0);
        assert!(matches!(
            Element::with_inertia("bad", 1.0, bad),
            Err(BuildError::DegenerateInertia { .. })
        ));
    }

    #[test]
    fn static_element_ignores_advance() {
        let mut e = Element::new_static("flight_computer", cylinder(), 0.18).unwrap();
        let before = e.clone();
        e.advance(1.0);
        assert_eq!(e, before);
    }

    #[test]
    fn dynamic_element_loses_mass() {
        let motor = MotorManager::new("F15").unwrap();
        let mut e = Element::new_dynamic("rocket_motor", motor.curve().shape(), motor).unwrap();
        let start = e.mass();
        let izz_start = e.local_inertia()[(2, 2)];
        e.advance(1.0);
        assert!(e.mass() < start);
        assert!(e.local_inertia()[(2, 2)] < izz_start);
        assert_eq!(e.motor().map(|m| m.elapsed()), Some(1.0));
    }

    #[test]
    fn body_inertia_follows_orientation() {
        let e = Element::with_inertia("slab", 1.0, inertia::diagonal(1.0, 2.0, 3.0))
            .unwrap()
            .oriented(Quaternion::from_axis_angle(Vec3D(0.0, 0.0, 1.0), FRAC_PI_2));
        let body = e.body_inertia();
        assert!((body[(0, 0)] - 2.0).abs() < 1e-12);
        assert!((body[(1, 1)] - 1.0).abs() < 1e-12);
    }
}
