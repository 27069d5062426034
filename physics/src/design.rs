//! The composite rigid body. A [`Design`] owns every element of the vehicle and its kinematic
//! state, and answers "what does the vehicle weigh, where is its CG, and what is its inertia right
//! now".
//!
//! Static elements are folded once into a [`StaticAggregate`] before flight; each step only the
//! (few) dynamic elements are folded and combined with that cache.
use std::fmt::Display;
use std::ops::AddAssign;

use tracing::{debug, trace};
use tvc_utils::{Quaternion, Vec3D};

use crate::element::Element;
use crate::error::DesignError;
use crate::mass::{DynamicAggregate, MassProperties, StaticAggregate};

/// Stable handle to an element of a [`Design`]. Elements are never removed, so a handle stays valid
/// for the life of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// rigid-body state of the whole vehicle. Position and velocity are world frame, angular velocity
/// is body frame, orientation maps body to world.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicData {
    pub position: Vec3D,
    pub velocity: Vec3D,
    pub orientation: Quaternion,
    pub angular_velocity: Vec3D,
}

#[derive(Debug, Clone, Default)]
pub struct Design {
    state: KinematicData,
    elements: Vec<Element>,
    static_aggregate: Option<StaticAggregate>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: KinematicData) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn add_element(&mut self, element: Element) -> Result<ElementId, DesignError> {
        //! registers an element. Static elements can only be added before consolidation.
        let id = ElementId(self.elements.len());
        if element.is_static() && self.static_aggregate.is_some() {
            return Err(DesignError::Consolidated(id));
        }
        debug!(
            %id,
            element = element.name(),
            mass = element.mass(),
            is_static = element.is_static(),
            "registered element"
        );
        self.elements.push(element);
        Ok(id)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, DesignError> {
        self.elements.get(id.0).ok_or(DesignError::UnknownElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, DesignError> {
        self.elements
            .get_mut(id.0)
            .ok_or(DesignError::UnknownElement(id))
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i), e))
    }

    pub fn state(&self) -> &KinematicData {
        &self.state
    }

    pub fn replace_state(&mut self, state: KinematicData) {
        //! the whole kinematic state is swapped at once; there is no partial update.
        self.state = state;
    }

    pub fn manipulate_element(
        &mut self,
        id: ElementId,
        position_offset: Vec3D,
    ) -> Result<(), DesignError> {
        //! places an element in the body frame. Assembly only: static elements are frozen once consolidated.
        let consolidated = self.static_aggregate.is_some();
        let element = self.element_mut(id)?;
        if element.is_static() && consolidated {
            return Err(DesignError::Consolidated(id));
        }
        element.set_offset_position(position_offset);
        Ok(())
    }

    /// rewrites a dynamic element's pose, e.g. a gimballed motor following its mount.
    pub fn set_element_pose(
        &mut self,
        id: ElementId,
        position_offset: Vec3D,
        orientation_offset: Quaternion,
    ) -> Result<(), DesignError> {
        let element = self.element_mut(id)?;
        if element.is_static() {
            return Err(DesignError::NotDynamic(id));
        }
        element.set_offset_position(position_offset);
        element.set_offset_orientation(orientation_offset);
        Ok(())
    }

    fn fold_static(&self) -> StaticAggregate {
        let statics = self.elements.iter().filter(|e| e.is_static());
        StaticAggregate {
            properties: MassProperties::combine(statics.clone().map(Element::mass_properties)),
            element_count: statics.count(),
        }
    }

    pub fn consolidate_static_elements(&mut self) -> &StaticAggregate {
        //! folds every static element into one cached equivalent body. Running it again gives the same aggregate.
        let aggregate = self.fold_static();
        debug!(
            elements = aggregate.element_count,
            mass = aggregate.properties.mass,
            cg = ?aggregate.properties.cg,
            "consolidated static elements"
        );
        self.static_aggregate.insert(aggregate)
    }

    pub fn is_consolidated(&self) -> bool {
        self.static_aggregate.is_some()
    }

    pub fn static_aggregate(&self) -> Option<&StaticAggregate> {
        self.static_aggregate.as_ref()
    }

    pub fn dynamic_aggregate(&self) -> DynamicAggregate {
        let dynamics = self.elements.iter().filter(|e| !e.is_static());
        DynamicAggregate {
            properties: MassProperties::combine(dynamics.clone().map(Element::mass_properties)),
            element_count: dynamics.count(),
        }
    }

    /// Instantaneous mass, CG and inertia (about the CG) of the whole vehicle, body frame.
    ///
    /// Uses the consolidated static aggregate when there is one, otherwise folds the static elements
    /// on the spot; either way the result is the same.
    pub fn get_temporary_properties(&self) -> MassProperties {
        let dynamic = self.dynamic_aggregate();
        let properties = match &self.static_aggregate {
            Some(cached) => cached.combine_with(&dynamic),
            None => self.fold_static().combine_with(&dynamic),
        };
        trace!(mass = properties.mass, cg = ?properties.cg, "mass properties");
        properties
    }

    pub fn step(&mut self, dt: f64) {
        //! advances every dynamic element's depletion by dt.
        for element in self.elements.iter_mut().filter(|e| !e.is_static()) {
            element.advance(dt);
        }
    }
}

impl AddAssign<KinematicData> for Design {
    fn add_assign(&mut self, rhs: KinematicData) {
        self.replace_state(rhs);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tvc_utils::inertia::{self, InertiaTensor};

    use super::*;
    use crate::motor::MotorManager;
    use crate::shapes::Shape;

    fn airframe() -> Vec<Element> {
        vec![
            Element::new_static(
                "body_tube",
                Shape::Tube {
                    inner_radius: 0.072,
                    outer_radius: 0.074,
                    height: 0.8,
                },
                0.42,
            )
            .unwrap(),
            Element::new_static(
                "nose_cone",
                Shape::Cone {
                    radius: 0.074,
                    height: 0.2,
                },
                0.08,
            )
            .unwrap()
            .at(Vec3D(0.0, 0.0, 0.4)),
            Element::new_static(
                "flight_computer",
                Shape::Cylinder {
                    radius: 0.072,
                    height: 0.12,
                },
                0.18,
            )
            .unwrap()
            .at(Vec3D(0.0, 0.0, 0.15)),
        ]
    }

    fn motor_element() -> Element {
        let motor = MotorManager::new("F15").unwrap();
        Element::new_dynamic("rocket_motor", motor.curve().shape(), motor)
            .unwrap()
            .at(Vec3D(0.0, 0.0, -0.4))
    }

    fn design_from(elements: Vec<Element>) -> Design {
        let mut design = Design::new();
        for e in elements {
            design.add_element(e).unwrap();
        }
        design
    }

    fn assert_close(a: &MassProperties, b: &MassProperties) {
        assert!((a.mass - b.mass).abs() < 1e-12, "{} vs {}", a.mass, b.mass);
        assert!(a.cg.equal_within_epsilon(&b.cg, 1e-12), "{:?} vs {:?}", a.cg, b.cg);
        let diff = inertia::max_abs_difference(&a.inertia, &b.inertia);
        assert!(diff < 1e-12, "inertia differs by {diff}");
    }

    #[test]
    fn mass_is_sum_of_elements() {
        let mut elements = airframe();
        elements.push(motor_element());
        let props = design_from(elements).get_temporary_properties();
        assert!((props.mass - (0.42 + 0.08 + 0.18 + 0.1016)).abs() < 1e-12);
    }

    #[test]
    fn result_is_symmetric_psd() {
        let mut elements = airframe();
        elements.push(motor_element().oriented(Quaternion::from_axis_angle(
            Vec3D(1.0, 1.0, 0.0),
            0.1,
        )));
        let props = design_from(elements).get_temporary_properties();
        assert!(inertia::is_positive_semidefinite(&props.inertia, 1e-12));
    }

    #[test]
    fn consolidation_matches_unconsolidated() {
        let mut elements = airframe();
        elements.push(motor_element());
        let mut design = design_from(elements);
        let before = design.get_temporary_properties();
        design.consolidate_static_elements();
        assert_close(&before, &design.get_temporary_properties());
    }

    #[test]
    fn consolidation_is_idempotent() {
        let mut design = design_from(airframe());
        let once = *design.consolidate_static_elements();
        let twice = *design.consolidate_static_elements();
        assert_eq!(once, twice);
        assert_eq!(once.element_count, 3);
    }

    #[test]
    fn static_elements_frozen_after_consolidation() {
        let mut design = design_from(airframe());
        let motor = design.add_element(motor_element()).unwrap();
        design.consolidate_static_elements();

        let nose = ElementId(1);
        assert_eq!(
            design.manipulate_element(nose, Vec3D::new()),
            Err(DesignError::Consolidated(nose))
        );
        assert!(design.manipulate_element(motor, Vec3D(0.0, 0.0, -0.3)).is_ok());
        assert!(matches!(
            design.add_element(airframe().remove(0)),
            Err(DesignError::Consolidated(_))
        ));
    }

    #[test]
    fn pose_write_back_only_on_dynamic() {
        let mut design = design_from(airframe());
        let motor = design.add_element(motor_element()).unwrap();
        let tilt = Quaternion::from_axis_angle(Vec3D(1.0, 0.0, 0.0), 0.05);
        design
            .set_element_pose(motor, Vec3D(0.0, 0.0, -0.4), tilt)
            .unwrap();
        assert_eq!(design.element(motor).unwrap().offset_orientation(), tilt);
        assert_eq!(
            design.set_element_pose(ElementId(0), Vec3D::new(), tilt),
            Err(DesignError::NotDynamic(ElementId(0)))
        );
        assert_eq!(
            design.manipulate_element(ElementId(42), Vec3D::new()),
            Err(DesignError::UnknownElement(ElementId(42)))
        );
    }

    #[test]
    fn step_burns_dynamic_mass_only() {
        let mut elements = airframe();
        elements.push(motor_element());
        let mut design = design_from(elements);
        design.consolidate_static_elements();
        let before = design.get_temporary_properties();
        design.step(1.0);
        let after = design.get_temporary_properties();
        assert!(after.mass < before.mass);
        // the motor sits below the CG, so burning it moves the CG up.
        assert!(after.cg.2 > before.cg.2);
        assert_eq!(design.static_aggregate().unwrap().properties.mass, 0.42 + 0.08 + 0.18);
    }

    #[test]
    fn state_is_replaced_wholesale() {
        let mut design = design_from(airframe());
        let next = KinematicData {
            position: Vec3D(1.0, 2.0, 3.0),
            velocity: Vec3D(0.0, 0.0, -1.0),
            orientation: Quaternion::from_axis_angle(Vec3D::up(), 0.3),
            angular_velocity: Vec3D(0.0, 0.0, 1.0),
        };
        design += next;
        assert_eq!(*design.state(), next);
    }

    #[test]
    fn single_unit_element() {
        let design = design_from(vec![Element::with_inertia(
            "unit",
            1.0,
            InertiaTensor::identity(),
        )
        .unwrap()]);
        let props = design.get_temporary_properties();
        assert_eq!(props.mass, 1.0);
        assert_eq!(props.cg, Vec3D::new());
        assert_eq!(props.inertia, InertiaTensor::identity());
    }

    fn arbitrary_element() -> impl Strategy<Value = Element> {
        (
            0.0f64..5.0,
            0.01f64..1.0,
            0.01f64..2.0,
            (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0),
            (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0, -3.0f64..3.0),
        )
            .prop_map(|(mass, radius, height, (x, y, z), (ax, ay, az, angle))| {
                Element::new_static("part", Shape::Cylinder { radius, height }, mass)
                    .unwrap()
                    .at(Vec3D(x, y, z))
                    .oriented(Quaternion::from_axis_angle(Vec3D(ax, ay, az), angle))
            })
    }

    proptest! {
        #[test]
        fn prop_consolidation_order_independent(
            elements in prop::collection::vec(arbitrary_element(), 1..8),
            seed in any::<u64>(),
        ) {
            let mut shuffled = elements.clone();
            // deterministic permutation from the seed
            let n = shuffled.len();
            for i in (1..n).rev() {
                let j = (seed.wrapping_mul(6364136223846793005).wrapping_add(i as u64) % (i as u64 + 1)) as usize;
                shuffled.swap(i, j);
            }
            let a = design_from(elements).get_temporary_properties();
            let b = design_from(shuffled).get_temporary_properties();
            let scale = 1.0 + a.mass;
            prop_assert!((a.mass - b.mass).abs() < 1e-9 * scale);
            prop_assert!(a.cg.equal_within_epsilon(&b.cg, 1e-9 * scale));
            prop_assert!(inertia::max_abs_difference(&a.inertia, &b.inertia) < 1e-9 * scale);
        }

        #[test]
        fn prop_consolidated_inertia_psd(elements in prop::collection::vec(arbitrary_element(), 1..8)) {
            let mut design = design_from(elements);
            design.consolidate_static_elements();
            let props = design.get_temporary_properties();
            prop_assert!(inertia::is_positive_semidefinite(&props.inertia, 1e-9));
        }
    }
}
