//! Mass-property aggregation: folding rigid parts into one equivalent rigid body.
use tvc_utils::inertia::{self, InertiaTensor};
use tvc_utils::Vec3D;

/// mass, centre of gravity (body frame) and inertia tensor about that centre of gravity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub mass: f64,
    pub cg: Vec3D,
    pub inertia: InertiaTensor,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self::zero()
    }
}

impl MassProperties {
    pub fn zero() -> Self {
        Self {
            mass: 0.0,
            cg: Vec3D::new(),
            inertia: InertiaTensor::zeros(),
        }
    }

    /// Folds any number of parts into a single equivalent body.
    ///
    /// The centre of gravity is the mass-weighted mean of the parts' centres. Each part's tensor is
    /// carried to that point with the parallel-axis theorem. Massless parts are skipped outright, and
    /// when nothing has mass the result is [`MassProperties::zero`], so this never divides by zero.
    /// Because the parallel-axis shift composes, folding already-folded aggregates gives the same
    /// answer as folding their parts directly.
    pub fn combine<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = MassProperties>,
        I::IntoIter: Clone,
    {
        let parts = parts.into_iter().filter(|p| p.mass > 0.0);

        let (mass, first_moment) = parts
            .clone()
            .fold((0.0, Vec3D::new()), |(m, moment), p| {
                (m + p.mass, moment + p.cg * p.mass)
            });
        if mass <= 0.0 {
            return Self::zero();
        }
        let cg = first_moment * (1.0 / mass);

        let inertia = parts.fold(InertiaTensor::zeros(), |acc, p| {
            acc + p.inertia + inertia::parallel_axis_shift(p.mass, &cg.vector_to(&p.cg))
        });

        Self { mass, cg, inertia }
    }
}

/// all static elements folded once before the flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticAggregate {
    pub properties: MassProperties,
    pub element_count: usize,
}

/// the dynamic elements folded at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicAggregate {
    pub properties: MassProperties,
    pub element_count: usize,
}

impl StaticAggregate {
    pub fn combine_with(&self, dynamic: &DynamicAggregate) -> MassProperties {
        MassProperties::combine([self.properties, dynamic.properties])
    }
}
