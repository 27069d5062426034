//! The shapes an element can take, and the inertia of each about its own centroid.
//! Every shape is axially symmetric about its local z axis.
use serde::{Deserialize, Serialize};
use tvc_utils::inertia::{self, InertiaTensor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// thick-walled tube, e.g. the body tube.
    Tube {
        inner_radius: f64,
        outer_radius: f64,
        height: f64,
    },
    Cone {
        radius: f64,
        height: f64,
    },
    /// solid cylinder; motors and avionics bays.
    Cylinder {
        radius: f64,
        height: f64,
    },
}

impl Shape {
    pub fn validate(&self) -> Result<(), &'static str> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        match *self {
            Shape::Tube {
                inner_radius,
                outer_radius,
                height,
            } => {
                if !inner_radius.is_finite() || inner_radius < 0.0 {
                    return Err("tube inner radius must be finite and non-negative");
                }
                if !positive(outer_radius) || !positive(height) {
                    return Err("tube outer radius and height must be positive");
                }
                if inner_radius >= outer_radius {
                    return Err("tube inner radius must be smaller than its outer radius");
                }
            }
            Shape::Cone { radius, height } | Shape::Cylinder { radius, height } => {
                if !positive(radius) || !positive(height) {
                    return Err("radius and height must be positive");
                }
            }
        }
        Ok(())
    }

    /// inertia tensor of a body of this shape and `mass` about its centroid.
    pub fn inertia(&self, mass: f64) -> InertiaTensor {
        match *self {
            Shape::Tube {
                inner_radius,
                outer_radius,
                height,
            } => {
                let r2 = inner_radius * inner_radius + outer_radius * outer_radius;
                let transverse = mass * (3.0 * r2 + height * height) / 12.0;
                inertia::diagonal(transverse, transverse, mass * r2 / 2.0)
            }
            Shape::Cone { radius, height } => {
                let transverse =
                    mass * (3.0 * radius * radius / 20.0 + 3.0 * height * height / 80.0);
                inertia::diagonal(transverse, transverse, 3.0 * mass * radius * radius / 10.0)
            }
            Shape::Cylinder { radius, height } => {
                let transverse = mass * (3.0 * radius * radius + height * height) / 12.0;
                inertia::diagonal(transverse, transverse, mass * radius * radius / 2.0)
            }
        }
    }
}
