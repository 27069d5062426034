//! Spatial primitives shared by the physics and rocket crates: a plain f64 vector, a rotation
//! quaternion and a few inertia-tensor helpers built on nalgebra.
pub mod inertia;
mod quaternion;
mod vec3d;

pub use inertia::InertiaTensor;
pub use quaternion::{Quaternion, QuaternionError, ERR_EPSILON};
pub use vec3d::Vec3D;
