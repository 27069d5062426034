use std::fmt::Display;

use nalgebra::Matrix3;

use crate::vec3d::Vec3D;

/// the unit quaternion (1, 0, 0, 0) is defined herein as the body frame coinciding with the world frame:
/// body +z (the rocket's long axis) points along world +z, "up".
/// a quaternion q maps body vectors into the world frame as q * v * q'; its conjugate maps back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion(pub f64, pub f64, pub f64, pub f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuaternionError {
    /// magnitude too far from 1 for a rotation.
    NotUnit,
    /// zero or non-finite magnitude; cannot be normalised.
    Degenerate,
}

impl Display for QuaternionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotUnit => write!(f, "quaternion is not unit length"),
            Self::Degenerate => write!(f, "quaternion has zero or non-finite magnitude"),
        }
    }
}

impl std::error::Error for QuaternionError {}

pub const ERR_EPSILON: f64 = 1e-6;

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn identity() -> Self {
        Self(1.0, 0.0, 0.0, 0.0)
    }

    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Result<Quaternion, QuaternionError> {
        //! creates a new Quaternion; checking the values provided produce a unit quaternion.
        let q = Quaternion(w, x, y, z);
        let mag = q.norm();
        if !mag.is_finite() {
            return Err(QuaternionError::Degenerate);
        }
        if (mag - 1.0).abs() < ERR_EPSILON {
            Ok(q)
        } else {
            Err(QuaternionError::NotUnit)
        }
    }

    pub fn from_axis_angle(axis: Vec3D, angle: f64) -> Self {
        //! rotation of `angle` radians about `axis`. A zero axis produces the identity.
        match axis.to_unit_vector() {
            Some(unit) => {
                let (s, c) = (angle / 2.0).sin_cos();
                Self(c, unit.0 * s, unit.1 * s, unit.2 * s)
            }
            None => Self::identity(),
        }
    }

    pub fn from_vector(vector: Vec3D) -> Self {
        //! pure quaternion (0, v). Used to rotate vectors and in the quaternion derivative.
        Quaternion(0.0, vector.0, vector.1, vector.2)
    }

    pub fn vector_part(&self) -> Vec3D {
        Vec3D(self.1, self.2, self.3)
    }

    pub fn mult(&self, other: &Self) -> Self {
        //! produces self * other. Remember that order matters.
        Self(
            self.0 * other.0 - self.1 * other.1 - self.2 * other.2 - self.3 * other.3,
            self.0 * other.1 + self.1 * other.0 + self.2 * other.3 - self.3 * other.2,
            self.0 * other.2 - self.1 * other.3 + self.2 * other.0 + self.3 * other.1,
            self.0 * other.3 + self.1 * other.2 - self.2 * other.1 + self.3 * other.0,
        )
    }

    pub fn conjugated(&self) -> Self {
        //! returns the conjugate pair of self.
        Self(self.0, -self.1, -self.2, -self.3)
    }

    pub fn add(&self, other: &Self) -> Self {
        Self(
            self.0 + other.0,
            self.1 + other.1,
            self.2 + other.2,
            self.3 + other.3,
        )
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self(self.0 * factor, self.1 * factor, self.2 * factor, self.3 * factor)
    }

    pub fn norm(&self) -> f64 {
        (self.0 * self.0 + self.1 * self.1 + self.2 * self.2 + self.3 * self.3).sqrt()
    }

    pub fn normalized(&self) -> Result<Self, QuaternionError> {
        let mag = self.norm();
        if mag == 0.0 || !mag.is_finite() {
            return Err(QuaternionError::Degenerate);
        }
        Ok(self.scale(1.0 / mag))
    }

    pub fn rotate(&self, v: &Vec3D) -> Vec3D {
        //! rotates v by self: q * (0, v) * q'. Assumes self is unit length.
        self.mult(&Self::from_vector(*v))
            .mult(&self.conjugated())
            .vector_part()
    }

    pub fn to_up_vector(&self) -> Vec3D {
        //! the body +z axis expressed in the world frame.
        self.rotate(&Vec3D::up())
    }

    /// rotation angle in radians, in [0, 2pi].
    pub fn angle(&self) -> f64 {
        2.0 * self.0.clamp(-1.0, 1.0).acos()
    }

    pub fn to_rotation_matrix(&self) -> Matrix3<f64> {
        //! direction cosine matrix R such that R * v == self.rotate(v).
        let Quaternion(w, x, y, z) = *self;
        Matrix3::new(
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - w * z),
            2.0 * (x * z + w * y),
            2.0 * (x * y + w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - w * x),
            2.0 * (x * z - w * y),
            2.0 * (y * z + w * x),
            1.0 - 2.0 * (x * x + y * y),
        )
    }

    pub fn equal_within_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        // return true if all fields values are within epsilon.
        (self.0 - other.0).abs() < epsilon
            && (self.1 - other.1).abs() < epsilon
            && (self.2 - other.2).abs() < epsilon
            && (self.3 - other.3).abs() < epsilon
    }
}

#[cfg(test)]
mod quaternion_tests {
    use std::f64::consts::FRAC_PI_2;

    use proptest::prelude::*;

    use super::{Quaternion, QuaternionError};
    use crate::vec3d::Vec3D;

    #[test]
    fn test_new_valid() {
        // this creation passes validation because its magnitude is 1
        assert_eq!(
            Quaternion::new(0.0, 0.6, 0.8, 0.0),
            Ok(Quaternion(0.0, 0.6, 0.8, 0.0))
        )
    }

    #[test]
    fn test_new_invalid() {
        // magnitude too far from 1, fail
        assert_eq!(
            Quaternion::new(1.0, 1.0, 0.0, 0.0),
            Err(QuaternionError::NotUnit)
        );
        assert_eq!(
            Quaternion::new(f64::NAN, 0.0, 0.0, 0.0),
            Err(QuaternionError::Degenerate)
        );
    }

    #[test]
    fn test_mult() {
        // multiply two quaternions together, validate output is correct against external calculation.
        let multed = Quaternion(0.3, 0.6, 0.5, 0.547722558).mult(&Quaternion(0.8, 0.1, 0.5, 0.316227766));
        let result = Quaternion(-0.2432050809041, 0.394252604, 0.4150355962, 0.7830463762);
        println!("{:?}\n{:?}", multed, result);
        assert!(multed.equal_within_epsilon(&result, 1e-3))
    }

    #[test]
    fn test_conjugate() {
        let quat_test = Quaternion(0.0, 0.6, 0.8, 0.0);
        assert_eq!(quat_test.conjugated(), Quaternion(0.0, -0.6, -0.8, -0.0));
    }

    #[test]
    fn test_from_vector() {
        assert_eq!(
            Quaternion::from_vector(Vec3D(0.6, 0.8, 0.0)),
            Quaternion(0.0, 0.6, 0.8, 0.0)
        )
    }

    #[test]
    fn test_identity_keeps_up() {
        assert_eq!(Quaternion::identity().to_up_vector(), Vec3D::up())
    }

    #[test]
    fn test_quarter_turn_about_x() {
        // +90 degrees about x takes +z to -y.
        let q = Quaternion::from_axis_angle(Vec3D(1.0, 0.0, 0.0), FRAC_PI_2);
        let up = q.to_up_vector();
        assert!(up.equal_within_epsilon(&Vec3D(0.0, -1.0, 0.0), 1e-12), "{up:?}");
        let back = q.conjugated().rotate(&up);
        assert!(back.equal_within_epsilon(&Vec3D::up(), 1e-12), "{back:?}");
    }

    #[test]
    fn test_normalized_rejects_zero() {
        assert_eq!(
            Quaternion(0.0, 0.0, 0.0, 0.0).normalized(),
            Err(QuaternionError::Degenerate)
        );
        let q = Quaternion(2.0, 0.0, 0.0, 0.0).normalized().unwrap();
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn test_angle() {
        let q = Quaternion::from_axis_angle(Vec3D::up(), 1.0);
        assert!((q.angle() - 1.0).abs() < 1e-12);
    }

    proptest! {
        /// the rotation matrix must agree with the sandwich product.
        #[test]
        fn prop_matrix_matches_rotate(
            ax in -1.0f64..1.0, ay in -1.0f64..1.0, az in -1.0f64..1.0,
            angle in -6.0f64..6.0,
            vx in -10.0f64..10.0, vy in -10.0f64..10.0, vz in -10.0f64..10.0,
        ) {
            let q = Quaternion::from_axis_angle(Vec3D(ax, ay, az), angle);
            let v = Vec3D(vx, vy, vz);
            let by_matrix: Vec3D = (q.to_rotation_matrix() * v.to_na()).into();
            prop_assert!(by_matrix.equal_within_epsilon(&q.rotate(&v), 1e-9));
        }

        /// rotation preserves length.
        #[test]
        fn prop_rotate_preserves_magnitude(
            ax in -1.0f64..1.0, ay in -1.0f64..1.0, az in -1.0f64..1.0,
            angle in -6.0f64..6.0,
            vx in -10.0f64..10.0, vy in -10.0f64..10.0, vz in -10.0f64..10.0,
        ) {
            let q = Quaternion::from_axis_angle(Vec3D(ax, ay, az), angle);
            let v = Vec3D(vx, vy, vz);
            prop_assert!((q.rotate(&v).magnitude() - v.magnitude()).abs() < 1e-9);
        }
    }
}
