//! basic 3D vector. Used for positions, forces, moments and angular rates.
//!
//! Vectors carry no frame information; whoever holds one is responsible for knowing whether it is
//! expressed in the body frame or the world frame.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use nalgebra::{Matrix3, Vector3};

#[derive(Debug, PartialEq, PartialOrd, Copy, Clone)]
pub struct Vec3D(pub f64, pub f64, pub f64);

impl Default for Vec3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Vec3D {
    /// the zero vector.
    pub const fn new() -> Self {
        Self(0.0, 0.0, 0.0)
    }

    pub const fn from_floats(x: f64, y: f64, z: f64) -> Self {
        Self(x, y, z)
    }

    /// unit vector along body +z. The rocket's long axis points this way.
    pub const fn up() -> Self {
        Self(0.0, 0.0, 1.0)
    }

    pub fn vector_to(&self, other: &Self) -> Self {
        //! get the direction vector from self to other.
        *other - *self
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0 * other.0 + self.1 * other.1 + self.2 * other.2
    }

    pub fn cross(&self, other: &Self) -> Self {
        //! produces self x other. Order matters.
        Self(
            self.1 * other.2 - self.2 * other.1,
            self.2 * other.0 - self.0 * other.2,
            self.0 * other.1 - self.1 * other.0,
        )
    }

    pub fn magnitude(&self) -> f64 {
        //! returns the magnitude of the current vector e.g Vec3D(3, 4, 0).magnitude() == 5.
        self.dot(self).sqrt()
    }

    pub fn scale(&self, scale_factor: f64) -> Self {
        //! scales the vector by a given magnitude.
        Self(
            self.0 * scale_factor,
            self.1 * scale_factor,
            self.2 * scale_factor,
        )
    }

    /// Returns the unit vector pointing the same way, or `None` for a zero or non-finite vector.
    pub fn to_unit_vector(self) -> Option<Self> {
        let divisor = self.magnitude();
        if divisor == 0.0 || !divisor.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / divisor))
    }

    /// outer product self * other^T.
    pub fn outer(&self, other: &Self) -> Matrix3<f64> {
        self.to_na() * other.to_na().transpose()
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.2.is_finite()
    }

    pub fn to_na(self) -> Vector3<f64> {
        Vector3::new(self.0, self.1, self.2)
    }

    /// true if every component of self is within `epsilon` of the matching component of other.
    pub fn equal_within_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        (self.0 - other.0).abs() < epsilon
            && (self.1 - other.1).abs() < epsilon
            && (self.2 - other.2).abs() < epsilon
    }
}

impl From<Vector3<f64>> for Vec3D {
    fn from(value: Vector3<f64>) -> Self {
        Self(value.x, value.y, value.z)
    }
}

impl From<Vec3D> for Vector3<f64> {
    fn from(value: Vec3D) -> Self {
        value.to_na()
    }
}

impl From<[f64; 3]> for Vec3D {
    fn from(value: [f64; 3]) -> Self {
        let [x, y, z] = value;
        Self(x, y, z)
    }
}

impl Add for Vec3D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        //! composes two vectors. Used for summing forces and offsets.
        Self(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

impl Sub for Vec3D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0, self.1 - rhs.1, self.2 - rhs.2)
    }
}

impl Mul<f64> for Vec3D {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Neg for Vec3D {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0, -self.1, -self.2)
    }
}

impl AddAssign for Vec3D {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs
    }
}
