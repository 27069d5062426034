//! Helpers for 3x3 inertia tensors. Tensors are plain nalgebra matrices; these functions only move
//! them between frames and reference points.

use nalgebra::Matrix3;

use crate::{Quaternion, Vec3D};

pub type InertiaTensor = Matrix3<f64>;

pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> InertiaTensor {
    Matrix3::from_diagonal(&nalgebra::Vector3::new(ixx, iyy, izz))
}

/// parallel-axis correction for a body of `mass` whose centroid sits at `d` from the new reference
/// point: m * (|d|^2 E - d d^T).
pub fn parallel_axis_shift(mass: f64, d: &Vec3D) -> InertiaTensor {
    (Matrix3::identity() * d.dot(d) - d.outer(d)) * mass
}

/// re-expresses a tensor given in a frame rotated by `q` in the parent frame: R I R^T.
pub fn rotate_inertia(q: &Quaternion, inertia: &InertiaTensor) -> InertiaTensor {
    let r = q.to_rotation_matrix();
    r * inertia * r.transpose()
}

pub fn is_symmetric(inertia: &InertiaTensor, epsilon: f64) -> bool {
    (inertia - inertia.transpose()).iter().all(|v| v.abs() <= epsilon)
}

/// symmetric positive semidefinite, judged by its eigenvalues.
pub fn is_positive_semidefinite(inertia: &InertiaTensor, epsilon: f64) -> bool {
    if !inertia.iter().all(|v| v.is_finite()) || !is_symmetric(inertia, epsilon) {
        return false;
    }
    inertia
        .symmetric_eigenvalues()
        .iter()
        .all(|&lambda| lambda >= -epsilon)
}

pub fn max_abs_difference(a: &InertiaTensor, b: &InertiaTensor) -> f64 {
    (a - b).iter().fold(0.0, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn shift_along_z_adds_to_x_and_y() {
        // point mass 2kg, 3m up the z axis: Ixx = Iyy = 18, Izz = 0.
        let shift = parallel_axis_shift(2.0, &Vec3D(0.0, 0.0, 3.0));
        assert_eq!(shift, diagonal(18.0, 18.0, 0.0));
    }

    #[test]
    fn shift_has_products_of_inertia() {
        let shift = parallel_axis_shift(1.0, &Vec3D(1.0, 2.0, 0.0));
        assert_eq!(shift[(0, 1)], -2.0);
        assert_eq!(shift[(1, 0)], -2.0);
        assert!(is_positive_semidefinite(&shift, 1e-12));
    }

    #[test]
    fn quarter_turn_swaps_axes() {
        let q = Quaternion::from_axis_angle(Vec3D(1.0, 0.0, 0.0), FRAC_PI_2);
        let rotated = rotate_inertia(&q, &diagonal(1.0, 2.0, 3.0));
        assert!(
            max_abs_difference(&rotated, &diagonal(1.0, 3.0, 2.0)) < 1e-12,
            "{rotated}"
        );
    }

    #[test]
    fn negative_eigenvalue_rejected() {
        assert!(!is_positive_semidefinite(&diagonal(1.0, -1.0, 1.0), 1e-12));
        assert!(is_positive_semidefinite(&diagonal(0.0, 0.0, 0.0), 1e-12));
    }
}
