//! Fixed-step rotational integration.
use tracing::trace;
use tvc_utils::{InertiaTensor, Quaternion, Vec3D, ERR_EPSILON};

use crate::error::IntegratorError;

/// Euler's rotation equation solved for angular acceleration: `I^-1 (M - w x (I w))`.
pub fn euler_angular_acceleration(
    inertia: &InertiaTensor,
    inertia_inv: &InertiaTensor,
    omega: Vec3D,
    moment: Vec3D,
) -> Vec3D {
    let angular_momentum = Vec3D::from(inertia * omega.to_na());
    let gyroscopic = omega.cross(&angular_momentum);
    Vec3D::from(inertia_inv * (moment - gyroscopic).to_na())
}

/// One explicit step of the attitude equations.
///
/// `omega' = omega + alpha dt` and `q' = normalize(q + dt/2 (q * [0, omega]))`. The quaternion
/// derivative uses the angular velocity from the start of the step. Returns `(q', omega')`.
///
/// `q` must arrive unit length within [`ERR_EPSILON`]; the result is always renormalised.
pub fn solver(
    omega: Vec3D,
    alpha: Vec3D,
    q: Quaternion,
    dt: f64,
) -> Result<(Quaternion, Vec3D), IntegratorError> {
    if !omega.is_finite() || !alpha.is_finite() || !dt.is_finite() {
        return Err(IntegratorError::NonFinite);
    }
    let norm = q.norm();
    if !norm.is_finite() || (norm - 1.0).abs() > ERR_EPSILON {
        return Err(IntegratorError::QuaternionDrift(norm));
    }

    let q_dot = q.mult(&Quaternion::from_vector(omega)).scale(0.5);
    let q_next = q.add(&q_dot.scale(dt)).normalized()?;
    let omega_next = omega + alpha * dt;

    trace!(?q_next, ?omega_next, "integrated attitude");
    Ok((q_next, omega_next))
}
