//! Thrust vector control: a two-axis gimbal under the motor, driven toward a commanded deflection
//! at a bounded slew rate, plus the guidance seam that supplies the command.
use std::fmt::Display;

use tracing::debug;
use tvc_physics::{KinematicData, MotorManager};
use tvc_utils::{Quaternion, Vec3D};

/// Gimbal misconfiguration or a bad command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TvcError {
    /// gimbal limits must be finite and strictly positive.
    InvalidLimits { max_deflection: f64, max_rate: f64 },
    /// guidance asked for a NaN deflection.
    NonFiniteSetpoint { target_x: f64, target_y: f64 },
}

impl Display for TvcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLimits {
                max_deflection,
                max_rate,
            } => write!(
                f,
                "invalid gimbal limits: max deflection {max_deflection} rad, max rate {max_rate} rad/s"
            ),
            Self::NonFiniteSetpoint { target_x, target_y } => {
                write!(f, "gimbal setpoint ({target_x}, {target_y}) is not a number")
            }
        }
    }
}

impl std::error::Error for TvcError {}

/// deflection about the body x and y axes, radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GimbalAngles {
    /// about body x.
    pub x: f64,
    /// about body y.
    pub y: f64,
}

impl GimbalAngles {
    pub fn to_quaternion(self) -> Quaternion {
        //! tilt about body x first, then about the tilted y.
        Quaternion::from_axis_angle(Vec3D(1.0, 0.0, 0.0), self.x)
            .mult(&Quaternion::from_axis_angle(Vec3D(0.0, 1.0, 0.0), self.y))
    }
}

/// A rate-limited two-axis gimbal carrying one motor.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrustVectorController {
    motor: MotorManager,
    offset: Vec3D,
    setpoint: GimbalAngles,
    deflection: GimbalAngles,
    max_deflection: f64,
    max_rate: f64,
}

impl ThrustVectorController {
    /// Centred gimbal at the body origin. Limits are in radians and rad/s and must be positive.
    pub fn new(motor: MotorManager, max_deflection: f64, max_rate: f64) -> Result<Self, TvcError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(max_deflection) || !valid(max_rate) {
            return Err(TvcError::InvalidLimits {
                max_deflection,
                max_rate,
            });
        }
        Ok(Self {
            motor,
            offset: Vec3D::new(),
            setpoint: GimbalAngles::default(),
            deflection: GimbalAngles::default(),
            max_deflection,
            max_rate,
        })
    }

    pub fn move_to_motor(&mut self, offset: Vec3D) {
        //! aligns the gimbal pivot with the motor's body-frame position.
        self.offset = offset;
    }

    /// the controller's copy of the motor clock.
    pub fn motor(&self) -> &MotorManager {
        &self.motor
    }

    /// gimbal pivot, body frame.
    pub fn offset(&self) -> Vec3D {
        self.offset
    }

    /// last accepted command, already clamped.
    pub fn setpoint(&self) -> GimbalAngles {
        self.setpoint
    }

    /// where the gimbal actually is.
    pub fn deflection(&self) -> GimbalAngles {
        self.deflection
    }

    /// per-axis limit, radians.
    pub fn max_deflection(&self) -> f64 {
        self.max_deflection
    }

    /// slew limit, rad/s.
    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// Body-frame force and moment about `cg` produced by the motor at time `t`.
    ///
    /// The thrust acts along body +z turned through the current gimbal deflection, applied at the
    /// pivot, so the moment arm is `offset - cg`.
    pub fn get_thrust_vector(&self, t: f64, cg: Vec3D) -> (Vec3D, Vec3D) {
        let direction = self.deflection.to_quaternion().rotate(&Vec3D::up());
        let force = direction * self.motor.thrust_at(t);
        let moment = (self.offset - cg).cross(&force);
        (force, moment)
    }

    pub fn update_setpoint(&mut self, target_x: f64, target_y: f64) -> Result<(), TvcError> {
        //! commands a new deflection. Out-of-range targets are clamped to the mechanical limit,
        //! a NaN target is an error and leaves the previous setpoint in place.
        if target_x.is_nan() || target_y.is_nan() {
            return Err(TvcError::NonFiniteSetpoint { target_x, target_y });
        }
        let clamp = |target: f64| target.clamp(-self.max_deflection, self.max_deflection);
        let clamped = GimbalAngles {
            x: clamp(target_x),
            y: clamp(target_y),
        };
        if clamped.x != target_x || clamped.y != target_y {
            debug!(target_x, target_y, ?clamped, "gimbal setpoint clamped");
        }
        self.setpoint = clamped;
        Ok(())
    }

    pub fn step(&mut self, dt: f64) {
        //! slews each axis toward the setpoint by at most `max_rate * dt`, and keeps the motor clock in step.
        let max_move = self.max_rate * dt.max(0.0);
        let slew = |current: f64, target: f64| current + (target - current).clamp(-max_move, max_move);
        self.deflection = GimbalAngles {
            x: slew(self.deflection.x, self.setpoint.x),
            y: slew(self.deflection.y, self.setpoint.y),
        };
        self.motor.advance(dt);
    }

    pub fn get_attitude(&self) -> (Vec3D, Quaternion) {
        //! pivot position and gimbal orientation, ready to write back onto the motor element.
        (self.offset, self.deflection.to_quaternion())
    }
}

/// Source of gimbal commands, polled once per step with the current time and vehicle state.
pub trait GuidancePolicy {
    /// `(target_x, target_y)` gimbal command in radians.
    fn setpoint(&mut self, t: f64, state: &KinematicData) -> (f64, f64);
}

/// commands zero deflection forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldZero;

impl GuidancePolicy for HoldZero {
    fn setpoint(&mut self, _t: f64, _state: &KinematicData) -> (f64, f64) {
        (0.0, 0.0)
    }
}
