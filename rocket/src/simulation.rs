//! The fixed-step flight loop. Each step samples the state, folds the vehicle's mass properties,
//! applies thrust and gravity, integrates, and then lets the motor, gimbal and guidance catch up.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};
use tvc_physics::integrator::{euler_angular_acceleration, solver};
use tvc_physics::{Design, DesignError, ElementId, IntegratorError, KinematicData};
use tvc_utils::Vec3D;

use crate::history::FlightHistory;
use crate::tvc::{GuidancePolicy, ThrustVectorController, TvcError};

/// Reasons a flight stops early. All of them are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// `dt`, `t_final` or gravity out of range.
    InvalidSettings(&'static str),
    /// the consolidated inertia tensor could not be inverted.
    SingularInertia,
    /// total mass was zero or not finite.
    ZeroMass(f64),
    /// attitude integration failed.
    Integrator(IntegratorError),
    /// the gimbal pose could not be written back.
    Design(DesignError),
    /// guidance produced an unusable command.
    Tvc(TvcError),
    /// a step failed; carries where it happened and the state the vehicle was in.
    StepFailure {
        step: usize,
        t: f64,
        state: KinematicData,
        source: Box<SimulationError>,
    },
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSettings(reason) => write!(f, "invalid simulation settings: {reason}"),
            Self::SingularInertia => write!(f, "vehicle inertia tensor is singular"),
            Self::ZeroMass(mass) => write!(f, "vehicle mass {mass} cannot be accelerated"),
            Self::Integrator(e) => write!(f, "{e}"),
            Self::Design(e) => write!(f, "{e}"),
            Self::Tvc(e) => write!(f, "{e}"),
            Self::StepFailure { step, t, source, .. } => {
                write!(f, "step {step} (t = {t:.4} s) failed: {source}")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Integrator(e) => Some(e),
            Self::Design(e) => Some(e),
            Self::Tvc(e) => Some(e),
            Self::StepFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<IntegratorError> for SimulationError {
    fn from(value: IntegratorError) -> Self {
        Self::Integrator(value)
    }
}

impl From<DesignError> for SimulationError {
    fn from(value: DesignError) -> Self {
        Self::Design(value)
    }
}

impl From<TvcError> for SimulationError {
    fn from(value: TvcError) -> Self {
        Self::Tvc(value)
    }
}

/// Fixed-step loop timing and the gravity it flies in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// the loop runs while `t < t_final`.
    pub t_final: f64,
    /// step length, seconds.
    pub dt: f64,
    /// magnitude of gravitational acceleration, acting along world -z.
    pub gravity: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            t_final: 4.0,
            dt: 0.01,
            gravity: 9.8,
        }
    }
}

impl SimulationSettings {
    /// rejects non-positive or non-finite timing and non-finite gravity.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimulationError::InvalidSettings("dt must be finite and positive"));
        }
        if !(self.t_final.is_finite() && self.t_final >= 0.0) {
            return Err(SimulationError::InvalidSettings(
                "t_final must be finite and non-negative",
            ));
        }
        if !self.gravity.is_finite() {
            return Err(SimulationError::InvalidSettings("gravity must be finite"));
        }
        Ok(())
    }
}

/// a thrust vector controller bound to the design element it steers.
#[derive(Debug, Clone)]
pub struct GimbalMount {
    /// the gimbal and its motor clock.
    pub controller: ThrustVectorController,
    /// the motor element the gimbal pose is written to.
    pub motor: ElementId,
}

/// Everything the loop owns for the length of a flight.
pub struct SimulationContext {
    /// the vehicle and its kinematic state.
    pub design: Design,
    /// `None` flies unpowered.
    pub tvc: Option<GimbalMount>,
    /// polled once per step for the next gimbal command.
    pub guidance: Box<dyn GuidancePolicy>,
    /// timing and gravity for this flight.
    pub settings: SimulationSettings,
}

/// world-frame snapshot taken at the start of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// loop clock at the start of the step.
    pub t: f64,
    /// body +z expressed in the world frame.
    pub direction: Vec3D,
    /// body rates.
    pub angular_velocity: Vec3D,
    /// world-frame position.
    pub position: Vec3D,
}

/// Advances the context by one `settings.dt` from time `t` and returns the state as it was at `t`.
pub fn step(ctx: &mut SimulationContext, t: f64) -> Result<Sample, SimulationError> {
    let dt = ctx.settings.dt;
    let state = *ctx.design.state();
    let q = state.orientation;
    let omega = state.angular_velocity;

    let sample = Sample {
        t,
        direction: q.rotate(&Vec3D::up()),
        angular_velocity: omega,
        position: state.position,
    };

    let properties = ctx.design.get_temporary_properties();
    let inertia_inv = properties
        .inertia
        .try_inverse()
        .ok_or(SimulationError::SingularInertia)?;

    let (thrust_body, moment_body) = match &ctx.tvc {
        Some(mount) => mount.controller.get_thrust_vector(t, properties.cg),
        None => (Vec3D::new(), Vec3D::new()),
    };

    let q_inv = q.conjugated();
    let mut force = q_inv.rotate(&thrust_body);
    let moment = q_inv.rotate(&moment_body);
    force.2 -= properties.mass * ctx.settings.gravity;

    let alpha = euler_angular_acceleration(&properties.inertia, &inertia_inv, omega, moment);

    if !(properties.mass.is_finite() && properties.mass > 0.0) {
        return Err(SimulationError::ZeroMass(properties.mass));
    }
    let acceleration = force * (1.0 / properties.mass);

    let (orientation, angular_velocity) = solver(omega, alpha, q, dt)?;

    // position advances on the velocity from the start of the step.
    let position = state.position + state.velocity * dt;
    let velocity = state.velocity + acceleration * dt;

    trace!(t, ?force, ?moment, ?alpha, mass = properties.mass, "step forces");

    ctx.design += KinematicData {
        position,
        velocity,
        orientation,
        angular_velocity,
    };

    ctx.design.step(dt);
    if let Some(mount) = &mut ctx.tvc {
        mount.controller.step(dt);
        let (pivot, gimbal) = mount.controller.get_attitude();
        ctx.design.set_element_pose(mount.motor, pivot, gimbal)?;
        let (target_x, target_y) = ctx.guidance.setpoint(t, ctx.design.state());
        mount.controller.update_setpoint(target_x, target_y)?;
    }

    Ok(sample)
}

/// Runs from t = 0 while `t < t_final`, adding `dt` to the clock after every step and recording
/// each one. The clock accumulates rounding, so the step count can exceed `t_final / dt` by one.
/// Any step error ends the run.
pub fn run(ctx: &mut SimulationContext) -> Result<FlightHistory, SimulationError> {
    ctx.settings.validate()?;
    if !ctx.design.is_consolidated() {
        ctx.design.consolidate_static_elements();
    }

    let SimulationSettings { t_final, dt, .. } = ctx.settings;
    info!(t_final, dt, gravity = ctx.settings.gravity, "starting flight");

    let mut history = FlightHistory::new(dt);
    let mut index: usize = 0;
    let mut t = 0.0;
    while t < t_final {
        let state = *ctx.design.state();
        let sample = step(ctx, t).map_err(|source| SimulationError::StepFailure {
            step: index,
            t,
            state,
            source: Box::new(source),
        })?;
        history.push(&sample);
        index += 1;
        t += dt;
    }

    let summary = history.summary();
    info!(
        steps = history.len(),
        apogee = summary.apogee,
        apogee_time = summary.apogee_time,
        max_angular_rate = summary.max_angular_rate,
        burnout_time = ctx.tvc.as_ref().map(|m| m.controller.motor().curve().burn_time()),
        "flight complete"
    );
    Ok(history)
}
