//! Solid motor depletion. A motor is identified by its designation, which selects a published
//! thrust curve; propellant mass is burnt off in proportion to the impulse delivered so far.
//!
//! Thrust samples follow the RASP engine-file convention: `(time s, thrust N)` pairs with an
//! implicit ignition at (0, 0) made explicit here, ending on a zero-thrust burnout sample.
use tracing::debug;
use tvc_utils::InertiaTensor;

use crate::builder::{ElementConfig, VehicleConfig};
use crate::error::MotorError;
use crate::shapes::Shape;

/// name under which [`MotorManager::get_element_data`] registers the motor element.
pub const MOTOR_ELEMENT_NAME: &str = "rocket_motor";

#[derive(Debug, PartialEq)]
pub struct ThrustCurve {
    pub designation: &'static str,
    pub diameter: f64,
    pub length: f64,
    pub propellant_mass: f64,
    /// loaded mass at ignition: casing plus propellant.
    pub total_mass: f64,
    samples: &'static [(f64, f64)],
}

static CATALOG: [ThrustCurve; 3] = [
    ThrustCurve {
        designation: "D12",
        diameter: 0.024,
        length: 0.070,
        propellant_mass: 0.0211,
        total_mass: 0.0422,
        samples: &[
            (0.0, 0.0),
            (0.049, 2.569),
            (0.116, 9.369),
            (0.184, 17.275),
            (0.237, 24.258),
            (0.282, 29.73),
            (0.297, 27.825),
            (0.311, 26.01),
            (0.322, 23.56),
            (0.348, 20.86),
            (0.386, 19.197),
            (0.442, 17.528),
            (0.546, 16.275),
            (0.718, 15.737),
            (0.879, 15.009),
            (1.001, 14.619),
            (1.179, 14.491),
            (1.328, 14.258),
            (1.451, 13.875),
            (1.552, 13.609),
            (1.623, 12.987),
            (1.653, 6.0),
            (1.68, 0.0),
        ],
    },
    ThrustCurve {
        designation: "E12",
        diameter: 0.024,
        length: 0.095,
        propellant_mass: 0.0358,
        total_mass: 0.0585,
        samples: &[
            (0.0, 0.0),
            (0.052, 5.045),
            (0.096, 9.91),
            (0.196, 24.144),
            (0.251, 31.351),
            (0.287, 32.973),
            (0.3, 29.91),
            (0.344, 17.117),
            (0.37, 14.414),
            (0.4, 12.973),
            (0.5, 11.712),
            (0.6, 11.171),
            (0.7, 10.631),
            (0.8, 10.09),
            (0.9, 9.73),
            (1.0, 9.55),
            (1.101, 9.91),
            (1.2, 9.55),
            (1.3, 9.73),
            (1.5, 9.73),
            (1.7, 9.55),
            (1.9, 9.73),
            (2.1, 9.55),
            (2.2, 9.73),
            (2.3, 9.19),
            (2.375, 9.37),
            (2.4, 5.95),
            (2.44, 0.0),
        ],
    },
    ThrustCurve {
        designation: "F15",
        diameter: 0.029,
        length: 0.114,
        propellant_mass: 0.060,
        total_mass: 0.1016,
        samples: &[
            (0.0, 0.0),
            (0.063, 2.127),
            (0.118, 4.407),
            (0.158, 8.359),
            (0.228, 13.68),
            (0.34, 20.82),
            (0.386, 26.75),
            (0.425, 25.38),
            (0.481, 22.19),
            (0.583, 17.93),
            (0.883, 16.39),
            (1.191, 14.59),
            (1.364, 15.65),
            (1.589, 14.74),
            (1.862, 14.14),
            (2.118, 13.98),
            (2.355, 13.38),
            (2.478, 13.68),
            (2.585, 13.22),
            (2.901, 13.07),
            (3.014, 13.07),
            (3.148, 13.37),
            (3.312, 13.22),
            (3.409, 13.38),
            (3.445, 0.0),
        ],
    },
];

impl ThrustCurve {
    pub fn lookup(designation: &str) -> Result<&'static ThrustCurve, MotorError> {
        CATALOG
            .iter()
            .find(|c| c.designation.eq_ignore_ascii_case(designation))
            .ok_or_else(|| MotorError::UnknownDesignation(designation.to_owned()))
    }

    pub fn designations() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|c| c.designation)
    }

    pub fn casing_mass(&self) -> f64 {
        self.total_mass - self.propellant_mass
    }

    pub fn burn_time(&self) -> f64 {
        self.samples.last().map_or(0.0, |&(t, _)| t)
    }

    pub fn thrust_at(&self, t: f64) -> f64 {
        //! linear interpolation between samples. Zero before ignition and from burnout onwards.
        if !(t > 0.0 && t < self.burn_time()) {
            return 0.0;
        }
        self.samples
            .windows(2)
            .find_map(|w| match *w {
                [(t0, f0), (t1, f1)] if t <= t1 => Some(lerp(t0, f0, t1, f1, t)),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    pub fn impulse_until(&self, t: f64) -> f64 {
        //! impulse delivered over [0, t], trapezoidal over the samples (exact for the interpolated curve).
        let mut impulse = 0.0;
        for w in self.samples.windows(2) {
            let [(t0, f0), (t1, f1)] = *w else { continue };
            if t <= t0 {
                break;
            }
            let end = t.min(t1);
            let f_end = lerp(t0, f0, t1, f1, end);
            impulse += 0.5 * (f0 + f_end) * (end - t0);
        }
        impulse
    }

    pub fn total_impulse(&self) -> f64 {
        self.impulse_until(self.burn_time())
    }

    pub fn mass_at(&self, t: f64) -> f64 {
        //! casing plus unburnt propellant. Never below the casing mass.
        let total = self.total_impulse();
        let burnt_fraction = if total > 0.0 {
            (self.impulse_until(t) / total).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.casing_mass() + self.propellant_mass * (1.0 - burnt_fraction)
    }

    pub fn shape(&self) -> Shape {
        Shape::Cylinder {
            radius: self.diameter / 2.0,
            height: self.length,
        }
    }
}

fn lerp(t0: f64, f0: f64, t1: f64, f1: f64, t: f64) -> f64 {
    if t1 <= t0 {
        return f1;
    }
    f0 + (f1 - f0) * (t - t0) / (t1 - t0)
}

/// Tracks how far through its burn a motor is.
///
/// Copies of a manager are independent clocks over the same static curve, so the design's motor
/// element and the thrust vector controller can each hold one and stay in step by being advanced
/// with the same `dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorManager {
    curve: &'static ThrustCurve,
    elapsed: f64,
}

impl MotorManager {
    pub fn new(designation: &str) -> Result<Self, MotorError> {
        let curve = ThrustCurve::lookup(designation)?;
        debug!(
            designation = curve.designation,
            burn_time = curve.burn_time(),
            total_impulse = curve.total_impulse(),
            "loaded thrust curve"
        );
        Ok(Self {
            curve,
            elapsed: 0.0,
        })
    }

    pub fn curve(&self) -> &'static ThrustCurve {
        self.curve
    }

    pub fn designation(&self) -> &'static str {
        self.curve.designation
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn advance(&mut self, dt: f64) {
        //! moves the burn clock forward. Negative steps are ignored, the clock only runs forwards.
        if dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn is_burnt_out(&self) -> bool {
        self.elapsed >= self.curve.burn_time()
    }

    pub fn thrust(&self) -> f64 {
        self.curve.thrust_at(self.elapsed)
    }

    pub fn thrust_at(&self, t: f64) -> f64 {
        self.curve.thrust_at(t)
    }

    pub fn mass(&self) -> f64 {
        self.curve.mass_at(self.elapsed)
    }

    pub fn inertia(&self) -> InertiaTensor {
        self.curve.shape().inertia(self.mass())
    }

    /// configuration fragment describing this motor as an ordinary dynamic element.
    pub fn get_element_data(&self) -> VehicleConfig {
        let mut fragment = VehicleConfig::new();
        fragment.insert(
            MOTOR_ELEMENT_NAME,
            ElementConfig {
                shape: self.curve.shape(),
                mass: self.mass(),
                is_static: false,
                motor: Some(self.curve.designation.to_owned()),
            },
        );
        fragment
    }
}
