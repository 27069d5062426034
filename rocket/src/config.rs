//! Scenario files: everything needed to assemble a flight, as JSON.
//!
//! ```json
//! {
//!     "simulation": { "t_final": 4.0, "dt": 0.01, "gravity": 9.8 },
//!     "motor": { "designation": "F15", "offset": [0.0, 0.0, -0.4] },
//!     "elements": {
//!         "nose_cone": { "type": "cone", "radius": 0.074, "height": 0.2, "mass": 0.08 }
//!     },
//!     "placements": { "nose_cone": [0.0, 0.0, 0.4] }
//! }
//! ```
use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Deserialize;
use tracing::debug;
use tvc_physics::{
    BuildError, Builder, DesignError, ElementConfig, KinematicData, MotorError, MotorManager,
    Shape, VehicleConfig, MOTOR_ELEMENT_NAME,
};
use tvc_utils::Vec3D;

use crate::simulation::{GimbalMount, SimulationContext, SimulationSettings};
use crate::tvc::{HoldZero, ThrustVectorController, TvcError};

/// which motor flies, and where its gimbal sits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotorSection {
    /// catalogue name, e.g. `"F15"`.
    pub designation: String,
    /// pivot of the gimbal, body frame.
    pub offset: [f64; 3],
}

/// gimbal limits in degrees; converted to radians on assembly.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TvcSection {
    /// mechanical limit on each axis.
    pub max_deflection_deg: f64,
    /// servo slew rate, degrees per second.
    pub max_rate_deg: f64,
}

impl Default for TvcSection {
    fn default() -> Self {
        Self {
            max_deflection_deg: 5.0,
            max_rate_deg: 30.0,
        }
    }
}

/// launch conditions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct InitialSection {
    /// body rates at launch, rad/s.
    pub omega: [f64; 3],
}

/// output thinning for the CSV printer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrintSection {
    /// print every n-th sample.
    pub interval: usize,
}

impl Default for PrintSection {
    fn default() -> Self {
        Self { interval: 1 }
    }
}

/// A whole scenario file. Only `simulation` and `motor` are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// loop timing and gravity.
    pub simulation: SimulationSettings,
    /// the motor and its gimbal pivot.
    pub motor: MotorSection,
    /// gimbal limits.
    #[serde(default)]
    pub tvc: TvcSection,
    /// launch rates.
    #[serde(default)]
    pub initial: InitialSection,
    /// CSV thinning.
    #[serde(default)]
    pub print: PrintSection,
    /// airframe elements; the motor element is added from `motor`.
    #[serde(default)]
    pub elements: VehicleConfig,
    /// body-frame offsets by element name. Unlisted elements sit at the origin.
    #[serde(default)]
    pub placements: BTreeMap<String, [f64; 3]>,
}

/// Anything that stops a scenario from turning into a runnable context.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// an element entry was rejected.
    Build(BuildError),
    /// a placement could not be applied.
    Design(DesignError),
    /// the motor designation is not in the catalogue.
    Motor(MotorError),
    /// gimbal limits out of range.
    Tvc(TvcError),
    /// a placement names an element the scenario does not define.
    UnknownPlacement(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(e) => write!(f, "{e}"),
            Self::Design(e) => write!(f, "{e}"),
            Self::Motor(e) => write!(f, "{e}"),
            Self::Tvc(e) => write!(f, "{e}"),
            Self::UnknownPlacement(name) => {
                write!(f, "placement given for unknown element {name:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Build(e) => Some(e),
            Self::Design(e) => Some(e),
            Self::Motor(e) => Some(e),
            Self::Tvc(e) => Some(e),
            Self::UnknownPlacement(_) => None,
        }
    }
}

impl From<BuildError> for ConfigError {
    fn from(value: BuildError) -> Self {
        Self::Build(value)
    }
}

impl From<DesignError> for ConfigError {
    fn from(value: DesignError) -> Self {
        Self::Design(value)
    }
}

impl From<MotorError> for ConfigError {
    fn from(value: MotorError) -> Self {
        Self::Motor(value)
    }
}

impl From<TvcError> for ConfigError {
    fn from(value: TvcError) -> Self {
        Self::Tvc(value)
    }
}

impl ScenarioConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        //! parses a scenario; defaults fill the optional sections.
        serde_json::from_str(text)
    }

    /// The built-in vehicle: an F15 under a 0.8 m tube with a nose cone and flight computer.
    pub fn demo() -> Self {
        let elements: VehicleConfig = [
            (
                "body_tube",
                ElementConfig::fixed(
                    Shape::Tube {
                        inner_radius: 0.072,
                        outer_radius: 0.074,
                        height: 0.8,
                    },
                    0.42,
                ),
            ),
            (
                "nose_cone",
                ElementConfig::fixed(
                    Shape::Cone {
                        radius: 0.074,
                        height: 0.2,
                    },
                    0.08,
                ),
            ),
            (
                "flight_computer",
                ElementConfig::fixed(
                    Shape::Cylinder {
                        radius: 0.072,
                        height: 0.12,
                    },
                    0.18,
                ),
            ),
        ]
        .into_iter()
        .collect();

        let placements = [
            ("nose_cone".to_owned(), [0.0, 0.0, 0.4]),
            ("flight_computer".to_owned(), [0.0, 0.0, 0.15]),
        ]
        .into_iter()
        .collect();

        Self {
            simulation: SimulationSettings {
                t_final: 4.0,
                dt: 0.01,
                gravity: 9.8,
            },
            motor: MotorSection {
                designation: "F15".to_owned(),
                offset: [0.0, 0.0, -0.4],
            },
            tvc: TvcSection::default(),
            initial: InitialSection::default(),
            print: PrintSection::default(),
            elements,
            placements,
        }
    }

    /// Builds the design, places its elements, mounts the gimbal on the motor and consolidates.
    pub fn assemble(&self) -> Result<SimulationContext, ConfigError> {
        let motor = MotorManager::new(&self.motor.designation)?;
        let mut vehicle = self.elements.clone();
        vehicle.update(motor.get_element_data());

        let (mut design, parts) = Builder::new(vehicle).generate_design()?;

        for (name, offset) in &self.placements {
            let id = parts
                .get(name)
                .ok_or_else(|| ConfigError::UnknownPlacement(name.clone()))?;
            design.manipulate_element(*id, Vec3D::from(*offset))?;
        }
        let motor_id = parts
            .get(MOTOR_ELEMENT_NAME)
            .copied()
            .ok_or_else(|| ConfigError::UnknownPlacement(MOTOR_ELEMENT_NAME.to_owned()))?;
        let pivot = Vec3D::from(self.motor.offset);
        design.manipulate_element(motor_id, pivot)?;

        design.replace_state(KinematicData {
            angular_velocity: Vec3D::from(self.initial.omega),
            ..KinematicData::default()
        });
        design.consolidate_static_elements();

        let mut controller = ThrustVectorController::new(
            motor,
            self.tvc.max_deflection_deg.to_radians(),
            self.tvc.max_rate_deg.to_radians(),
        )?;
        controller.move_to_motor(pivot);

        let properties = design.get_temporary_properties();
        debug!(
            mass = properties.mass,
            cg = ?properties.cg,
            motor = motor.designation(),
            "vehicle assembled"
        );

        Ok(SimulationContext {
            design,
            tvc: Some(GimbalMount {
                controller,
                motor: motor_id,
            }),
            guidance: Box::new(HoldZero),
            settings: self.simulation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "simulation": { "t_final": 1.0, "dt": 0.02, "gravity": 9.81 },
        "motor": { "designation": "E12", "offset": [0.0, 0.0, -0.3] },
        "tvc": { "max_deflection_deg": 8.0 },
        "initial": { "omega": [0.0, 0.0, 0.5] },
        "elements": {
            "body_tube": {
                "type": "tube",
                "inner_radius": 0.03,
                "outer_radius": 0.032,
                "height": 0.6,
                "mass": 0.2
            },
            "payload": { "type": "cylinder", "radius": 0.03, "height": 0.1, "mass": 0.1 }
        },
        "placements": { "payload": [0.0, 0.0, 0.2] }
    }"#;

    #[test]
    fn parses_scenario_file() {
        let config = ScenarioConfig::from_json_str(SCENARIO).unwrap();
        assert_eq!(config.simulation.dt, 0.02);
        assert_eq!(config.motor.designation, "E12");
        assert_eq!(config.tvc.max_deflection_deg, 8.0);
        // unspecified fields fall back to defaults.
        assert_eq!(config.tvc.max_rate_deg, 30.0);
        assert_eq!(config.print.interval, 1);
        assert_eq!(config.elements.len(), 2);
    }

    #[test]
    fn assembles_scenario_file() {
        let ctx = ScenarioConfig::from_json_str(SCENARIO)
            .unwrap()
            .assemble()
            .unwrap();
        assert_eq!(ctx.design.elements().count(), 3);
        assert_eq!(ctx.design.state().angular_velocity, Vec3D(0.0, 0.0, 0.5));
        let mount = ctx.tvc.as_ref().unwrap();
        assert_eq!(mount.controller.offset(), Vec3D(0.0, 0.0, -0.3));
        let motor = ctx.design.element(mount.motor).unwrap();
        assert_eq!(motor.offset_position(), Vec3D(0.0, 0.0, -0.3));
    }

    #[test]
    fn demo_mass_and_layout() {
        let ctx = ScenarioConfig::demo().assemble().unwrap();
        let properties = ctx.design.get_temporary_properties();
        let expected_mass = 0.42 + 0.08 + 0.18 + 0.1016;
        assert!(
            (properties.mass - expected_mass).abs() < 1e-9,
            "mass {}",
            properties.mass
        );
        // nose and avionics above, motor below: cg sits slightly above the tube centre.
        let expected_cg = (0.08 * 0.4 + 0.18 * 0.15 - 0.1016 * 0.4) / expected_mass;
        assert!((properties.cg.2 - expected_cg).abs() < 1e-9, "cg {:?}", properties.cg);
        assert!(ctx.design.is_consolidated());
    }

    #[test]
    fn unknown_placement_rejected() {
        let mut config = ScenarioConfig::demo();
        config.placements.insert("fins".to_owned(), [0.0, 0.0, -0.3]);
        assert!(matches!(
            config.assemble(),
            Err(ConfigError::UnknownPlacement(name)) if name == "fins"
        ));
    }

    #[test]
    fn unknown_motor_rejected() {
        let mut config = ScenarioConfig::demo();
        config.motor.designation = "Z99".to_owned();
        assert!(matches!(config.assemble(), Err(ConfigError::Motor(_))));
    }
}
