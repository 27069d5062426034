//! Flight of a thrust-vector-controlled rocket: the gimbal controller, the fixed-step loop that
//! drives a [`tvc_physics::Design`] through the air, recorded history and scenario files.
pub mod config;
pub mod history;
pub mod simulation;
pub mod tvc;

pub use config::{ConfigError, ScenarioConfig};
pub use history::{CsvPlotter, FlightHistory, FlightSummary, HistoryPlotter, PrintType};
pub use simulation::{
    run, step, GimbalMount, Sample, SimulationContext, SimulationError, SimulationSettings,
};
pub use tvc::{GimbalAngles, GuidancePolicy, HoldZero, ThrustVectorController, TvcError};
