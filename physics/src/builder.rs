//! Turns a declarative vehicle description into a [`Design`].
//!
//! The description is an ordered mapping from element name to [`ElementConfig`]. Static entries
//! become fixed-mass elements; dynamic entries must name a motor, whose thrust curve then drives
//! the element's mass. The motor's own entry is normally produced by
//! [`MotorManager::get_element_data`](crate::motor::MotorManager::get_element_data).
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::design::{Design, ElementId};
use crate::element::Element;
use crate::error::BuildError;
use crate::motor::MotorManager;
use crate::shapes::Shape;

/// lookup from element name to its handle in the built design. Iterates by name; the ids
/// themselves follow configuration order.
pub type PartNumbers = BTreeMap<String, ElementId>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    #[serde(flatten)]
    pub shape: Shape,
    pub mass: f64,
    #[serde(default = "default_static")]
    pub is_static: bool,
    /// designation of the motor driving a dynamic element.
    #[serde(default)]
    pub motor: Option<String>,
}

fn default_static() -> bool {
    true
}

impl ElementConfig {
    pub fn fixed(shape: Shape, mass: f64) -> Self {
        Self {
            shape,
            mass,
            is_static: true,
            motor: None,
        }
    }
}

/// Ordered name -> element mapping. Inserting an existing name replaces that entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleConfig {
    entries: Vec<(String, ElementConfig)>,
}

impl VehicleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, config: ElementConfig) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = config,
            None => self.entries.push((name, config)),
        }
    }

    /// merges `other` into self, like a dictionary update.
    pub fn update(&mut self, other: VehicleConfig) {
        for (name, config) in other.entries {
            self.insert(name, config);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ElementConfig> {
        self.entries
            .iter()
            .find_map(|(n, c)| (n == name).then_some(c))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementConfig)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ElementConfig)> for VehicleConfig {
    fn from_iter<T: IntoIterator<Item = (S, ElementConfig)>>(iter: T) -> Self {
        let mut config = VehicleConfig::new();
        for (name, element) in iter {
            config.insert(name, element);
        }
        config
    }
}

/// Entries are taken in the order the format presents them; a repeated name replaces the earlier entry.
impl<'de> Deserialize<'de> for VehicleConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = VehicleConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of element name to element configuration")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut config = VehicleConfig::new();
                while let Some((name, element)) = map.next_entry::<String, ElementConfig>()? {
                    config.insert(name, element);
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

pub struct Builder {
    config: VehicleConfig,
}

impl Builder {
    pub fn new(config: VehicleConfig) -> Self {
        Self { config }
    }

    fn build_element(name: &str, config: &ElementConfig) -> Result<Element, BuildError> {
        match (config.is_static, &config.motor) {
            (true, None) => Element::new_static(name, config.shape, config.mass),
            (true, Some(_)) => Err(BuildError::UnexpectedMotor {
                element: name.to_owned(),
            }),
            (false, None) => Err(BuildError::MissingMotor {
                element: name.to_owned(),
            }),
            (false, Some(designation)) => {
                let motor = MotorManager::new(designation).map_err(|source| BuildError::Motor {
                    element: name.to_owned(),
                    source,
                })?;
                if (motor.mass() - config.mass).abs() > 1e-9 {
                    warn!(
                        element = name,
                        configured = config.mass,
                        motor = motor.mass(),
                        "dynamic element mass taken from its motor, not the configuration"
                    );
                }
                Element::new_dynamic(name, config.shape, motor)
            }
        }
    }

    /// Builds every element in configuration order. Any invalid entry aborts the whole build.
    pub fn generate_design(&self) -> Result<(Design, PartNumbers), BuildError> {
        let mut design = Design::new();
        let mut part_numbers = PartNumbers::new();
        for (name, config) in self.config.iter() {
            let element = Self::build_element(name, config)?;
            let id = design.add_element(element)?;
            part_numbers.insert(name.to_owned(), id);
        }
        debug!(elements = part_numbers.len(), "design generated");
        Ok((design, part_numbers))
    }
}
