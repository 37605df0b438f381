//! Altitude units accepted by the form and passed to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output unit for the computed MSL altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeUnit {
    #[default]
    Feet,
    Meters,
    Kilometers,
}

impl AltitudeUnit {
    /// The form value and display label for this unit.
    pub fn label(&self) -> &'static str {
        match self {
            AltitudeUnit::Feet => "ft",
            AltitudeUnit::Meters => "m",
            AltitudeUnit::Kilometers => "km",
        }
    }

    /// The engine flag selecting this unit, if any.
    ///
    /// Feet is the engine's default and takes no flag.
    pub fn engine_flag(&self) -> Option<&'static str> {
        match self {
            AltitudeUnit::Feet => None,
            AltitudeUnit::Meters => Some("--meters"),
            AltitudeUnit::Kilometers => Some("--kilometers"),
        }
    }
}

impl FromStr for AltitudeUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ft" => Ok(AltitudeUnit::Feet),
            "m" => Ok(AltitudeUnit::Meters),
            "km" => Ok(AltitudeUnit::Kilometers),
            _ => Err(UnitParseError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for AltitudeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnitParseError {
    #[error("Unsupported unit: {0}. Expected 'ft', 'm', or 'km'")]
    Unsupported(String),
}
