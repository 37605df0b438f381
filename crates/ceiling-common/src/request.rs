//! Request types and input validation.

use serde::Deserialize;

use crate::coverage::CoverageArea;
use crate::error::CeilingError;
use crate::units::AltitudeUnit;

/// Raw form fields as submitted, before validation.
///
/// Field values are kept as strings so the renderer can echo them back
/// exactly as the user typed them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CeilingForm {
    #[serde(default)]
    pub da: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A validated ceiling request. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingRequest {
    /// Density-altitude threshold, in feet.
    pub density_altitude_ft: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub unit: AltitudeUnit,
}

impl CeilingForm {
    /// Validate the submitted fields against the coverage footprint.
    ///
    /// Pure parse/bounds-check, no I/O. Out-of-coverage points are
    /// rejected here so no subprocess is ever spawned for them.
    pub fn validate(&self, coverage: &CoverageArea) -> Result<CeilingRequest, CeilingError> {
        let density_altitude_ft = parse_finite("da", &self.da)?;
        let latitude = parse_finite("lat", &self.lat)?;
        let longitude = parse_finite("lon", &self.lon)?;

        if !coverage.contains_point(latitude, longitude) {
            return Err(CeilingError::CoverageOutOfRange {
                lat: latitude,
                lon: longitude,
            });
        }

        let unit = match self.unit.as_deref() {
            None | Some("") => AltitudeUnit::default(),
            Some(s) => s.parse().map_err(|_| CeilingError::InvalidParameter {
                param: "unit".to_string(),
                message: format!("'{}' is not one of ft, m, km", s),
            })?,
        };

        Ok(CeilingRequest {
            density_altitude_ft,
            latitude,
            longitude,
            unit,
        })
    }
}

fn parse_finite(param: &str, value: &str) -> Result<f64, CeilingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CeilingError::MissingParameter(param.to_string()));
    }

    let parsed: f64 = trimmed.parse().map_err(|_| CeilingError::InvalidParameter {
        param: param.to_string(),
        message: format!("'{}' is not a number", value),
    })?;

    if !parsed.is_finite() {
        return Err(CeilingError::InvalidParameter {
            param: param.to_string(),
            message: format!("'{}' is not a finite number", value),
        });
    }

    Ok(parsed)
}

/// Values used to pre-populate the form on first display.
///
/// These are display defaults only; they are never substituted for
/// invalid or missing submitted input.
#[derive(Debug, Clone)]
pub struct FormDefaults {
    pub da: String,
    pub lat: String,
    pub lon: String,
    pub unit: AltitudeUnit,
}

impl Default for FormDefaults {
    fn default() -> Self {
        // Morey Airport, Middleton WI; 14000 ft is the approximate
        // service ceiling of a fully loaded C172E.
        Self {
            da: "14000".to_string(),
            lat: "43.113381".to_string(),
            lon: "-89.528386".to_string(),
            unit: AltitudeUnit::Feet,
        }
    }
}
