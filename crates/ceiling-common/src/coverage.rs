//! Coverage footprint of the weather model grid.

use serde::{Deserialize, Serialize};

/// Geographic footprint within which the weather model has data.
///
/// Coordinates are in degrees. The engine interpolates from the model's
/// projected grid and cannot answer for points outside this box, so the
/// validator rejects them before any subprocess is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageArea {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl CoverageArea {
    /// Create a coverage area from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The RAP 130 grid footprint: CONUS plus an adjoining buffer.
    ///
    /// These are the lat/lon extremes of the Lambert conformal CONUS grid,
    /// so points near the corners of this box may still fall slightly
    /// outside the projected grid; the engine reports those as failures.
    pub fn conus() -> Self {
        Self::new(-139.86, 16.28, -57.38, 58.37)
    }

    /// Check if a point is contained within this footprint.
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

impl Default for CoverageArea {
    fn default() -> Self {
        Self::conus()
    }
}
