//! Common types shared across the ceiling-calc services.

pub mod coverage;
pub mod error;
pub mod request;
pub mod units;

pub use coverage::CoverageArea;
pub use error::{CeilingError, CeilingResult};
pub use request::{CeilingForm, CeilingRequest, FormDefaults};
pub use units::AltitudeUnit;
