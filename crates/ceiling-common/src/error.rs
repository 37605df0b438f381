//! Error types for the ceiling-calc services.

use thiserror::Error;

/// Result type alias using CeilingError.
pub type CeilingResult<T> = Result<T, CeilingError>;

/// Primary error type for the request pipeline.
#[derive(Debug, Error)]
pub enum CeilingError {
    // === Input errors ===
    #[error("Missing required field: {0}")]
    MissingParameter(String),

    #[error("Invalid value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Point ({lat}, {lon}) is outside the supported coverage area")]
    CoverageOutOfRange { lat: f64, lon: f64 },

    // === Dataset errors ===
    #[error("Weather dataset could not be obtained: {0}")]
    RefreshError(String),

    // === Engine errors ===
    #[error("Calculation engine failed: {0}")]
    EngineFailure(String),

    #[error("Calculation timed out")]
    EngineTimeout,

    #[error("Calculation engine produced unparseable output: {0}")]
    UnparseableOutput(String),

    // === Infrastructure errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CeilingError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            CeilingError::MissingParameter(_)
            | CeilingError::InvalidParameter { .. }
            | CeilingError::CoverageOutOfRange { .. } => 400,

            CeilingError::RefreshError(_) => 503,
            CeilingError::EngineTimeout => 504,

            CeilingError::EngineFailure(_)
            | CeilingError::UnparseableOutput(_)
            | CeilingError::InternalError(_) => 500,
        }
    }

    /// User-facing message for this error.
    ///
    /// Detail fields (subprocess stderr, file paths, argv) are logged
    /// server-side only and never included here.
    pub fn user_message(&self) -> String {
        match self {
            CeilingError::MissingParameter(field) => {
                format!("The '{}' field is required.", field)
            }
            CeilingError::InvalidParameter { param, message } => {
                format!("Invalid value for '{}': {}.", param, message)
            }
            CeilingError::CoverageOutOfRange { .. } => {
                "That point is outside the weather model's coverage area \
                 (contiguous United States and nearby regions)."
                    .to_string()
            }
            CeilingError::RefreshError(_) => {
                "Current weather data is unavailable right now. Please try again later."
                    .to_string()
            }
            CeilingError::EngineFailure(_) => {
                "The altitude calculation failed. Please try again later.".to_string()
            }
            CeilingError::EngineTimeout => {
                "The altitude calculation took too long and was cancelled.".to_string()
            }
            CeilingError::UnparseableOutput(_) => {
                "The altitude calculation returned an unexpected result.".to_string()
            }
            CeilingError::InternalError(_) => {
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl From<std::io::Error> for CeilingError {
    fn from(err: std::io::Error) -> Self {
        CeilingError::InternalError(err.to_string())
    }
}
