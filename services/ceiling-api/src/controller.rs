//! Request controller: sequences validation, dataset refresh, and the
//! engine invocation for one submission.
//!
//! Each request moves Validating -> Refreshing -> Computing and then
//! renders; an error at any stage short-circuits to the error rendering
//! for that request only. Nothing here is retried and nothing is
//! process-fatal.

use tracing::debug;

use ceiling_common::{CeilingError, CeilingForm};
use ceiling_engine::CalculationResult;

use crate::state::AppState;

/// Pipeline stage at which a request failed, for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Refreshing,
    Computing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Refreshing => "refreshing",
            Stage::Computing => "computing",
        }
    }
}

/// Run the pipeline for one submitted form.
///
/// Validation runs first and is never skipped; no subprocess is spawned
/// for input that fails it.
pub async fn handle_submission(
    state: &AppState,
    form: &CeilingForm,
) -> Result<CalculationResult, (Stage, CeilingError)> {
    let request = form
        .validate(&state.coverage)
        .map_err(|e| (Stage::Validating, e))?;
    debug!(
        da = request.density_altitude_ft,
        lat = request.latitude,
        lon = request.longitude,
        unit = %request.unit,
        "Request validated"
    );

    let dataset = state
        .cache
        .obtain_current()
        .await
        .map_err(|e| (Stage::Refreshing, e.into()))?;

    let result = state
        .engine
        .compute(&request, &dataset)
        .await
        .map_err(|e| (Stage::Computing, e.into()))?;

    Ok(result)
}
