//! HTTP handlers for the calculator service.
//!
//! - `GET /` - form pre-filled with display defaults
//! - `POST /` - run the pipeline for a submission
//! - `GET /health` - health check with dataset cache status

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Json},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use ceiling_common::CeilingForm;

use crate::controller::handle_submission;
use crate::render::{render_page, FormView, Outcome};
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub dataset: DatasetStatus,
}

/// Cache status reported by /health. Age only, never the file path.
#[derive(Debug, Serialize)]
pub struct DatasetStatus {
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<u64>,
}

/// GET / - first render with display defaults.
async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let view = FormView::from_defaults(&state.defaults);
    Html(render_page(&view, Outcome::Blank))
}

/// POST / - run the pipeline for one submission.
async fn submit_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<CeilingForm>,
) -> impl IntoResponse {
    let id = Uuid::new_v4().to_string();
    info!(id = %id, da = %form.da, lat = %form.lat, lon = %form.lon, "Received submission");

    let view = FormView::from_submission(&form);
    match handle_submission(&state, &form).await {
        Ok(result) => {
            info!(id = %id, altitude = result.altitude, unit = %result.unit, "Request complete");
            (StatusCode::OK, Html(render_page(&view, Outcome::Result(&result))))
        }
        Err((stage, err)) => {
            // Full detail stays in the log; the page gets the per-kind
            // user message only.
            error!(id = %id, stage = stage.as_str(), error = %err, "Request failed");
            let status = StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Html(render_page(&view, Outcome::Error(&err))))
        }
    }
}

/// GET /health - health check.
async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let handle = state.cache.current_handle().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "ceiling-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset: DatasetStatus {
            cached: handle.is_some(),
            age_secs: handle.map(|h| h.age().as_secs()),
        },
    })
}

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

/// Start the HTTP server.
pub async fn start_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting ceiling-api HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
