//! Effective service ceiling calculator service.
//!
//! Accepts a density-altitude threshold and a point, obtains a current
//! cached weather-model file via the external refresher, and invokes the
//! external calculation engine to find the MSL altitude at which that
//! density altitude is reached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ceiling_api::handlers::start_server;
use ceiling_api::state::AppState;
use ceiling_engine::EngineConfig;
use dataset_cache::RefresherConfig;

#[derive(Parser, Debug)]
#[command(name = "ceiling-api")]
#[command(about = "Effective service ceiling calculator web service")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Path to the dataset refresher executable
    #[arg(long, env = "REFRESHER_BIN", default_value = "update-rap")]
    refresher: PathBuf,

    /// Path to the calculation engine executable
    #[arg(long, env = "ENGINE_BIN", default_value = "rdacalc")]
    engine: PathBuf,

    /// Maximum age of the cached dataset before a refresh, in seconds
    #[arg(long, env = "FRESHNESS_SECS", default_value = "3600")]
    freshness_secs: u64,

    /// Time budget for one refresher invocation, in seconds
    #[arg(long, env = "REFRESH_TIMEOUT_SECS", default_value = "300")]
    refresh_timeout_secs: u64,

    /// Time budget for one engine invocation, in seconds
    #[arg(long, env = "ENGINE_TIMEOUT_SECS", default_value = "60")]
    engine_timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        refresher = %args.refresher.display(),
        engine = %args.engine.display(),
        freshness_secs = args.freshness_secs,
        "Starting effective service ceiling calculator"
    );

    let state = Arc::new(AppState::new(
        RefresherConfig {
            program: args.refresher,
            freshness_window: Duration::from_secs(args.freshness_secs),
            timeout: Duration::from_secs(args.refresh_timeout_secs),
        },
        EngineConfig {
            program: args.engine,
            timeout: Duration::from_secs(args.engine_timeout_secs),
        },
    ));

    start_server(state, args.port).await
}
