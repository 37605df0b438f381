//! Freshness-windowed cache over the external dataset refresher.
//!
//! The refresher is a separate program that downloads the latest weather
//! model GRIB file and prints its path on stdout. This crate decides when
//! to invoke it, verifies what it reports, and publishes the resulting
//! handle atomically so in-flight readers of the previous file are never
//! affected by a refresh.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use ceiling_common::CeilingError;

/// A cached weather-model dataset on local storage.
///
/// Immutable; a refresh produces a new handle rather than mutating an
/// existing one, so concurrent requests holding an `Arc` to the old
/// handle keep reading the old file.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    pub path: PathBuf,
    pub retrieved_at: DateTime<Utc>,
}

impl DatasetHandle {
    /// Age of this handle.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.retrieved_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Configuration for the refresher subprocess.
#[derive(Debug, Clone)]
pub struct RefresherConfig {
    /// Path to the refresher executable.
    pub program: PathBuf,
    /// Maximum age of a cached handle before a refresh is attempted.
    pub freshness_window: Duration,
    /// Time budget for one refresher invocation.
    pub timeout: Duration,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("update-rap"),
            // RAP/HRRR update hourly; there is nothing new to fetch sooner
            freshness_window: Duration::from_secs(3600),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Errors from obtaining a current dataset.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to spawn refresher: {0}")]
    Spawn(std::io::Error),

    #[error("Refresher exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Refresher exceeded its time budget")]
    Timeout,

    #[error("Refresher produced no output path")]
    EmptyOutput,

    #[error("Refresher reported a missing or empty file: {0}")]
    BadFile(PathBuf),
}

impl From<RefreshError> for CeilingError {
    fn from(err: RefreshError) -> Self {
        CeilingError::RefreshError(err.to_string())
    }
}

/// Cache of the most recently fetched dataset.
///
/// Shared across requests. Readers take the current handle without
/// blocking on a refresh in progress; at most one refresher subprocess
/// runs at a time.
pub struct DatasetCache {
    config: RefresherConfig,
    handle: RwLock<Option<Arc<DatasetHandle>>>,
    refresh_lock: Mutex<()>,
}

impl DatasetCache {
    pub fn new(config: RefresherConfig) -> Self {
        Self {
            config,
            handle: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Peek at the current handle without triggering a refresh.
    pub async fn current_handle(&self) -> Option<Arc<DatasetHandle>> {
        self.handle.read().await.clone()
    }

    /// Obtain a current dataset handle, refreshing if the cached one is
    /// stale or absent.
    ///
    /// If a refresh fails but a previous handle exists it is served stale
    /// rather than failing the request; `RefreshError` surfaces only when
    /// no usable handle exists at all.
    pub async fn obtain_current(&self) -> Result<Arc<DatasetHandle>, RefreshError> {
        if let Some(handle) = self.fresh_handle().await {
            return Ok(handle);
        }

        // Single-flight: one refresher subprocess at a time. Whoever
        // waited here may find a fresh handle published by the winner.
        let _guard = self.refresh_lock.lock().await;
        if let Some(handle) = self.fresh_handle().await {
            return Ok(handle);
        }

        match self.run_refresher().await {
            Ok(new_handle) => {
                let new_handle = Arc::new(new_handle);
                *self.handle.write().await = Some(new_handle.clone());
                info!(
                    path = %new_handle.path.display(),
                    "Published refreshed dataset"
                );
                Ok(new_handle)
            }
            Err(err) => {
                // Serve stale data over failing the request outright
                if let Some(stale) = self.current_handle().await {
                    warn!(
                        error = %err,
                        path = %stale.path.display(),
                        age_secs = stale.age().as_secs(),
                        "Dataset refresh failed, serving stale handle"
                    );
                    Ok(stale)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn fresh_handle(&self) -> Option<Arc<DatasetHandle>> {
        let handle = self.handle.read().await.clone()?;
        if handle.age() < self.config.freshness_window {
            debug!(
                path = %handle.path.display(),
                age_secs = handle.age().as_secs(),
                "Reusing cached dataset"
            );
            Some(handle)
        } else {
            None
        }
    }

    /// Invoke the refresher and validate what it reports.
    ///
    /// The invocation carries only a fixed verbosity flag; no request
    /// data ever reaches this argv.
    async fn run_refresher(&self) -> Result<DatasetHandle, RefreshError> {
        info!(program = %self.config.program.display(), "Invoking dataset refresher");

        let child = Command::new(&self.config.program)
            .arg("-v")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RefreshError::Spawn)?;

        let output = match timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(RefreshError::Spawn)?,
            Err(_) => return Err(RefreshError::Timeout),
        };

        if !output.status.success() {
            return Err(RefreshError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // The refresher prints the dataset path as its last line; tolerate
        // any progress lines before it.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(RefreshError::EmptyOutput)?;

        let path = PathBuf::from(reported);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(DatasetHandle {
                path,
                retrieved_at: Utc::now(),
            }),
            _ => Err(RefreshError::BadFile(path)),
        }
    }
}
