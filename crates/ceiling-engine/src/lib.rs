//! Invoker for the external altitude-calculation engine.
//!
//! The engine reads the cached GRIB file, interpolates current conditions
//! at the requested point, and prints the MSL altitude at which density
//! altitude reaches the requested threshold. This crate owns the call
//! contract: argument construction, time budget, and output parsing.
//!
//! Every caller-supplied value is handed to the subprocess as one discrete
//! argv token via `Command::arg`. There is no shell in the call path, so a
//! value containing metacharacters cannot change the argument count or be
//! reinterpreted as a flag or command.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use ceiling_common::{AltitudeUnit, CeilingError, CeilingRequest};
use dataset_cache::DatasetHandle;

/// The computed effective-service-ceiling altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationResult {
    pub altitude: f64,
    pub unit: AltitudeUnit,
}

/// Configuration for the engine subprocess.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub program: PathBuf,
    /// Time budget for one calculation (disk I/O plus interpolation).
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("rdacalc"),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Errors from one engine invocation. Never retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to spawn engine: {0}")]
    Spawn(std::io::Error),

    #[error("Engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Engine exceeded its time budget")]
    Timeout,

    #[error("Engine produced unparseable output: {0:?}")]
    Unparseable(String),
}

impl From<EngineError> for CeilingError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Timeout => CeilingError::EngineTimeout,
            EngineError::Unparseable(out) => CeilingError::UnparseableOutput(out),
            other => CeilingError::EngineFailure(other.to_string()),
        }
    }
}

/// Runs the external calculation engine.
pub struct EngineInvoker {
    config: EngineConfig,
}

impl EngineInvoker {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Compute the ceiling altitude for a validated request.
    pub async fn compute(
        &self,
        request: &CeilingRequest,
        dataset: &DatasetHandle,
    ) -> Result<CalculationResult, EngineError> {
        let args = build_args(request, dataset);
        debug!(program = %self.config.program.display(), ?args, "Invoking calculation engine");

        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let output = match timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(EngineError::Spawn)?,
            Err(_) => return Err(EngineError::Timeout),
        };

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let altitude = parse_altitude(&stdout)?;

        info!(
            altitude = altitude,
            unit = %request.unit,
            lat = request.latitude,
            lon = request.longitude,
            "Calculation complete"
        );

        Ok(CalculationResult {
            altitude,
            unit: request.unit,
        })
    }
}

/// Build the engine argument vector.
///
/// `<dataset-path> <da> <lat> <lon> [unit-flag]`, each value one token.
fn build_args(request: &CeilingRequest, dataset: &DatasetHandle) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        dataset.path.as_os_str().to_os_string(),
        request.density_altitude_ft.to_string().into(),
        request.latitude.to_string().into(),
        request.longitude.to_string().into(),
    ];
    if let Some(flag) = request.unit.engine_flag() {
        args.push(flag.into());
    }
    args
}

/// Parse the engine's stdout into an altitude.
///
/// The engine prints the altitude as plain text on its last line; any
/// diagnostic lines before it are ignored.
fn parse_altitude(stdout: &str) -> Result<f64, EngineError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| EngineError::Unparseable(String::new()))?;

    line.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EngineError::Unparseable(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn request(unit: AltitudeUnit) -> CeilingRequest {
        CeilingRequest {
            density_altitude_ft: 14000.0,
            latitude: 43.113381,
            longitude: -89.528386,
            unit,
        }
    }

    fn dataset(dir: &Path) -> DatasetHandle {
        let path = dir.join("rap.grib2");
        fs::write(&path, "grib").unwrap();
        DatasetHandle {
            path,
            retrieved_at: Utc::now(),
        }
    }

    fn invoker(program: PathBuf, timeout: Duration) -> EngineInvoker {
        EngineInvoker::new(EngineConfig { program, timeout })
    }

    #[test]
    fn test_arg_order_and_unit_flags() {
        let dir = TempDir::new().unwrap();
        let ds = dataset(dir.path());

        let args = build_args(&request(AltitudeUnit::Feet), &ds);
        assert_eq!(args.len(), 4);
        assert_eq!(args[0], ds.path.clone().into_os_string());
        assert_eq!(args[1], "14000");
        assert_eq!(args[2], "43.113381");
        assert_eq!(args[3], "-89.528386");

        let args = build_args(&request(AltitudeUnit::Meters), &ds);
        assert_eq!(args.len(), 5);
        assert_eq!(args[4], "--meters");

        let args = build_args(&request(AltitudeUnit::Kilometers), &ds);
        assert_eq!(args.len(), 5);
        assert_eq!(args[4], "--kilometers");
    }

    #[tokio::test]
    async fn test_successful_calculation() {
        let dir = TempDir::new().unwrap();
        let program = write_script(dir.path(), "engine.sh", "#!/bin/sh\necho 11230.5\n");
        let invoker = invoker(program, Duration::from_secs(5));

        let result = invoker
            .compute(&request(AltitudeUnit::Feet), &dataset(dir.path()))
            .await
            .unwrap();
        assert_eq!(result.altitude, 11230.5);
        assert_eq!(result.unit, AltitudeUnit::Feet);
    }

    #[tokio::test]
    async fn test_metacharacters_stay_one_token() {
        let dir = TempDir::new().unwrap();
        // Prints its own argc; a value split by a shell would change it
        let program = write_script(dir.path(), "engine.sh", "#!/bin/sh\necho $#\n");
        let invoker = invoker(program, Duration::from_secs(5));
        let ds = dataset(dir.path());

        // Construction of a CeilingRequest with hostile values is only
        // reachable in tests (the validator rejects non-numeric input),
        // but the invoker must hold the token boundary on its own.
        let args = build_args(
            &CeilingRequest {
                density_altitude_ft: 14000.0,
                latitude: 43.1,
                longitude: -89.5,
                unit: AltitudeUnit::Feet,
            },
            &DatasetHandle {
                path: PathBuf::from("rap; rm -rf / `whoami`.grib2"),
                retrieved_at: Utc::now(),
            },
        );
        assert_eq!(args.len(), 4);
        assert_eq!(args[0], "rap; rm -rf / `whoami`.grib2");

        // End to end: the stub sees exactly four arguments
        let result = invoker
            .compute(&request(AltitudeUnit::Feet), &ds)
            .await
            .unwrap();
        assert_eq!(result.altitude, 4.0);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_engine_failure() {
        let dir = TempDir::new().unwrap();
        let program = write_script(
            dir.path(),
            "engine.sh",
            "#!/bin/sh\necho 'point off grid' >&2\nexit 2\n",
        );
        let invoker = invoker(program, Duration::from_secs(5));

        let err = invoker
            .compute(&request(AltitudeUnit::Feet), &dataset(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let program = write_script(dir.path(), "engine.sh", "#!/bin/sh\nsleep 30\n");
        let invoker = invoker(program, Duration::from_millis(100));

        let err = invoker
            .compute(&request(AltitudeUnit::Feet), &dataset(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Timeout));
    }

    #[tokio::test]
    async fn test_empty_and_garbage_output() {
        let dir = TempDir::new().unwrap();
        let empty = write_script(dir.path(), "empty.sh", "#!/bin/sh\nexit 0\n");
        let err = invoker(empty, Duration::from_secs(5))
            .compute(&request(AltitudeUnit::Feet), &dataset(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unparseable(_)));

        let garbage = write_script(dir.path(), "garbage.sh", "#!/bin/sh\necho 'no data'\n");
        let err = invoker(garbage, Duration::from_secs(5))
            .compute(&request(AltitudeUnit::Feet), &dataset(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unparseable(_)));
    }

    #[test]
    fn test_parse_altitude_skips_diagnostics() {
        let out = "reading grib file\nlevels: 37\n11230.5\n\n";
        assert_eq!(parse_altitude(out).unwrap(), 11230.5);
    }

    #[test]
    fn test_parse_altitude_rejects_nan() {
        assert!(parse_altitude("NaN\n").is_err());
        assert!(parse_altitude("inf\n").is_err());
    }
}
