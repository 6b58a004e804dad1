//! Save and load results.log.json for a tracked run.

use std::path::Path;

use chrono::Utc;
use tracing::instrument;

use crate::types::RunLog;

/// Default filename for the result log under a run directory.
pub const RUN_LOG_FILENAME: &str = "results.log.json";

/// Loads a result log from `path`. Returns error if file is missing or invalid JSON.
#[instrument(level = "trace", skip(path))]
pub fn load_run_log(path: &Path) -> Result<RunLog, std::io::Error> {
  let bytes = std::fs::read(path)?;
  serde_json::from_slice(&bytes)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Writes an in-progress log (`finished_at: None`), e.g. after each accumulated result.
/// Creates parent directory if needed.
#[instrument(level = "trace", skip(path, log))]
pub fn write_run_log_partial(path: &Path, log: &RunLog) -> Result<(), std::io::Error> {
  write(path, &RunLog {
    finished_at: None,
    ..log.clone()
  })
}

/// Writes the final log with `finished_at` stamped now.
#[instrument(level = "trace", skip(path, log))]
pub fn write_run_log_final(path: &Path, log: &RunLog) -> Result<(), std::io::Error> {
  write(path, &RunLog {
    finished_at: Some(Utc::now().to_rfc3339()),
    ..log.clone()
  })
}

fn write(path: &Path, log: &RunLog) -> Result<(), std::io::Error> {
  let json = serde_json::to_string_pretty(log)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)
}
