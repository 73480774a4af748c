//! Default path resolution for the store root and log directory.
//!
//! Paths are resolved here but always injected into components as explicit
//! handles; nothing in the engine reads these lazily at use time, which is
//! what lets tests and multi-root deployments point at their own
//! directories.

use std::path::PathBuf;

use crate::error::{BeaconError, Result};

/// Overrides the default store root when set.
pub const DATA_DIR_ENV: &str = "BEACON_DATA_DIR";

fn beacon_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".beacon"))
        .ok_or(BeaconError::HomeDirNotFound)
}

/// Directory holding one JSON file per session record.
pub fn data_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    Ok(beacon_dir()?.join("sessions"))
}

/// Directory for hook/watch log files.
pub fn log_dir() -> Result<PathBuf> {
    Ok(beacon_dir()?.join("logs"))
}
