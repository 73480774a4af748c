//! Error types for beacon-core operations.
//!
//! Most failures in this system are recovered locally (skip the record,
//! retry next tick). The variants here cover the cases a caller must see:
//! an unusable store root, an unrecognized hook event, and genuine I/O or
//! serialization failures on write paths.

use std::path::PathBuf;

/// All errors that can occur in beacon-core operations.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Store root unavailable: {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// An event name outside the known hook vocabulary. This indicates a
    /// protocol/version mismatch rather than a normal race, so it is
    /// surfaced to the caller instead of being silently dropped.
    #[error("Unrecognized hook event: {0}")]
    UnknownEvent(String),
}

/// Convenience type alias for Results using BeaconError.
pub type Result<T> = std::result::Result<T, BeaconError>;
