//! Error types for sensor reads, device discovery and fan actuation.
//!
//! Hardware-facing modules return [`FanError`] so callers can tell a
//! recoverable read failure from a fatal topology problem. Lifecycle code
//! wraps these in `anyhow` with context.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Domain error for the fan control path.
#[derive(Error, Debug)]
pub enum FanError {
    /// Temperature input unreadable or not a single decimal integer.
    #[error("Failed to read temperature from {path}: {reason}")]
    SensorRead { path: PathBuf, reason: String },

    /// Averaging was asked for with no temperature sources.
    #[error("No temperature sources available")]
    EmptySourceSet,

    /// Discovery found no device whose name starts with the controller marker.
    #[error("No fan controller found (no hwmon device named '{marker}*')")]
    ControllerNotFound { marker: String },

    /// Writing a duty cycle to a fan channel failed.
    #[error("Failed to write duty cycle to {path}: {source}")]
    ActuatorWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The hwmon class directory itself could not be listed.
    #[error("Failed to enumerate hwmon devices in {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for fan control operations.
pub type Result<T> = std::result::Result<T, FanError>;
