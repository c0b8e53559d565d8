//! Error types for packet streaming.
//!
//! All fallible operations in the crate return [`TelemetryError`]. Errors carry
//! structured context so callers can decide whether to retry (for example,
//! reconnect a serial device) or give up.
//!
//! ## Error Categories
//!
//! - **Setup Errors**: unsupported packet types, invalid configuration
//! - **Source Errors**: device or capture-file I/O failures
//! - **Decode Errors**: payloads that do not match their field layout
//! - **Delivery Errors**: the consumer side of a stream went away
//!
//! Checksum failures are *not* errors. They are reported in-band as
//! [`SyncLoss`](crate::SyncLoss) events and the stream keeps going.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use imulink::TelemetryError;
//!
//! let error = TelemetryError::source_failed("serial port disconnected");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```
//!
//! ## Helper Constructors
//!
//! ```rust
//! use imulink::TelemetryError;
//! use std::path::PathBuf;
//!
//! let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
//! let file_error = TelemetryError::file_error(PathBuf::from("/logs/ins381.bin"), io_err);
//!
//! let config_error = TelemetryError::config("reset_command is not valid hex");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Unsupported packet type '{tag}'")]
    UnsupportedPacketType { tag: String },

    #[error("Byte source failed: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Field '{field}' at offset {offset} does not fit a {payload_len}-byte payload")]
    PayloadBounds { field: &'static str, offset: usize, payload_len: usize },

    #[error("Type conversion error: {details}")]
    TypeConversion { details: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Stream consumer dropped")]
    ChannelClosed,

    #[error("Stream task failed: {reason}")]
    Task { reason: String },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Source { .. } => true,
            TelemetryError::Io(_) => true,
            TelemetryError::File { .. } => false,
            TelemetryError::UnsupportedPacketType { .. } => false,
            TelemetryError::PayloadBounds { .. } => false,
            TelemetryError::TypeConversion { .. } => false,
            TelemetryError::Config { .. } => false,
            TelemetryError::ChannelClosed => false,
            TelemetryError::Task { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::UnsupportedPacketType { .. } => vec![
                "Check the packet type tag spelling (tags are case sensitive)",
                "Use one of the catalog tags, e.g. A2, S1, z1 or nav",
            ],
            TelemetryError::Source { .. } | TelemetryError::Io(_) => vec![
                "Check the device cable and power",
                "Verify the serial port name and baud rate",
                "Reopen the port and start a new stream",
            ],
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            TelemetryError::PayloadBounds { .. } | TelemetryError::TypeConversion { .. } => vec![
                "Verify the configured packet type matches the device output",
                "Check the unit firmware version",
            ],
            TelemetryError::Config { .. } => vec![
                "Check the YAML structure against the documented layout",
                "Reset commands must be hex strings such as 55555352007E4F",
            ],
            TelemetryError::ChannelClosed => vec!["Keep the stream handle alive while reading"],
            TelemetryError::Task { .. } => vec![
                "Check the logs for the failing stream",
                "Start a new stream",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for byte source failures.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Source { reason: reason.into(), source: None }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        TelemetryError::Config { reason: reason.into() }
    }

    /// Helper constructor for unknown packet type tags.
    pub fn unsupported_packet_type(tag: impl Into<String>) -> Self {
        TelemetryError::UnsupportedPacketType { tag: tag.into() }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TelemetryError::Config { reason: err.to_string() }
    }
}

impl From<hex::FromHexError> for TelemetryError {
    fn from(err: hex::FromHexError) -> Self {
        TelemetryError::Config { reason: format!("invalid hex command: {}", err) }
    }
}
