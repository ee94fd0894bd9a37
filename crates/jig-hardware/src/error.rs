//! Error types for probe and collaborator operations.
//!
//! These errors stay below the dispatch boundary: a probe that hits one
//! reports it as an in-band failing reply, never as an error crossing to
//! the wire.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving peripherals.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Configured device path/node does not exist.
    #[error("Hardware absent: {path}")]
    Absent { path: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// External measurement command failed.
    #[error("Measurement command failed: {message}")]
    CommandFailed { message: String },

    /// Unparseable data read from a device node.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Probe configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new absent-hardware error.
    pub fn absent(path: impl Into<String>) -> Self {
        Self::Absent { path: path.into() }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new command failure error.
    pub fn command_failed(message: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}
