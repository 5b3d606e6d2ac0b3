//! Error types for NRC

use std::fmt;
use thiserror::Error;

/// Accelerator runtime primitive that reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevicePrimitive {
    /// Creating a device context or stream.
    Context,
    /// Allocating or uploading device memory.
    Allocate,
    /// Enqueueing an asynchronous host-to-device write.
    EnqueueWrite,
    /// Enqueueing an asynchronous device-to-host copy.
    EnqueueCopy,
    /// Waiting for a stream to drain.
    Synchronize,
}

impl DevicePrimitive {
    /// Stable lowercase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            DevicePrimitive::Context => "context",
            DevicePrimitive::Allocate => "allocate",
            DevicePrimitive::EnqueueWrite => "enqueue_copy_htod",
            DevicePrimitive::EnqueueCopy => "enqueue_copy_dtoh",
            DevicePrimitive::Synchronize => "stream_synchronize",
        }
    }
}

impl fmt::Display for DevicePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a device operation.
///
/// This is the only error a snapshot can produce. `primitive` names the
/// runtime call that failed, `cause` carries the runtime's own message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("device operation {primitive} failed: {cause}")]
pub struct DeviceOperationError {
    /// Failing primitive.
    pub primitive: DevicePrimitive,
    /// Runtime-provided description.
    pub cause: String,
}

impl DeviceOperationError {
    /// Build an error for `primitive` with a displayable cause.
    pub fn new(primitive: DevicePrimitive, cause: impl fmt::Display) -> Self {
        Self { primitive, cause: cause.to_string() }
    }
}

/// NRC error type
#[derive(Error, Debug)]
pub enum Error {
    /// Device runtime error
    #[error(transparent)]
    Device(#[from] DeviceOperationError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single device operation.
pub type DeviceResult<T> = std::result::Result<T, DeviceOperationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_primitive() {
        let err = DeviceOperationError::new(DevicePrimitive::Synchronize, "illegal address");
        assert_eq!(
            err.to_string(),
            "device operation stream_synchronize failed: illegal address"
        );
    }

    #[test]
    fn test_device_error_converts_transparently() {
        let err: Error =
            DeviceOperationError::new(DevicePrimitive::EnqueueCopy, "bad range").into();
        assert!(matches!(err, Error::Device(_)));
        assert_eq!(err.to_string(), "device operation enqueue_copy_dtoh failed: bad range");
    }
}
