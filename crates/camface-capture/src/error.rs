//! Error types for camera capture operations.

use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur while configuring or driving a camera.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No candidate sizes were supplied; the camera must not be configured.
    #[error("No {what} sizes supplied")]
    EmptyInput { what: &'static str },

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Camera device error: {0}")]
    Device(String),

    #[error("Display has been released")]
    DisplayGone,

    #[error("Failed to lock overlay surface: {0}")]
    SurfaceLock(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CaptureError {
    /// Create an empty-input error for the named size catalog.
    pub fn empty_input(what: &'static str) -> Self {
        Self::EmptyInput { what }
    }

    /// Create a device failure error.
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device(message.into())
    }

    /// Create a device-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::DeviceUnavailable(message.into())
    }

    /// Create a surface lock failure error.
    pub fn surface_lock(message: impl Into<String>) -> Self {
        Self::SurfaceLock(message.into())
    }

    /// Returns true if camera startup must stop on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SurfaceLock(_))
    }
}
