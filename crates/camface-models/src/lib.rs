//! Shared camera value types for camface.
//!
//! This crate provides Serde-serializable types for:
//! - Supported resolutions and aspect-ratio comparison
//! - Display rotation and camera facing
//! - Flash and focus modes
//! - Sensor-space face detections and view-space rectangles
//! - Device capability catalogs and applied camera parameters

pub mod camera_mode;
pub mod capabilities;
pub mod orientation;
pub mod rect;
pub mod session;
pub mod size;

// Re-export common types
pub use camera_mode::{FlashMode, FlashModeParseError, FocusMode, FocusModeParseError};
pub use capabilities::{CameraCapabilities, CameraParameters};
pub use orientation::{FacingMode, FacingModeParseError, Rotation, RotationParseError};
pub use rect::{DetectionRect, Face, ViewRect};
pub use session::SessionId;
pub use size::{Size, SizeParseError};
