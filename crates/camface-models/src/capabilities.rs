//! What a camera device reports and what gets applied back to it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{FacingMode, FlashMode, FocusMode, Rotation, Size};

/// Capability catalog reported by a camera device when it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CameraCapabilities {
    /// Supported still-capture resolutions
    pub picture_sizes: Vec<Size>,
    /// Supported preview resolutions, in the order the device lists them
    pub preview_sizes: Vec<Size>,
    /// Supported flash modes; empty when the camera has no flash unit
    #[serde(default)]
    pub flash_modes: Vec<FlashMode>,
    /// Supported focus modes
    #[serde(default)]
    pub focus_modes: Vec<FocusMode>,
    /// Clockwise angle the sensor image must be rotated to be upright
    /// in the device's natural orientation
    #[serde(default)]
    pub sensor_orientation: Rotation,
    /// Which way the camera faces
    pub facing: FacingMode,
    /// Maximum number of faces the hardware detector can report; 0 disables it
    #[serde(default)]
    pub max_detected_faces: u32,
}

impl CameraCapabilities {
    /// Returns true if the device has a flash unit.
    pub fn has_flash(&self) -> bool {
        !self.flash_modes.is_empty()
    }

    /// Returns true if the hardware face detector is available.
    pub fn supports_face_detection(&self) -> bool {
        self.max_detected_faces > 0
    }

    pub fn supports_focus_mode(&self, mode: FocusMode) -> bool {
        self.focus_modes.contains(&mode)
    }
}

/// Parameters the controller pushes to an open device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CameraParameters {
    pub picture_size: Size,
    pub preview_size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_mode: Option<FlashMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_mode: Option<FocusMode>,
}

impl CameraParameters {
    pub fn new(picture_size: Size, preview_size: Size) -> Self {
        Self {
            picture_size,
            preview_size,
            flash_mode: None,
            focus_mode: None,
        }
    }
}
