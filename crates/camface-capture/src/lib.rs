#![deny(unreachable_patterns)]
//! Camera session logic for camface.
//!
//! This crate provides:
//! - Picture and preview size negotiation
//! - Display orientation resolution against a weakly held display
//! - Sensor-to-view mapping of face detections
//! - A camera controller driving open, preview, face detection and capture
//! - A face overlay that redraws detections on a drawing surface
//! - An in-memory camera platform for dry runs and tests

pub mod collaborator;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod mapping;
pub mod metrics;
pub mod orientation;
pub mod overlay;
pub mod selection;
pub mod simulated;

pub use collaborator::{CameraDevice, CameraProvider, DisplayInfo, FaceSender, OverlaySurface};
pub use config::CaptureConfig;
pub use controller::{choose_focus_mode, flash_mode_for, CameraController, OpenedCamera};
pub use error::{CaptureError, CaptureResult};
pub use events::{CameraEvent, CameraEventReceiver, CameraEventSender, FaceEvents};
pub use mapping::{detection_to_view_transform, map_detection_to_view, Transform};
pub use orientation::{resolve_display_orientation, OrientationResolver};
pub use overlay::{FaceOverlay, LockedFrame, StrokeStyle};
pub use selection::{
    select_max_area_size, select_optimal_preview_size, NoExactMatchWarning, PreviewSelection,
};
pub use simulated::{DeviceState, SimulatedCamera, SimulatedDisplay, SimulatedSurface};
