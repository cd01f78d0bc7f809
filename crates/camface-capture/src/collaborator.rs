//! Platform collaborator traits.
//!
//! The platform owns the camera hardware, the display and the drawing
//! surfaces. These traits give the controller and overlay a uniform interface
//! over them, so a real platform binding and the in-memory simulation plug in
//! the same way.

use async_trait::async_trait;
use camface_models::{CameraCapabilities, CameraParameters, FacingMode, Face, Rotation, ViewRect};
use tokio::sync::mpsc;

use crate::error::CaptureResult;
use crate::overlay::StrokeStyle;

/// Sending side of the face detection stream.
///
/// The device pushes one batch per detector callback. A single receiver keeps
/// deliveries strictly ordered.
pub type FaceSender = mpsc::UnboundedSender<Vec<Face>>;

/// Opens camera devices by facing.
pub trait CameraProvider: Send + Sync {
    /// Open the camera facing `facing`.
    fn open(&self, facing: FacingMode) -> CaptureResult<Box<dyn CameraDevice>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// An open camera device.
#[async_trait]
pub trait CameraDevice: Send {
    /// Capability catalog reported at open time.
    fn capabilities(&self) -> &CameraCapabilities;

    /// Push picture/preview sizes and flash/focus modes.
    fn apply_parameters(&mut self, params: &CameraParameters) -> CaptureResult<()>;

    /// Rotate the preview output clockwise.
    fn set_display_orientation(&mut self, rotation: Rotation) -> CaptureResult<()>;

    fn start_preview(&mut self) -> CaptureResult<()>;

    fn stop_preview(&mut self) -> CaptureResult<()>;

    /// Start the hardware face detector, delivering batches to `sink`.
    fn start_face_detection(&mut self, sink: FaceSender) -> CaptureResult<()>;

    /// Stop the face detector and drop its sink.
    fn stop_face_detection(&mut self) -> CaptureResult<()>;

    /// Run one auto-focus pass. Resolves to whether focus was achieved.
    async fn auto_focus(&mut self) -> CaptureResult<bool>;

    fn cancel_auto_focus(&mut self);

    /// Capture a still image. Resolves to the encoded picture bytes.
    async fn take_picture(&mut self) -> CaptureResult<Vec<u8>>;

    /// Release the hardware. The device is unusable afterwards.
    fn release(&mut self);
}

/// Current rotation of the display the preview is shown on.
pub trait DisplayInfo: Send + Sync {
    fn rotation(&self) -> Rotation;
}

/// A drawing surface for the face overlay.
///
/// Drawing is only valid between `lock` and `unlock_and_post`; use
/// [`crate::overlay::LockedFrame`] rather than calling these directly.
pub trait OverlaySurface: Send {
    /// Surface size in pixels, `(width, height)`.
    fn size(&self) -> (u32, u32);

    fn lock(&mut self) -> CaptureResult<()>;

    /// Clear the locked frame to transparent.
    fn clear(&mut self);

    fn draw_rect(&mut self, rect: &ViewRect, stroke: &StrokeStyle);

    /// Release the frame and post it for display.
    fn unlock_and_post(&mut self);
}

impl<S: OverlaySurface + ?Sized> OverlaySurface for Box<S> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn lock(&mut self) -> CaptureResult<()> {
        (**self).lock()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw_rect(&mut self, rect: &ViewRect, stroke: &StrokeStyle) {
        (**self).draw_rect(rect, stroke)
    }

    fn unlock_and_post(&mut self) {
        (**self).unlock_and_post()
    }
}
