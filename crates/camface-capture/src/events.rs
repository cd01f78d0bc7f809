//! Event delivery for camera sessions.
//!
//! The platform calls back on its own camera thread. Here those callbacks
//! become channel messages, which keeps the controller decoupled from the
//! consumer (UI thread, logging, a test harness) and keeps each stream
//! strictly ordered:
//! - [`CameraEvent`]s tell the application that initialisation finished or a
//!   picture is ready
//! - [`FaceEvents`] carries face detection batches to the overlay

use chrono::{DateTime, Utc};
use camface_models::{Face, Size};
use tokio::sync::mpsc;

use crate::collaborator::FaceSender;
use crate::orientation::OrientationResolver;

/// Event emitted by the camera controller.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    /// Sizes were negotiated; the preview view can be laid out.
    InitFinished { preview: Size },

    /// A still capture finished.
    ImageAvailable {
        data: Vec<u8>,
        captured_at: DateTime<Utc>,
    },
}

/// Sending side of the application event stream.
#[derive(Debug, Clone)]
pub struct CameraEventSender {
    tx: mpsc::UnboundedSender<CameraEvent>,
}

impl CameraEventSender {
    pub fn new(tx: mpsc::UnboundedSender<CameraEvent>) -> Self {
        Self { tx }
    }

    /// Send an event. Dropped silently once the receiver is gone.
    pub fn send(&self, event: CameraEvent) {
        let _ = self.tx.send(event);
    }

    pub fn init_finished(&self, preview: Size) {
        self.send(CameraEvent::InitFinished { preview });
    }

    pub fn image_available(&self, data: Vec<u8>) {
        self.send(CameraEvent::ImageAvailable {
            data,
            captured_at: Utc::now(),
        });
    }
}

/// Receiving side of the application event stream.
pub struct CameraEventReceiver {
    rx: mpsc::UnboundedReceiver<CameraEvent>,
}

impl CameraEventReceiver {
    /// Receive the next event.
    pub async fn recv(&mut self) -> Option<CameraEvent> {
        self.rx.recv().await
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&mut self) -> Option<CameraEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create an application event channel pair.
pub fn channel() -> (CameraEventSender, CameraEventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CameraEventSender::new(tx), CameraEventReceiver { rx })
}

/// Face detection batches for one open camera, plus what is needed to place
/// them on screen.
///
/// The stream ends when the camera stops face detection or is closed.
#[derive(Debug)]
pub struct FaceEvents {
    rx: mpsc::UnboundedReceiver<Vec<Face>>,
    orientation: OrientationResolver,
}

impl FaceEvents {
    /// Create the stream and the sink to hand to the device.
    pub fn channel(orientation: OrientationResolver) -> (FaceSender, FaceEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, FaceEvents { rx, orientation })
    }

    /// Receive the next batch of faces.
    pub async fn recv(&mut self) -> Option<Vec<Face>> {
        self.rx.recv().await
    }

    /// Try to receive a batch without blocking.
    pub fn try_recv(&mut self) -> Option<Vec<Face>> {
        self.rx.try_recv().ok()
    }

    pub fn orientation(&self) -> &OrientationResolver {
        &self.orientation
    }
}
