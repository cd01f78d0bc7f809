//! Session driver for the `camface` binary.
//!
//! Loads a session script (camera catalog, display rotation, overlay size and
//! the face batches the detector should report), runs it against the
//! simulated camera platform and produces a JSON-serializable report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use camface_capture::{
    events, CameraController, CameraEvent, CaptureConfig, DeviceState, FaceOverlay, OpenedCamera,
    SimulatedCamera, SimulatedDisplay, SimulatedSurface,
};
use camface_models::{CameraCapabilities, Face, FacingMode, Rotation, ViewRect};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Command line arguments.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "camface")]
#[command(author, version, about = "Camera negotiation and face overlay driver", long_about = None)]
pub struct Args {
    /// Session script (JSON)
    pub script: PathBuf,

    /// Camera to open (front or back)
    #[arg(long)]
    pub facing: Option<FacingMode>,

    /// Print Prometheus metrics after the report
    #[arg(long)]
    pub metrics: bool,
}

/// Overlay surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlaySize {
    pub width: u32,
    pub height: u32,
}

impl Default for OverlaySize {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 2478,
        }
    }
}

fn default_take_picture() -> bool {
    true
}

/// A scripted camera session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Cameras exposed by the simulated platform
    pub cameras: Vec<CameraCapabilities>,
    #[serde(default)]
    pub display_rotation: Rotation,
    #[serde(default)]
    pub overlay: OverlaySize,
    /// Batches delivered by the face detector, in order
    #[serde(default)]
    pub faces: Vec<Vec<Face>>,
    #[serde(default = "default_take_picture")]
    pub take_picture: bool,
}

/// Load a session script from a JSON file.
pub fn load_script(path: &Path) -> anyhow::Result<SessionScript> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session script {}", path.display()))?;
    let script: SessionScript = serde_json::from_str(&raw)
        .with_context(|| format!("invalid session script {}", path.display()))?;

    if script.cameras.is_empty() {
        bail!("session script {} lists no cameras", path.display());
    }
    Ok(script)
}

/// Outcome of a session run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub opened: OpenedCamera,
    pub faces_drawn: u64,
    /// Rectangles of each overlay frame posted
    pub frames: Vec<Vec<ViewRect>>,
    pub picture_bytes: Option<usize>,
    pub events: Vec<&'static str>,
    pub device: DeviceState,
}

/// Open the camera, feed the scripted face batches through the overlay,
/// optionally capture a picture, then close.
pub async fn run_session(
    script: SessionScript,
    config: &CaptureConfig,
    facing: Option<FacingMode>,
) -> anyhow::Result<SessionReport> {
    let camera = SimulatedCamera::new(script.cameras);
    let display = Arc::new(SimulatedDisplay::new(script.display_rotation));
    let weak = Arc::downgrade(&display);

    let mut controller = CameraController::new(camera.clone(), weak, config);
    if let Some(facing) = facing {
        controller.set_facing(facing);
    }
    let (sender, mut receiver) = events::channel();
    controller.set_event_sender(sender);

    let opened = controller.open(config.min_preview_width)?;
    info!(
        session_id = %opened.session,
        picture_size = %opened.picture_size,
        preview_size = %opened.preview.size,
        "Camera session started"
    );

    let surface = SimulatedSurface::new(script.overlay.width, script.overlay.height);
    let overlay_task = controller.take_face_events().map(|faces| {
        let mut overlay = FaceOverlay::new(surface.clone(), config.overlay_stroke);
        tokio::spawn(async move { overlay.run(faces).await })
    });

    if overlay_task.is_none() && !script.faces.is_empty() {
        warn!(
            batches = script.faces.len(),
            "Camera has no face detector, dropping scripted faces"
        );
    }
    for batch in script.faces {
        if overlay_task.is_some() {
            camera.emit_faces(batch);
        }
    }

    let picture_bytes = if script.take_picture {
        controller.take_picture().await?.map(|data| data.len())
    } else {
        None
    };

    controller.close();

    let faces_drawn = match overlay_task {
        Some(task) => task.await.context("overlay task failed")??,
        None => 0,
    };

    let mut emitted = Vec::new();
    while let Some(event) = receiver.try_recv() {
        emitted.push(match event {
            CameraEvent::InitFinished { .. } => "init_finished",
            CameraEvent::ImageAvailable { .. } => "image_available",
        });
    }

    Ok(SessionReport {
        opened,
        faces_drawn,
        frames: surface.frames(),
        picture_bytes,
        events: emitted,
        device: camera.state(),
    })
}
