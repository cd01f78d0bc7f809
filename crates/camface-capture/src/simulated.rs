//! In-memory camera platform.
//!
//! A [`SimulatedCamera`] plays the role of the camera service: it holds a
//! capability catalog per facing, validates what the controller pushes and
//! records every call in a [`DeviceState`]. [`SimulatedDisplay`] and
//! [`SimulatedSurface`] stand in for the display and the overlay surface.
//! Used by the CLI for dry runs and by the integration tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use camface_models::{
    CameraCapabilities, CameraParameters, Face, FacingMode, Rotation, Size, ViewRect,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::collaborator::{CameraDevice, CameraProvider, DisplayInfo, FaceSender, OverlaySurface};
use crate::error::{CaptureError, CaptureResult};
use crate::overlay::StrokeStyle;

fn lock_recovering<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!(what, "Simulated state mutex poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Everything the simulated hardware has been asked to do.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    pub opens: u32,
    pub releases: u32,
    pub open: bool,
    pub parameters: Option<CameraParameters>,
    pub display_orientation: Option<Rotation>,
    pub previewing: bool,
    pub preview_starts: u32,
    pub face_detection: bool,
    pub auto_focus_runs: u32,
    pub auto_focus_cancels: u32,
    pub pictures: u32,
}

struct SimState {
    cameras: Vec<CameraCapabilities>,
    device: DeviceState,
    face_sink: Option<FaceSender>,
    focus_result: bool,
    reject_parameters: bool,
}

/// Simulated camera service.
#[derive(Clone)]
pub struct SimulatedCamera {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedCamera {
    /// Create a camera service exposing `cameras`, at most one per facing.
    pub fn new(cameras: Vec<CameraCapabilities>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                cameras,
                device: DeviceState::default(),
                face_sink: None,
                focus_result: true,
                reject_parameters: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock_recovering(&self.state, "camera")
    }

    /// Snapshot of the recorded device state.
    pub fn state(&self) -> DeviceState {
        self.lock().device.clone()
    }

    /// Outcome reported by subsequent auto-focus passes.
    pub fn set_focus_result(&self, focused: bool) {
        self.lock().focus_result = focused;
    }

    /// Make subsequent parameter updates fail as a busy driver would.
    pub fn set_reject_parameters(&self, reject: bool) {
        self.lock().reject_parameters = reject;
    }

    /// Deliver a face detection batch as the hardware detector would.
    ///
    /// Returns false if face detection is not running or nobody is listening.
    pub fn emit_faces(&self, faces: Vec<Face>) -> bool {
        let state = self.lock();
        match &state.face_sink {
            Some(sink) => sink.send(faces).is_ok(),
            None => false,
        }
    }
}

impl CameraProvider for SimulatedCamera {
    fn open(&self, facing: FacingMode) -> CaptureResult<Box<dyn CameraDevice>> {
        let mut state = self.lock();

        if state.device.open {
            return Err(CaptureError::unavailable("camera is already in use"));
        }

        let caps = state
            .cameras
            .iter()
            .find(|c| c.facing == facing)
            .cloned()
            .ok_or_else(|| CaptureError::unavailable(format!("no {} camera", facing)))?;

        state.device = DeviceState {
            opens: state.device.opens + 1,
            releases: state.device.releases,
            open: true,
            ..DeviceState::default()
        };
        debug!(%facing, "Simulated camera opened");

        Ok(Box::new(SimulatedDevice {
            caps,
            state: Arc::clone(&self.state),
            released: false,
        }))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

struct SimulatedDevice {
    caps: CameraCapabilities,
    state: Arc<Mutex<SimState>>,
    released: bool,
}

impl SimulatedDevice {
    fn lock(&self) -> CaptureResult<MutexGuard<'_, SimState>> {
        if self.released {
            return Err(CaptureError::device("camera has been released"));
        }
        Ok(lock_recovering(&self.state, "device"))
    }

    fn validate(&self, params: &CameraParameters) -> CaptureResult<()> {
        if !self.caps.picture_sizes.contains(&params.picture_size) {
            return Err(CaptureError::device(format!(
                "unsupported picture size {}",
                params.picture_size
            )));
        }
        if !self.caps.preview_sizes.contains(&params.preview_size) {
            return Err(CaptureError::device(format!(
                "unsupported preview size {}",
                params.preview_size
            )));
        }
        if params.flash_mode.is_some() && !self.caps.has_flash() {
            return Err(CaptureError::device("camera has no flash unit"));
        }
        if let Some(mode) = params.focus_mode {
            if !self.caps.supports_focus_mode(mode) {
                return Err(CaptureError::device(format!("unsupported focus mode {}", mode)));
            }
        }
        Ok(())
    }
}

/// Minimal JPEG-framed payload carrying the picture dimensions.
fn fake_jpeg(size: Size) -> Vec<u8> {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&[0xFF, 0xD8]);
    data.extend_from_slice(&size.width.to_be_bytes());
    data.extend_from_slice(&size.height.to_be_bytes());
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

#[async_trait]
impl CameraDevice for SimulatedDevice {
    fn capabilities(&self) -> &CameraCapabilities {
        &self.caps
    }

    fn apply_parameters(&mut self, params: &CameraParameters) -> CaptureResult<()> {
        self.validate(params)?;
        let mut state = self.lock()?;
        if state.reject_parameters {
            return Err(CaptureError::device("parameter update rejected"));
        }
        state.device.parameters = Some(*params);
        Ok(())
    }

    fn set_display_orientation(&mut self, rotation: Rotation) -> CaptureResult<()> {
        self.lock()?.device.display_orientation = Some(rotation);
        Ok(())
    }

    fn start_preview(&mut self) -> CaptureResult<()> {
        let mut state = self.lock()?;
        if state.device.parameters.is_none() {
            return Err(CaptureError::device("preview started before parameters"));
        }
        state.device.previewing = true;
        state.device.preview_starts += 1;
        Ok(())
    }

    fn stop_preview(&mut self) -> CaptureResult<()> {
        self.lock()?.device.previewing = false;
        Ok(())
    }

    fn start_face_detection(&mut self, sink: FaceSender) -> CaptureResult<()> {
        if !self.caps.supports_face_detection() {
            return Err(CaptureError::device("face detection not supported"));
        }
        let mut state = self.lock()?;
        if !state.device.previewing {
            return Err(CaptureError::device("face detection requires a running preview"));
        }
        state.face_sink = Some(sink);
        state.device.face_detection = true;
        Ok(())
    }

    fn stop_face_detection(&mut self) -> CaptureResult<()> {
        let mut state = self.lock()?;
        state.face_sink = None;
        state.device.face_detection = false;
        Ok(())
    }

    async fn auto_focus(&mut self) -> CaptureResult<bool> {
        let mut state = self.lock()?;
        state.device.auto_focus_runs += 1;
        Ok(state.focus_result)
    }

    fn cancel_auto_focus(&mut self) {
        if let Ok(mut state) = self.lock() {
            state.device.auto_focus_cancels += 1;
        }
    }

    async fn take_picture(&mut self) -> CaptureResult<Vec<u8>> {
        let mut state = self.lock()?;
        if !state.device.previewing {
            return Err(CaptureError::device("take_picture requires a running preview"));
        }
        let size = state
            .device
            .parameters
            .map(|p| p.picture_size)
            .ok_or_else(|| CaptureError::device("picture size not configured"))?;
        state.device.pictures += 1;
        Ok(fake_jpeg(size))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        let mut state = lock_recovering(&self.state, "device");
        state.face_sink = None;
        state.device.open = false;
        state.device.previewing = false;
        state.device.face_detection = false;
        state.device.releases += 1;
        self.released = true;
        debug!(facing = %self.caps.facing, "Simulated camera released");
    }
}

/// Display with a settable rotation.
#[derive(Debug, Default)]
pub struct SimulatedDisplay {
    rotation: Mutex<Rotation>,
}

impl SimulatedDisplay {
    pub fn new(rotation: Rotation) -> Self {
        Self {
            rotation: Mutex::new(rotation),
        }
    }

    pub fn set_rotation(&self, rotation: Rotation) {
        *lock_recovering(&self.rotation, "display") = rotation;
    }
}

impl DisplayInfo for SimulatedDisplay {
    fn rotation(&self) -> Rotation {
        *lock_recovering(&self.rotation, "display")
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    locked: bool,
    fail_lock: bool,
    pending: Vec<ViewRect>,
    frames: Vec<Vec<ViewRect>>,
}

/// Overlay surface that records every posted frame.
///
/// Clones share the same recording.
#[derive(Debug, Clone)]
pub struct SimulatedSurface {
    width: u32,
    height: u32,
    state: Arc<Mutex<SurfaceState>>,
}

impl SimulatedSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: Arc::new(Mutex::new(SurfaceState::default())),
        }
    }

    /// Rectangles of each posted frame, oldest first.
    pub fn frames(&self) -> Vec<Vec<ViewRect>> {
        lock_recovering(&self.state, "surface").frames.clone()
    }

    /// Rectangles currently on screen.
    pub fn current(&self) -> Vec<ViewRect> {
        self.frames().pop().unwrap_or_default()
    }

    /// Make subsequent locks fail, as when the surface is being destroyed.
    pub fn set_fail_lock(&self, fail: bool) {
        lock_recovering(&self.state, "surface").fail_lock = fail;
    }
}

impl OverlaySurface for SimulatedSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn lock(&mut self) -> CaptureResult<()> {
        let mut state = lock_recovering(&self.state, "surface");
        if state.fail_lock {
            return Err(CaptureError::surface_lock("surface is not available"));
        }
        if state.locked {
            return Err(CaptureError::surface_lock("surface is already locked"));
        }
        state.locked = true;
        state.pending.clear();
        Ok(())
    }

    fn clear(&mut self) {
        lock_recovering(&self.state, "surface").pending.clear();
    }

    fn draw_rect(&mut self, rect: &ViewRect, _stroke: &StrokeStyle) {
        lock_recovering(&self.state, "surface").pending.push(*rect);
    }

    fn unlock_and_post(&mut self) {
        let mut state = lock_recovering(&self.state, "surface");
        if !state.locked {
            return;
        }
        state.locked = false;
        let frame = std::mem::take(&mut state.pending);
        state.frames.push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camface_models::{DetectionRect, FlashMode, FocusMode};

    fn back_camera() -> CameraCapabilities {
        CameraCapabilities {
            picture_sizes: vec![Size::new(4000, 3000)],
            preview_sizes: vec![Size::new(1440, 1080)],
            flash_modes: vec![FlashMode::Auto],
            focus_modes: vec![FocusMode::Auto],
            sensor_orientation: Rotation::Deg90,
            facing: FacingMode::Back,
            max_detected_faces: 5,
        }
    }

    #[test]
    fn test_open_missing_facing() {
        let camera = SimulatedCamera::new(vec![back_camera()]);
        let err = camera.open(FacingMode::Front).err().unwrap();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_single_open_at_a_time() {
        let camera = SimulatedCamera::new(vec![back_camera()]);
        let mut device = camera.open(FacingMode::Back).unwrap();
        assert!(camera.open(FacingMode::Back).is_err());

        device.release();
        assert!(camera.open(FacingMode::Back).is_ok());
        assert_eq!(camera.state().opens, 2);
    }

    #[test]
    fn test_rejects_unsupported_parameters() {
        let camera = SimulatedCamera::new(vec![back_camera()]);
        let mut device = camera.open(FacingMode::Back).unwrap();

        let params = CameraParameters::new(Size::new(640, 480), Size::new(1440, 1080));
        assert!(device.apply_parameters(&params).is_err());
        assert_eq!(camera.state().parameters, None);
    }

    #[tokio::test]
    async fn test_picture_encodes_size() {
        let camera = SimulatedCamera::new(vec![back_camera()]);
        let mut device = camera.open(FacingMode::Back).unwrap();
        device
            .apply_parameters(&CameraParameters::new(Size::new(4000, 3000), Size::new(1440, 1080)))
            .unwrap();

        assert!(device.take_picture().await.is_err());

        device.start_preview().unwrap();
        let data = device.take_picture().await.unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        assert_eq!(&data[2..6], &4000u32.to_be_bytes());
        assert_eq!(&data[6..10], &3000u32.to_be_bytes());
        assert_eq!(&data[10..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_emit_faces_requires_detection() {
        let camera = SimulatedCamera::new(vec![back_camera()]);
        let face = Face::new(DetectionRect::FULL_FRAME, 90);
        assert!(!camera.emit_faces(vec![face]));
    }

    #[test]
    fn test_surface_records_posted_frames() {
        let mut surface = SimulatedSurface::new(100, 200);
        let rect = ViewRect::new(1.0, 2.0, 3.0, 4.0);

        surface.lock().unwrap();
        surface.draw_rect(&rect, &StrokeStyle::default());
        surface.unlock_and_post();

        assert_eq!(surface.frames(), vec![vec![rect]]);
        assert_eq!(surface.current(), vec![rect]);

        surface.set_fail_lock(true);
        assert!(surface.lock().is_err());
    }
}
