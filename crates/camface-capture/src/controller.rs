//! Camera lifecycle controller.
//!
//! Opens a camera through a [`CameraProvider`], negotiates picture and preview
//! sizes, picks flash and focus modes, applies the display orientation and
//! starts preview plus hardware face detection. Still capture runs an
//! auto-focus pass first when the chosen focus mode allows it.

use std::sync::Weak;

use camface_models::{
    CameraCapabilities, CameraParameters, FacingMode, FlashMode, FocusMode, Rotation, SessionId,
    Size,
};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::collaborator::{CameraDevice, CameraProvider, DisplayInfo};
use crate::config::CaptureConfig;
use crate::error::{CaptureError, CaptureResult};
use crate::events::{CameraEventSender, FaceEvents};
use crate::metrics;
use crate::orientation::OrientationResolver;
use crate::selection::{select_max_area_size, select_optimal_preview_size, PreviewSelection};

/// Summary of a successfully opened camera.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenedCamera {
    pub session: SessionId,
    pub facing: FacingMode,
    pub picture_size: Size,
    pub preview: PreviewSelection,
    pub flash_mode: Option<FlashMode>,
    pub focus_mode: Option<FocusMode>,
    pub auto_focus: bool,
    pub orientation: Rotation,
    pub face_detection: bool,
}

struct ActiveCamera {
    session: SessionId,
    device: Box<dyn CameraDevice>,
    params: CameraParameters,
    auto_focus: bool,
    face_detection: bool,
    face_events: Option<FaceEvents>,
}

/// Drives one camera at a time.
pub struct CameraController<P: CameraProvider> {
    provider: P,
    display: Weak<dyn DisplayInfo>,
    facing: FacingMode,
    flash_mode: FlashMode,
    events: Option<CameraEventSender>,
    active: Option<ActiveCamera>,
}

impl<P: CameraProvider> CameraController<P> {
    /// Create a controller. The display is held weakly and never kept alive
    /// by the controller.
    pub fn new(provider: P, display: Weak<dyn DisplayInfo>, config: &CaptureConfig) -> Self {
        Self {
            provider,
            display,
            facing: config.facing,
            flash_mode: config.flash_mode,
            events: None,
            active: None,
        }
    }

    /// Route application events (init finished, image available) to `sender`.
    pub fn set_event_sender(&mut self, sender: CameraEventSender) {
        self.events = Some(sender);
    }

    /// Select the camera used by the next [`open`](Self::open).
    pub fn set_facing(&mut self, facing: FacingMode) {
        self.facing = facing;
    }

    /// Switch between front and back for the next open.
    pub fn change_facing(&mut self) {
        self.facing = self.facing.toggled();
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn flash_mode(&self) -> FlashMode {
        self.flash_mode
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Parameters applied to the open camera.
    pub fn parameters(&self) -> Option<&CameraParameters> {
        self.active.as_ref().map(|a| &a.params)
    }

    /// Take the face detection stream of the open camera.
    ///
    /// Returns `None` if no camera is open, the device has no face detector,
    /// or the stream was already taken.
    pub fn take_face_events(&mut self) -> Option<FaceEvents> {
        self.active.as_mut().and_then(|a| a.face_events.take())
    }

    /// Open the selected camera and start preview.
    ///
    /// Any camera that is already open is closed first. Fails without
    /// touching the hardware if `min_preview_width` is zero
    /// ([`CaptureError::InvalidConfig`]) or the display has been released
    /// ([`CaptureError::DisplayGone`]).
    pub fn open(&mut self, min_preview_width: u32) -> CaptureResult<OpenedCamera> {
        if min_preview_width == 0 {
            return Err(CaptureError::InvalidConfig(
                "minimum preview width must be positive".to_string(),
            ));
        }

        if self.display.strong_count() == 0 {
            warn!(facing = %self.facing, "Display has been released, not opening camera");
            return Err(CaptureError::DisplayGone);
        }

        if self.active.is_some() {
            self.close();
        }

        let session = SessionId::new();
        let span = info_span!("camera_open", session_id = %session, facing = %self.facing);
        let _guard = span.enter();

        let mut device = match self.provider.open(self.facing) {
            Ok(device) => device,
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "Failed to open camera");
                metrics::record_open(self.facing.as_str(), false);
                return Err(e);
            }
        };

        match self.start_device(device.as_mut(), &session, min_preview_width) {
            Ok((opened, params, face_events)) => {
                metrics::record_open(self.facing.as_str(), true);
                self.active = Some(ActiveCamera {
                    session,
                    device,
                    params,
                    auto_focus: opened.auto_focus,
                    face_detection: opened.face_detection,
                    face_events,
                });
                Ok(opened)
            }
            Err(e) => {
                error!(error = %e, "Failed to configure camera");
                metrics::record_open(self.facing.as_str(), false);
                device.release();
                Err(e)
            }
        }
    }

    fn start_device(
        &self,
        device: &mut dyn CameraDevice,
        session: &SessionId,
        min_preview_width: u32,
    ) -> CaptureResult<(OpenedCamera, CameraParameters, Option<FaceEvents>)> {
        let caps = device.capabilities().clone();

        let picture_size = select_max_area_size(&caps.picture_sizes)?;
        info!(picture_size = %picture_size, "Selected picture size");

        let preview = select_optimal_preview_size(&caps.preview_sizes, min_preview_width, picture_size)?;
        if let Some(warning) = &preview.warning {
            warn!(%warning, "No suitable preview size");
            metrics::record_preview_fallback(caps.facing.as_str());
        }
        info!(preview_size = %preview.size, "Selected preview size");

        if let Some(events) = &self.events {
            events.init_finished(preview.size);
        }

        let mut params = CameraParameters::new(picture_size, preview.size);
        params.flash_mode = flash_mode_for(&caps, self.flash_mode);
        params.focus_mode = choose_focus_mode(&caps);
        let auto_focus = params.focus_mode.is_some();
        info!(
            flash_mode = ?params.flash_mode,
            focus_mode = ?params.focus_mode,
            auto_focus,
            "Selected camera modes"
        );

        device.apply_parameters(&params)?;

        let resolver =
            OrientationResolver::new(self.display.clone(), caps.sensor_orientation, caps.facing);
        let orientation = resolver.resolve();
        info!(orientation = %orientation, "Resolved display orientation");
        if orientation != Rotation::Deg0 {
            device.set_display_orientation(orientation)?;
        }

        device.start_preview()?;

        let face_events = if caps.supports_face_detection() {
            let (sink, events) = FaceEvents::channel(resolver);
            device.start_face_detection(sink)?;
            debug!(max_faces = caps.max_detected_faces, "Face detection started");
            Some(events)
        } else {
            None
        };

        let opened = OpenedCamera {
            session: session.clone(),
            facing: caps.facing,
            picture_size,
            preview,
            flash_mode: params.flash_mode,
            focus_mode: params.focus_mode,
            auto_focus,
            orientation,
            face_detection: face_events.is_some(),
        };

        Ok((opened, params, face_events))
    }

    /// Stop face detection and preview, then release the camera.
    ///
    /// Does nothing if no camera is open.
    pub fn close(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };

        if active.face_detection {
            if let Err(e) = active.device.stop_face_detection() {
                warn!(session_id = %active.session, error = %e, "Failed to stop face detection");
            }
        }
        if let Err(e) = active.device.stop_preview() {
            warn!(session_id = %active.session, error = %e, "Failed to stop preview");
        }
        active.device.release();

        info!(session_id = %active.session, "Camera closed");
    }

    /// Change the flash mode, re-applying parameters if a camera is open.
    ///
    /// Does nothing if the mode is unchanged. If the device rejects the
    /// update, the previous mode and parameters are kept.
    pub fn set_flash_mode(&mut self, mode: FlashMode) -> CaptureResult<()> {
        if self.flash_mode == mode {
            return Ok(());
        }

        let Some(active) = self.active.as_mut() else {
            self.flash_mode = mode;
            return Ok(());
        };

        let flash = flash_mode_for(active.device.capabilities(), mode);
        if flash.is_some() {
            let mut params = active.params;
            params.flash_mode = flash;
            active.device.apply_parameters(&params)?;
            active.params = params;
            info!(session_id = %active.session, flash_mode = %mode, "Flash mode updated");
        }

        self.flash_mode = mode;
        Ok(())
    }

    /// Capture a still picture.
    ///
    /// Runs auto-focus first when supported, then captures, emits
    /// [`crate::events::CameraEvent::ImageAvailable`] and restarts preview.
    /// Returns `Ok(None)` if no camera is open.
    pub async fn take_picture(&mut self) -> CaptureResult<Option<Vec<u8>>> {
        let Some(active) = self.active.as_mut() else {
            debug!("take_picture ignored, camera not open");
            return Ok(None);
        };

        let span = info_span!("take_picture", session_id = %active.session);
        let events = self.events.as_ref();

        async move {
            info!("Taking picture");

            if active.auto_focus {
                let focused = active.device.auto_focus().await?;
                info!(focused, "Auto focus finished");
            }

            let data = active.device.take_picture().await?;
            active.device.stop_preview()?;

            metrics::record_picture(active.device.capabilities().facing.as_str(), data.len());
            if let Some(events) = events {
                events.image_available(data.clone());
            }

            active.device.cancel_auto_focus();
            active.device.start_preview()?;

            info!(bytes = data.len(), "Picture taken");
            Ok(Some(data))
        }
        .instrument(span)
        .await
    }
}

impl<P: CameraProvider> Drop for CameraController<P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Flash mode to apply, or `None` when the device has no flash unit.
///
/// The requested mode is applied as long as any flash mode is supported.
pub fn flash_mode_for(caps: &CameraCapabilities, requested: FlashMode) -> Option<FlashMode> {
    caps.has_flash().then_some(requested)
}

/// First supported of continuous-picture, auto, macro.
///
/// `None` means the camera cannot focus before capture.
pub fn choose_focus_mode(caps: &CameraCapabilities) -> Option<FocusMode> {
    FocusMode::AUTO_FOCUS_PREFERENCE
        .iter()
        .copied()
        .find(|mode| caps.supports_focus_mode(*mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(flash: &[FlashMode], focus: &[FocusMode]) -> CameraCapabilities {
        CameraCapabilities {
            picture_sizes: vec![Size::new(4000, 3000)],
            preview_sizes: vec![Size::new(1440, 1080)],
            flash_modes: flash.to_vec(),
            focus_modes: focus.to_vec(),
            sensor_orientation: Rotation::Deg90,
            facing: FacingMode::Back,
            max_detected_faces: 0,
        }
    }

    #[test]
    fn test_focus_priority() {
        let all = caps(
            &[],
            &[FocusMode::Macro, FocusMode::Auto, FocusMode::ContinuousPicture],
        );
        assert_eq!(choose_focus_mode(&all), Some(FocusMode::ContinuousPicture));

        let no_continuous = caps(&[], &[FocusMode::Macro, FocusMode::Auto]);
        assert_eq!(choose_focus_mode(&no_continuous), Some(FocusMode::Auto));

        let macro_only = caps(&[], &[FocusMode::Fixed, FocusMode::Macro]);
        assert_eq!(choose_focus_mode(&macro_only), Some(FocusMode::Macro));

        let fixed = caps(&[], &[FocusMode::Fixed, FocusMode::Infinity]);
        assert_eq!(choose_focus_mode(&fixed), None);
    }

    #[test]
    fn test_flash_requires_flash_unit() {
        assert_eq!(flash_mode_for(&caps(&[], &[]), FlashMode::On), None);

        // Any flash support is enough, even if the exact mode is unlisted.
        let torch_only = caps(&[FlashMode::Torch], &[]);
        assert_eq!(flash_mode_for(&torch_only, FlashMode::Auto), Some(FlashMode::Auto));
    }
}
