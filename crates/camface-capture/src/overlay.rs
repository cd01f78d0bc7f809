//! Face overlay drawing.
//!
//! Each detection batch replaces the previous overlay: the frame is locked,
//! cleared, every face is mapped into the surface's pixel space and stroked,
//! and the frame is posted. [`LockedFrame`] guarantees the post happens on
//! every exit path.

use camface_models::{Face, Rotation, ViewRect};
use scopeguard::ScopeGuard;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collaborator::OverlaySurface;
use crate::error::CaptureResult;
use crate::events::FaceEvents;
use crate::mapping::detection_to_view_transform;
use crate::metrics;

/// Stroke used to outline faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// ARGB color
    pub color: u32,
    /// Line width in pixels
    pub width: f32,
    pub anti_alias: bool,
}

impl StrokeStyle {
    pub const RED: u32 = 0xFFFF_0000;
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Self::RED,
            width: 5.0,
            anti_alias: true,
        }
    }
}

/// A locked overlay frame.
///
/// Unlocks and posts the frame when dropped, including on early return and
/// while unwinding.
pub struct LockedFrame<'a, S: OverlaySurface + ?Sized> {
    surface: ScopeGuard<&'a mut S, fn(&'a mut S)>,
}

fn post<S: OverlaySurface + ?Sized>(surface: &mut S) {
    surface.unlock_and_post();
}

impl<'a, S: OverlaySurface + ?Sized> LockedFrame<'a, S> {
    /// Lock `surface` for drawing.
    pub fn acquire(surface: &'a mut S) -> CaptureResult<Self> {
        surface.lock()?;
        let unlock: fn(&'a mut S) = post::<S>;
        Ok(Self {
            surface: scopeguard::guard(surface, unlock),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn draw_rect(&mut self, rect: &ViewRect, stroke: &StrokeStyle) {
        self.surface.draw_rect(rect, stroke);
    }
}

/// Draws face detections onto an overlay surface.
pub struct FaceOverlay<S: OverlaySurface> {
    surface: S,
    stroke: StrokeStyle,
}

impl<S: OverlaySurface> FaceOverlay<S> {
    pub fn new(surface: S, stroke: StrokeStyle) -> Self {
        Self { surface, stroke }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Draw one batch of faces, replacing the previous overlay.
    ///
    /// An empty batch leaves the previous overlay untouched. Returns the
    /// number of faces drawn.
    pub fn render(
        &mut self,
        faces: &[Face],
        mirror: bool,
        orientation: Rotation,
    ) -> CaptureResult<usize> {
        if faces.is_empty() {
            return Ok(0);
        }

        let mut frame = LockedFrame::acquire(&mut self.surface)?;
        frame.clear();

        let (width, height) = frame.size();
        let transform = detection_to_view_transform(mirror, orientation, width, height);

        for face in faces {
            let rect = transform.map_rect(&face.rect.clamped());
            debug!(
                sensor = ?face.rect,
                view = ?rect,
                score = face.score,
                "Mapped face"
            );
            frame.draw_rect(&rect, &self.stroke);
        }

        metrics::record_faces_drawn(faces.len());
        Ok(faces.len())
    }

    /// Draw every batch from `events` in order until the stream closes.
    ///
    /// Orientation is resolved per batch, so a display rotation mid-session is
    /// picked up. A batch whose frame cannot be locked is skipped. Returns the
    /// number of faces drawn.
    pub async fn run(&mut self, mut events: FaceEvents) -> CaptureResult<u64> {
        let mut drawn = 0u64;

        while let Some(faces) = events.recv().await {
            let resolver = events.orientation();
            match self.render(&faces, resolver.mirror(), resolver.resolve()) {
                Ok(count) => drawn += count as u64,
                Err(e) if !e.is_fatal() => {
                    warn!(error = %e, faces = faces.len(), "Skipping face overlay frame");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(drawn, "Face event stream closed");
        Ok(drawn)
    }
}
