//! Coordinate mapping from sensor space to view space.
//!
//! Face detections arrive in the camera driver's fixed coordinate space and
//! must be drawn on an overlay surface in pixels:
//! - **Sensor space**: `[-1000, 1000]` on both axes, origin at the centre,
//!   independent of preview resolution
//! - **View space**: `[0, width] x [0, height]` pixels, origin at the top-left
//!
//! # Transform order
//! The affine transform is composed in this exact order, each step applied
//! after the previous one:
//! 1. Scale x by -1 when mirroring (front camera)
//! 2. Rotate clockwise by the display orientation
//! 3. Scale by `width / 2000` and `height / 2000`
//! 4. Translate by `(width / 2, height / 2)`
//!
//! Any other order misaligns the overlay.
//!
//! # Usage
//! ```rust
//! use camface_capture::mapping::map_detection_to_view;
//! use camface_models::{DetectionRect, Rotation, ViewRect};
//!
//! let view = map_detection_to_view(&DetectionRect::FULL_FRAME, false, Rotation::Deg0, 1000, 2000);
//! assert_eq!(view, ViewRect::new(0.0, 0.0, 1000.0, 2000.0));
//! ```

use camface_models::{DetectionRect, Rotation, ViewRect};

/// Width and height of the sensor coordinate space.
pub const SENSOR_SPAN: f64 = DetectionRect::SENSOR_SPAN as f64;

/// 2D affine transform.
///
/// Maps `(x, y)` to `(sx * x + kx * y + tx, ky * x + sy * y + ty)`. The
/// `post_*` builders apply the new operation after the existing ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub kx: f64,
    pub tx: f64,
    pub ky: f64,
    pub sy: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy: 1.0,
            ty: 0.0,
        }
    }

    /// A pure scale, replacing any previous state.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            sx,
            sy,
            ..Self::identity()
        }
    }

    /// A pure clockwise rotation (y axis pointing down).
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = sin_cos_snapped(degrees);
        Self {
            sx: cos,
            kx: -sin,
            ky: sin,
            sy: cos,
            ..Self::identity()
        }
    }

    /// A pure translation.
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::identity()
        }
    }

    /// Apply `after` once this transform has been applied.
    pub fn then(&self, after: &Transform) -> Self {
        Self {
            sx: after.sx * self.sx + after.kx * self.ky,
            kx: after.sx * self.kx + after.kx * self.sy,
            tx: after.sx * self.tx + after.kx * self.ty + after.tx,
            ky: after.ky * self.sx + after.sy * self.ky,
            sy: after.ky * self.kx + after.sy * self.sy,
            ty: after.ky * self.tx + after.sy * self.ty + after.ty,
        }
    }

    pub fn post_rotate(&self, degrees: f64) -> Self {
        self.then(&Self::rotation(degrees))
    }

    pub fn post_scale(&self, sx: f64, sy: f64) -> Self {
        self.then(&Self::scale(sx, sy))
    }

    pub fn post_translate(&self, dx: f64, dy: f64) -> Self {
        self.then(&Self::translation(dx, dy))
    }

    /// Map a single point.
    #[inline]
    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.sx * x + self.kx * y + self.tx,
            self.ky * x + self.sy * y + self.ty,
        )
    }

    /// Map a rectangle's four corners and return their bounding rectangle.
    ///
    /// For right-angle rotations the mapped corners already form an
    /// axis-aligned rectangle, so the bounds are exact.
    pub fn map_rect(&self, rect: &DetectionRect) -> ViewRect {
        ViewRect::from_corners(rect.corners().map(|(x, y)| self.map_point(x, y)))
    }
}

/// Sine and cosine with exact values at right angles.
///
/// `f64::sin_cos` leaves residue like `6.1e-17` at 90 degrees, which would
/// turn an axis-aligned result into a slightly skewed one.
fn sin_cos_snapped(degrees: f64) -> (f64, f64) {
    let normalized = degrees.rem_euclid(360.0);
    if normalized == 0.0 {
        (0.0, 1.0)
    } else if normalized == 90.0 {
        (1.0, 0.0)
    } else if normalized == 180.0 {
        (0.0, -1.0)
    } else if normalized == 270.0 {
        (-1.0, 0.0)
    } else {
        normalized.to_radians().sin_cos()
    }
}

/// Build the sensor-to-view transform for an overlay surface.
pub fn detection_to_view_transform(
    mirror: bool,
    display_orientation: Rotation,
    view_width: u32,
    view_height: u32,
) -> Transform {
    let width = view_width as f64;
    let height = view_height as f64;

    Transform::scale(if mirror { -1.0 } else { 1.0 }, 1.0)
        .post_rotate(display_orientation.degrees() as f64)
        .post_scale(width / SENSOR_SPAN, height / SENSOR_SPAN)
        .post_translate(width / 2.0, height / 2.0)
}

/// Map a face rectangle from sensor space into view pixels.
pub fn map_detection_to_view(
    rect: &DetectionRect,
    mirror: bool,
    display_orientation: Rotation,
    view_width: u32,
    view_height: u32,
) -> ViewRect {
    detection_to_view_transform(mirror, display_orientation, view_width, view_height).map_rect(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_full_frame_fills_view() {
        let view = map_detection_to_view(&DetectionRect::FULL_FRAME, false, Rotation::Deg0, 1000, 2000);
        assert_eq!(view, ViewRect::new(0.0, 0.0, 1000.0, 2000.0));
    }

    #[test]
    fn test_full_frame_fills_view_at_any_rotation() {
        for &rotation in Rotation::ALL {
            for mirror in [false, true] {
                let view =
                    map_detection_to_view(&DetectionRect::FULL_FRAME, mirror, rotation, 1440, 2560);
                assert!(view.approx_eq(&ViewRect::new(0.0, 0.0, 1440.0, 2560.0), EPS));
            }
        }
    }

    #[test]
    fn test_center_maps_to_view_center() {
        let t = detection_to_view_transform(true, Rotation::Deg270, 720, 1280);
        let (x, y) = t.map_point(0.0, 0.0);
        assert!((x - 360.0).abs() < EPS);
        assert!((y - 640.0).abs() < EPS);
    }

    #[test]
    fn test_mirror_flips_x() {
        let rects = [
            DetectionRect::new(-300, -200, 100, 400),
            DetectionRect::new(200, 500, 900, 1000),
            DetectionRect::new(-1000, -1000, -500, -900),
        ];
        let (w, h) = (1080, 1920);

        for rect in rects {
            let plain = map_detection_to_view(&rect, false, Rotation::Deg0, w, h);
            let mirrored = map_detection_to_view(&rect, true, Rotation::Deg0, w, h);

            // Left and right swap roles under the flip.
            assert!((mirrored.left - (w as f64 - plain.right)).abs() < EPS);
            assert!((mirrored.right - (w as f64 - plain.left)).abs() < EPS);
            assert!((mirrored.top - plain.top).abs() < EPS);
            assert!((mirrored.bottom - plain.bottom).abs() < EPS);
        }
    }

    #[test]
    fn test_quarter_turn_square_view() {
        // Bottom-right sensor quadrant rotates into the bottom-left.
        let rect = DetectionRect::new(0, 0, 500, 500);
        let view = map_detection_to_view(&rect, false, Rotation::Deg90, 2000, 2000);
        assert!(view.approx_eq(&ViewRect::new(500.0, 1000.0, 1000.0, 1500.0), EPS));
    }

    #[test]
    fn test_quarter_turn_scales_after_rotating() {
        let rect = DetectionRect::new(0, 0, 500, 500);
        let view = map_detection_to_view(&rect, false, Rotation::Deg90, 1000, 2000);
        assert!(view.approx_eq(&ViewRect::new(250.0, 1000.0, 500.0, 1500.0), EPS));
    }

    #[test]
    fn test_half_turn() {
        let rect = DetectionRect::new(-1000, -1000, 0, 0);
        let view = map_detection_to_view(&rect, false, Rotation::Deg180, 1000, 1000);
        assert!(view.approx_eq(&ViewRect::new(500.0, 500.0, 1000.0, 1000.0), EPS));
    }

    #[test]
    fn test_order_matters() {
        let rect = DetectionRect::new(0, 0, 500, 500);
        let expected = map_detection_to_view(&rect, false, Rotation::Deg90, 1000, 2000);

        // Scaling before rotating swaps which axis gets which factor.
        let wrong = Transform::identity()
            .post_scale(1000.0 / SENSOR_SPAN, 2000.0 / SENSOR_SPAN)
            .post_rotate(90.0)
            .post_translate(500.0, 1000.0)
            .map_rect(&rect);

        assert!(!wrong.approx_eq(&expected, EPS));
    }

    #[test]
    fn test_right_angles_are_exact() {
        let t = Transform::rotation(90.0);
        assert_eq!(t.map_point(1.0, 0.0), (0.0, 1.0));
        let t = Transform::rotation(-90.0);
        assert_eq!(t.map_point(1.0, 0.0), (0.0, -1.0));
    }

    #[test]
    fn test_arbitrary_rotation_bounds() {
        let rect = DetectionRect::new(-100, -100, 100, 100);
        let view = Transform::rotation(45.0).map_rect(&rect);
        let half_diag = 100.0 * 2f64.sqrt();
        assert!(view.approx_eq(&ViewRect::new(-half_diag, -half_diag, half_diag, half_diag), 1e-6));
    }
}
