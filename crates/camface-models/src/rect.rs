use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A face rectangle in sensor coordinates.
///
/// The sensor space is fixed at `[-1000, 1000]` on both axes with the origin
/// at the sensor centre, independent of the active preview resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DetectionRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl DetectionRect {
    /// Lowest sensor coordinate on either axis.
    pub const SENSOR_MIN: i32 = -1000;
    /// Highest sensor coordinate on either axis.
    pub const SENSOR_MAX: i32 = 1000;
    /// Width and height of the sensor space.
    pub const SENSOR_SPAN: i32 = Self::SENSOR_MAX - Self::SENSOR_MIN;

    /// The whole sensor frame.
    pub const FULL_FRAME: DetectionRect = DetectionRect {
        left: Self::SENSOR_MIN,
        top: Self::SENSOR_MIN,
        right: Self::SENSOR_MAX,
        bottom: Self::SENSOR_MAX,
    };

    /// Create a new detection rectangle.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Clip every edge into the sensor range.
    ///
    /// Drivers occasionally report faces that extend slightly past the frame.
    pub fn clamped(&self) -> Self {
        let clip = |v: i32| v.clamp(Self::SENSOR_MIN, Self::SENSOR_MAX);
        Self {
            left: clip(self.left),
            top: clip(self.top),
            right: clip(self.right),
            bottom: clip(self.bottom),
        }
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (l, t, r, b) = (
            self.left as f64,
            self.top as f64,
            self.right as f64,
            self.bottom as f64,
        );
        [(l, t), (r, t), (r, b), (l, b)]
    }
}

/// A rectangle in pixel coordinates of a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ViewRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Smallest axis-aligned rectangle containing all four corners.
    pub fn from_corners(corners: [(f64, f64); 4]) -> Self {
        let mut bounds = Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for (x, y) in corners {
            bounds.left = bounds.left.min(x);
            bounds.top = bounds.top.min(y);
            bounds.right = bounds.right.max(x);
            bounds.bottom = bounds.bottom.max(y);
        }
        bounds
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Approximate equality, for comparing mapped floating-point output.
    pub fn approx_eq(&self, other: &ViewRect, epsilon: f64) -> bool {
        (self.left - other.left).abs() <= epsilon
            && (self.top - other.top).abs() <= epsilon
            && (self.right - other.right).abs() <= epsilon
            && (self.bottom - other.bottom).abs() <= epsilon
    }
}

/// A face reported by the camera's detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Face {
    /// Bounds in sensor coordinates
    pub rect: DetectionRect,
    /// Detector confidence, 1 to 100
    pub score: u8,
    /// Tracking id, when the driver supports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl Face {
    pub fn new(rect: DetectionRect, score: u8) -> Self {
        Self {
            rect,
            score,
            id: None,
        }
    }
}
