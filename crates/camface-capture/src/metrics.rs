//! Camera session metrics.
//!
//! Provides standardized metrics for monitoring camera sessions:
//! - Open counters by facing and outcome
//! - Preview fallback counter
//! - Capture counter and picture size histogram
//! - Faces drawn on the overlay

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Camera opens by facing and status.
    pub const CAMERA_OPENS_TOTAL: &str = "camface_camera_opens_total";

    /// Preview negotiations that fell back to the first listed size.
    pub const PREVIEW_FALLBACKS_TOTAL: &str = "camface_preview_fallbacks_total";

    /// Still captures delivered by facing.
    pub const PICTURES_TAKEN_TOTAL: &str = "camface_pictures_taken_total";

    /// Encoded still capture size in bytes.
    pub const PICTURE_BYTES: &str = "camface_picture_bytes";

    /// Face rectangles drawn on the overlay.
    pub const FACES_DRAWN_TOTAL: &str = "camface_faces_drawn_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a camera open attempt.
pub fn record_open(facing: &str, success: bool) {
    counter!(
        names::CAMERA_OPENS_TOTAL,
        "facing" => facing.to_string(),
        "status" => if success { "ok" } else { "error" }
    )
    .increment(1);
}

/// Record a preview size fallback.
pub fn record_preview_fallback(facing: &str) {
    counter!(
        names::PREVIEW_FALLBACKS_TOTAL,
        "facing" => facing.to_string()
    )
    .increment(1);
}

/// Record a delivered still capture.
pub fn record_picture(facing: &str, bytes: usize) {
    counter!(
        names::PICTURES_TAKEN_TOTAL,
        "facing" => facing.to_string()
    )
    .increment(1);

    histogram!(names::PICTURE_BYTES).record(bytes as f64);
}

/// Record faces drawn in one overlay frame.
pub fn record_faces_drawn(count: usize) {
    counter!(names::FACES_DRAWN_TOTAL).increment(count as u64);
}

// =============================================================================
// Tests
// =============================================================================
