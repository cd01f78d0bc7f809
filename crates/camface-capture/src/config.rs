//! Capture configuration.

use camface_models::{FacingMode, FlashMode};
use tracing::warn;

use crate::error::{CaptureError, CaptureResult};
use crate::overlay::StrokeStyle;

/// Camera capture configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Minimum preview size, compared against each candidate's height
    pub min_preview_width: u32,
    /// Camera to open first
    pub facing: FacingMode,
    /// Flash mode applied when the device has a flash unit
    pub flash_mode: FlashMode,
    /// Face outline stroke
    pub overlay_stroke: StrokeStyle,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_preview_width: 1080,
            facing: FacingMode::Back,
            flash_mode: FlashMode::Auto,
            overlay_stroke: StrokeStyle::default(),
        }
    }
}

impl CaptureConfig {
    /// Create config from environment variables.
    ///
    /// Unparseable values fall back to defaults with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            min_preview_width: parse_or(
                &lookup,
                "CAMFACE_MIN_PREVIEW_WIDTH",
                defaults.min_preview_width,
            ),
            facing: parse_or(&lookup, "CAMFACE_FACING", defaults.facing),
            flash_mode: parse_or(&lookup, "CAMFACE_FLASH_MODE", defaults.flash_mode),
            overlay_stroke: StrokeStyle {
                color: lookup("CAMFACE_OVERLAY_COLOR")
                    .and_then(|s| parse_color(&s))
                    .unwrap_or(defaults.overlay_stroke.color),
                width: parse_or(
                    &lookup,
                    "CAMFACE_OVERLAY_STROKE_WIDTH",
                    defaults.overlay_stroke.width,
                ),
                anti_alias: defaults.overlay_stroke.anti_alias,
            },
        }
    }

    /// Reject values no camera session can run with.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.min_preview_width == 0 {
            return Err(CaptureError::InvalidConfig(
                "min_preview_width must be greater than zero".to_string(),
            ));
        }
        if !(self.overlay_stroke.width.is_finite() && self.overlay_stroke.width > 0.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "overlay stroke width must be positive, got {}",
                self.overlay_stroke.width
            )));
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

/// Parse `0xAARRGGBB`, `#AARRGGBB` or `#RRGGBB` (opaque).
fn parse_color(raw: &str) -> Option<u32> {
    let hex = raw
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('#');

    let value = u32::from_str_radix(hex, 16).ok();
    match (hex.len(), value) {
        (8, Some(argb)) => Some(argb),
        (6, Some(rgb)) => Some(0xFF00_0000 | rgb),
        _ => {
            warn!(value = %raw, "Invalid overlay color, using default");
            None
        }
    }
}
