//! Picture and preview size negotiation.
//!
//! The hardware exposes a fixed catalog of resolutions. Still capture takes the
//! largest one; preview takes the smallest one that keeps the still-capture
//! aspect ratio and clears a minimum size, so the preview is never cropped
//! differently from the photo and memory bandwidth stays low.
//!
//! Ties are always resolved to the first candidate in catalog order.

use camface_models::Size;
use serde::Serialize;
use std::fmt;

use crate::error::{CaptureError, CaptureResult};

/// Raised when no preview size matches the reference aspect ratio.
///
/// Not an error: the first listed preview size is used instead and the
/// caller should log the degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoExactMatchWarning {
    pub min_width: u32,
    pub reference: Size,
    pub fallback: Size,
}

impl fmt::Display for NoExactMatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no preview size matches aspect {} with minimum {}, falling back to {}",
            self.reference, self.min_width, self.fallback
        )
    }
}

/// Outcome of preview size negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewSelection {
    pub size: Size,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<NoExactMatchWarning>,
}

impl PreviewSelection {
    /// Returns true if the size is the catalog fallback rather than a match.
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Pick the size with the greatest area.
pub fn select_max_area_size(sizes: &[Size]) -> CaptureResult<Size> {
    // `max_by_key` keeps the last maximum; reduce keeps the first.
    sizes
        .iter()
        .copied()
        .reduce(|best, candidate| {
            if candidate.area() > best.area() {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| CaptureError::empty_input("picture"))
}

/// Pick the smallest size sharing `reference`'s aspect ratio whose height is
/// at least `min_width`.
///
/// The minimum is compared against the candidate's *height*: catalogs are
/// landscape while `min_width` is a portrait width.
///
/// Falls back to `sizes[0]` with a [`NoExactMatchWarning`] when nothing matches.
pub fn select_optimal_preview_size(
    sizes: &[Size],
    min_width: u32,
    reference: Size,
) -> CaptureResult<PreviewSelection> {
    let first = *sizes.first().ok_or_else(|| CaptureError::empty_input("preview"))?;

    let best = sizes
        .iter()
        .copied()
        .filter(|s| s.same_aspect(&reference) && s.height >= min_width)
        .min_by_key(Size::area);

    Ok(match best {
        Some(size) => PreviewSelection {
            size,
            warning: None,
        },
        None => PreviewSelection {
            size: first,
            warning: Some(NoExactMatchWarning {
                min_width,
                reference,
                fallback: first,
            }),
        },
    })
}
