//! Discrete camera resolutions.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A supported picture or preview resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a size, rejecting a zero width or height.
    pub fn try_new(width: u32, height: u32) -> Result<Self, SizeParseError> {
        if width == 0 || height == 0 {
            return Err(SizeParseError::ZeroValue);
        }
        Ok(Self { width, height })
    }

    /// Pixel count. Widened to `u64` so sensor-sized catalogs cannot overflow.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exact aspect-ratio equality via cross multiplication.
    ///
    /// `a.width * b.height == a.height * b.width`, computed in `u64` so no
    /// rounding is involved.
    #[inline]
    pub fn same_aspect(&self, other: &Size) -> bool {
        self.width as u64 * other.height as u64 == self.height as u64 * other.width as u64
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '*'])
            .ok_or_else(|| SizeParseError::InvalidFormat(s.to_string()))?;

        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| SizeParseError::InvalidNumber(w.to_string()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| SizeParseError::InvalidNumber(h.to_string()))?;

        Size::try_new(width, height)
    }
}

// Catalog entries go through the same zero check as parsed strings.
impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawSize {
            width: u32,
            height: u32,
        }

        let raw = RawSize::deserialize(deserializer)?;
        Size::try_new(raw.width, raw.height).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeParseError {
    #[error("Invalid size format: {0}, expected 'WxH'")]
    InvalidFormat(String),
    #[error("Invalid number in size: {0}")]
    InvalidNumber(String),
    #[error("Size cannot have zero values")]
    ZeroValue,
}
