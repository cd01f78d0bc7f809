//! Flash and focus modes.
//!
//! Wire strings match the platform camera parameter values, so a device
//! catalog can be read straight from what the hardware reports.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flash behavior for still capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FlashMode {
    Off,
    On,
    #[default]
    Auto,
    RedEye,
    Torch,
}

impl FlashMode {
    pub const ALL: &'static [FlashMode] = &[
        FlashMode::Off,
        FlashMode::On,
        FlashMode::Auto,
        FlashMode::RedEye,
        FlashMode::Torch,
    ];

    /// Platform parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashMode::Off => "off",
            FlashMode::On => "on",
            FlashMode::Auto => "auto",
            FlashMode::RedEye => "red-eye",
            FlashMode::Torch => "torch",
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlashMode {
    type Err = FlashModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(FlashMode::Off),
            "on" => Ok(FlashMode::On),
            "auto" => Ok(FlashMode::Auto),
            "red-eye" | "red_eye" => Ok(FlashMode::RedEye),
            "torch" => Ok(FlashMode::Torch),
            _ => Err(FlashModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown flash mode: {0}")]
pub struct FlashModeParseError(String);

/// Lens focus behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    Auto,
    Infinity,
    Macro,
    Fixed,
    Edof,
    ContinuousVideo,
    ContinuousPicture,
}

impl FocusMode {
    /// Modes that let a capture wait for focus, most preferred first.
    pub const AUTO_FOCUS_PREFERENCE: &'static [FocusMode] = &[
        FocusMode::ContinuousPicture,
        FocusMode::Auto,
        FocusMode::Macro,
    ];

    /// Platform parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusMode::Auto => "auto",
            FocusMode::Infinity => "infinity",
            FocusMode::Macro => "macro",
            FocusMode::Fixed => "fixed",
            FocusMode::Edof => "edof",
            FocusMode::ContinuousVideo => "continuous-video",
            FocusMode::ContinuousPicture => "continuous-picture",
        }
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FocusMode {
    type Err = FocusModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "auto" => Ok(FocusMode::Auto),
            "infinity" => Ok(FocusMode::Infinity),
            "macro" => Ok(FocusMode::Macro),
            "fixed" => Ok(FocusMode::Fixed),
            "edof" => Ok(FocusMode::Edof),
            "continuous-video" => Ok(FocusMode::ContinuousVideo),
            "continuous-picture" => Ok(FocusMode::ContinuousPicture),
            _ => Err(FocusModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown focus mode: {0}")]
pub struct FocusModeParseError(String);
