//! Display rotation and camera facing.
//!
//! Rotations are restricted to the four right angles a display or a camera
//! sensor can be mounted at. Facing decides whether the preview is mirrored
//! and which orientation formula applies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Clockwise rotation in whole quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All rotations, in increasing order.
    pub const ALL: &'static [Rotation] = &[
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Rotation in degrees.
    pub const fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = RotationParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(RotationParseError(other.to_string())),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

impl FromStr for Rotation {
    type Err = RotationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let degrees: u32 = s
            .trim()
            .parse()
            .map_err(|_| RotationParseError(s.to_string()))?;
        Rotation::try_from(degrees)
    }
}

// Serialized as plain degrees so catalogs read `"sensor_orientation": 90`.
impl Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.degrees())
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let degrees = u32::deserialize(deserializer)?;
        Rotation::try_from(degrees).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Rotation {
    fn schema_name() -> String {
        "Rotation".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        u32::json_schema(gen)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid rotation: {0}, expected one of 0, 90, 180, 270")]
pub struct RotationParseError(String);

/// Which side of the device the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Faces the user; output is mirrored.
    Front,
    /// Faces away from the user.
    #[default]
    Back,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Front => "front",
            FacingMode::Back => "back",
        }
    }

    /// The opposite camera.
    pub fn toggled(&self) -> Self {
        match self {
            FacingMode::Front => FacingMode::Back,
            FacingMode::Back => FacingMode::Front,
        }
    }

    /// Front cameras need a horizontal flip to look like a mirror.
    pub fn is_mirrored(&self) -> bool {
        matches!(self, FacingMode::Front)
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = FacingModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" | "user" => Ok(FacingMode::Front),
            "back" | "rear" | "environment" => Ok(FacingMode::Back),
            _ => Err(FacingModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown camera facing: {0}")]
pub struct FacingModeParseError(String);
