//! Display orientation for the camera preview.
//!
//! The sensor is mounted at a fixed angle relative to the device's natural
//! orientation, and the display can be rotated on top of that. The result is
//! the clockwise rotation to hand to the device so the preview looks upright.

use std::fmt;
use std::sync::Weak;

use camface_models::{FacingMode, Rotation};
use tracing::warn;

use crate::collaborator::DisplayInfo;

/// Rotation to apply to the preview for a sensor, facing and display rotation.
///
/// - Back: `(sensor - device + 360) % 360`
/// - Front: `(360 - (sensor + device) % 360) % 360`, compensating for the
///   front sensor's mirrored mounting.
pub fn resolve_display_orientation(
    sensor_orientation: Rotation,
    facing: FacingMode,
    device_rotation: Rotation,
) -> Rotation {
    let sensor = sensor_orientation.degrees();
    let device = device_rotation.degrees();

    let degrees = match facing {
        FacingMode::Front => {
            let raw = (sensor + device) % 360;
            (360 - raw) % 360
        }
        FacingMode::Back => (sensor + 360 - device) % 360,
    };

    // Both inputs are right angles, so the result is too.
    Rotation::try_from(degrees).unwrap_or_default()
}

/// Resolves the preview orientation against a display it does not own.
///
/// Holds only a weak reference to the display. Once the display is dropped,
/// [`OrientationResolver::resolve`] returns 0 degrees instead of failing.
#[derive(Clone)]
pub struct OrientationResolver {
    display: Weak<dyn DisplayInfo>,
    sensor_orientation: Rotation,
    facing: FacingMode,
}

impl OrientationResolver {
    pub fn new(
        display: Weak<dyn DisplayInfo>,
        sensor_orientation: Rotation,
        facing: FacingMode,
    ) -> Self {
        Self {
            display,
            sensor_orientation,
            facing,
        }
    }

    /// Returns true while the display is still alive.
    pub fn is_display_alive(&self) -> bool {
        self.display.strong_count() > 0
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Whether overlays for this camera must be flipped horizontally.
    pub fn mirror(&self) -> bool {
        self.facing.is_mirrored()
    }

    /// Current preview orientation, or 0 degrees if the display is gone.
    pub fn resolve(&self) -> Rotation {
        let Some(display) = self.display.upgrade() else {
            warn!(facing = %self.facing, "Display has been released, using 0 degree orientation");
            return Rotation::Deg0;
        };

        resolve_display_orientation(self.sensor_orientation, self.facing, display.rotation())
    }
}

impl fmt::Debug for OrientationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrientationResolver")
            .field("display_alive", &self.is_display_alive())
            .field("sensor_orientation", &self.sensor_orientation)
            .field("facing", &self.facing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FixedDisplay(Mutex<Rotation>);

    impl DisplayInfo for FixedDisplay {
        fn rotation(&self) -> Rotation {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn test_back_facing() {
        assert_eq!(
            resolve_display_orientation(Rotation::Deg90, FacingMode::Back, Rotation::Deg0),
            Rotation::Deg90
        );
        assert_eq!(
            resolve_display_orientation(Rotation::Deg90, FacingMode::Back, Rotation::Deg180),
            Rotation::Deg270
        );
        assert_eq!(
            resolve_display_orientation(Rotation::Deg0, FacingMode::Back, Rotation::Deg90),
            Rotation::Deg270
        );
    }

    #[test]
    fn test_front_facing() {
        assert_eq!(
            resolve_display_orientation(Rotation::Deg90, FacingMode::Front, Rotation::Deg0),
            Rotation::Deg270
        );
        assert_eq!(
            resolve_display_orientation(Rotation::Deg270, FacingMode::Front, Rotation::Deg0),
            Rotation::Deg90
        );
        assert_eq!(
            resolve_display_orientation(Rotation::Deg270, FacingMode::Front, Rotation::Deg90),
            Rotation::Deg0
        );
    }

    #[test]
    fn test_matches_formula_for_all_inputs() {
        for &sensor in Rotation::ALL {
            for &device in Rotation::ALL {
                let s = sensor.degrees() as i32;
                let d = device.degrees() as i32;

                let back = resolve_display_orientation(sensor, FacingMode::Back, device);
                assert_eq!(back.degrees() as i32, (s - d + 360) % 360);

                let front = resolve_display_orientation(sensor, FacingMode::Front, device);
                assert_eq!(front.degrees() as i32, (360 - (s + d) % 360) % 360);
            }
        }
    }

    #[test]
    fn test_is_pure() {
        let a = resolve_display_orientation(Rotation::Deg90, FacingMode::Front, Rotation::Deg270);
        let b = resolve_display_orientation(Rotation::Deg90, FacingMode::Front, Rotation::Deg270);
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolver_follows_display() {
        let display = Arc::new(FixedDisplay(Mutex::new(Rotation::Deg0)));
        let weak = Arc::downgrade(&display);
        let resolver = OrientationResolver::new(weak, Rotation::Deg90, FacingMode::Back);

        assert_eq!(resolver.resolve(), Rotation::Deg90);
        *display.0.lock().unwrap() = Rotation::Deg90;
        assert_eq!(resolver.resolve(), Rotation::Deg0);
    }

    #[test]
    fn test_resolver_defaults_when_display_dropped() {
        let display = Arc::new(FixedDisplay(Mutex::new(Rotation::Deg0)));
        let weak = Arc::downgrade(&display);
        let resolver = OrientationResolver::new(weak, Rotation::Deg90, FacingMode::Front);

        assert!(resolver.is_display_alive());
        drop(display);
        assert!(!resolver.is_display_alive());
        assert_eq!(resolver.resolve(), Rotation::Deg0);
    }
}
