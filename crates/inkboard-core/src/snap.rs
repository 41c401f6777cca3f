//! Grid and angle snapping.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default grid spacing in world units.
pub const GRID_SIZE: f64 = 12.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Snap a scalar to the nearest multiple of `grid_size`.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap an angle (degrees) to the nearest increment.
///
/// Unlike a heading, an object rotation is not normalized, so the result
/// may fall outside 0..360.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return angle_degrees;
    }
    (angle_degrees / increment).round() * increment
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Session snapping toggle together with its grid and angle steps.
///
/// A single toggle drives both grid and angle snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    pub grid_size: f64,
    pub angle_step: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_size: GRID_SIZE,
            angle_step: ANGLE_SNAP_INCREMENT,
        }
    }
}

impl SnapSettings {
    /// Snap a world coordinate or length when snapping is on.
    pub fn value(&self, value: f64) -> f64 {
        if self.enabled {
            snap_value(value, self.grid_size)
        } else {
            value
        }
    }

    /// Snap a point when snapping is on.
    pub fn point(&self, point: Point) -> Point {
        if self.enabled {
            snap_to_grid(point, self.grid_size)
        } else {
            point
        }
    }

    /// Snap a rotation in degrees when snapping is on.
    pub fn angle(&self, degrees: f64) -> f64 {
        if self.enabled {
            snap_angle(degrees, self.angle_step)
        } else {
            degrees
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_value() {
        assert!((snap_value(17.0, 12.0) - 12.0).abs() < f64::EPSILON);
        assert!((snap_value(18.0, 12.0) - 24.0).abs() < f64::EPSILON);
        assert!((snap_value(-7.0, 12.0) - -12.0).abs() < f64::EPSILON);
        assert!((snap_value(5.5, 0.0) - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_angle_keeps_range() {
        assert!((snap_angle(7.0, 15.0) - 0.0).abs() < f64::EPSILON);
        assert!((snap_angle(8.0, 15.0) - 15.0).abs() < f64::EPSILON);
        assert!((snap_angle(367.0, 15.0) - 360.0).abs() < f64::EPSILON);
        assert!((snap_angle(-52.0, 15.0) - -45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_settings_disabled_is_identity() {
        let snap = SnapSettings::default();
        assert!((snap.value(17.3) - 17.3).abs() < f64::EPSILON);
        assert!((snap.angle(33.0) - 33.0).abs() < f64::EPSILON);
        assert_eq!(snap.point(Point::new(1.5, 2.5)), Point::new(1.5, 2.5));
    }

    #[test]
    fn test_settings_enabled() {
        let snap = SnapSettings {
            enabled: true,
            grid_size: 20.0,
            angle_step: 15.0,
        };
        assert!((snap.value(29.0) - 20.0).abs() < f64::EPSILON);
        assert!((snap.angle(98.0) - 105.0).abs() < f64::EPSILON);
        assert_eq!(snap.point(Point::new(31.0, 9.0)), Point::new(40.0, 0.0));
    }
}
