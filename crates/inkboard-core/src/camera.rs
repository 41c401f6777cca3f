//! Device/world coordinate transform and world sizing.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed display scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed display scale.
pub const MAX_SCALE: f64 = 5.0;

/// Logical dimensions of the drawable plane.
///
/// The raster surface always has exactly these pixel dimensions, so world
/// units and raster pixels coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: u32,
    pub height: u32,
}

impl WorldSize {
    /// Create a world size from explicit dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Compute the world size for a viewport: `multiplier` times the viewport
    /// in each dimension, never below the given minimums.
    pub fn for_viewport(viewport: Size, multiplier: f64, min_width: u32, min_height: u32) -> Self {
        let scaled = |extent: f64, min: u32| -> u32 {
            let grown = (extent.max(0.0) * multiplier).floor();
            if grown >= u32::MAX as f64 {
                u32::MAX
            } else {
                (grown as u32).max(min)
            }
        };
        Self {
            width: scaled(viewport.width, min_width),
            height: scaled(viewport.height, min_height),
        }
    }

    /// The world extent as a kurbo size.
    pub fn to_size(self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// Camera holds the display-only transform between device space and world space.
///
/// Device coordinates are page coordinates (pointer `clientX/clientY`).
/// The viewport element sits at `viewport_origin` on the page; the world is
/// translated by `pan` and then scaled by `scale` inside it. Stored geometry is
/// never touched by camera changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner of the viewport in device coordinates.
    pub viewport_origin: Point,
    /// Size of the viewport in device pixels.
    pub viewport_size: Size,
    /// Screen-space translation applied to the world.
    pub pan: Vec2,
    /// Display zoom factor.
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            viewport_origin: Point::ZERO,
            viewport_size: Size::ZERO,
            pan: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera with identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// World to device transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.viewport_origin.to_vec2() + self.pan) * Affine::scale(self.scale)
    }

    /// Device to world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-(self.viewport_origin.to_vec2() + self.pan))
    }

    /// Convert a device point (page coordinates) to world coordinates.
    pub fn to_world(&self, device: Point) -> Point {
        self.inverse_transform() * device
    }

    /// Convert a world point to device coordinates.
    pub fn to_device(&self, world: Point) -> Point {
        self.transform() * world
    }

    /// Convert a device-space length to world units.
    pub fn device_len_to_world(&self, len: f64) -> f64 {
        len / self.scale
    }

    /// Translate the view by a raw device-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the world point under `device` fixed.
    pub fn zoom_at(&mut self, device: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("Ignoring zoom factor {}", factor);
            return;
        }
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.to_world(device);
        self.scale = new_scale;

        let moved = self.to_device(anchor);
        self.pan += device - moved;
    }

    /// Update the viewport rectangle as reported by the host.
    pub fn set_viewport(&mut self, origin: Point, size: Size) {
        self.viewport_origin = origin;
        self.viewport_size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn test_identity_camera() {
        let camera = Camera::new();
        let p = Point::new(100.0, 200.0);
        assert!(close(camera.to_world(p), p));
    }

    #[test]
    fn test_to_world_applies_origin_pan_and_scale() {
        let mut camera = Camera::new();
        camera.viewport_origin = Point::new(10.0, 20.0);
        camera.pan = Vec2::new(30.0, 40.0);
        camera.scale = 2.0;

        let world = camera.to_world(Point::new(140.0, 260.0));
        assert!(close(world, Point::new(50.0, 100.0)));
    }

    #[test]
    fn test_round_trip_over_pan_and_scale_range() {
        let pans = [-10000.0, -2500.5, 0.0, 17.25, 10000.0];
        let scales = [0.1, 0.37, 1.0, 2.5, 5.0];
        let device_points = [Point::new(0.0, 0.0), Point::new(640.5, 480.25), Point::new(-33.0, 9000.0)];

        for &px in &pans {
            for &py in &pans {
                for &scale in &scales {
                    let camera = Camera {
                        viewport_origin: Point::new(12.0, 48.0),
                        viewport_size: Size::new(1280.0, 720.0),
                        pan: Vec2::new(px, py),
                        scale,
                    };
                    for &d in &device_points {
                        let back = camera.to_device(camera.to_world(d));
                        assert!(close(back, d));
                    }
                }
            }
        }
    }

    #[test]
    fn test_pan_is_screen_space() {
        let mut camera = Camera::new();
        camera.scale = 2.0;
        camera.pan_by(Vec2::new(10.0, -4.0));
        assert_eq!(camera.pan, Vec2::new(10.0, -4.0));
        assert!(close(camera.to_world(Point::new(10.0, -4.0)), Point::ZERO));
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        camera.pan = Vec2::new(25.0, 25.0);
        let anchor = Point::new(300.0, 200.0);
        let before = camera.to_world(anchor);

        camera.zoom_at(anchor, 2.0);

        assert!((camera.scale - 2.0).abs() < f64::EPSILON);
        assert!(close(camera.to_world(anchor), before));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 100.0);
        assert!((camera.scale - MAX_SCALE).abs() < f64::EPSILON);
        camera.zoom_at(Point::ZERO, 0.0001);
        assert!((camera.scale - MIN_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_ignores_invalid_factors() {
        let mut camera = Camera::new();
        let anchor = Point::new(40.0, 30.0);
        for factor in [f64::NAN, f64::INFINITY, 0.0, -1.5] {
            camera.zoom_at(anchor, factor);
            assert!((camera.scale - 1.0).abs() < f64::EPSILON);
            assert_eq!(camera.pan, Vec2::ZERO);
        }

        camera.zoom_at(anchor, 2.0);
        assert!((camera.scale - 2.0).abs() < f64::EPSILON);
        assert!(close(camera.to_world(anchor), anchor));
    }

    #[test]
    fn test_world_size_for_viewport() {
        let small = WorldSize::for_viewport(Size::new(300.0, 200.0), 2.0, 1400, 900);
        assert_eq!(small, WorldSize::new(1400, 900));

        let large = WorldSize::for_viewport(Size::new(1280.7, 800.2), 2.0, 1400, 900);
        assert_eq!(large, WorldSize::new(2561, 1600));
    }
}
