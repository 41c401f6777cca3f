//! Board configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "snap": { "enabled": true }, "brush": { "color": "#1e40af", "size": 6 } }
//! ```

use crate::history::MAX_HISTORY;
use crate::input::{DOUBLE_CLICK_DISTANCE, DOUBLE_CLICK_TIME_MS};
use crate::selection::HANDLE_HIT_TOLERANCE;
use crate::shapes::StyleDefaults;
use crate::snap::SnapSettings;
use crate::tools::BrushSettings;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Settings fixed for the lifetime of a board session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Maximum number of undo states kept.
    pub history_capacity: usize,
    /// Initial snapping toggle plus its grid and angle steps.
    pub snap: SnapSettings,
    /// Degrees added to every rotate gesture. The rotate handle sits above
    /// the object, a quarter turn away from the pointer angle origin.
    pub rotation_handle_offset: f64,
    /// Smallest world the raster surface is allocated for.
    pub world_min_width: u32,
    pub world_min_height: u32,
    /// World size relative to the viewport.
    pub world_multiplier: f64,
    /// Offset applied to both axes when duplicating.
    pub duplicate_offset: f64,
    /// Smallest size a resize gesture can produce.
    pub min_object_width: f64,
    pub min_object_height: f64,
    pub double_click_ms: f64,
    /// Device pixels the second press of a double click may drift.
    pub double_click_distance: f64,
    /// Handle hit radius in device pixels.
    pub handle_tolerance: f64,
    /// Initial brush.
    pub brush: BrushSettings,
    /// Initial style for new objects.
    pub style: StyleDefaults,
    /// Start with a rectangle, a circle and a text block in the baseline.
    pub seed_demo_objects: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            history_capacity: MAX_HISTORY,
            snap: SnapSettings::default(),
            rotation_handle_offset: 90.0,
            world_min_width: 1400,
            world_min_height: 900,
            world_multiplier: 2.0,
            duplicate_offset: 20.0,
            min_object_width: 20.0,
            min_object_height: 12.0,
            double_click_ms: DOUBLE_CLICK_TIME_MS,
            double_click_distance: DOUBLE_CLICK_DISTANCE,
            handle_tolerance: HANDLE_HIT_TOLERANCE,
            brush: BrushSettings::default(),
            style: StyleDefaults::default(),
            seed_demo_objects: false,
        }
    }
}

impl BoardConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Smallest object size a resize can produce.
    pub fn min_object_size(&self) -> Size {
        Size::new(self.min_object_width, self.min_object_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.history_capacity, 40);
        assert!(!config.snap.enabled);
        assert!((config.snap.grid_size - 12.0).abs() < f64::EPSILON);
        assert!((config.rotation_handle_offset - 90.0).abs() < f64::EPSILON);
        assert_eq!((config.world_min_width, config.world_min_height), (1400, 900));
        assert_eq!(config.min_object_size(), Size::new(20.0, 12.0));
        assert_eq!(config.brush.color, [0, 0, 0]);
        assert_eq!(config.style.fill, "teal");
        assert!(!config.seed_demo_objects);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(
            r##"{"history_capacity": 10, "snap": {"enabled": true}, "brush": {"color": "#1e40af"}}"##,
        )
        .unwrap();
        assert_eq!(config.history_capacity, 10);
        assert!(config.snap.enabled);
        assert!((config.snap.angle_step - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.brush.color, [0x1e, 0x40, 0xaf]);
        assert!((config.brush.size - 4.0).abs() < f64::EPSILON);
        assert!((config.duplicate_offset - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_brush_color_is_rejected() {
        assert!(BoardConfig::from_json(r#"{"brush": {"color": "blue"}}"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = BoardConfig::default();
        config.seed_demo_objects = true;
        config.brush.color = [255, 0, 16];
        let json = config.to_json().unwrap();
        assert!(json.contains("\"#ff0010\""));
        assert_eq!(BoardConfig::from_json(&json).unwrap(), config);
    }
}
