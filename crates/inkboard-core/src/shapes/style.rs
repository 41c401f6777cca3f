//! Object styling and the session-wide defaults for new objects.

use super::ObjectKind;
use serde::{Deserialize, Serialize};

/// Font size used when a requested size is not a positive number.
pub const FALLBACK_FONT_SIZE: f64 = 12.0;

/// Longest colour string accepted from outside.
const MAX_COLOR_LEN: usize = 64;

/// Visual style of a single object.
///
/// Text objects carry no fill or border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStyle {
    pub fill: Option<String>,
    pub border_color: Option<String>,
    pub font_color: String,
    /// Font size in pixels.
    pub font_size: f64,
}

impl ObjectStyle {
    /// Style for a freshly created object of `kind`.
    pub fn for_kind(kind: ObjectKind, defaults: &StyleDefaults) -> Self {
        let shape = kind.is_shape();
        Self {
            fill: shape.then(|| defaults.fill.clone()),
            border_color: shape.then(|| defaults.border_color.clone()),
            font_color: defaults.font_color.clone(),
            font_size: defaults.font_size,
        }
    }

    /// Apply a patch the way the style controls do: font colour reaches
    /// every kind, font size only text, fill and border only shapes.
    /// Returns true when anything changed.
    pub fn apply(&mut self, kind: ObjectKind, patch: &StylePatch) -> bool {
        let before = self.clone();
        if let Some(color) = &patch.font_color {
            self.font_color = color.clone();
        }
        if kind == ObjectKind::Text {
            if let Some(size) = patch.font_size {
                self.font_size = normalize_font_size(size);
            }
        }
        if kind.is_shape() {
            if let Some(fill) = &patch.fill {
                self.fill = Some(fill.clone());
            }
            if let Some(border) = &patch.border_color {
                self.border_color = Some(border.clone());
            }
        }
        *self != before
    }
}

/// Style applied to objects created from now on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDefaults {
    pub font_color: String,
    pub font_size: f64,
    pub fill: String,
    pub border_color: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            font_color: "#000000".to_string(),
            font_size: 16.0,
            fill: "teal".to_string(),
            border_color: "red".to_string(),
        }
    }
}

impl StyleDefaults {
    /// Fold a patch into the defaults.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(color) = &patch.font_color {
            self.font_color = color.clone();
        }
        if let Some(size) = patch.font_size {
            self.font_size = normalize_font_size(size);
        }
        if let Some(fill) = &patch.fill {
            self.fill = fill.clone();
        }
        if let Some(border) = &patch.border_color {
            self.border_color = border.clone();
        }
    }
}

/// A style change requested by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StylePatch {
    pub font_color: Option<String>,
    pub font_size: Option<f64>,
    pub fill: Option<String>,
    pub border_color: Option<String>,
}

impl StylePatch {
    pub fn font_color(color: impl Into<String>) -> Self {
        Self {
            font_color: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn font_size(size: f64) -> Self {
        Self {
            font_size: Some(size),
            ..Self::default()
        }
    }

    pub fn fill(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn border_color(color: impl Into<String>) -> Self {
        Self {
            border_color: Some(color.into()),
            ..Self::default()
        }
    }

    /// Drop colour values that are not plain CSS colours.
    pub fn sanitized(self) -> Self {
        Self {
            font_color: self.font_color.as_deref().and_then(sanitize_color),
            font_size: self.font_size,
            fill: self.fill.as_deref().and_then(sanitize_color),
            border_color: self.border_color.as_deref().and_then(sanitize_color),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.font_color.is_none() && self.font_size.is_none() && self.fill.is_none() && self.border_color.is_none()
    }
}

fn normalize_font_size(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        FALLBACK_FONT_SIZE
    }
}

/// Accept a CSS colour value (`#hex`, a colour keyword or a functional
/// notation such as `rgba(...)`) and reject anything that could smuggle in
/// other declarations or resource references.
pub fn sanitize_color(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.len() > MAX_COLOR_LEN {
        return None;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-' | '/');
    if !value.chars().all(allowed) {
        return None;
    }
    let lower = value.to_ascii_lowercase();
    if lower.contains("url") || lower.contains("expression") || lower.contains("//") {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_kind_uses_defaults() {
        let defaults = StyleDefaults::default();
        let rect = ObjectStyle::for_kind(ObjectKind::Rect, &defaults);
        assert_eq!(rect.fill.as_deref(), Some("teal"));
        assert_eq!(rect.border_color.as_deref(), Some("red"));

        let text = ObjectStyle::for_kind(ObjectKind::Text, &defaults);
        assert!(text.fill.is_none());
        assert!(text.border_color.is_none());
        assert!((text.font_size - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_respects_kind_targets() {
        let defaults = StyleDefaults::default();
        let mut rect = ObjectStyle::for_kind(ObjectKind::Rect, &defaults);
        let mut text = ObjectStyle::for_kind(ObjectKind::Text, &defaults);

        assert!(!rect.apply(ObjectKind::Rect, &StylePatch::font_size(30.0)));
        assert!(text.apply(ObjectKind::Text, &StylePatch::font_size(30.0)));
        assert!((text.font_size - 30.0).abs() < f64::EPSILON);

        assert!(!text.apply(ObjectKind::Text, &StylePatch::fill("navy")));
        assert!(text.fill.is_none());
        assert!(rect.apply(ObjectKind::Rect, &StylePatch::fill("navy")));
        assert_eq!(rect.fill.as_deref(), Some("navy"));

        assert!(text.apply(ObjectKind::Text, &StylePatch::font_color("#ff0000")));
        assert!(rect.apply(ObjectKind::Rect, &StylePatch::font_color("#ff0000")));
    }

    #[test]
    fn test_invalid_font_size_falls_back() {
        let mut defaults = StyleDefaults::default();
        defaults.apply(&StylePatch::font_size(0.0));
        assert!((defaults.font_size - FALLBACK_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sanitize_color() {
        assert_eq!(sanitize_color(" #aabbcc "), Some("#aabbcc".to_string()));
        assert_eq!(sanitize_color("teal"), Some("teal".to_string()));
        assert_eq!(sanitize_color("rgba(0, 0, 0, 0.5)"), Some("rgba(0, 0, 0, 0.5)".to_string()));
        assert_eq!(sanitize_color("red; position: fixed"), None);
        assert_eq!(sanitize_color("url(evil.png)"), None);
        assert_eq!(sanitize_color("expression(alert(1))"), None);
        assert_eq!(sanitize_color(""), None);
    }

    #[test]
    fn test_sanitized_patch_drops_bad_colors() {
        let patch = StylePatch {
            fill: Some("url(x)".to_string()),
            font_color: Some("#123456".to_string()),
            ..StylePatch::default()
        }
        .sanitized();
        assert!(patch.fill.is_none());
        assert_eq!(patch.font_color.as_deref(), Some("#123456"));
    }
}
