//! Tool selection and brush settings.

use serde::{Deserialize, Serialize};

/// Available tools.
///
/// Objects stay interactive whichever tool is active; the tool only decides
/// what a press on empty background does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Highlighter,
    Eraser,
    Select,
}

impl ToolKind {
    /// The brush a drawing tool paints with, `None` for the select tool.
    pub fn brush(self) -> Option<BrushKind> {
        match self {
            ToolKind::Pen => Some(BrushKind::Pen),
            ToolKind::Highlighter => Some(BrushKind::Highlighter),
            ToolKind::Eraser => Some(BrushKind::Eraser),
            ToolKind::Select => None,
        }
    }

    /// Parse a tool name as used by host toolbars.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pen" => Some(ToolKind::Pen),
            "highlighter" => Some(ToolKind::Highlighter),
            "eraser" => Some(ToolKind::Eraser),
            "select" => Some(ToolKind::Select),
            _ => None,
        }
    }
}

/// How a stroke affects the raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushKind {
    /// Alpha-blended stroke in the brush colour.
    Pen,
    /// Wide translucent yellow stroke with blunt ends and a soft glow.
    Highlighter,
    /// Removes alpha instead of painting.
    Eraser,
}

/// Brush controls shared by all drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Pen colour as RGB, written as `#rrggbb` in config files.
    #[serde(with = "hex_color")]
    pub color: [u8; 3],
    /// Stroke width in world units (the highlighter widens this).
    pub size: f64,
    /// Pen opacity in 0..=1.
    pub opacity: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: [0, 0, 0],
            size: 4.0,
            opacity: 1.0,
        }
    }
}

impl BrushSettings {
    /// Set the colour from a `#rrggbb` string. Returns false if it does not parse.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        match parse_hex_color(hex) {
            Some(rgb) => {
                self.color = rgb;
                true
            }
            None => false,
        }
    }
}

/// Parse a `#rrggbb` colour.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let s = s.trim();
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(rgb: &[u8; 3], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 3], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex_color(&s).ok_or_else(|| D::Error::custom(format!("invalid colour {s:?}, expected #rrggbb")))
    }
}

/// Current tool plus brush settings.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub brush: BrushSettings,
}

impl ToolManager {
    pub fn new(brush: BrushSettings) -> Self {
        Self {
            current_tool: ToolKind::default(),
            brush,
        }
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("Tool changed to {:?}", tool);
        self.current_tool = tool;
    }

    /// Whether background presses start a stroke.
    pub fn is_drawing_tool(&self) -> bool {
        self.current_tool.brush().is_some()
    }
}
