//! JSON import and export of the vector object list.
//!
//! The document is an array of flat records, one per object, in stacking
//! order. Raster pixels and the selection are not part of it.
//!
//! Import is two-phase: every entry is validated and turned into a
//! [`VectorObject`] first, and only a fully valid document is handed to the
//! caller for insertion. A bad entry anywhere leaves the board untouched.

use crate::document::BoardDocument;
use crate::shapes::{Content, ObjectId, ObjectKind, ObjectStyle, StyleDefaults, VectorObject, sanitize_color};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading an object document.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("document is not a list of objects")]
    NotAList,
    #[error("entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Style block of an exported object. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportedCss {
    pub background: String,
    pub border_color: String,
    /// CSS length, e.g. `"16px"`.
    pub font_size: String,
    pub color: String,
}

/// One record of the exchange document.
///
/// Missing fields take the creation defaults. `id` is informational only:
/// imported objects always receive fresh ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportedObject {
    pub id: Value,
    #[serde(rename = "type")]
    pub kind: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    pub angle: f64,
    pub html: String,
    pub css: ExportedCss,
    pub z: i64,
}

impl Default for ExportedObject {
    fn default() -> Self {
        Self {
            id: Value::Null,
            kind: ObjectKind::Rect.as_str().to_string(),
            left: 120.0,
            top: 80.0,
            width: 220.0,
            height: 120.0,
            angle: 0.0,
            html: String::new(),
            css: ExportedCss::default(),
            z: 1,
        }
    }
}

impl ExportedObject {
    /// Flatten an object into a record.
    pub fn from_object(object: &VectorObject) -> Self {
        Self {
            id: Value::String(object.id().to_string()),
            kind: object.kind.as_str().to_string(),
            left: object.x,
            top: object.y,
            width: object.width,
            height: object.height,
            angle: object.rotation,
            html: object.content.to_markup(),
            css: ExportedCss {
                background: object.style.fill.clone().unwrap_or_default(),
                border_color: object.style.border_color.clone().unwrap_or_default(),
                font_size: format!("{}px", object.style.font_size),
                color: object.style.font_color.clone(),
            },
            z: i64::try_from(object.z()).unwrap_or(i64::MAX),
        }
    }

    /// Build an object from this record. Unknown types become rectangles,
    /// markup is reduced to safe content and colours that are not plain CSS
    /// colours are dropped in favour of the defaults.
    pub fn to_object(&self, defaults: &StyleDefaults) -> Result<VectorObject, String> {
        for (name, value) in [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
            ("angle", self.angle),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} is not a finite number"));
            }
        }

        let kind = ObjectKind::from_type_name(&self.kind);
        let mut style = ObjectStyle::for_kind(kind, defaults);
        if kind.is_shape() {
            if let Some(fill) = non_empty_color(&self.css.background) {
                style.fill = Some(fill);
            }
            if let Some(border) = non_empty_color(&self.css.border_color) {
                style.border_color = Some(border);
            }
        }
        if let Some(size) = parse_css_px(&self.css.font_size) {
            style.font_size = size;
        }
        if let Some(color) = non_empty_color(&self.css.color) {
            style.font_color = color;
        }

        let content = if self.html.trim().is_empty() {
            Content::default()
        } else {
            Content::from_markup(&self.html)
        };

        Ok(VectorObject {
            id: ObjectId(0),
            kind,
            x: self.left,
            y: self.top,
            width: self.width.max(0.0),
            height: self.height.max(0.0),
            rotation: self.angle,
            content,
            style,
            z: self.z.max(1) as u64,
        })
    }
}

fn non_empty_color(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let color = sanitize_color(value);
    if color.is_none() {
        log::warn!("Ignoring unsafe colour value {:?}", value);
    }
    color
}

/// Parse a CSS pixel length such as `"16px"` or `"16"`.
fn parse_css_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// Serialize the document's objects in stacking order.
pub fn export_objects(document: &BoardDocument) -> Vec<ExportedObject> {
    document.ordered().map(ExportedObject::from_object).collect()
}

/// Serialize the document's objects as pretty-printed JSON.
pub fn export_json(document: &BoardDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export_objects(document))
}

/// Validate a JSON document and build its objects without touching any board.
pub fn parse_objects(json: &str, defaults: &StyleDefaults) -> ImportResult<Vec<VectorObject>> {
    let value: Value = serde_json::from_str(json)?;
    objects_from_value(value, defaults)
}

/// Validate an already parsed document and build its objects.
pub fn objects_from_value(value: Value, defaults: &StyleDefaults) -> ImportResult<Vec<VectorObject>> {
    let Value::Array(entries) = value else {
        return Err(ImportError::NotAList);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.is_object() {
                return Err(ImportError::InvalidEntry {
                    index,
                    reason: "expected an object".to_string(),
                });
            }
            let record: ExportedObject = serde_json::from_value(entry).map_err(|e| ImportError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;
            record
                .to_object(defaults)
                .map_err(|reason| ImportError::InvalidEntry { index, reason })
        })
        .collect()
}
