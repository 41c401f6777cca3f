//! Vector objects layered above the raster surface.

mod content;
mod style;

pub use content::{Content, ContentError, ImageRef, PLACEHOLDER_TEXT};
pub use style::{ObjectStyle, StyleDefaults, StylePatch, sanitize_color};

use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique object identifier, assigned from a monotonic per-session counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj{}", self.0)
    }
}

/// The kind of a vector object. All kinds share the same box geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Rect,
    Circle,
    Text,
}

impl ObjectKind {
    /// Name used in exported documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Circle => "circle",
            ObjectKind::Text => "text",
        }
    }

    /// Parse a document type name. Anything unrecognised is a rectangle.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "circle" => ObjectKind::Circle,
            "text" => ObjectKind::Text,
            _ => ObjectKind::Rect,
        }
    }

    /// Whether fill and border colours apply to this kind.
    pub fn is_shape(self) -> bool {
        matches!(self, ObjectKind::Rect | ObjectKind::Circle)
    }
}

/// Partial geometry update. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Rotation in degrees.
    pub rotation: Option<f64>,
}

impl GeometryPatch {
    /// Patch that moves an object to a new top-left corner.
    pub fn position(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }

    /// Patch that resizes an object.
    pub fn size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            ..Self::default()
        }
    }

    /// Patch that sets the rotation.
    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }
}

/// A manipulable shape or text block.
///
/// `x`/`y` is the top-left corner of the unrotated box in world units, and
/// `rotation` (degrees) turns the box around its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObject {
    pub(crate) id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub content: Content,
    pub style: ObjectStyle,
    pub(crate) z: u64,
}

impl VectorObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Stacking order; higher values render above lower ones.
    pub fn z(&self) -> u64 {
        self.z
    }

    /// Top-left corner of the unrotated box.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Axis-aligned box ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Map a world point into the object's unrotated frame.
    pub fn to_local(&self, point: Point) -> Point {
        Affine::rotate_about(-self.rotation.to_radians(), self.center()) * point
    }

    /// Map a point from the object's unrotated frame back into the world.
    pub fn to_world(&self, local: Point) -> Point {
        Affine::rotate_about(self.rotation.to_radians(), self.center()) * local
    }

    /// Check whether a world point lies on the object, honouring rotation.
    /// Circles use an ellipse test inscribed in the box.
    pub fn hit_test(&self, point: Point) -> bool {
        let local = self.to_local(point);
        let bounds = self.bounds();
        match self.kind {
            ObjectKind::Circle => {
                let rx = bounds.width() / 2.0;
                let ry = bounds.height() / 2.0;
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let c = bounds.center();
                let dx = (local.x - c.x) / rx;
                let dy = (local.y - c.y) / ry;
                dx * dx + dy * dy <= 1.0
            }
            ObjectKind::Rect | ObjectKind::Text => {
                local.x >= bounds.x0 && local.x <= bounds.x1 && local.y >= bounds.y0 && local.y <= bounds.y1
            }
        }
    }

    /// Apply a geometry patch. Returns true when anything changed.
    pub fn apply_geometry(&mut self, patch: &GeometryPatch) -> bool {
        let mut changed = false;
        let mut set = |field: &mut f64, value: Option<f64>| {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                if (*field - v).abs() > f64::EPSILON {
                    *field = v;
                    changed = true;
                }
            }
        };
        set(&mut self.x, patch.x);
        set(&mut self.y, patch.y);
        set(&mut self.width, patch.width.filter(|w| w.is_finite()).map(|w| w.max(0.0)));
        set(&mut self.height, patch.height.filter(|h| h.is_finite()).map(|h| h.max(0.0)));
        set(&mut self.rotation, patch.rotation);
        changed
    }

    /// Whether the object's content is an image reference.
    pub fn is_image(&self) -> bool {
        matches!(self.content, Content::Image(_))
    }
}
