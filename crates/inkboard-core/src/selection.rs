//! Selection set, marquee rectangle and manipulation handles.

use crate::document::BoardDocument;
use crate::shapes::{ObjectId, VectorObject};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in device pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// Distance from the top edge to the rotation handle (in world units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Ordered set of selected object ids. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ObjectId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    /// Add an id at the end unless already selected.
    pub fn add(&mut self, id: ObjectId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: ObjectId) {
        self.ids.retain(|other| *other != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with a single object.
    pub fn select_single(&mut self, id: ObjectId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Replace the selection with the given ids, in order.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    /// Add the object if absent, remove it if present.
    pub fn toggle(&mut self, id: ObjectId) {
        if self.contains(id) {
            self.remove(id);
        } else {
            self.ids.push(id);
        }
    }

    /// Select every object whose bounding box overlaps `rect`.
    /// With `additive` the hits are added to the current selection.
    pub fn marquee_select(&mut self, document: &BoardDocument, rect: Rect, additive: bool) {
        if !additive {
            self.ids.clear();
        }
        for id in document.objects_in_rect(rect) {
            self.add(id);
        }
    }

    /// Drop ids that no longer exist in the document.
    pub fn retain_existing(&mut self, document: &BoardDocument) {
        self.ids.retain(|id| document.contains(*id));
    }
}

/// Rubber-band rectangle between the press point and the current pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: Point,
    pub current: Point,
}

impl SelectionRect {
    pub fn new(start: Point) -> Self {
        Self { start, current: start }
    }

    /// Normalized rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

/// Manipulation handles shown on selected objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Bottom-right corner; drags width and height.
    Resize,
    /// Above the top edge; turns the object around its center.
    Rotate,
}

/// A handle with its world position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    /// Check if a world point is within `tolerance` of this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handles for an object, placed in its rotated frame.
pub fn get_handles(object: &VectorObject) -> [Handle; 2] {
    let bounds = object.bounds();
    let top_center = Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET);
    [
        Handle {
            position: object.to_world(Point::new(bounds.x1, bounds.y1)),
            kind: HandleKind::Resize,
        },
        Handle {
            position: object.to_world(top_center),
            kind: HandleKind::Rotate,
        },
    ]
}

/// Find the handle under a world point among the selected objects, checking
/// the top-most object first. `tolerance` is in world units.
pub fn hit_test_handles(
    document: &BoardDocument,
    selection: &Selection,
    point: Point,
    tolerance: f64,
) -> Option<(ObjectId, HandleKind)> {
    let mut candidates: Vec<&VectorObject> = selection.ids().iter().filter_map(|id| document.get(*id)).collect();
    candidates.sort_by_key(|o| std::cmp::Reverse((o.z(), o.id())));
    candidates.into_iter().find_map(|object| {
        get_handles(object)
            .into_iter()
            .find(|h| h.hit_test(point, tolerance))
            .map(|h| (object.id(), h.kind))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ObjectSpec;
    use crate::shapes::{GeometryPatch, ObjectKind};

    #[test]
    fn test_select_single_and_toggle() {
        let mut sel = Selection::new();
        sel.select_single(ObjectId(1));
        sel.toggle(ObjectId(2));
        sel.toggle(ObjectId(3));
        assert_eq!(sel.ids(), &[ObjectId(1), ObjectId(2), ObjectId(3)]);
        sel.toggle(ObjectId(2));
        assert_eq!(sel.ids(), &[ObjectId(1), ObjectId(3)]);
        sel.select_single(ObjectId(3));
        assert_eq!(sel.ids(), &[ObjectId(3)]);
    }

    #[test]
    fn test_marquee_select() {
        let mut doc = BoardDocument::default();
        let a = doc.create(ObjectSpec::new(ObjectKind::Rect).at(10.0, 10.0).sized(20.0, 20.0));
        let b = doc.create(ObjectSpec::new(ObjectKind::Rect).at(500.0, 500.0).sized(20.0, 20.0));
        let c = doc.create(ObjectSpec::new(ObjectKind::Circle).at(90.0, 40.0).sized(40.0, 40.0));

        let mut sel = Selection::new();
        sel.select_single(b);
        sel.marquee_select(&doc, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        assert_eq!(sel.ids(), &[a, c]);

        sel.select_single(b);
        sel.marquee_select(&doc, Rect::new(0.0, 0.0, 100.0, 100.0), true);
        assert_eq!(sel.ids(), &[b, a, c]);
    }

    #[test]
    fn test_selection_rect_normalizes() {
        let mut rect = SelectionRect::new(Point::new(50.0, 50.0));
        rect.current = Point::new(10.0, 80.0);
        assert_eq!(rect.to_rect(), Rect::new(10.0, 50.0, 50.0, 80.0));
    }

    #[test]
    fn test_handles_follow_rotation() {
        let mut doc = BoardDocument::default();
        let id = doc.create(ObjectSpec::new(ObjectKind::Rect).at(0.0, 0.0).sized(100.0, 50.0));
        let [resize, rotate] = get_handles(doc.get(id).unwrap());
        assert_eq!(resize.position, Point::new(100.0, 50.0));
        assert_eq!(rotate.position, Point::new(50.0, -25.0));

        doc.mutate_geometry(id, &GeometryPatch::rotation(180.0)).unwrap();
        let [resize, _] = get_handles(doc.get(id).unwrap());
        assert!((resize.position.x - 0.0).abs() < 1e-9);
        assert!((resize.position.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_handles_only_on_selected() {
        let mut doc = BoardDocument::default();
        let id = doc.create(ObjectSpec::new(ObjectKind::Rect).at(0.0, 0.0).sized(100.0, 50.0));
        let mut sel = Selection::new();
        assert_eq!(hit_test_handles(&doc, &sel, Point::new(101.0, 51.0), 5.0), None);

        sel.select_single(id);
        assert_eq!(
            hit_test_handles(&doc, &sel, Point::new(101.0, 51.0), 5.0),
            Some((id, HandleKind::Resize))
        );
        assert_eq!(
            hit_test_handles(&doc, &sel, Point::new(50.0, -22.0), 5.0),
            Some((id, HandleKind::Rotate))
        );
    }
}
