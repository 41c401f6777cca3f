//! Object arena with a z-ordered index.

use crate::error::{BoardError, BoardResult};
use crate::shapes::{
    Content, GeometryPatch, ImageRef, ObjectId, ObjectKind, ObjectStyle, StyleDefaults, StylePatch, VectorObject,
};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;

/// What to create. Missing content becomes the placeholder prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpec {
    pub kind: ObjectKind,
    pub position: Point,
    pub size: Size,
    pub content: Option<Content>,
}

impl ObjectSpec {
    /// Default spec for a kind, using the toolbar presets.
    pub fn new(kind: ObjectKind) -> Self {
        let size = match kind {
            ObjectKind::Rect => Size::new(220.0, 120.0),
            ObjectKind::Circle => Size::new(140.0, 140.0),
            ObjectKind::Text => Size::new(220.0, 80.0),
        };
        Self {
            kind,
            position: Point::new(120.0, 80.0),
            size,
            content: None,
        }
    }

    /// A rectangle showing an image.
    pub fn image(image: ImageRef) -> Self {
        Self {
            size: Size::new(260.0, 160.0),
            content: Some(Content::Image(image)),
            ..Self::new(ObjectKind::Rect)
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }
}

/// The authoritative object list.
///
/// Records live in a map keyed by id; `z_index` holds the ids sorted by
/// `(z, id)` and is kept in step on every insertion and removal.
#[derive(Debug, Clone)]
pub struct BoardDocument {
    objects: HashMap<ObjectId, VectorObject>,
    z_index: Vec<ObjectId>,
    next_id: u64,
    z_counter: u64,
    defaults: StyleDefaults,
}

impl Default for BoardDocument {
    fn default() -> Self {
        Self::new(StyleDefaults::default())
    }
}

impl BoardDocument {
    /// Create an empty document.
    pub fn new(defaults: StyleDefaults) -> Self {
        Self {
            objects: HashMap::new(),
            z_index: Vec::new(),
            next_id: 1,
            z_counter: 1,
            defaults,
        }
    }

    /// Style applied to new objects.
    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut StyleDefaults {
        &mut self.defaults
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn allocate_z(&mut self) -> u64 {
        self.z_counter += 1;
        self.z_counter
    }

    fn index_insert(&mut self, id: ObjectId, z: u64) {
        let objects = &self.objects;
        let pos = self
            .z_index
            .partition_point(|other| objects.get(other).map(|o| (o.z, *other)) < Some((z, id)));
        self.z_index.insert(pos, id);
    }

    /// Create an object above everything else.
    pub fn create(&mut self, spec: ObjectSpec) -> ObjectId {
        let id = self.allocate_id();
        let z = self.allocate_z();
        let object = VectorObject {
            id,
            kind: spec.kind,
            x: spec.position.x,
            y: spec.position.y,
            width: spec.size.width,
            height: spec.size.height,
            rotation: 0.0,
            content: spec.content.unwrap_or_default(),
            style: ObjectStyle::for_kind(spec.kind, &self.defaults),
            z,
        };
        self.objects.insert(id, object);
        self.index_insert(id, z);
        id
    }

    /// Add a fully described object under a fresh id, keeping its z.
    /// The z counter moves past it so later creations stay on top.
    pub fn adopt(&mut self, mut object: VectorObject) -> ObjectId {
        let id = self.allocate_id();
        object.id = id;
        self.z_counter = self.z_counter.max(object.z);
        let z = object.z;
        self.objects.insert(id, object);
        self.index_insert(id, z);
        id
    }

    /// Put back an object with its own id and z (history restore).
    fn reinsert(&mut self, object: VectorObject) {
        let (id, z) = (object.id, object.z);
        self.next_id = self.next_id.max(id.0 + 1);
        self.z_counter = self.z_counter.max(z);
        if self.objects.insert(id, object).is_some() {
            self.z_index.retain(|other| *other != id);
        }
        self.index_insert(id, z);
    }

    pub fn get(&self, id: ObjectId) -> Option<&VectorObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove an object.
    pub fn remove(&mut self, id: ObjectId) -> Option<VectorObject> {
        let removed = self.objects.remove(&id)?;
        self.z_index.retain(|other| *other != id);
        Some(removed)
    }

    /// Remove several objects, returning how many existed.
    pub fn remove_many(&mut self, ids: &[ObjectId]) -> usize {
        ids.iter().filter(|id| self.remove(**id).is_some()).count()
    }

    /// Remove every object. Counters keep running.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.z_index.clear();
    }

    /// Objects in render order (z ascending).
    pub fn ordered(&self) -> impl Iterator<Item = &VectorObject> {
        self.z_index.iter().filter_map(|id| self.objects.get(id))
    }

    /// Update an object's geometry. Returns whether anything changed.
    pub fn mutate_geometry(&mut self, id: ObjectId, patch: &GeometryPatch) -> BoardResult<bool> {
        let object = self.objects.get_mut(&id).ok_or(BoardError::UnknownObject(id))?;
        Ok(object.apply_geometry(patch))
    }

    /// Replace an object's content. Returns whether it changed.
    pub fn set_content(&mut self, id: ObjectId, content: Content) -> BoardResult<bool> {
        let object = self.objects.get_mut(&id).ok_or(BoardError::UnknownObject(id))?;
        if object.content == content {
            return Ok(false);
        }
        object.content = content;
        Ok(true)
    }

    /// Apply a style patch to the given objects. Returns how many changed.
    pub fn apply_style(&mut self, ids: &[ObjectId], patch: &StylePatch) -> usize {
        let mut changed = 0;
        for id in ids {
            if let Some(object) = self.objects.get_mut(id) {
                if object.style.apply(object.kind, patch) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Clone the given objects, offset by `offset`, each on a new top layer.
    /// Unknown ids are skipped. Returns the new ids in input order.
    pub fn duplicate(&mut self, ids: &[ObjectId], offset: Vec2) -> Vec<ObjectId> {
        let sources: Vec<VectorObject> = ids.iter().filter_map(|id| self.objects.get(id).cloned()).collect();
        sources
            .into_iter()
            .map(|mut clone| {
                let id = self.allocate_id();
                let z = self.allocate_z();
                clone.id = id;
                clone.z = z;
                clone.x += offset.x;
                clone.y += offset.y;
                self.objects.insert(id, clone);
                self.index_insert(id, z);
                id
            })
            .collect()
    }

    /// Objects whose shape contains `point`, top-most first.
    pub fn objects_at_point(&self, point: Point) -> Vec<ObjectId> {
        self.z_index
            .iter()
            .rev()
            .filter(|id| self.objects.get(*id).is_some_and(|o| o.hit_test(point)))
            .copied()
            .collect()
    }

    /// The top-most object at `point`.
    pub fn top_object_at(&self, point: Point) -> Option<ObjectId> {
        self.objects_at_point(point).into_iter().next()
    }

    /// Objects whose axis-aligned box overlaps `rect` with nonzero area,
    /// in render order. Rotation is ignored.
    pub fn objects_in_rect(&self, rect: Rect) -> Vec<ObjectId> {
        let rect = rect.abs();
        self.ordered()
            .filter(|o| {
                let overlap = rect.intersect(o.bounds());
                overlap.width() > 0.0 && overlap.height() > 0.0
            })
            .map(|o| o.id)
            .collect()
    }

    /// Copy of all records in render order.
    pub fn snapshot(&self) -> Vec<VectorObject> {
        self.ordered().cloned().collect()
    }

    /// Replace every record with the given list.
    pub fn restore(&mut self, objects: &[VectorObject]) {
        self.clear();
        for object in objects {
            self.reinsert(object.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_at(doc: &mut BoardDocument, x: f64, y: f64, w: f64, h: f64) -> ObjectId {
        doc.create(ObjectSpec::new(ObjectKind::Rect).at(x, y).sized(w, h))
    }

    #[test]
    fn test_create_assigns_monotonic_ids_and_z() {
        let mut doc = BoardDocument::default();
        let a = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        let b = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(a, ObjectId(1));
        assert_eq!(b, ObjectId(2));
        assert!(doc.get(b).unwrap().z() > doc.get(a).unwrap().z());
        assert_eq!(doc.get(a).unwrap().content, Content::default());
    }

    #[test]
    fn test_presets() {
        let mut doc = BoardDocument::default();
        let circle = doc.create(ObjectSpec::new(ObjectKind::Circle));
        let circle = doc.get(circle).unwrap();
        assert_eq!(circle.position(), Point::new(120.0, 80.0));
        assert_eq!(circle.size(), Size::new(140.0, 140.0));
        assert_eq!(circle.style.fill.as_deref(), Some("teal"));

        let image = ImageRef::parse("https://example.com/x.png").unwrap();
        let spec = ObjectSpec::image(image);
        assert_eq!(spec.kind, ObjectKind::Rect);
        assert_eq!(spec.size, Size::new(260.0, 160.0));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut doc = BoardDocument::default();
        let a = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        let b = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        let c = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        assert!(doc.remove(b).is_some());
        assert!(doc.remove(b).is_none());
        let order: Vec<_> = doc.ordered().map(|o| o.id()).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_top_object_wins() {
        let mut doc = BoardDocument::default();
        let _a = rect_at(&mut doc, 0.0, 0.0, 100.0, 100.0);
        let b = rect_at(&mut doc, 50.0, 50.0, 100.0, 100.0);
        assert_eq!(doc.top_object_at(Point::new(75.0, 75.0)), Some(b));
        assert_eq!(doc.objects_at_point(Point::new(75.0, 75.0)).len(), 2);
        assert_eq!(doc.top_object_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_objects_in_rect() {
        let mut doc = BoardDocument::default();
        let inside = rect_at(&mut doc, 10.0, 10.0, 20.0, 20.0);
        let _outside = rect_at(&mut doc, 300.0, 300.0, 20.0, 20.0);
        let straddling = rect_at(&mut doc, 90.0, 90.0, 40.0, 40.0);
        let _touching = rect_at(&mut doc, 100.0, 0.0, 20.0, 20.0);

        let hits = doc.objects_in_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(hits, vec![inside, straddling]);

        // Corners given in any order.
        let hits = doc.objects_in_rect(Rect::new(100.0, 100.0, 0.0, 0.0));
        assert_eq!(hits, vec![inside, straddling]);
    }

    #[test]
    fn test_duplicate_offsets_and_stacks() {
        let mut doc = BoardDocument::default();
        let a = rect_at(&mut doc, 80.0, 60.0, 260.0, 150.0);
        let copies = doc.duplicate(&[a, ObjectId(99)], Vec2::new(20.0, 20.0));
        assert_eq!(copies.len(), 1);
        let copy = doc.get(copies[0]).unwrap();
        assert_eq!(copy.bounds(), Rect::new(100.0, 80.0, 360.0, 230.0));
        assert!(copy.z() > doc.get(a).unwrap().z());
        assert_eq!(copy.style, doc.get(a).unwrap().style);
    }

    #[test]
    fn test_mutate_geometry_unknown_object() {
        let mut doc = BoardDocument::default();
        let result = doc.mutate_geometry(ObjectId(5), &GeometryPatch::rotation(10.0));
        assert!(matches!(result, Err(BoardError::UnknownObject(ObjectId(5)))));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut doc = BoardDocument::default();
        let a = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        let _b = rect_at(&mut doc, 5.0, 5.0, 10.0, 10.0);
        let snap = doc.snapshot();

        doc.remove(a);
        doc.mutate_geometry(ObjectId(2), &GeometryPatch::position(Point::new(40.0, 40.0)))
            .unwrap();
        doc.restore(&snap);
        assert_eq!(doc.snapshot(), snap);

        // Ids never repeat after a restore.
        let c = rect_at(&mut doc, 0.0, 0.0, 1.0, 1.0);
        assert_eq!(c, ObjectId(3));
    }

    #[test]
    fn test_adopt_keeps_z_and_bumps_counter() {
        let mut doc = BoardDocument::default();
        let a = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        let mut imported = doc.get(a).unwrap().clone();
        imported.z = 40;
        let adopted = doc.adopt(imported);
        assert_ne!(adopted, a);
        assert_eq!(doc.get(adopted).unwrap().z(), 40);

        let fresh = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(doc.get(fresh).unwrap().z(), 41);
    }

    #[test]
    fn test_set_content() {
        let mut doc = BoardDocument::default();
        let t = doc.create(ObjectSpec::new(ObjectKind::Text));
        assert!(doc.set_content(t, Content::text("Hello")).unwrap());
        assert!(!doc.set_content(t, Content::text("Hello")).unwrap());
        assert!(doc.set_content(ObjectId(40), Content::text("x")).is_err());
    }

    #[test]
    fn test_apply_style_counts_changes() {
        let mut doc = BoardDocument::default();
        let a = rect_at(&mut doc, 0.0, 0.0, 10.0, 10.0);
        let t = doc.create(ObjectSpec::new(ObjectKind::Text));
        assert_eq!(doc.apply_style(&[a, t], &StylePatch::fill("navy")), 1);
        assert_eq!(doc.apply_style(&[a, t], &StylePatch::font_color("#333333")), 2);
    }
}
