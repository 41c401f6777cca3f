//! Gesture state machine.
//!
//! Each gesture keeps the pointer position and the geometry it started
//! from. Every move recomputes the result from that origin, so rounding and
//! snapping never accumulate.

use crate::selection::SelectionRect;
use crate::shapes::{Content, ObjectId};
use crate::snap::SnapSettings;
use kurbo::{Point, Size, Vec2};

/// The single active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// A raster stroke is in progress.
    Drawing,
    /// View translation; positions are in device space.
    Panning { pointer_origin: Point, pan_origin: Vec2 },
    /// Rubber-band selection; the rectangle is in device space.
    Marquee { rect: SelectionRect, additive: bool },
    /// Moving the selection. Positions are in world space.
    Dragging {
        pointer_origin: Point,
        originals: Vec<(ObjectId, Point)>,
        /// Object to select alone if the press turns out to be a plain click.
        collapse_to: Option<ObjectId>,
    },
    /// Resizing one object from its bottom-right handle.
    Resizing {
        id: ObjectId,
        pointer_origin: Point,
        original: Size,
    },
    /// Turning one object around its center.
    Rotating {
        id: ObjectId,
        center: Point,
        pointer_origin_deg: f64,
        original_rotation: f64,
    },
    /// Content of one object is being edited by the host.
    TextEditing { id: ObjectId, original: Content },
}

/// Flat view of [`Interaction`] for hosts (cursor choice, toolbar state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Idle,
    Drawing,
    Panning,
    MarqueeDragging,
    ObjectDragging,
    ObjectResizing,
    ObjectRotating,
    TextEditing,
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::Idle => InteractionKind::Idle,
            Interaction::Drawing => InteractionKind::Drawing,
            Interaction::Panning { .. } => InteractionKind::Panning,
            Interaction::Marquee { .. } => InteractionKind::MarqueeDragging,
            Interaction::Dragging { .. } => InteractionKind::ObjectDragging,
            Interaction::Resizing { .. } => InteractionKind::ObjectResizing,
            Interaction::Rotating { .. } => InteractionKind::ObjectRotating,
            Interaction::TextEditing { .. } => InteractionKind::TextEditing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// The object under text edit, if any.
    pub fn editing(&self) -> Option<ObjectId> {
        match self {
            Interaction::TextEditing { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// New top-left corners for a group drag: every original moved by the same
/// delta, then snapped per object.
pub fn drag_positions(originals: &[(ObjectId, Point)], delta: Vec2, snap: &SnapSettings) -> Vec<(ObjectId, Point)> {
    originals
        .iter()
        .map(|(id, origin)| (*id, snap.point(*origin + delta)))
        .collect()
}

/// New size for a resize gesture, clamped to `min` before and after snapping.
pub fn resize_size(original: Size, delta: Vec2, min: Size, snap: &SnapSettings) -> Size {
    let width = (original.width + delta.x).max(min.width);
    let height = (original.height + delta.y).max(min.height);
    Size::new(
        snap.value(width).max(min.width),
        snap.value(height).max(min.height),
    )
}

/// Pointer direction from `center`, in degrees.
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    let d = pointer - center;
    d.y.atan2(d.x).to_degrees()
}

/// Rotation for a rotate gesture: the starting rotation plus the pointer's
/// angular travel plus the fixed handle correction, snapped if enabled.
pub fn rotation_angle(
    original_rotation: f64,
    pointer_origin_deg: f64,
    pointer_deg: f64,
    handle_offset_deg: f64,
    snap: &SnapSettings,
) -> f64 {
    snap.angle(original_rotation + (pointer_deg - pointer_origin_deg) + handle_offset_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapping(grid: f64) -> SnapSettings {
        SnapSettings {
            enabled: true,
            grid_size: grid,
            angle_step: 15.0,
        }
    }

    #[test]
    fn test_drag_moves_group_by_same_delta() {
        let originals = vec![(ObjectId(1), Point::new(10.0, 10.0)), (ObjectId(2), Point::new(100.0, 50.0))];
        let moved = drag_positions(&originals, Vec2::new(5.0, -3.0), &SnapSettings::default());
        assert_eq!(moved[0], (ObjectId(1), Point::new(15.0, 7.0)));
        assert_eq!(moved[1], (ObjectId(2), Point::new(105.0, 47.0)));
    }

    #[test]
    fn test_drag_snaps_per_object() {
        let originals = vec![(ObjectId(1), Point::new(10.0, 10.0)), (ObjectId(2), Point::new(31.0, 50.0))];
        let moved = drag_positions(&originals, Vec2::new(5.0, 0.0), &snapping(12.0));
        assert_eq!(moved[0].1, Point::new(12.0, 12.0));
        assert_eq!(moved[1].1, Point::new(36.0, 48.0));
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let min = Size::new(20.0, 12.0);
        let size = resize_size(Size::new(100.0, 50.0), Vec2::new(-500.0, -500.0), min, &SnapSettings::default());
        assert_eq!(size, min);

        let size = resize_size(Size::new(100.0, 50.0), Vec2::new(10.5, 4.0), min, &SnapSettings::default());
        assert_eq!(size, Size::new(110.5, 54.0));
    }

    #[test]
    fn test_resize_snap_never_drops_below_minimum() {
        let min = Size::new(20.0, 12.0);
        let size = resize_size(Size::new(30.0, 30.0), Vec2::new(-10.0, -18.0), min, &snapping(50.0));
        assert_eq!(size, Size::new(20.0, 12.0));
    }

    #[test]
    fn test_rotation_keeps_handle_offset() {
        let center = Point::new(0.0, 0.0);
        let start = pointer_angle(center, Point::new(0.0, -10.0));
        assert!((start - -90.0).abs() < 1e-9);

        // Grabbing the handle without moving already applies the offset.
        let angle = rotation_angle(0.0, start, start, 90.0, &SnapSettings::default());
        assert!((angle - 90.0).abs() < 1e-9);

        let now = pointer_angle(center, Point::new(10.0, 0.0));
        let angle = rotation_angle(30.0, start, now, 90.0, &SnapSettings::default());
        assert!((angle - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_snaps() {
        let angle = rotation_angle(0.0, 0.0, 8.0, 90.0, &snapping(12.0));
        assert!((angle - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Interaction::Idle.kind(), InteractionKind::Idle);
        let editing = Interaction::TextEditing {
            id: ObjectId(3),
            original: Content::default(),
        };
        assert_eq!(editing.kind(), InteractionKind::TextEditing);
        assert_eq!(editing.editing(), Some(ObjectId(3)));
        assert!(Interaction::default().is_idle());
    }
}
