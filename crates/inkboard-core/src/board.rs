//! The whiteboard session.
//!
//! [`Whiteboard`] owns every engine component and is the only type hosts
//! need: it turns pointer and keyboard events into gestures, runs the board
//! operations and decides when history is captured.
//!
//! Capture points are stroke end (deferred to the next [`Whiteboard::tick`]),
//! object creation, a drag/resize/rotate that changed geometry, a text edit
//! that changed content, duplicate, delete, import, clear, a canvas load and
//! a completed image load.

use crate::camera::{Camera, WorldSize};
use crate::config::BoardConfig;
use crate::document::{BoardDocument, ObjectSpec};
use crate::error::BoardResult;
use crate::history::{History, HistoryEntry};
use crate::images::{ImageLoadState, ImageLoads};
use crate::input::{Command, InputState, Key, KeyInput, MouseButton, PointerInput, shortcut_command};
use crate::interaction::{Interaction, InteractionKind, drag_positions, pointer_angle, resize_size, rotation_angle};
use crate::io::{self, ExportedObject};
use crate::raster::RasterSurface;
use crate::selection::{HandleKind, Selection, SelectionRect, hit_test_handles};
use crate::shapes::{
    Content, GeometryPatch, ImageRef, ObjectId, ObjectKind, StyleDefaults, StylePatch, VectorObject,
};
use crate::snap::SnapSettings;
use crate::tools::{BrushSettings, ToolKind, ToolManager};
use kurbo::{Point, Rect, Size, Vec2};
use serde_json::Value;

/// A whiteboard editing session.
#[derive(Debug)]
pub struct Whiteboard {
    config: BoardConfig,
    camera: Camera,
    raster: RasterSurface,
    document: BoardDocument,
    selection: Selection,
    tools: ToolManager,
    snap: SnapSettings,
    history: History,
    interaction: Interaction,
    input: InputState,
    /// A finished stroke waits for the next tick to be captured.
    capture_pending: bool,
    images: ImageLoads,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Whiteboard {
    /// Create a session and capture its baseline state.
    pub fn new(config: BoardConfig) -> Self {
        let world = WorldSize::new(config.world_min_width, config.world_min_height);
        let mut board = Self {
            camera: Camera::new(),
            raster: RasterSurface::new(world),
            document: BoardDocument::new(config.style.clone()),
            selection: Selection::new(),
            tools: ToolManager::new(config.brush),
            snap: config.snap,
            history: History::new(config.history_capacity),
            interaction: Interaction::Idle,
            input: InputState::with_double_click(config.double_click_ms, config.double_click_distance),
            capture_pending: false,
            images: ImageLoads::new(),
            config,
        };
        if board.config.seed_demo_objects {
            board.seed_demo_objects();
        }
        board.capture();
        board
    }

    fn seed_demo_objects(&mut self) {
        for spec in [
            ObjectSpec::new(ObjectKind::Rect).at(80.0, 60.0).sized(260.0, 150.0),
            ObjectSpec::new(ObjectKind::Circle).at(420.0, 120.0).sized(160.0, 160.0),
            ObjectSpec::new(ObjectKind::Text).at(120.0, 320.0).sized(260.0, 110.0),
        ] {
            self.document.create(spec);
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn world_size(&self) -> WorldSize {
        self.raster.size()
    }

    pub fn raster(&self) -> &RasterSurface {
        &self.raster
    }

    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    /// Objects in render order.
    pub fn objects(&self) -> impl Iterator<Item = &VectorObject> {
        self.document.ordered()
    }

    pub fn object(&self, id: ObjectId) -> Option<&VectorObject> {
        self.document.get(id)
    }

    /// Selected ids in selection order.
    pub fn selection(&self) -> &[ObjectId] {
        self.selection.ids()
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.tools.brush
    }

    pub fn snap(&self) -> &SnapSettings {
        &self.snap
    }

    pub fn style_defaults(&self) -> &StyleDefaults {
        self.document.defaults()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn interaction_kind(&self) -> InteractionKind {
        self.interaction.kind()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether Space is held for panning.
    pub fn is_space_held(&self) -> bool {
        self.input.space_held
    }

    // --- Tools and settings ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    /// Set the pen colour from `#rrggbb`. Returns false if it does not parse.
    pub fn set_brush_color(&mut self, hex: &str) -> bool {
        self.tools.brush.set_color_hex(hex)
    }

    pub fn set_brush_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.tools.brush.size = size;
        }
    }

    pub fn set_brush_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.tools.brush.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap.enabled = enabled;
    }

    pub fn set_grid_size(&mut self, grid_size: f64) {
        if grid_size.is_finite() && grid_size > 0.0 {
            self.snap.grid_size = grid_size;
        }
    }

    // --- History ---

    /// Record the current raster and objects as a new history state.
    /// Does nothing while captures are suppressed.
    pub fn capture(&mut self) -> bool {
        if self.history.is_suppressed() {
            return false;
        }
        self.capture_pending = false;
        let entry = HistoryEntry {
            raster: self.raster.snapshot(),
            objects: self.document.snapshot(),
        };
        self.history.push(entry)
    }

    /// Run `f` with history capture suppressed. The previous setting is put
    /// back when `f` returns or unwinds.
    pub fn with_capture_suppressed<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.history.set_suppressed(true);
        let mut guard = SuppressedCaptures { board: self, previous };
        f(&mut *guard.board)
    }

    /// Per-frame hook. Performs the capture deferred from the last stroke end.
    /// Returns true if a capture happened.
    pub fn tick(&mut self) -> bool {
        if self.capture_pending {
            self.capture()
        } else {
            false
        }
    }

    /// Whether a finished stroke is waiting for [`Whiteboard::tick`].
    pub fn has_pending_capture(&self) -> bool {
        self.capture_pending
    }

    /// Step back to the previous state. Needs a state besides the baseline.
    pub fn undo(&mut self) -> bool {
        self.settle_for_history();
        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.restore_entry(&entry);
        log::debug!("Undo ({} undo, {} redo)", self.history.undo_len(), self.history.redo_len());
        true
    }

    /// Re-apply the last undone state.
    pub fn redo(&mut self) -> bool {
        self.settle_for_history();
        let Some(entry) = self.history.redo().cloned() else {
            return false;
        };
        self.restore_entry(&entry);
        log::debug!("Redo ({} undo, {} redo)", self.history.undo_len(), self.history.redo_len());
        true
    }

    /// Finish whatever is in flight so the history top matches the live state.
    fn settle_for_history(&mut self) {
        if self.interaction.editing().is_some() {
            self.commit_text_edit();
        }
        if self.raster.is_stroking() && self.raster.end_stroke() {
            self.capture_pending = true;
        }
        let gesture = std::mem::take(&mut self.interaction);
        if self.capture_pending {
            self.capture();
        }
        self.commit_gesture(gesture);
    }

    fn restore_entry(&mut self, entry: &HistoryEntry) {
        self.with_capture_suppressed(|board| {
            board.raster.restore(&entry.raster);
            board.document.restore(&entry.objects);
            board.selection.clear();
            board.images.register_objects(&entry.objects);
        });
    }

    // --- Objects ---

    /// Create an object above all others and make it the only selection.
    pub fn create(&mut self, spec: ObjectSpec) -> ObjectId {
        let id = self.document.create(spec);
        self.images.register_objects(self.document.get(id));
        self.selection.select_single(id);
        log::debug!("Created {}", id);
        self.capture();
        id
    }

    /// Create an object showing an image. Only `http`, `https` and
    /// `data:image/*` sources are accepted.
    pub fn add_image(&mut self, src: &str) -> BoardResult<ObjectId> {
        let image = ImageRef::parse(src)?;
        Ok(self.create(ObjectSpec::image(image)))
    }

    /// Change an object's geometry, capturing if anything changed.
    pub fn mutate_geometry(&mut self, id: ObjectId, patch: &GeometryPatch) -> BoardResult<bool> {
        let changed = self.document.mutate_geometry(id, patch)?;
        if changed {
            self.capture();
        }
        Ok(changed)
    }

    /// Apply a style change.
    ///
    /// With a selection the patch goes to the selected objects (font colour to
    /// all, font size to text, fill and border to shapes) and the count of
    /// changed objects is returned. With nothing selected the patch becomes
    /// the default for future objects and 0 is returned. Style changes are
    /// not captured.
    pub fn mutate_style(&mut self, patch: StylePatch) -> usize {
        let patch = patch.sanitized();
        if patch.is_empty() {
            return 0;
        }
        if self.selection.is_empty() {
            self.document.defaults_mut().apply(&patch);
            log::debug!("Updated style defaults: {:?}", self.document.defaults());
            0
        } else {
            self.document.apply_style(self.selection.ids(), &patch)
        }
    }

    /// Clone the selection offset by the configured delta and select the
    /// copies. No-op with an empty selection.
    pub fn duplicate_selected(&mut self) -> Vec<ObjectId> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let copies = self.document.duplicate(self.selection.ids(), offset);
        if copies.is_empty() {
            return copies;
        }
        self.selection.set(copies.iter().copied());
        self.capture();
        copies
    }

    /// Delete the selected objects. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        self.delete(&ids)
    }

    /// Delete objects by id. Returns how many existed.
    pub fn delete(&mut self, ids: &[ObjectId]) -> usize {
        let removed = self.document.remove_many(ids);
        if removed == 0 {
            return 0;
        }
        if self.targets_missing_object() {
            self.interaction = Interaction::Idle;
        }
        self.selection.retain_existing(&self.document);
        self.capture();
        removed
    }

    fn targets_missing_object(&self) -> bool {
        let missing = |id: &ObjectId| !self.document.contains(*id);
        match &self.interaction {
            Interaction::Dragging { originals, .. } => originals.iter().any(|(id, _)| missing(id)),
            Interaction::Resizing { id, .. } | Interaction::Rotating { id, .. } | Interaction::TextEditing { id, .. } => {
                missing(id)
            }
            _ => false,
        }
    }

    // --- Selection ---

    /// Select only `id`. Returns false if it does not exist.
    pub fn select_single(&mut self, id: ObjectId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selection.select_single(id);
        true
    }

    /// Add or remove `id` from the selection. Returns false if it does not exist.
    pub fn toggle_selection(&mut self, id: ObjectId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selection.toggle(id);
        true
    }

    /// Select the objects whose boxes overlap a world rectangle.
    pub fn marquee_select(&mut self, world_rect: Rect, additive: bool) {
        self.selection.marquee_select(&self.document, world_rect, additive);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Pointer input ---

    /// Handle a pointer press in device coordinates.
    pub fn pointer_down(&mut self, input: &PointerInput) {
        let world = self.camera.to_world(input.position);
        let double_click = self.input.clicks.press(input);

        // Pressing anywhere but the edited object ends the edit.
        if let Some(editing) = self.interaction.editing() {
            if self.document.top_object_at(world) == Some(editing) {
                return;
            }
            self.commit_text_edit();
        }
        if !self.interaction.is_idle() {
            return;
        }

        if input.button == MouseButton::Middle {
            self.begin_pan(input.position);
            return;
        }
        if input.button != MouseButton::Left {
            return;
        }

        // Handles take precedence over object bodies.
        let tolerance = self.camera.device_len_to_world(self.config.handle_tolerance);
        if let Some((id, handle)) = hit_test_handles(&self.document, &self.selection, world, tolerance) {
            self.begin_handle_gesture(id, handle, world);
            return;
        }

        if let Some(id) = self.document.top_object_at(world) {
            if double_click && self.begin_text_edit(id) {
                return;
            }
            self.begin_drag(id, world, input.modifiers.shift);
            return;
        }

        // Space turns a background press into a pan.
        if self.input.space_held {
            self.begin_pan(input.position);
            return;
        }

        match self.tools.current_tool.brush() {
            Some(kind) => {
                self.raster.begin_stroke(kind, &self.tools.brush, world);
                self.interaction = Interaction::Drawing;
            }
            None => {
                let additive = input.modifiers.shift;
                if !additive {
                    self.selection.clear();
                }
                self.interaction = Interaction::Marquee {
                    rect: SelectionRect::new(input.position),
                    additive,
                };
            }
        }
    }

    fn begin_pan(&mut self, pointer_origin: Point) {
        self.interaction = Interaction::Panning {
            pointer_origin,
            pan_origin: self.camera.pan,
        };
    }

    fn begin_handle_gesture(&mut self, id: ObjectId, handle: HandleKind, world: Point) {
        let Some(object) = self.document.get(id) else {
            return;
        };
        self.interaction = match handle {
            HandleKind::Resize => Interaction::Resizing {
                id,
                pointer_origin: world,
                original: object.size(),
            },
            HandleKind::Rotate => {
                let center = object.center();
                Interaction::Rotating {
                    id,
                    center,
                    pointer_origin_deg: pointer_angle(center, world),
                    original_rotation: object.rotation,
                }
            }
        };
    }

    fn begin_drag(&mut self, id: ObjectId, world: Point, shift: bool) {
        let mut collapse_to = None;
        if shift {
            self.selection.toggle(id);
        } else if !self.selection.contains(id) {
            self.selection.select_single(id);
        } else if self.selection.len() > 1 {
            collapse_to = Some(id);
        }

        let originals: Vec<(ObjectId, Point)> = self
            .selection
            .ids()
            .iter()
            .filter_map(|sid| self.document.get(*sid))
            .map(|o| (o.id(), o.position()))
            .collect();
        if originals.is_empty() {
            return;
        }
        self.interaction = Interaction::Dragging {
            pointer_origin: world,
            originals,
            collapse_to,
        };
    }

    /// Handle pointer movement. Gestures keep following the pointer wherever
    /// it goes until release.
    pub fn pointer_move(&mut self, input: &PointerInput) {
        let world = self.camera.to_world(input.position);
        let min_size = self.config.min_object_size();
        let handle_offset = self.config.rotation_handle_offset;

        match &mut self.interaction {
            Interaction::Idle | Interaction::TextEditing { .. } => {}
            Interaction::Drawing => {
                self.raster.extend_stroke(world);
            }
            Interaction::Panning {
                pointer_origin,
                pan_origin,
            } => {
                self.camera.pan = *pan_origin + (input.position - *pointer_origin);
            }
            Interaction::Marquee { rect, .. } => {
                rect.current = input.position;
            }
            Interaction::Dragging {
                pointer_origin,
                originals,
                ..
            } => {
                for (id, position) in drag_positions(originals, world - *pointer_origin, &self.snap) {
                    apply_gesture(&mut self.document, id, &GeometryPatch::position(position));
                }
            }
            Interaction::Resizing {
                id,
                pointer_origin,
                original,
            } => {
                let size = resize_size(*original, world - *pointer_origin, min_size, &self.snap);
                apply_gesture(&mut self.document, *id, &GeometryPatch::size(size));
            }
            Interaction::Rotating {
                id,
                center,
                pointer_origin_deg,
                original_rotation,
            } => {
                let angle = rotation_angle(
                    *original_rotation,
                    *pointer_origin_deg,
                    pointer_angle(*center, world),
                    handle_offset,
                    &self.snap,
                );
                apply_gesture(&mut self.document, *id, &GeometryPatch::rotation(angle));
            }
        }
    }

    /// Handle a pointer release, committing the active gesture.
    pub fn pointer_up(&mut self, input: &PointerInput) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Panning { .. } => {}
            editing @ Interaction::TextEditing { .. } => {
                self.interaction = editing;
            }
            Interaction::Drawing => {
                if self.raster.end_stroke() {
                    // Captured on the next tick so the last segment is included.
                    self.capture_pending = true;
                }
            }
            Interaction::Marquee { mut rect, additive } => {
                rect.current = input.position;
                let device = rect.to_rect();
                let world_rect = Rect::from_points(
                    self.camera.to_world(Point::new(device.x0, device.y0)),
                    self.camera.to_world(Point::new(device.x1, device.y1)),
                );
                self.selection
                    .marquee_select(&self.document, world_rect, additive || input.modifiers.shift);
            }
            gesture => {
                self.commit_gesture(gesture);
            }
        }
    }

    /// End a drag, resize or rotate, capturing once if geometry changed.
    /// Other interactions are dropped.
    fn commit_gesture(&mut self, gesture: Interaction) {
        match gesture {
            Interaction::Dragging {
                originals, collapse_to, ..
            } => {
                let moved = originals
                    .iter()
                    .any(|(id, origin)| self.document.get(*id).is_some_and(|o| o.position() != *origin));
                if moved {
                    self.capture();
                } else if let Some(id) = collapse_to {
                    self.selection.select_single(id);
                }
            }
            Interaction::Resizing { id, original, .. } => {
                if self.document.get(id).is_some_and(|o| o.size() != original) {
                    self.capture();
                }
            }
            Interaction::Rotating {
                id, original_rotation, ..
            } => {
                if self
                    .document
                    .get(id)
                    .is_some_and(|o| (o.rotation - original_rotation).abs() > f64::EPSILON)
                {
                    self.capture();
                }
            }
            _ => {}
        }
    }

    // --- Keyboard input ---

    /// Handle a key press. Returns the command it triggered, if any.
    /// Keys are left to the text editor while an edit is in progress.
    pub fn key_down(&mut self, input: &KeyInput) -> Option<Command> {
        if self.interaction.editing().is_some() {
            return None;
        }
        if input.key == Key::Space {
            self.input.space_held = true;
            return None;
        }
        let command = shortcut_command(input)?;
        self.execute(command);
        Some(command)
    }

    pub fn key_up(&mut self, input: &KeyInput) {
        if input.key == Key::Space {
            self.input.space_held = false;
        }
    }

    /// Run a board command.
    pub fn execute(&mut self, command: Command) {
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Duplicate => {
                self.duplicate_selected();
            }
            Command::DeleteSelection => {
                self.delete_selected();
            }
        }
    }

    // --- Text editing ---

    /// Start editing an object's text. Image objects cannot be edited.
    pub fn begin_text_edit(&mut self, id: ObjectId) -> bool {
        if let Some(current) = self.interaction.editing() {
            if current == id {
                return true;
            }
            self.commit_text_edit();
        }
        if !self.interaction.is_idle() {
            return false;
        }
        let Some(object) = self.document.get(id) else {
            return false;
        };
        if object.is_image() {
            return false;
        }
        self.interaction = Interaction::TextEditing {
            id,
            original: object.content.clone(),
        };
        self.selection.select_single(id);
        true
    }

    /// Replace the text of the object being edited. Not captured until commit.
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        let Some(id) = self.interaction.editing() else {
            return false;
        };
        self.document.set_content(id, Content::text(text)).unwrap_or(false)
    }

    /// Finish the edit, capturing if the content changed.
    pub fn commit_text_edit(&mut self) -> bool {
        if self.interaction.editing().is_none() {
            return false;
        }
        let Interaction::TextEditing { id, original } = std::mem::take(&mut self.interaction) else {
            return false;
        };
        let changed = self.document.get(id).is_some_and(|o| o.content != original);
        if changed {
            self.capture();
        }
        changed
    }

    /// Abandon the edit and put the original content back.
    pub fn cancel_text_edit(&mut self) {
        if self.interaction.editing().is_none() {
            return;
        }
        if let Interaction::TextEditing { id, original } = std::mem::take(&mut self.interaction) {
            if let Err(e) = self.document.set_content(id, original) {
                log::debug!("Edited object vanished before cancel: {}", e);
            }
        }
    }

    // --- Board-wide operations ---

    /// Remove every object and all drawing. One capture.
    pub fn clear_board(&mut self) {
        self.interaction = Interaction::Idle;
        self.with_capture_suppressed(|board| {
            board.document.clear();
            board.selection.clear();
            board.raster.clear();
        });
        self.capture();
        log::debug!("Board cleared");
    }

    /// Replace the objects with a JSON document without capturing.
    /// Nothing changes unless the whole document is valid.
    pub fn load_objects(&mut self, json: &str) -> BoardResult<usize> {
        let objects = io::parse_objects(json, self.document.defaults())?;
        Ok(self.replace_objects(objects))
    }

    /// Like [`Whiteboard::load_objects`] for an already parsed document.
    pub fn load_objects_value(&mut self, document: Value) -> BoardResult<usize> {
        let objects = io::objects_from_value(document, self.document.defaults())?;
        Ok(self.replace_objects(objects))
    }

    /// Replace the objects with a JSON document and capture once.
    /// Nothing changes unless the whole document is valid.
    pub fn import_objects(&mut self, json: &str) -> BoardResult<usize> {
        let count = self
            .load_objects(json)
            .inspect_err(|e| log::warn!("Import rejected: {}", e))?;
        self.capture();
        Ok(count)
    }

    /// Like [`Whiteboard::import_objects`] for an already parsed document.
    pub fn import_objects_value(&mut self, document: Value) -> BoardResult<usize> {
        let count = self
            .load_objects_value(document)
            .inspect_err(|e| log::warn!("Import rejected: {}", e))?;
        self.capture();
        Ok(count)
    }

    fn replace_objects(&mut self, objects: Vec<VectorObject>) -> usize {
        self.interaction = Interaction::Idle;
        self.with_capture_suppressed(|board| {
            board.document.clear();
            board.selection.clear();
            board.images.register_objects(&objects);
            let count = objects.len();
            for object in objects {
                board.document.adopt(object);
            }
            count
        })
    }

    /// The object list as exchange records, in stacking order.
    pub fn export_objects(&self) -> Vec<ExportedObject> {
        io::export_objects(&self.document)
    }

    pub fn export_json(&self) -> BoardResult<String> {
        Ok(io::export_json(&self.document)?)
    }

    /// Replace the drawing with an encoded bitmap, or clear it with `None`.
    /// A successful load is captured; clearing is not.
    pub fn load_canvas(&mut self, encoded: Option<&str>) -> BoardResult<()> {
        let Some(encoded) = encoded.filter(|e| !e.trim().is_empty()) else {
            self.raster.clear();
            return Ok(());
        };
        if let Err(e) = self.raster.load_encoded(encoded) {
            log::warn!("Canvas load failed: {}", e);
            return Err(e.into());
        }
        self.capture();
        Ok(())
    }

    /// Replace the drawing with the bytes of an image file. Captured on success.
    pub fn load_canvas_bytes(&mut self, bytes: &[u8]) -> BoardResult<()> {
        if let Err(e) = self.raster.load_bytes(bytes) {
            log::warn!("Canvas load failed: {}", e);
            return Err(e.into());
        }
        self.capture();
        Ok(())
    }

    /// The drawing as PNG bytes.
    pub fn export_canvas_png(&self) -> BoardResult<Vec<u8>> {
        Ok(self.raster.encode_png()?)
    }

    /// The drawing as a `data:image/png;base64,` URL.
    pub fn export_canvas(&self) -> BoardResult<String> {
        Ok(self.raster.to_data_url()?)
    }

    // --- View ---

    /// Report a new viewport rectangle. The world is resized to match and
    /// the drawing is discarded; objects are kept.
    pub fn resize_viewport(&mut self, origin: Point, size: Size) {
        self.camera.set_viewport(origin, size);
        let world = WorldSize::for_viewport(
            size,
            self.config.world_multiplier,
            self.config.world_min_width,
            self.config.world_min_height,
        );
        if matches!(self.interaction, Interaction::Drawing) {
            self.interaction = Interaction::Idle;
        }
        self.raster.resize(world);
    }

    /// Zoom around a device point.
    pub fn zoom_at(&mut self, device: Point, factor: f64) {
        self.camera.zoom_at(device, factor);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan_by(delta);
    }

    /// Convert a device point to world coordinates.
    pub fn to_world(&self, device: Point) -> Point {
        self.camera.to_world(device)
    }

    // --- Image loading ---

    /// Image sources the host should start fetching.
    pub fn take_image_requests(&mut self) -> Vec<ImageRef> {
        self.images.take_requests()
    }

    pub fn image_state(&self, image: &ImageRef) -> Option<ImageLoadState> {
        self.images.state(image)
    }

    /// Report the outcome of an image fetch. A successful load of a source
    /// still on the board is captured. Returns whether a capture happened.
    pub fn complete_image_load(&mut self, src: &str, result: Result<(), String>) -> bool {
        let image = match ImageRef::parse(src) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Ignoring completion for rejected source {:?}: {}", src, e);
                return false;
            }
        };
        match self.images.complete(&image, result.is_ok()) {
            Some(ImageLoadState::Loaded) => {
                let shown = self.document.ordered().any(|o| o.content.as_image() == Some(&image));
                shown && self.capture()
            }
            Some(_) => {
                if let Err(reason) = result {
                    log::warn!("Image {} failed to load: {}", image.src(), reason);
                }
                false
            }
            None => {
                log::debug!("Ignoring repeated completion for {}", image.src());
                false
            }
        }
    }
}

/// Restores the capture setting on drop.
struct SuppressedCaptures<'a> {
    board: &'a mut Whiteboard,
    previous: bool,
}

impl Drop for SuppressedCaptures<'_> {
    fn drop(&mut self) {
        self.board.history.set_suppressed(self.previous);
    }
}

fn apply_gesture(document: &mut BoardDocument, id: ObjectId, patch: &GeometryPatch) {
    if let Err(e) = document.mutate_geometry(id, patch) {
        log::warn!("Gesture target lost: {}", e);
    }
}
