//! WebAssembly entry point and page bridge.
//!
//! The page owns the DOM: it forwards pointer and key events, renders the
//! objects from [`WasmBoard::export_objects`], paints the raster from
//! [`WasmBoard::export_canvas`] and fetches image sources on request.

use inkboard_core::{
    BoardConfig, Key, KeyInput, Modifiers, MouseButton, ObjectKind, ObjectSpec, PointerInput, StylePatch, ToolKind,
    Whiteboard,
};
use kurbo::{Point, Size, Vec2};
use wasm_bindgen::prelude::*;

/// Initialize logging and panic reporting.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("Inkboard engine loaded");
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// Milliseconds since page load, for double-click detection.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

fn pointer(x: f64, y: f64, button: i16, mods: Modifiers) -> PointerInput {
    let button = match button {
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Left,
    };
    PointerInput {
        button,
        ..PointerInput::new(x, y).with_modifiers(mods).at_time(now_ms())
    }
}

/// A board session driven by the page.
#[wasm_bindgen]
pub struct WasmBoard {
    board: Whiteboard,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create a session. `config` is an optional JSON `BoardConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WasmBoard, JsError> {
        let config = match config {
            Some(json) => BoardConfig::from_json(&json).map_err(js_error)?,
            None => BoardConfig::default(),
        };
        Ok(Self {
            board: Whiteboard::new(config),
        })
    }

    // Pointer and keyboard. Coordinates are page coordinates and `button`
    // follows `MouseEvent.button`.

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.board
            .pointer_down(&pointer(x, y, button, modifiers(shift, ctrl, alt, meta)));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool) {
        self.board
            .pointer_move(&pointer(x, y, 0, modifiers(shift, false, false, false)));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, shift: bool) {
        self.board
            .pointer_up(&pointer(x, y, 0, modifiers(shift, false, false, false)));
    }

    /// Returns true when the key was consumed and the default action should
    /// be prevented.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let input = KeyInput::new(Key::from_dom(key), modifiers(shift, ctrl, alt, meta));
        let was_editing = self.board.interaction().editing().is_some();
        let command = self.board.key_down(&input);
        command.is_some() || (!was_editing && input.key == Key::Space)
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, key: &str) {
        self.board
            .key_up(&KeyInput::new(Key::from_dom(key), Modifiers::NONE));
    }

    /// Call once per animation frame.
    pub fn tick(&mut self) -> bool {
        self.board.tick()
    }

    // View

    /// Report the board element's page rectangle after layout changes.
    pub fn resize(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.board.resize_viewport(Point::new(x, y), Size::new(width, height));
    }

    #[wasm_bindgen(js_name = zoomAt)]
    pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
        self.board.zoom_at(Point::new(x, y), factor);
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.board.pan_by(Vec2::new(dx, dy));
    }

    /// `[panX, panY, scale]` for the page's CSS transform.
    #[wasm_bindgen(js_name = viewTransform)]
    pub fn view_transform(&self) -> Vec<f64> {
        let camera = self.board.camera();
        vec![camera.pan.x, camera.pan.y, camera.scale]
    }

    #[wasm_bindgen(js_name = worldSize)]
    pub fn world_size(&self) -> Vec<u32> {
        let size = self.board.world_size();
        vec![size.width, size.height]
    }

    // Toolbar

    /// Returns false for an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> bool {
        match ToolKind::from_name(name) {
            Some(tool) => {
                self.board.set_tool(tool);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = setBrushColor)]
    pub fn set_brush_color(&mut self, hex: &str) -> bool {
        self.board.set_brush_color(hex)
    }

    #[wasm_bindgen(js_name = setBrushSize)]
    pub fn set_brush_size(&mut self, size: f64) {
        self.board.set_brush_size(size);
    }

    #[wasm_bindgen(js_name = setBrushOpacity)]
    pub fn set_brush_opacity(&mut self, opacity: f64) {
        self.board.set_brush_opacity(opacity);
    }

    #[wasm_bindgen(js_name = setSnap)]
    pub fn set_snap(&mut self, enabled: bool) {
        self.board.set_snap_enabled(enabled);
    }

    /// Add a toolbar preset (`rect`, `circle` or `text`). Returns its id.
    #[wasm_bindgen(js_name = addShape)]
    pub fn add_shape(&mut self, kind: &str) -> f64 {
        let id = self.board.create(ObjectSpec::new(ObjectKind::from_type_name(kind)));
        id.0 as f64
    }

    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, src: &str) -> Result<f64, JsError> {
        let id = self.board.add_image(src).map_err(js_error)?;
        Ok(id.0 as f64)
    }

    /// Apply a JSON style patch (`{fontColor, fontSize, fill, borderColor}`)
    /// to the selection, or to the defaults when nothing is selected.
    #[wasm_bindgen(js_name = setStyle)]
    pub fn set_style(&mut self, patch: &str) -> Result<usize, JsError> {
        let patch: StylePatch = serde_json::from_str(patch).map_err(js_error)?;
        Ok(self.board.mutate_style(patch))
    }

    #[wasm_bindgen(js_name = duplicateSelected)]
    pub fn duplicate_selected(&mut self) -> usize {
        self.board.duplicate_selected().len()
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> usize {
        self.board.delete_selected()
    }

    pub fn undo(&mut self) -> bool {
        self.board.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.board.redo()
    }

    // Text editing

    /// The object whose text the page should show an editor for.
    #[wasm_bindgen(js_name = editingObject)]
    pub fn editing_object(&self) -> Option<f64> {
        self.board.interaction().editing().map(|id| id.0 as f64)
    }

    #[wasm_bindgen(js_name = setEditText)]
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        self.board.set_edit_text(text)
    }

    #[wasm_bindgen(js_name = commitTextEdit)]
    pub fn commit_text_edit(&mut self) -> bool {
        self.board.commit_text_edit()
    }

    #[wasm_bindgen(js_name = cancelTextEdit)]
    pub fn cancel_text_edit(&mut self) {
        self.board.cancel_text_edit();
    }

    // Public surface

    #[wasm_bindgen(js_name = clearBoard)]
    pub fn clear_board(&mut self) {
        self.board.clear_board();
    }

    /// Replace the objects without recording history.
    #[wasm_bindgen(js_name = loadObjects)]
    pub fn load_objects(&mut self, json: &str) -> Result<usize, JsError> {
        self.board.load_objects(json).map_err(js_error)
    }

    /// Replace the objects as one undoable step.
    #[wasm_bindgen(js_name = importObjects)]
    pub fn import_objects(&mut self, json: &str) -> Result<usize, JsError> {
        self.board.import_objects(json).map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportObjects)]
    pub fn export_objects(&self) -> Result<String, JsError> {
        self.board.export_json().map_err(js_error)
    }

    /// Load a `data:` URL onto the drawing surface, or clear it with `null`.
    #[wasm_bindgen(js_name = loadCanvas)]
    pub fn load_canvas(&mut self, encoded: Option<String>) -> Result<(), JsError> {
        self.board.load_canvas(encoded.as_deref()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportCanvas)]
    pub fn export_canvas(&self) -> Result<String, JsError> {
        self.board.export_canvas().map_err(js_error)
    }

    /// Selected ids, in selection order.
    pub fn selection(&self) -> Vec<f64> {
        self.board.selection().iter().map(|id| id.0 as f64).collect()
    }

    /// Current gesture, for cursor styling.
    pub fn interaction(&self) -> String {
        format!("{:?}", self.board.interaction_kind())
    }

    // Images

    /// Sources the page should start loading.
    #[wasm_bindgen(js_name = takeImageRequests)]
    pub fn take_image_requests(&mut self) -> js_sys::Array {
        self.board
            .take_image_requests()
            .iter()
            .map(|image| JsValue::from_str(image.src()))
            .collect()
    }

    /// Report a load result. `error` is `null` on success.
    #[wasm_bindgen(js_name = imageLoaded)]
    pub fn image_loaded(&mut self, src: &str, error: Option<String>) -> bool {
        let result = match error {
            Some(reason) => Err(reason),
            None => Ok(()),
        };
        self.board.complete_image_load(src, result)
    }
}
