//! Inkboard Core Library
//!
//! Platform-agnostic whiteboard engine: a raster drawing surface under a set
//! of manipulable vector objects, with pan/zoom, selection, gestures and
//! snapshot-based undo/redo. The host renders and fetches; the engine never
//! performs I/O.

pub mod board;
pub mod camera;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod images;
pub mod input;
pub mod interaction;
pub mod io;
pub mod raster;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod tools;

pub use board::Whiteboard;
pub use camera::{Camera, WorldSize};
pub use config::BoardConfig;
pub use document::{BoardDocument, ObjectSpec};
pub use error::{BoardError, BoardResult};
pub use history::{History, HistoryEntry, MAX_HISTORY};
pub use images::{ImageLoadState, ImageLoads};
pub use input::{Command, InputState, Key, KeyInput, Modifiers, MouseButton, PointerInput};
pub use interaction::{Interaction, InteractionKind};
pub use io::{ExportedCss, ExportedObject, ImportError};
pub use raster::{RasterError, RasterSnapshot, RasterSurface};
pub use selection::{Handle, HandleKind, Selection, SelectionRect};
pub use shapes::{
    Content, ContentError, GeometryPatch, ImageRef, ObjectId, ObjectKind, ObjectStyle, StyleDefaults, StylePatch,
    VectorObject,
};
pub use snap::{SnapSettings, snap_angle, snap_to_grid, snap_value};
pub use tools::{BrushKind, BrushSettings, ToolKind, ToolManager};
