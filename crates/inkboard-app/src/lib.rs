//! Inkboard Application
//!
//! Host shell around the engine: a headless command line for native
//! targets and a page bridge for WebAssembly.

pub mod shortcuts;

#[cfg(feature = "native")]
pub mod cli;

pub use shortcuts::{Shortcut, ShortcutRegistry};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WasmBoard;
