//! Error types for board operations.

use crate::io::ImportError;
use crate::raster::RasterError;
use crate::shapes::{ContentError, ObjectId};
use thiserror::Error;

/// Errors surfaced by the board's public operations.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),
    #[error("rejected content: {0}")]
    Content(#[from] ContentError),
    #[error("no object with id {0}")]
    UnknownObject(ObjectId),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;
