//! Error types for the flipbook rig.

use thiserror::Error;

/// Result type alias using FlipbookError.
pub type Result<T> = std::result::Result<T, FlipbookError>;

/// Main error type for book building and animation operations.
#[derive(Error, Debug)]
pub enum FlipbookError {
    /// Failed to decode a raster image delivered by the host.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to serialize or parse JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Geometry segment count and bone chain length disagree.
    #[error("Rig mismatch: plate with {segments} segments needs a chain of {segments} + 1 joints, got {joints}")]
    RigMismatch { segments: usize, joints: usize },

    /// Invalid geometry dimensions or segment count.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Book configuration is unusable (e.g. no pages).
    #[error("Invalid book config: {0}")]
    InvalidConfig(String),

    /// Failed to export mesh data.
    #[error("Export error: {0}")]
    Export(String),
}
