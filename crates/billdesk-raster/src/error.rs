//! Error types for region capture and image encoding.
//!
//! Uses [`thiserror`] for ergonomic error derivation.

use thiserror::Error;

/// Error type for capture and encoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// No region with the requested identifier exists in the document.
    #[error("capture target not found: {0}")]
    TargetMissing(String),

    /// Rasterizing or encoding failed; no bitmap or image was produced.
    #[error("capture failed: {0}")]
    Failed(String),

    /// A font could not be loaded.
    #[error("font error: {0}")]
    Font(String),
}

/// Result type used by the rasterizer.
pub type RasterResult<T> = Result<T, RasterError>;
