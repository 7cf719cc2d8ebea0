//! Error type for the export pipeline.

use billdesk_raster::RasterError;
use thiserror::Error;

/// Error type for export operations.
///
/// Whatever the variant, no output file is left behind.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The capture region does not exist in the rendered view.
    #[error("capture target not found: {0}")]
    CaptureTargetMissing(String),

    /// Rasterizing or image encoding failed.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// The PDF could not be assembled.
    #[error("PDF assembly failed: {0}")]
    Assemble(String),

    /// Writing the PDF failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another export is still in flight.
    #[error("an export is already in progress")]
    Busy,
}

impl From<RasterError> for ExportError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::TargetMissing(id) => ExportError::CaptureTargetMissing(id),
            RasterError::Failed(msg) | RasterError::Font(msg) => ExportError::CaptureFailed(msg),
        }
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::Assemble(err.to_string())
    }
}

/// Result type used by the export pipeline.
pub type ExportResult<T> = Result<T, ExportError>;
