//! billdesk-raster: Pure-Rust region capture for billdesk documents.
//!
//! Paints one region of a [`billdesk_core::Document`] into an RGBA
//! [`Bitmap`] with tiny-skia, renders text with fontdue, and encodes the
//! result as PNG.
//!
//! # Example
//!
//! ```ignore
//! use billdesk_core::{CONTENT_REGION, Invoice, InvoiceLayout, ViewOptions};
//! use billdesk_raster::{CaptureOptions, Rasterizer, to_image};
//!
//! let doc = InvoiceLayout::new(ViewOptions::default()).render(&Invoice::with_blank_item());
//! let bitmap = Rasterizer::default().capture_region(&doc, CONTENT_REGION, &CaptureOptions::default())?;
//! let png = to_image(&bitmap)?;
//! std::fs::write("invoice.png", png.data())?;
//! ```

pub mod bitmap;
pub mod capture;
pub mod encode;
pub mod error;
pub mod resources;
pub mod text;

pub use bitmap::Bitmap;
pub use capture::{CaptureOptions, MAX_BITMAP_DIMENSION, Rasterizer, capture_region};
pub use encode::{PngImage, decode_data_uri, to_image};
pub use error::{RasterError, RasterResult};
pub use resources::{DefaultLoader, ResourceLoader};
pub use text::{SYSTEM_FONT_PATHS, TextPlacement, TextRenderer};
