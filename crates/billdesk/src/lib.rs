//! billdesk: Build invoices and export them as single-page A4 PDFs.
//!
//! This is the public API facade crate. It re-exports the invoice model from
//! billdesk-core and the region capture from billdesk-raster, and adds PDF
//! assembly, file delivery and the asynchronous export pipeline.
//!
//! # Architecture
//!
//! - **billdesk-core**: Invoice model, totals, and the view layout
//! - **billdesk-raster**: Region capture to bitmaps and PNG
//! - **billdesk** (this crate): PDF assembly, saving, export sequencing
//!
//! # Example
//!
//! ```ignore
//! use billdesk::{DirectorySink, ExportPipeline, Invoice, InvoiceSession, ItemField, ViewOptions};
//!
//! let session = InvoiceSession::new(Invoice::with_blank_item(), ViewOptions::default());
//! session.set_customer("Asha");
//! session.update_item(0, ItemField::Quantity, "2")?;
//! session.update_item(0, ItemField::Price, "125")?;
//!
//! let pipeline = ExportPipeline::new(DirectorySink::new("."));
//! let report = pipeline.export(&session).await?;
//! println!("{}", report.file.location.display());
//! ```

pub mod error;
pub mod filename;
pub mod pdf;
pub mod pipeline;
pub mod save;
pub mod session;

pub use billdesk_core;
pub use billdesk_raster;

pub use billdesk_core::{
    CONTENT_REGION, CONTROLS_REGION, Currency, Invoice, InvoiceError, InvoiceLayout, ItemField,
    LineItem, NumericPolicy, ViewOptions, format_amount, grand_total, line_total,
};
pub use billdesk_raster::{CaptureOptions, PngImage, Rasterizer, TextRenderer, to_image};
pub use error::{ExportError, ExportResult};
pub use filename::invoice_filename;
pub use pdf::{AssembledPdf, ImagePlacement, PT_PER_MM, PageFormat, assemble_pdf, assemble_pdf_on};
pub use pipeline::{
    ConcurrencyPolicy, DEFAULT_SETTLE_DELAY, ExportOptions, ExportPipeline, ExportReport,
    ViewSnapshot, ViewSource,
};
pub use save::{Clock, DirectorySink, DownloadSink, FixedClock, MemorySink, SavedFile, SystemClock, save};
pub use session::InvoiceSession;
