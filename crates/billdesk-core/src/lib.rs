//! billdesk-core: Backend-independent invoice types and algorithms.
//!
//! This crate provides the invoice model (line items, lenient numeric entry,
//! totals), currency display, geometry, the display list that views are
//! rendered into, and the invoice layout that produces it. It performs no
//! I/O; rasterizing and PDF output live in `billdesk-raster` and `billdesk`.

pub mod error;
pub mod geometry;
pub mod invoice;
pub mod layout;
pub mod money;
pub mod numeric;
pub mod view;

pub use error::{InvoiceError, InvoiceResult};
pub use geometry::{BBox, Size};
pub use invoice::{DEFAULT_CUSTOMER, Invoice, ItemField, LineItem, grand_total, line_total};
pub use layout::{CONTENT_REGION, CONTROLS_REGION, InvoiceLayout, ViewOptions, display_number};
pub use money::{Currency, format_amount};
pub use numeric::{NumericPolicy, coerce, parse_lenient};
pub use view::{Color, Document, ImageSource, Node, Region, TextAnchor};
