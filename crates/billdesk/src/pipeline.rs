//! The export pipeline: settle, snapshot, capture, encode, assemble, save.
//!
//! Each stage runs after the previous one has finished. Rasterizing and PDF
//! assembly are CPU-bound and run on tokio's blocking pool, as does the
//! final write.

use std::sync::Arc;
use std::time::Duration;

use billdesk_core::{CONTENT_REGION, Document};
use billdesk_raster::{CaptureOptions, Rasterizer, to_image};
use tokio::sync::Mutex;

use crate::error::{ExportError, ExportResult};
use crate::pdf::{ImagePlacement, PageFormat, assemble_pdf_on};
use crate::save::{Clock, DownloadSink, SavedFile, SystemClock, save};

/// Fixed wait before capturing so pending view updates land first.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// What happens when an export is triggered while another is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// Fail the new trigger with [`ExportError::Busy`].
    #[default]
    RejectWhileBusy,
    /// Run triggers one after another, in the order they arrived.
    Queue,
}

/// Options for [`ExportPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Wait before the view is snapshotted. Default 100 ms.
    pub settle_delay: Duration,
    /// Region to capture. Default [`CONTENT_REGION`].
    pub region_id: String,
    pub capture: CaptureOptions,
    /// Page the image is placed on. Default A4 portrait.
    pub page: PageFormat,
    pub concurrency: ConcurrencyPolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            region_id: CONTENT_REGION.to_string(),
            capture: CaptureOptions::default(),
            page: PageFormat::A4,
            concurrency: ConcurrencyPolicy::default(),
        }
    }
}

/// A rendered view at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub document: Document,
    /// Customer name as entered; may be empty.
    pub customer: String,
}

/// Anything that can render its current state for export.
pub trait ViewSource: Send + Sync {
    fn snapshot(&self) -> ViewSnapshot;
}

impl ViewSource for ViewSnapshot {
    fn snapshot(&self) -> ViewSnapshot {
        self.clone()
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file: SavedFile,
    /// Captured bitmap size in device pixels.
    pub bitmap_size: (u32, u32),
    pub placement: ImagePlacement,
    /// `true` if the image runs past the bottom of the page.
    pub overflows: bool,
}

/// Turns views into saved PDF files.
pub struct ExportPipeline {
    options: ExportOptions,
    rasterizer: Arc<Rasterizer>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DownloadSink>,
    busy: Mutex<()>,
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("options", &self.options)
            .field("rasterizer", &self.rasterizer)
            .finish_non_exhaustive()
    }
}

impl ExportPipeline {
    /// A pipeline with default options, the system clock and a rasterizer
    /// using the first system font found.
    pub fn new(sink: impl DownloadSink + 'static) -> Self {
        Self {
            options: ExportOptions::default(),
            rasterizer: Arc::new(Rasterizer::default()),
            clock: Arc::new(SystemClock),
            sink: Arc::new(sink),
            busy: Mutex::new(()),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export the current state of `view` as a PDF.
    ///
    /// On any error no file is written.
    pub async fn export(&self, view: &dyn ViewSource) -> ExportResult<ExportReport> {
        let _guard = match self.options.concurrency {
            ConcurrencyPolicy::RejectWhileBusy => {
                self.busy.try_lock().map_err(|_| ExportError::Busy)?
            }
            ConcurrencyPolicy::Queue => self.busy.lock().await,
        };

        tracing::debug!(delay_ms = self.options.settle_delay.as_millis() as u64, "settling");
        tokio::time::sleep(self.options.settle_delay).await;

        let snapshot = view.snapshot();
        tracing::debug!(region = %self.options.region_id, "capturing");

        let rasterizer = Arc::clone(&self.rasterizer);
        let region_id = self.options.region_id.clone();
        let capture = self.options.capture.clone();
        let page = self.options.page;
        let customer = snapshot.customer.clone();
        let (bitmap_size, pdf) = tokio::task::spawn_blocking(move || -> ExportResult<_> {
            let bitmap = rasterizer.capture_region(&snapshot.document, &region_id, &capture)?;
            let png = to_image(&bitmap)?;
            tracing::debug!(bytes = png.data().len(), "encoded PNG");
            let pdf = assemble_pdf_on(&png, &snapshot.customer, page)?;
            Ok(((bitmap.width(), bitmap.height()), pdf))
        })
        .await
        .map_err(|e| ExportError::CaptureFailed(format!("capture task did not complete: {e}")))??;

        let placement = pdf.placement();
        let overflows = pdf.overflows();
        let clock = Arc::clone(&self.clock);
        let sink = Arc::clone(&self.sink);
        let file = tokio::task::spawn_blocking(move || {
            save(&pdf, &customer, clock.as_ref(), sink.as_ref())
        })
        .await
        .map_err(|e| ExportError::Io(std::io::Error::other(e)))??;

        Ok(ExportReport {
            file,
            bitmap_size,
            placement,
            overflows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{FixedClock, MemorySink};
    use billdesk_core::{BBox, Color, Node, Region, Size};
    use billdesk_raster::{DefaultLoader, TextRenderer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports the number of snapshots taken so far as the customer name.
    #[derive(Default)]
    struct CountingView {
        taken: AtomicUsize,
    }

    impl ViewSource for CountingView {
        fn snapshot(&self) -> ViewSnapshot {
            let n = self.taken.fetch_add(1, Ordering::SeqCst);
            let mut snap = simple_view(100.0);
            snap.customer = format!("view{n}");
            snap
        }
    }

    fn simple_view(height: f64) -> ViewSnapshot {
        let mut doc = Document::new(Size::new(200.0, 100.0));
        let mut region = Region::new(CONTENT_REGION, BBox::new(0.0, 0.0, 200.0, height));
        region.push(Node::Rect {
            bbox: BBox::new(10.0, 10.0, 190.0, 40.0),
            fill: Some(Color::rgb(13, 110, 253)),
            stroke: None,
            stroke_width: 0.0,
        });
        doc.push(region);
        ViewSnapshot {
            document: doc,
            customer: "Asha".to_string(),
        }
    }

    fn pipeline(sink: Arc<MemorySink>, options: ExportOptions) -> ExportPipeline {
        ExportPipeline::new(sink)
            .with_options(options)
            .with_rasterizer(Rasterizer::new(TextRenderer::without_font(), DefaultLoader::new()))
            .with_clock(FixedClock(1_700_000_000_000))
    }

    fn fast() -> ExportOptions {
        ExportOptions {
            settle_delay: Duration::from_millis(1),
            ..ExportOptions::default()
        }
    }

    #[test]
    fn default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.settle_delay, Duration::from_millis(100));
        assert_eq!(options.region_id, "invoice-content");
        assert_eq!(options.capture.scale, 2.0);
        assert_eq!(options.page, PageFormat::A4);
        assert_eq!(options.concurrency, ConcurrencyPolicy::RejectWhileBusy);
    }

    #[tokio::test]
    async fn exports_one_pdf() {
        let sink = Arc::new(MemorySink::new());
        let report = pipeline(sink.clone(), fast())
            .export(&simple_view(100.0))
            .await
            .unwrap();
        assert_eq!(report.bitmap_size, (400, 200));
        assert_eq!(report.file.file_name, "Invoice_Asha_1700000000000.pdf");
        assert!(!report.overflows);
        let files = sink.files();
        assert_eq!(files.len(), 1);
        assert!(files[0].1.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn missing_region_writes_nothing() {
        let sink = Arc::new(MemorySink::new());
        let options = ExportOptions {
            region_id: "nope".to_string(),
            ..fast()
        };
        let err = pipeline(sink.clone(), options)
            .export(&simple_view(100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::CaptureTargetMissing(ref id) if id == "nope"));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn failed_capture_writes_nothing() {
        let sink = Arc::new(MemorySink::new());
        let mut view = simple_view(100.0);
        view.document.regions[0].push(Node::Image {
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            source: billdesk_core::ImageSource::parse("/nonexistent/logo.png"),
        });
        let err = pipeline(sink.clone(), fast()).export(&view).await.unwrap_err();
        assert!(matches!(err, ExportError::CaptureFailed(_)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn tall_view_overflows_without_error() {
        let sink = Arc::new(MemorySink::new());
        let report = pipeline(sink.clone(), fast())
            .export(&simple_view(600.0))
            .await
            .unwrap();
        assert!(report.overflows);
        assert_eq!(report.placement.width_mm, 210.0);
        assert!((report.placement.height_mm - 630.0).abs() < 1e-9);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn second_trigger_is_rejected_while_busy() {
        let sink = Arc::new(MemorySink::new());
        let pipeline = pipeline(sink.clone(), fast());
        let view = simple_view(100.0);
        let (first, second) = tokio::join!(pipeline.export(&view), pipeline.export(&view));
        assert!(first.is_ok());
        assert!(matches!(second, Err(ExportError::Busy)));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn queued_triggers_run_in_order() {
        let sink = Arc::new(MemorySink::new());
        let options = ExportOptions {
            concurrency: ConcurrencyPolicy::Queue,
            ..fast()
        };
        let pipeline = pipeline(sink.clone(), options);
        let view = CountingView::default();
        let (first, second) = tokio::join!(pipeline.export(&view), pipeline.export(&view));
        assert_eq!(first.unwrap().file.file_name, "Invoice_view0_1700000000000.pdf");
        assert_eq!(second.unwrap().file.file_name, "Invoice_view1_1700000000000.pdf");
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn pipeline_is_reusable_after_export() {
        let sink = Arc::new(MemorySink::new());
        let pipeline = pipeline(sink.clone(), fast());
        let view = simple_view(100.0);
        pipeline.export(&view).await.unwrap();
        pipeline.export(&view).await.unwrap();
        assert_eq!(sink.len(), 2);
    }
}
