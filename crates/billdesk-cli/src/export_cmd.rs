use std::path::Path;
use std::time::Duration;

use billdesk::{DirectorySink, ExportOptions, ExportPipeline, InvoiceSession};

use crate::cli::{CaptureArgs, InvoiceArgs, ViewArgs};
use crate::shared::{capture_options, load_invoice, rasterizer, view_options};

pub fn run(
    file: &Path,
    out_dir: &Path,
    delay_ms: u64,
    invoice_args: &InvoiceArgs,
    view: &ViewArgs,
    capture: &CaptureArgs,
) -> Result<(), i32> {
    if !out_dir.is_dir() {
        eprintln!("Error: output directory not found: {}", out_dir.display());
        return Err(1);
    }
    let invoice = load_invoice(file, invoice_args)?;
    let options = ExportOptions {
        settle_delay: Duration::from_millis(delay_ms),
        region_id: capture.region.clone(),
        capture: capture_options(capture)?,
        ..ExportOptions::default()
    };
    let pipeline = ExportPipeline::new(DirectorySink::new(out_dir))
        .with_options(options)
        .with_rasterizer(rasterizer(file, capture)?);
    let session = InvoiceSession::new(invoice, view_options(invoice_args, view));
    tracing::debug!(file = %file.display(), out_dir = %out_dir.display(), "exporting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| {
            eprintln!("Error: failed to start runtime: {e}");
            1
        })?;
    let report = runtime
        .block_on(pipeline.export(&session))
        .map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;

    if report.overflows {
        eprintln!(
            "Warning: invoice is {:.1} mm tall and runs past the bottom of the page",
            report.placement.height_mm
        );
    }
    println!("{}", report.file.location.display());
    Ok(())
}
