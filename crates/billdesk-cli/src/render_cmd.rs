use std::path::Path;

use billdesk::{InvoiceLayout, to_image};

use crate::cli::{CaptureArgs, InvoiceArgs, ViewArgs};
use crate::shared::{capture_options, load_invoice, rasterizer, view_options};

pub fn run(
    file: &Path,
    output: &Path,
    invoice_args: &InvoiceArgs,
    view: &ViewArgs,
    capture: &CaptureArgs,
) -> Result<(), i32> {
    let invoice = load_invoice(file, invoice_args)?;
    let options = capture_options(capture)?;
    let rasterizer = rasterizer(file, capture)?;

    let document = InvoiceLayout::new(view_options(invoice_args, view)).render(&invoice);
    let bitmap = rasterizer
        .capture_region(&document, &capture.region, &options)
        .map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;
    let png = to_image(&bitmap).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    std::fs::write(output, png.data()).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", output.display());
        1
    })?;
    println!(
        "{} ({}x{})",
        output.display(),
        bitmap.width(),
        bitmap.height()
    );
    Ok(())
}
