//! Performance benchmarks for billdesk.
//!
//! Covers the synchronous part of the export: rendering the layout, capturing
//! the content region, PNG encoding, and PDF assembly, for a short invoice
//! and one long enough to overflow the page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use billdesk::{
    CONTENT_REGION, CaptureOptions, Invoice, InvoiceLayout, ItemField, Rasterizer, TextRenderer,
    ViewOptions, assemble_pdf, to_image,
};
use billdesk_raster::DefaultLoader;

fn invoice_with(rows: usize) -> Invoice {
    let mut invoice = Invoice::new();
    invoice.set_customer("Bench Traders");
    for i in 0..rows {
        invoice.add_item();
        invoice
            .update_item(i, ItemField::Name, &format!("Item {}", i + 1))
            .unwrap();
        invoice
            .update_item(i, ItemField::Quantity, &(i % 5 + 1).to_string())
            .unwrap();
        invoice.update_item(i, ItemField::Price, "199.5").unwrap();
    }
    invoice
}

fn bench_export(c: &mut Criterion) {
    let layout = InvoiceLayout::new(ViewOptions::default());
    let rasterizer = Rasterizer::new(TextRenderer::discover(), DefaultLoader::new());
    let options = CaptureOptions::default();

    for (name, rows) in [("short", 3), ("long", 40)] {
        let invoice = invoice_with(rows);
        let doc = layout.render(&invoice);

        c.bench_function(&format!("layout_{name}"), |b| {
            b.iter(|| black_box(layout.render(black_box(&invoice))))
        });

        c.bench_function(&format!("capture_{name}"), |b| {
            b.iter(|| {
                rasterizer
                    .capture_region(black_box(&doc), CONTENT_REGION, &options)
                    .unwrap()
            })
        });

        let bitmap = rasterizer
            .capture_region(&doc, CONTENT_REGION, &options)
            .unwrap();
        c.bench_function(&format!("encode_{name}"), |b| {
            b.iter(|| to_image(black_box(&bitmap)).unwrap())
        });

        let png = to_image(&bitmap).unwrap();
        c.bench_function(&format!("assemble_{name}"), |b| {
            b.iter(|| assemble_pdf(black_box(&png), "Bench Traders").unwrap())
        });
    }
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
