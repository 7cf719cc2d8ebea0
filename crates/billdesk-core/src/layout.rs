//! Invoice layout: turns an [`Invoice`] into a [`Document`].
//!
//! The document has two regions. [`CONTENT_REGION`] holds what belongs on
//! paper (title, customer and date, the item table and the totals).
//! [`CONTROLS_REGION`] holds the interactive controls (row remove buttons,
//! add-item and export buttons), which is why it sits outside the content
//! box and never ends up in a capture of the content region.

use crate::geometry::{BBox, Size};
use crate::invoice::Invoice;
use crate::money::{Currency, format_amount};
use crate::view::{Color, Document, ImageSource, Node, Region, TextAnchor};

/// Identifier of the printable invoice area.
pub const CONTENT_REGION: &str = "invoice-content";
/// Identifier of the interactive controls area.
pub const CONTROLS_REGION: &str = "invoice-controls";

const MARGIN: f64 = 24.0;
const PADDING: f64 = 24.0;
const FIELD_HEIGHT: f64 = 36.0;
const HEADER_ROW_HEIGHT: f64 = 36.0;
const ROW_HEIGHT: f64 = 40.0;
const BUTTON_HEIGHT: f64 = 36.0;
const LOGO_SIZE: f64 = 48.0;

/// Relative widths of the Item, Qty, Unit Price and Total columns.
const COLUMN_WEIGHTS: [f64; 4] = [0.40, 0.15, 0.20, 0.25];
const COLUMN_TITLES: [&str; 4] = ["Item", "Qty", "Unit Price", "Total"];

const PRIMARY: Color = Color::rgb(13, 110, 253);
const SUCCESS: Color = Color::rgb(25, 135, 84);
const DANGER: Color = Color::rgb(220, 53, 69);
const BORDER: Color = Color::rgb(222, 226, 230);
const HEADER_FILL: Color = Color::rgb(248, 249, 250);
const TEXT: Color = Color::rgb(33, 37, 41);
const PLACEHOLDER: Color = Color::rgb(108, 117, 125);

/// Options controlling the invoice layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewOptions {
    /// Heading printed at the top of the invoice.
    pub title: String,
    /// Currency glyph for every displayed amount.
    pub currency: Currency,
    /// Width of the content region in CSS pixels.
    pub content_width: f64,
    /// Visible window size.
    pub viewport: Size,
    /// Base font size in CSS pixels.
    pub font_size: f64,
    /// Optional logo drawn beside the title.
    pub logo: Option<ImageSource>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            title: "INVOICE".to_string(),
            currency: Currency::default(),
            content_width: 760.0,
            viewport: Size::new(1024.0, 768.0),
            font_size: 14.0,
            logo: None,
        }
    }
}

/// Lays out invoices with a fixed set of [`ViewOptions`].
#[derive(Debug, Clone, Default)]
pub struct InvoiceLayout {
    options: ViewOptions,
}

impl InvoiceLayout {
    pub fn new(options: ViewOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Lay out `invoice` into a document with the content and controls regions.
    pub fn render(&self, invoice: &Invoice) -> Document {
        let opts = &self.options;
        let fs = opts.font_size;
        let x0 = MARGIN;
        let x1 = MARGIN + opts.content_width;
        let inner_x0 = x0 + PADDING;
        let inner_x1 = x1 - PADDING;
        let inner_width = inner_x1 - inner_x0;

        let mut content = Vec::new();
        let mut controls = Vec::new();
        let mut y = MARGIN + PADDING;

        // Title row
        let title_size = fs * 1.75;
        if let Some(logo) = &opts.logo {
            content.push(Node::Image {
                bbox: BBox::from_xywh(inner_x0, y, LOGO_SIZE, LOGO_SIZE),
                source: logo.clone(),
            });
        }
        let title_row = LOGO_SIZE.max(title_size * 1.5);
        content.push(text(
            (inner_x0 + inner_x1) / 2.0,
            y + (title_row - title_size * 1.5) / 2.0,
            title_size,
            TextAnchor::Middle,
            PRIMARY,
            &opts.title,
        ));
        y += title_row + fs * 1.5;

        // Customer and date fields
        let half = (inner_width - PADDING) / 2.0;
        let fields = [
            ("Customer Name", invoice.customer(), "Enter customer name", inner_x0),
            (
                "Billing Date",
                invoice.date().unwrap_or(""),
                "",
                inner_x0 + half + PADDING,
            ),
        ];
        for (label, value, placeholder, fx) in fields {
            content.push(text(fx, y, fs, TextAnchor::Start, TEXT, label));
            let field = BBox::from_xywh(fx, y + fs * 1.5 + 4.0, half, FIELD_HEIGHT);
            content.push(outlined(field, Some(Color::WHITE)));
            let (shown, color) = if value.is_empty() {
                (placeholder, PLACEHOLDER)
            } else {
                (value, TEXT)
            };
            if !shown.is_empty() {
                content.push(text(
                    field.x0 + 12.0,
                    centered_top(field, fs),
                    fs,
                    TextAnchor::Start,
                    color,
                    shown,
                ));
            }
        }
        y += fs * 1.5 + 4.0 + FIELD_HEIGHT + fs * 1.5;

        // Item table
        let columns = column_edges(inner_x0, inner_width);
        let header = BBox::new(inner_x0, y, inner_x1, y + HEADER_ROW_HEIGHT);
        content.push(outlined(header, Some(HEADER_FILL)));
        for (i, title) in COLUMN_TITLES.iter().enumerate() {
            let cell = BBox::new(columns[i], header.top, columns[i + 1], header.bottom);
            content.push(outlined(cell, None));
            content.push(text(
                (cell.x0 + cell.x1) / 2.0,
                centered_top(cell, fs),
                fs,
                TextAnchor::Middle,
                TEXT,
                title,
            ));
        }
        y = header.bottom;

        let currency = &opts.currency;
        for item in invoice.items() {
            let row = BBox::new(inner_x0, y, inner_x1, y + ROW_HEIGHT);
            let name_color = if item.name.is_empty() { PLACEHOLDER } else { TEXT };
            let name = if item.name.is_empty() {
                "Item name".to_string()
            } else {
                item.name.clone()
            };
            let cells = [
                name,
                display_number(item.quantity),
                display_number(item.price),
                format_amount(item.total(), currency),
            ];
            for (i, value) in cells.iter().enumerate() {
                let cell = BBox::new(columns[i], row.top, columns[i + 1], row.bottom);
                content.push(outlined(cell, Some(Color::WHITE)));
                let color = if i == 0 { name_color } else { TEXT };
                content.push(text(
                    (cell.x0 + cell.x1) / 2.0,
                    centered_top(cell, fs),
                    fs,
                    TextAnchor::Middle,
                    color,
                    value,
                ));
            }

            // Row remove button, outside the printable box.
            let remove = BBox::from_xywh(x1 + 8.0, row.top + 4.0, 32.0, ROW_HEIGHT - 8.0);
            controls.extend(button(remove, DANGER, "✖", fs));
            y = row.bottom;
        }
        y += fs * 1.5;

        // Totals
        let subtotal = format!("Subtotal: {}", format_amount(invoice.subtotal(), currency));
        content.push(text(inner_x1, y, fs, TextAnchor::End, TEXT, &subtotal));
        y += fs * 1.5 + 8.0;
        let total_size = fs * 1.25;
        let total = format!("Total: {}", format_amount(invoice.total(), currency));
        content.push(text(inner_x1, y, total_size, TextAnchor::End, TEXT, &total));
        y += total_size * 1.5;

        let content_box = BBox::new(x0, MARGIN, x1, y + PADDING);
        let mut content_region = Region::new(CONTENT_REGION, content_box);
        content_region.push(Node::Rect {
            bbox: content_box,
            fill: Some(Color::WHITE),
            stroke: Some(BORDER),
            stroke_width: 1.0,
        });
        content_region.nodes.extend(content);

        // Add-item and export buttons below the printable box.
        let button_top = content_box.bottom + 16.0;
        let add = BBox::from_xywh(x1 - 140.0, button_top, 140.0, BUTTON_HEIGHT);
        controls.extend(button(add, SUCCESS, "+ Add Item", fs));
        let export = BBox::from_xywh(
            (x0 + x1) / 2.0 - 110.0,
            add.bottom + 16.0,
            220.0,
            BUTTON_HEIGHT,
        );
        controls.extend(button(export, PRIMARY, "Generate Invoice PDF", fs));
        let controls_box = controls
            .iter()
            .map(Node::bounds)
            .fold(add.union(&export), |acc, b| acc.union(&b));
        let mut controls_region = Region::new(CONTROLS_REGION, controls_box);
        controls_region.nodes = controls;

        let mut doc = Document::new(opts.viewport);
        doc.push(content_region);
        doc.push(controls_region);
        doc
    }
}

/// Show a stored number the way a number input would: blank for `NaN`.
pub fn display_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.is_infinite() {
        if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string()
    } else {
        format!("{value}")
    }
}

fn column_edges(x0: f64, width: f64) -> [f64; 5] {
    let mut edges = [x0; 5];
    for (i, weight) in COLUMN_WEIGHTS.iter().enumerate() {
        edges[i + 1] = edges[i] + width * weight;
    }
    edges
}

fn centered_top(cell: BBox, size: f64) -> f64 {
    cell.top + (cell.height() - size * crate::view::LINE_HEIGHT) / 2.0
}

fn text(x: f64, top: f64, size: f64, anchor: TextAnchor, color: Color, content: &str) -> Node {
    Node::Text {
        x,
        top,
        size,
        anchor,
        color,
        content: content.to_string(),
    }
}

fn outlined(bbox: BBox, fill: Option<Color>) -> Node {
    Node::Rect {
        bbox,
        fill,
        stroke: Some(BORDER),
        stroke_width: 1.0,
    }
}

fn button(bbox: BBox, fill: Color, label: &str, size: f64) -> [Node; 2] {
    [
        Node::Rect {
            bbox,
            fill: Some(fill),
            stroke: None,
            stroke_width: 0.0,
        },
        text(
            (bbox.x0 + bbox.x1) / 2.0,
            centered_top(bbox, size),
            size,
            TextAnchor::Middle,
            Color::WHITE,
            label,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::ItemField;

    fn sample_invoice() -> Invoice {
        let mut invoice = Invoice::with_blank_item();
        invoice.set_customer("Asha Traders");
        invoice.set_date("2024-03-01");
        invoice.update_item(0, ItemField::Name, "Cotton shirt").unwrap();
        invoice.update_item(0, ItemField::Quantity, "2").unwrap();
        invoice.update_item(0, ItemField::Price, "100").unwrap();
        invoice.add_item();
        invoice.update_item(1, ItemField::Name, "Scarf").unwrap();
        invoice.update_item(1, ItemField::Price, "50").unwrap();
        invoice
    }

    fn content_texts(doc: &Document) -> Vec<String> {
        doc.region(CONTENT_REGION)
            .unwrap()
            .texts()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn renders_content_and_controls_regions() {
        let doc = InvoiceLayout::default().render(&sample_invoice());
        assert!(doc.region(CONTENT_REGION).is_some());
        assert!(doc.region(CONTROLS_REGION).is_some());
        assert_eq!(doc.regions.len(), 2);
    }

    #[test]
    fn content_shows_rows_and_totals() {
        let texts = content_texts(&InvoiceLayout::default().render(&sample_invoice()));
        for expected in [
            "INVOICE",
            "Asha Traders",
            "2024-03-01",
            "Cotton shirt",
            "₹200.00",
            "₹50.00",
            "Subtotal: ₹250.00",
            "Total: ₹250.00",
        ] {
            assert!(texts.iter().any(|t| t == expected), "missing {expected:?} in {texts:?}");
        }
    }

    #[test]
    fn controls_are_not_in_content() {
        let doc = InvoiceLayout::default().render(&sample_invoice());
        let texts = content_texts(&doc);
        assert!(!texts.iter().any(|t| t.contains("Generate Invoice PDF")));
        assert!(!texts.iter().any(|t| t.contains("Add Item")));
        assert!(!texts.iter().any(|t| t.contains('✖')));

        let controls: Vec<&str> = doc.region(CONTROLS_REGION).unwrap().texts().collect();
        assert!(controls.contains(&"Generate Invoice PDF"));
        assert!(controls.contains(&"+ Add Item"));
        assert_eq!(controls.iter().filter(|t| **t == "✖").count(), 2);
    }

    #[test]
    fn controls_region_does_not_overlap_content() {
        let doc = InvoiceLayout::default().render(&sample_invoice());
        let content = doc.region(CONTENT_REGION).unwrap().bbox;
        for node in &doc.region(CONTROLS_REGION).unwrap().nodes {
            assert!(content.intersection(&node.bounds()).is_none(), "{node:?}");
        }
    }

    #[test]
    fn nan_total_is_visible() {
        let mut invoice = sample_invoice();
        invoice.update_item(1, ItemField::Quantity, "x").unwrap();
        let texts = content_texts(&InvoiceLayout::default().render(&invoice));
        assert!(texts.iter().any(|t| t == "Total: ₹NaN"));
        assert!(texts.iter().any(|t| t == "₹NaN"));
    }

    #[test]
    fn empty_fields_show_placeholders() {
        let texts = content_texts(&InvoiceLayout::default().render(&Invoice::with_blank_item()));
        assert!(texts.iter().any(|t| t == "Enter customer name"));
        assert!(texts.iter().any(|t| t == "Item name"));
        assert!(texts.iter().any(|t| t == "Total: ₹0.00"));
    }

    #[test]
    fn content_grows_with_items() {
        let layout = InvoiceLayout::default();
        let mut invoice = Invoice::new();
        let empty = layout.render(&invoice).region(CONTENT_REGION).unwrap().bbox;
        for _ in 0..30 {
            invoice.add_item();
        }
        let doc = layout.render(&invoice);
        let tall = doc.region(CONTENT_REGION).unwrap().bbox;
        assert!((tall.height() - empty.height() - 30.0 * ROW_HEIGHT).abs() < 1e-9);
        // Thirty rows no longer fit the 768px viewport.
        assert!(doc.scroll_size().height > doc.viewport.height);
    }

    #[test]
    fn logo_is_drawn_when_configured() {
        let layout = InvoiceLayout::new(ViewOptions {
            logo: Some(ImageSource::parse("https://cdn.example.com/logo.png")),
            ..ViewOptions::default()
        });
        let doc = layout.render(&Invoice::new());
        let has_logo = doc
            .region(CONTENT_REGION)
            .unwrap()
            .nodes
            .iter()
            .any(|n| matches!(n, Node::Image { source, .. } if source.is_cross_origin()));
        assert!(has_logo);
    }

    #[test]
    fn display_number_formats_like_an_input() {
        assert_eq!(display_number(2.0), "2");
        assert_eq!(display_number(19.5), "19.5");
        assert_eq!(display_number(f64::NAN), "");
        assert_eq!(display_number(f64::INFINITY), "Infinity");
    }
}
