use std::path::{Path, PathBuf};

use billdesk::billdesk_core::ImageSource;
use billdesk::billdesk_raster::DefaultLoader;
use billdesk::{
    CaptureOptions, Currency, Invoice, ItemField, NumericPolicy, Rasterizer, TextRenderer,
    ViewOptions,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{CaptureArgs, InvoiceArgs, ViewArgs};

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// On-disk invoice: every field optional, numbers as JSON numbers or text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvoiceFile {
    customer: String,
    date: Option<String>,
    items: Vec<ItemEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemEntry {
    name: String,
    quantity: Option<FieldValue>,
    price: Option<FieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    fn raw(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Build an invoice from JSON text, entering every value the way a form
/// field would: one item at a time, through `update_item`.
pub fn parse_invoice(json: &str, policy: NumericPolicy) -> Result<Invoice, String> {
    let file: InvoiceFile =
        serde_json::from_str(json).map_err(|e| format!("invalid invoice file: {e}"))?;

    let mut invoice = Invoice::new().with_policy(policy);
    invoice.set_customer(file.customer);
    if let Some(date) = file.date {
        invoice.set_date(date);
    }
    for (index, entry) in file.items.iter().enumerate() {
        invoice.add_item();
        let fields = [
            (ItemField::Name, Some(entry.name.clone())),
            (ItemField::Quantity, entry.quantity.as_ref().map(FieldValue::raw)),
            (ItemField::Price, entry.price.as_ref().map(FieldValue::raw)),
        ];
        for (field, raw) in fields {
            if let Some(raw) = raw {
                invoice
                    .update_item(index, field, &raw)
                    .map_err(|e| format!("{e} (item {})", index + 1))?;
            }
        }
    }
    Ok(invoice)
}

/// Read and parse an invoice file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr on failure.
pub fn load_invoice(file: &Path, args: &InvoiceArgs) -> Result<Invoice, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    let json = std::fs::read_to_string(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })?;
    let policy = if args.reject_invalid {
        NumericPolicy::Reject
    } else {
        NumericPolicy::Propagate
    };
    parse_invoice(&json, policy).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

pub fn view_options(invoice_args: &InvoiceArgs, view: &ViewArgs) -> ViewOptions {
    ViewOptions {
        title: view.title.clone(),
        currency: Currency::new(invoice_args.currency.clone()),
        logo: view.logo.as_deref().map(ImageSource::parse),
        ..ViewOptions::default()
    }
}

/// Validate capture flags and build the rasterizer. Relative image paths
/// resolve against the invoice file's directory.
pub fn rasterizer(invoice_file: &Path, args: &CaptureArgs) -> Result<Rasterizer, i32> {
    let text = match &args.font {
        Some(path) => TextRenderer::from_file(path).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?,
        None => TextRenderer::discover(),
    };
    let base_dir = invoice_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(PathBuf::new);
    Ok(Rasterizer::new(text, DefaultLoader::with_base_dir(base_dir)))
}

pub fn capture_options(args: &CaptureArgs) -> Result<CaptureOptions, i32> {
    if !(args.scale.is_finite() && args.scale > 0.0) {
        eprintln!("Error: --scale must be a positive number, got {}", args.scale);
        return Err(1);
    }
    Ok(CaptureOptions {
        scale: args.scale,
        allow_cross_origin: !args.no_cross_origin,
        ..CaptureOptions::default()
    })
}
