use std::path::Path;

use billdesk::billdesk_core::display_number;
use billdesk::{Currency, Invoice, format_amount, line_total};

use crate::cli::{InvoiceArgs, OutputFormat};
use crate::shared::load_invoice;

/// JSON number, or null when not finite.
fn amount_json(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

pub fn run(file: &Path, format: &OutputFormat, args: &InvoiceArgs) -> Result<(), i32> {
    let invoice = load_invoice(file, args)?;
    let currency = Currency::new(args.currency.clone());
    match format {
        OutputFormat::Text => print_text(&invoice, &currency),
        OutputFormat::Json => print_json(&invoice, &currency)?,
    }
    Ok(())
}

fn print_text(invoice: &Invoice, currency: &Currency) {
    println!("Customer: {}", invoice.customer_or_default());
    if let Some(date) = invoice.date() {
        println!("Date: {date}");
    }
    for (i, item) in invoice.items().iter().enumerate() {
        println!(
            "{:>3}. {}  {} x {} = {}",
            i + 1,
            item.name,
            display_number(item.quantity),
            display_number(item.price),
            format_amount(line_total(item), currency)
        );
    }
    println!("Subtotal: {}", format_amount(invoice.subtotal(), currency));
    println!("Total: {}", format_amount(invoice.total(), currency));
}

fn print_json(invoice: &Invoice, currency: &Currency) -> Result<(), i32> {
    let items: Vec<serde_json::Value> = invoice
        .items()
        .iter()
        .map(|item| {
            let total = line_total(item);
            serde_json::json!({
                "name": item.name,
                "quantity": amount_json(item.quantity),
                "price": amount_json(item.price),
                "total": amount_json(total),
                "total_display": format_amount(total, currency),
            })
        })
        .collect();
    let output = serde_json::json!({
        "customer": invoice.customer_or_default(),
        "date": invoice.date(),
        "items": items,
        "subtotal": amount_json(invoice.subtotal()),
        "total": amount_json(invoice.total()),
        "total_display": format_amount(invoice.total(), currency),
    });
    let text = serde_json::to_string_pretty(&output).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    println!("{text}");
    Ok(())
}
