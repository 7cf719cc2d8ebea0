//! An editable invoice bound to its view.

use std::sync::{Mutex, MutexGuard, PoisonError};

use billdesk_core::{Invoice, InvoiceLayout, InvoiceResult, ItemField, LineItem, ViewOptions};

use crate::pipeline::{ViewSnapshot, ViewSource};

/// Owns an invoice and renders it on demand.
///
/// Edits may arrive while an export is waiting out its settle delay; the
/// export sees whatever state is current when it snapshots.
#[derive(Debug)]
pub struct InvoiceSession {
    invoice: Mutex<Invoice>,
    layout: InvoiceLayout,
}

impl InvoiceSession {
    pub fn new(invoice: Invoice, options: ViewOptions) -> Self {
        Self {
            invoice: Mutex::new(invoice),
            layout: InvoiceLayout::new(options),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Invoice> {
        self.invoice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current invoice.
    pub fn invoice(&self) -> Invoice {
        self.lock().clone()
    }

    pub fn layout(&self) -> &InvoiceLayout {
        &self.layout
    }

    pub fn add_item(&self) {
        self.lock().add_item();
    }

    pub fn update_item(&self, index: usize, field: ItemField, raw: &str) -> InvoiceResult<()> {
        self.lock().update_item(index, field, raw)
    }

    pub fn remove_item(&self, index: usize) -> InvoiceResult<LineItem> {
        self.lock().remove_item(index)
    }

    pub fn set_customer(&self, customer: impl Into<String>) {
        self.lock().set_customer(customer);
    }

    pub fn set_date(&self, date: impl Into<String>) {
        self.lock().set_date(date);
    }

    pub fn total(&self) -> f64 {
        self.lock().total()
    }
}

impl ViewSource for InvoiceSession {
    fn snapshot(&self) -> ViewSnapshot {
        let invoice = self.lock();
        ViewSnapshot {
            document: self.layout.render(&invoice),
            customer: invoice.customer().to_string(),
        }
    }
}
