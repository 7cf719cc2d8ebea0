//! Invoice data model and total computation.
//!
//! An [`Invoice`] holds a customer name, an optional date and an ordered list
//! of [`LineItem`]s. Totals are never cached: [`Invoice::subtotal`] and
//! [`Invoice::total`] fold over the current items on every call, so every
//! mutation is visible to the next read.

use std::fmt;
use std::str::FromStr;

use crate::error::{InvoiceError, InvoiceResult};
use crate::numeric::{NumericPolicy, coerce};

/// Customer label used when the customer name is empty.
pub const DEFAULT_CUSTOMER: &str = "Customer";

/// One billable row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineItem {
    /// Free-form label, may be empty.
    pub name: String,
    /// Quantity; `NaN` when the entered text was not numeric.
    pub quantity: f64,
    /// Unit price; `NaN` when the entered text was not numeric.
    pub price: f64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// A fresh row: empty name, quantity 1, price 0.
    pub fn blank() -> Self {
        Self::new("", 1.0, 0.0)
    }

    /// `quantity * price` for this row.
    pub fn total(&self) -> f64 {
        line_total(self)
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self::blank()
    }
}

/// Editable field of a [`LineItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ItemField {
    Name,
    Quantity,
    Price,
}

impl ItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemField::Name => "name",
            ItemField::Quantity => "quantity",
            ItemField::Price => "price",
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ItemField::Name),
            "quantity" => Ok(ItemField::Quantity),
            "price" => Ok(ItemField::Price),
            other => Err(format!("unknown item field: '{other}'")),
        }
    }
}

/// `item.quantity * item.price`, `NaN` if either operand is `NaN`.
pub fn line_total(item: &LineItem) -> f64 {
    item.quantity * item.price
}

/// Sum of [`line_total`] over `items`, starting from zero.
///
/// A single `NaN` row makes the whole sum `NaN`. An empty slice sums to `0`.
pub fn grand_total(items: &[LineItem]) -> f64 {
    items.iter().fold(0.0, |sum, item| sum + line_total(item))
}

/// An invoice under construction.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Invoice {
    customer: String,
    date: Option<String>,
    items: Vec<LineItem>,
    #[cfg_attr(feature = "serde", serde(default))]
    policy: NumericPolicy,
}

impl Invoice {
    /// An invoice with no items.
    pub fn new() -> Self {
        Self::default()
    }

    /// An invoice seeded with one blank row, as a form shows it on open.
    pub fn with_blank_item() -> Self {
        let mut invoice = Self::new();
        invoice.add_item();
        invoice
    }

    /// Use `policy` for subsequent numeric edits.
    pub fn with_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: NumericPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Customer name, or [`DEFAULT_CUSTOMER`] when it is empty.
    pub fn customer_or_default(&self) -> &str {
        if self.customer.is_empty() {
            DEFAULT_CUSTOMER
        } else {
            &self.customer
        }
    }

    pub fn set_customer(&mut self, customer: impl Into<String>) {
        self.customer = customer.into();
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Set the billing date; empty text clears it.
    pub fn set_date(&mut self, date: impl Into<String>) {
        let date = date.into();
        self.date = if date.is_empty() { None } else { Some(date) };
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a blank row (empty name, quantity 1, price 0).
    pub fn add_item(&mut self) {
        self.items.push(LineItem::blank());
    }

    /// Set `field` of the item at `index` from raw input text.
    ///
    /// Names are stored verbatim; quantities and prices go through the
    /// lenient numeric parse.
    pub fn update_item(&mut self, index: usize, field: ItemField, raw: &str) -> InvoiceResult<()> {
        let len = self.items.len();
        let policy = self.policy;
        let item = self
            .items
            .get_mut(index)
            .ok_or(InvoiceError::IndexOutOfRange { index, len })?;

        match field {
            ItemField::Name => item.name = raw.to_string(),
            ItemField::Quantity | ItemField::Price => {
                let value =
                    coerce(raw, policy).ok_or_else(|| InvoiceError::InvalidNumericInput {
                        field,
                        raw: raw.to_string(),
                    })?;
                if field == ItemField::Quantity {
                    item.quantity = value;
                } else {
                    item.price = value;
                }
            }
        }
        Ok(())
    }

    /// Remove and return the item at `index`; later items shift left.
    pub fn remove_item(&mut self, index: usize) -> InvoiceResult<LineItem> {
        let len = self.items.len();
        if index >= len {
            return Err(InvoiceError::IndexOutOfRange { index, len });
        }
        Ok(self.items.remove(index))
    }

    pub fn subtotal(&self) -> f64 {
        grand_total(&self.items)
    }

    /// Amount due. No tax or discount stage exists, so this equals the
    /// subtotal, but it is computed on its own.
    pub fn total(&self) -> f64 {
        self.items.iter().map(line_total).fold(0.0, |sum, t| sum + t)
    }
}
