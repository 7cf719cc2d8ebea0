//! Error types for the invoice model.
//!
//! [`InvoiceError`] covers the two ways an edit can be refused: addressing an
//! item that does not exist, and (under [`NumericPolicy::Reject`]) numeric
//! text that does not parse.
//!
//! [`NumericPolicy::Reject`]: crate::NumericPolicy::Reject

use std::fmt;

use crate::invoice::ItemField;

/// Error returned by invoice mutations.
///
/// A failed mutation never modifies the invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    /// An update or removal addressed an item outside `0..len`.
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Number of items at the time of the request.
        len: usize,
    },
    /// Numeric text was refused at entry (only with `NumericPolicy::Reject`).
    InvalidNumericInput {
        /// Field the text was entered into.
        field: ItemField,
        /// The raw text as entered.
        raw: String,
    },
}

impl fmt::Display for InvoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceError::IndexOutOfRange { index, len } => {
                write!(f, "item index {index} out of range (invoice has {len} items)")
            }
            InvoiceError::InvalidNumericInput { field, raw } => {
                write!(f, "invalid numeric input for {field}: '{raw}'")
            }
        }
    }
}

impl std::error::Error for InvoiceError {}

/// Result type used by invoice mutations.
pub type InvoiceResult<T> = Result<T, InvoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_display() {
        let err = InvoiceError::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(
            err.to_string(),
            "item index 3 out of range (invoice has 2 items)"
        );
    }

    #[test]
    fn invalid_numeric_input_display() {
        let err = InvoiceError::InvalidNumericInput {
            field: ItemField::Price,
            raw: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid numeric input for price: 'abc'");
    }

    #[test]
    fn invoice_error_implements_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(InvoiceError::IndexOutOfRange { index: 0, len: 0 });
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn invoice_error_clone_and_eq() {
        let err = InvoiceError::InvalidNumericInput {
            field: ItemField::Quantity,
            raw: "x".to_string(),
        };
        assert_eq!(err.clone(), err);
    }
}
