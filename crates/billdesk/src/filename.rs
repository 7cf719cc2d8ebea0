//! Download file names.

use billdesk_core::DEFAULT_CUSTOMER;

/// `Invoice_<customer>_<epoch_ms>.pdf`.
///
/// An empty customer becomes `Customer`. Path separators and control
/// characters are replaced with `_` so the name stays a single path
/// component; everything else is kept as typed.
pub fn invoice_filename(customer: &str, epoch_ms: i64) -> String {
    let name = if customer.is_empty() {
        DEFAULT_CUSTOMER.to_string()
    } else {
        sanitize(customer)
    };
    format!("Invoice_{name}_{epoch_ms}.pdf")
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_customer_uses_default() {
        assert_eq!(
            invoice_filename("", 1_700_000_000_000),
            "Invoice_Customer_1700000000000.pdf"
        );
    }

    #[test]
    fn customer_name_is_kept_verbatim() {
        assert_eq!(
            invoice_filename("Asha Rao", 1_700_000_000_123),
            "Invoice_Asha Rao_1700000000123.pdf"
        );
        assert_eq!(invoice_filename("Zoë", 5), "Invoice_Zoë_5.pdf");
    }

    #[test]
    fn whitespace_only_customer_is_not_empty() {
        assert_eq!(invoice_filename(" ", 1), "Invoice_ _1.pdf");
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(
            invoice_filename("../etc/passwd", 1),
            "Invoice_.._etc_passwd_1.pdf"
        );
        assert_eq!(invoice_filename("a\\b:c", 2), "Invoice_a_b_c_2.pdf");
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(invoice_filename("a\nb\tc", 3), "Invoice_a_b_c_3.pdf");
    }
}
