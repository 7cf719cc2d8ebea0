//! Currency display.
//!
//! Amounts are kept as `f64` and only rounded when displayed.

use std::fmt;

/// Currency glyph used as a prefix on displayed amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Currency {
    pub symbol: String,
}

impl Currency {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("₹")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Format `amount` with the currency prefix and exactly two decimals.
///
/// `NaN` is shown as `NaN` so an invalid total can never be mistaken for a
/// zero one. Infinite amounts read `Infinity` / `-Infinity`.
pub fn format_amount(amount: f64, currency: &Currency) -> String {
    let symbol = &currency.symbol;
    if amount.is_nan() {
        return format!("{symbol}NaN");
    }
    if amount.is_infinite() {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{symbol}{sign}Infinity");
    }
    // -0.0 prints as "0.00"
    let amount = if amount == 0.0 { 0.0 } else { amount };
    // Exact half-cent ties are the odd multiples of 1/8; they round away
    // from zero, where `{:.2}` would round them to even.
    let magnitude = amount.abs();
    let eighths = magnitude * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let sign = if amount < 0.0 { "-" } else { "" };
        let cents = (magnitude * 100.0).ceil() as u64;
        return format!("{symbol}{sign}{}.{:02}", cents / 100, cents % 100);
    }
    format!("{symbol}{amount:.2}")
}
