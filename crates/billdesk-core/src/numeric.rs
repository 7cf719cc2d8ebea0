//! Coercion of user-entered text into numbers.
//!
//! Form fields hand over text. Quantities and prices are read with a lenient
//! float parse: leading whitespace is skipped and the longest numeric prefix
//! is taken, so `"12kg"` reads as `12`. Text without a numeric prefix reads
//! as `NaN`, which then shows up in every total that depends on it.

/// How invalid numeric text is treated when it is entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericPolicy {
    /// Store `NaN` and let it surface in the totals.
    #[default]
    Propagate,
    /// Refuse the edit and leave the field unchanged.
    Reject,
}

/// Parse the longest numeric prefix of `raw`, or `NaN` if there is none.
///
/// Accepts an optional sign, digits with an optional fractional part, an
/// optional exponent and the literal `Infinity`.
pub fn parse_lenient(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerce `raw` under `policy`.
///
/// Returns `None` when the policy refuses the text.
pub fn coerce(raw: &str, policy: NumericPolicy) -> Option<f64> {
    let value = parse_lenient(raw);
    match policy {
        NumericPolicy::Propagate => Some(value),
        NumericPolicy::Reject if value.is_nan() => None,
        NumericPolicy::Reject => Some(value),
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
