//! Formats amounts for insight messages.

use numfmt::{Formatter, Precision};

/// How the digits before the decimal point are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitGrouping {
    /// Groups of three, e.g. "1,234,567".
    Thousands,
    /// The last three digits, then groups of two, e.g. "12,34,567".
    Indian,
}

impl DigitGrouping {
    /// Indian grouping for the rupee symbol, thousands for anything else.
    pub fn for_symbol(symbol: &str) -> Self {
        if symbol == "₹" {
            Self::Indian
        } else {
            Self::Thousands
        }
    }
}

/// Format `amount` with two decimal places and digit grouping, prefixed by
/// `symbol`, e.g. "₹12,34,567.50" or "$1,234,567.50".
///
/// Non-finite amounts are formatted as zero.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    // Whole cents avoid float rounding drift in the decimal places.
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let prefix = format!("{sign}{symbol}");

    let whole = format_whole(cents / 100, &prefix);
    let whole = match DigitGrouping::for_symbol(symbol) {
        DigitGrouping::Thousands => whole,
        DigitGrouping::Indian => regroup_indian(&whole, &prefix),
    };

    format!("{whole}.{:02}", cents % 100)
}

/// Format the whole units of an amount with thousands separators.
fn format_whole(whole: u64, prefix: &str) -> String {
    if whole == 0 {
        // Zero is hardcoded as "0" without the prefix
        return format!("{prefix}0");
    }

    match Formatter::currency(prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(0))
            .fmt_string(whole as f64),
        Err(error) => {
            tracing::warn!("could not format amounts with the prefix {prefix:?}: {error:?}");
            format!("{prefix}{whole}")
        }
    }
}

/// Rewrite the thousands grouping in `formatted` as Indian grouping.
fn regroup_indian(formatted: &str, prefix: &str) -> String {
    let digits: Vec<char> = formatted
        .strip_prefix(prefix)
        .unwrap_or(formatted)
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let split = digits.len().saturating_sub(3);
    let (lakhs, hundreds) = digits.split_at(split);
    let mut grouped = String::with_capacity(digits.len() * 2);

    // An odd number of leading digits starts with a single digit group.
    for (i, digit) in lakhs.iter().enumerate() {
        if i > 0 && (lakhs.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    if !lakhs.is_empty() {
        grouped.push(',');
    }
    grouped.extend(hundreds);

    format!("{prefix}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::{DigitGrouping, format_currency};

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_currency(0.0, "₹"), "₹0.00");
        assert_eq!(format_currency(12.5, "₹"), "₹12.50");
        assert_eq!(format_currency(0.129, "$"), "$0.13");
        assert_eq!(format_currency(7.0, "$"), "$7.00");
    }

    #[test]
    fn groups_thousands_for_other_symbols() {
        assert_eq!(format_currency(999.0, "$"), "$999.00");
        assert_eq!(format_currency(1000.0, "$"), "$1,000.00");
        assert_eq!(format_currency(1234567.891, "$"), "$1,234,567.89");
    }

    #[test]
    fn groups_lakhs_and_crores_for_rupees() {
        assert_eq!(format_currency(999.0, "₹"), "₹999.00");
        assert_eq!(format_currency(1000.0, "₹"), "₹1,000.00");
        assert_eq!(format_currency(150000.0, "₹"), "₹1,50,000.00");
        assert_eq!(format_currency(1234567.891, "₹"), "₹12,34,567.89");
        assert_eq!(format_currency(123456789.0, "₹"), "₹12,34,56,789.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_currency(-1500.0, "$"), "-$1,500.00");
        assert_eq!(format_currency(-250000.0, "₹"), "-₹2,50,000.00");
        assert_eq!(format_currency(-0.001, "$"), "$0.00");
    }

    #[test]
    fn formats_non_finite_as_zero() {
        assert_eq!(format_currency(f64::NAN, "₹"), "₹0.00");
        assert_eq!(format_currency(f64::INFINITY, "₹"), "₹0.00");
    }

    #[test]
    fn grouping_follows_symbol() {
        assert_eq!(DigitGrouping::for_symbol("₹"), DigitGrouping::Indian);
        assert_eq!(DigitGrouping::for_symbol("$"), DigitGrouping::Thousands);
    }
}
