//! Conversion between free-text currency input and numeric values.
//!
//! Input follows the pt-BR conventions of the form: `.` groups thousands,
//! `,` separates decimals and a leading `R$` symbol is ignored. Display
//! strings use the same locale with BRL currency.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Per-field message shown while a field holds a negative amount.
pub const NEGATIVE_AMOUNT: &str = "Valor não pode ser negativo";

/// Separator the pt-BR currency format places after the symbol.
const NBSP: char = '\u{a0}';

/// Rounds to two decimal places, midpoint away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use sim_core::normalize::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses user-typed currency text into an amount.
///
/// Empty or non-numeric input yields zero. A `-` ahead of the first digit
/// makes the amount negative; the caller decides whether that is an error.
pub fn parse_amount(text: &str) -> Decimal {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    let negative = trimmed
        .chars()
        .find(|c| c.is_ascii_digit() || *c == '-')
        .is_some_and(|c| c == '-');

    let normalized: String = trimmed
        .replace('.', "")
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match Decimal::from_str(&normalized) {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => {
            if !normalized.is_empty() {
                tracing::debug!(input = %text, "unparseable amount treated as zero");
            }
            Decimal::ZERO
        }
    }
}

/// Formats an amount as pt-BR BRL currency, e.g. `R$ 1.234,56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!("{sign}R${NBSP}{},{frac_part}", group_thousands(int_part))
}

/// Formats a ratio as a percentage with two decimals, e.g. `0.1534` ->
/// `15.34%`.
pub fn format_rate(value: Decimal) -> String {
    format!("{:.2}%", round_half_up(value.saturating_mul(Decimal::ONE_HUNDRED)))
}

/// Text a field shows while being edited: the raw number with a decimal
/// comma, no grouping and no symbol. Zero shows as an empty field.
///
/// The result parses back to the same value with [`parse_amount`].
pub fn edit_text(value: Decimal) -> String {
    if value.is_zero() {
        return String::new();
    }
    value.normalize().to_string().replace('.', ",")
}

/// Per-field validation: negative amounts are flagged, never clamped.
pub fn validate_amount(value: Decimal) -> Option<&'static str> {
    if value < Decimal::ZERO {
        Some(NEGATIVE_AMOUNT)
    } else {
        None
    }
}

/// `dd/mm/yyyy`, or `-` when the date is unknown.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Inserts `.` between groups of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
