//! Value formatting for rendered cells.

use finreport_core::{Decimal, Formatting, NumberFormat, RenderedRow};
use rust_decimal::RoundingStrategy;

/// Largest number of decimal places rendered.
const MAX_DECIMALS: u32 = 10;

/// Format a value for display.
///
/// Blank values format as the empty string. Rounding is half away from zero.
///
/// ```
/// use finreport_core::{Formatting, NumberFormat};
/// use finreport_render::apply_formatting;
/// use rust_decimal_macros::dec;
///
/// let mut formatting = Formatting::default();
/// formatting.currency.symbol = "€".to_string();
///
/// assert_eq!(apply_formatting(Some(dec!(1234.56)), NumberFormat::Currency, &formatting), "€ 1,235");
/// assert_eq!(apply_formatting(Some(dec!(12.345)), NumberFormat::Percent, &formatting), "12.3%");
/// assert_eq!(apply_formatting(None, NumberFormat::Decimal, &formatting), "");
/// ```
#[must_use]
pub fn apply_formatting(value: Option<Decimal>, format: NumberFormat, formatting: &Formatting) -> String {
    let Some(value) = value else {
        return String::new();
    };

    match format {
        NumberFormat::Currency => {
            let c = &formatting.currency;
            let number = format_number(value, u32::from(c.decimals), c.thousands);
            if c.symbol.is_empty() {
                number
            } else {
                format!("{} {number}", c.symbol)
            }
        }
        NumberFormat::Percent => {
            let number = format_number(value, u32::from(formatting.percent.decimals), false);
            format!("{number}%")
        }
        NumberFormat::Integer => format_number(value, 0, formatting.integer.thousands),
        NumberFormat::Decimal => {
            let d = &formatting.decimal;
            format_number(value, u32::from(d.decimals), d.thousands)
        }
    }
}

/// Format one cell of a row; rows without a format use currency.
#[must_use]
pub fn format_cell(row: &RenderedRow, year: i32, formatting: &Formatting) -> String {
    let format = row.format.unwrap_or(NumberFormat::Currency);
    apply_formatting(row.amounts.get(&year).copied().flatten(), format, formatting)
}

/// Round to `decimals` places and render with an optional `,` thousands separator.
#[must_use]
pub fn format_number(value: Decimal, decimals: u32, thousands: bool) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());

    let (integer, fraction) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    if thousands {
        out.push_str(&group_thousands(integer));
    } else {
        out.push_str(integer);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
