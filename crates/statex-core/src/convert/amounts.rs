//! Amount conversion into exact minor-unit integers.

use rust_decimal::Decimal;

use super::currency::strip_currency;
use super::NumberFormat;
use crate::error::ConversionError;

/// Fractional digits of a monetary amount (cents).
pub const DEFAULT_SCALE: u32 = 2;

/// Largest scale whose minor units still fit comfortably into an `i64`.
const MAX_SCALE: u32 = 18;

/// Parse an amount into minor units (two fractional digits).
///
/// `"1.000 €"` under [`NumberFormat::GERMAN`] is `100000`.
pub fn parse_amount(s: &str, format: NumberFormat) -> Result<i64, ConversionError> {
    parse_amount_scaled(s, format, DEFAULT_SCALE)
}

/// Parse an amount into units of `10^-scale`.
///
/// Surrounding whitespace and currency symbols are stripped. Grouping
/// separators are dropped, the decimal separator may appear once, and any
/// other character rejects the value. More than `scale` fractional digits is
/// an error rather than a rounding.
pub fn parse_amount_scaled(s: &str, format: NumberFormat, scale: u32) -> Result<i64, ConversionError> {
    let invalid = |reason: &str| ConversionError::InvalidAmount {
        value: s.to_string(),
        reason: reason.to_string(),
    };

    if scale > MAX_SCALE {
        return Err(ConversionError::OutOfRange(s.to_string()));
    }

    let body = strip_currency(s);
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, strip_currency(rest)),
        None => (false, strip_currency(body.strip_prefix('+').unwrap_or(body))),
    };

    let mut normalized = String::with_capacity(body.len() + 1);
    let mut integer_digits = 0usize;
    let mut fraction_digits = 0u32;
    let mut seen_decimal = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        let next_is_digit = chars.peek().is_some_and(|n| n.is_ascii_digit());

        if c.is_ascii_digit() {
            normalized.push(c);
            if seen_decimal {
                fraction_digits += 1;
            } else {
                integer_digits += 1;
            }
        } else if !seen_decimal && format.is_decimal(c) {
            if !next_is_digit {
                return Err(invalid("decimal separator without fractional digits"));
            }
            if integer_digits == 0 {
                normalized.push('0');
            }
            normalized.push('.');
            seen_decimal = true;
        } else if !seen_decimal && format.is_grouping(c) {
            if integer_digits == 0 || !next_is_digit {
                return Err(invalid("misplaced grouping separator"));
            }
        } else {
            return Err(invalid(&format!("unexpected character `{}`", c)));
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return Err(invalid("no digits"));
    }

    if fraction_digits > scale {
        return Err(ConversionError::PrecisionExceeded {
            value: s.to_string(),
            scale,
        });
    }

    let mut value = Decimal::from_str_exact(&normalized)
        .map_err(|_| ConversionError::OutOfRange(s.to_string()))?;
    value.rescale(scale);

    let minor = i64::try_from(value.mantissa()).map_err(|_| ConversionError::OutOfRange(s.to_string()))?;
    Ok(if negative { -minor } else { minor })
}

/// Convert minor units back into a decimal value.
pub fn minor_to_decimal(minor: i64, scale: u32) -> Decimal {
    Decimal::new(minor, scale)
}

/// Format minor units with the grouping and decimal separators of `format`.
///
/// `format_amount(123456, NumberFormat::GERMAN, 2)` is `"1.234,56"`.
pub fn format_amount(minor: i64, format: NumberFormat, scale: u32) -> String {
    let digits = minor.unsigned_abs().to_string();
    let scale = scale as usize;

    // Left-pad so there is always at least one integer digit.
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (integer_part, fraction_part) = padded.split_at(padded.len() - scale);

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(padded.len() + chars.len() / 3 + 2);
    if minor < 0 {
        formatted.push('-');
    }
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(format.grouping_char());
        }
        formatted.push(*c);
    }

    if !fraction_part.is_empty() {
        formatted.push(format.decimal_char());
        formatted.push_str(fraction_part);
    }

    formatted
}
