//! Currency symbol and code normalization.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::ConversionError;

/// ISO 4217 codes accepted verbatim.
const KNOWN_CODES: &[&str] = &[
    "EUR", "USD", "GBP", "CHF", "JPY", "PLN", "CZK", "HUF", "SEK", "NOK", "DKK", "CAD", "AUD",
    "NZD", "INR", "RUB", "TRY", "KRW", "ILS", "CNY", "HKD", "SGD", "ZAR", "BRL", "MXN",
];

lazy_static! {
    static ref SYMBOLS: HashMap<&'static str, &'static str> = HashMap::from([
        ("€", "EUR"),
        ("$", "USD"),
        ("US$", "USD"),
        ("£", "GBP"),
        ("¥", "JPY"),
        ("Fr.", "CHF"),
        ("zł", "PLN"),
        ("Kč", "CZK"),
        ("Ft", "HUF"),
        ("₹", "INR"),
        ("₽", "RUB"),
        ("₺", "TRY"),
        ("₩", "KRW"),
        ("₪", "ILS"),
        ("C$", "CAD"),
        ("A$", "AUD"),
    ]);
}

/// Unicode currency symbols (`\p{Sc}` for the scripts statements use).
pub(crate) fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '¢' | '£' | '¤' | '¥' | '\u{20a0}'..='\u{20c0}')
}

fn trim_symbols(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || is_currency_symbol(c))
}

/// Trim whitespace, currency symbols, and ISO codes from both ends.
pub(crate) fn strip_currency(s: &str) -> &str {
    let mut rest = trim_symbols(s);
    loop {
        let before = rest.len();
        for code in KNOWN_CODES.iter().chain(["zł", "Kč", "Fr."].iter()) {
            if let Some(r) = rest.strip_prefix(code) {
                rest = trim_symbols(r);
            }
            if let Some(r) = rest.strip_suffix(code) {
                rest = trim_symbols(r);
            }
        }
        if rest.len() == before {
            return rest;
        }
    }
}

/// Map a currency symbol or ISO code to its canonical ISO code.
pub fn as_currency_code(symbol: &str) -> Result<String, ConversionError> {
    let symbol = symbol.trim();

    if let Some(code) = SYMBOLS.get(symbol) {
        return Ok((*code).to_string());
    }

    let upper = symbol.to_ascii_uppercase();
    if KNOWN_CODES.contains(&upper.as_str()) {
        return Ok(upper);
    }

    Err(ConversionError::UnknownCurrency(symbol.to_string()))
}

/// Pick the currency of a value.
///
/// A `fixed` currency implied by the rule wins and needs no symbol in the
/// text; otherwise the captured `symbol` must be recognized.
pub fn resolve_currency(symbol: Option<&str>, fixed: Option<&str>) -> Result<String, ConversionError> {
    match (fixed, symbol) {
        (Some(fixed), _) => as_currency_code(fixed),
        (None, Some(symbol)) => as_currency_code(symbol),
        (None, None) => Err(ConversionError::UnknownCurrency(String::new())),
    }
}
