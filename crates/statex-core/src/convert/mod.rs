//! Locale-aware conversion of captured text into amounts, dates, and currencies.
//!
//! Converters never guess the layout of a value: the call site picks the
//! [`NumberFormat`] or [`DateOrder`] that matches the pattern which captured it.

pub mod amounts;
pub mod currency;
pub mod dates;

pub use amounts::{format_amount, minor_to_decimal, parse_amount, parse_amount_scaled, DEFAULT_SCALE};
pub use currency::{as_currency_code, resolve_currency};
pub use dates::{parse_date, DateOrder};

use serde::{Deserialize, Serialize};

/// Digit grouping (thousands) separator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// `1.234.567`
    Period,
    /// `1,234,567`
    Comma,
    /// `1'234'567` (ASCII or typographic apostrophe)
    Apostrophe,
    /// `1 234 567` (space, no-break space, or narrow no-break space)
    Space,
}

/// Decimal separator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalSeparator {
    Comma,
    Period,
}

/// A number convention: grouping style × decimal style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub grouping: Grouping,
    pub decimal: DecimalSeparator,
}

impl NumberFormat {
    /// `1.234,56` (de-DE, de-AT, nl, es, it, ...)
    pub const GERMAN: Self = Self::new(Grouping::Period, DecimalSeparator::Comma);
    /// `1,234.56` (en-US, en-GB, ...)
    pub const ENGLISH: Self = Self::new(Grouping::Comma, DecimalSeparator::Period);
    /// `1'234.56` (de-CH, fr-CH, it-CH, de-LI)
    pub const SWISS: Self = Self::new(Grouping::Apostrophe, DecimalSeparator::Period);
    /// `1 234,56` (fr-FR, pl, cs, sv, ...)
    pub const FRENCH: Self = Self::new(Grouping::Space, DecimalSeparator::Comma);

    pub const fn new(grouping: Grouping, decimal: DecimalSeparator) -> Self {
        Self { grouping, decimal }
    }

    /// Map a (language, country) hint to its number convention.
    ///
    /// Unknown hints fall back to [`NumberFormat::GERMAN`].
    pub fn for_locale(language: &str, country: &str) -> Self {
        let language = language.to_ascii_lowercase();
        let country = country.to_ascii_uppercase();

        match (language.as_str(), country.as_str()) {
            (_, "CH") | (_, "LI") => Self::SWISS,
            ("en", _) | (_, "US") | (_, "GB") | (_, "IE") | (_, "AU") | (_, "CA") => Self::ENGLISH,
            ("fr", _) | ("pl", _) | ("cs", _) | ("sk", _) | ("sv", _) | ("fi", _) | ("nb", _)
            | ("no", _) | ("hu", _) | ("ru", _) => Self::FRENCH,
            _ => Self::GERMAN,
        }
    }

    /// Whether `c` separates digit groups under this convention.
    pub fn is_grouping(&self, c: char) -> bool {
        match self.grouping {
            Grouping::Period => c == '.',
            Grouping::Comma => c == ',',
            Grouping::Apostrophe => c == '\'' || c == '\u{2019}',
            Grouping::Space => c == ' ' || c == '\u{00a0}' || c == '\u{202f}',
        }
    }

    /// Whether `c` marks the start of the fractional part.
    ///
    /// Apostrophe grouping leaves both `.` and `,` free, and statements using
    /// it print either one, so both are accepted.
    pub fn is_decimal(&self, c: char) -> bool {
        if self.grouping == Grouping::Apostrophe {
            return c == '.' || c == ',';
        }
        match self.decimal {
            DecimalSeparator::Comma => c == ',',
            DecimalSeparator::Period => c == '.',
        }
    }

    /// Character written between digit groups.
    pub fn grouping_char(&self) -> char {
        match self.grouping {
            Grouping::Period => '.',
            Grouping::Comma => ',',
            Grouping::Apostrophe => '\'',
            Grouping::Space => ' ',
        }
    }

    /// Character written before the fractional digits.
    pub fn decimal_char(&self) -> char {
        match self.decimal {
            DecimalSeparator::Comma => ',',
            DecimalSeparator::Period => '.',
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::GERMAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_locale() {
        assert_eq!(NumberFormat::for_locale("de", "DE"), NumberFormat::GERMAN);
        assert_eq!(NumberFormat::for_locale("de", "CH"), NumberFormat::SWISS);
        assert_eq!(NumberFormat::for_locale("en", "US"), NumberFormat::ENGLISH);
        assert_eq!(NumberFormat::for_locale("fr", "FR"), NumberFormat::FRENCH);
        assert_eq!(NumberFormat::for_locale("xx", "ZZ"), NumberFormat::GERMAN);
    }

    #[test]
    fn test_apostrophe_accepts_both_decimal_marks() {
        let swiss = NumberFormat::SWISS;
        assert!(swiss.is_decimal('.'));
        assert!(swiss.is_decimal(','));
        assert!(swiss.is_grouping('\''));
        assert!(!NumberFormat::GERMAN.is_decimal('.'));
    }
}
