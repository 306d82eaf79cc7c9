//! Date conversion for numeric statement dates.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ConversionError;

lazy_static! {
    // Three numeric fields joined by one of `.`, `/`, `-`.
    static ref DATE_PARTS: Regex = Regex::new(
        r"^(\d{1,4})([./\-])(\d{1,2})([./\-])(\d{1,4})$"
    ).unwrap();
}

/// Order of day and month when the year comes last.
///
/// A four-digit leading field is always read as `YYYY?MM?DD`, so the order
/// only disambiguates `DD.MM.YYYY` from `MM/DD/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `DD.MM.YYYY`, `DD-MM-YYYY`, `DD/MM/YYYY`
    DayFirst,
    /// `MM/DD/YYYY`
    MonthFirst,
}

/// Parse a numeric date such as `07.02.2022`, `2022-02-07`, or `02/19/2023`.
///
/// Both separators must be the same character and the result must be a
/// calendar date (`30.02.2022` is rejected).
pub fn parse_date(s: &str, order: DateOrder) -> Result<NaiveDate, ConversionError> {
    let s = s.trim();
    let invalid = || ConversionError::InvalidDate(s.to_string());

    let caps = DATE_PARTS.captures(s).ok_or_else(invalid)?;
    if caps[2] != caps[4] {
        return Err(invalid());
    }

    let (first, second, third) = (&caps[1], &caps[3], &caps[5]);

    let (year, month, day) = if first.len() == 4 && third.len() <= 2 {
        (first, second, third)
    } else if third.len() == 4 && first.len() <= 2 {
        match order {
            DateOrder::DayFirst => (third, second, first),
            DateOrder::MonthFirst => (third, first, second),
        }
    } else {
        return Err(invalid());
    };

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}
