//! Bondora Capital (Go & Grow) account statements.
//!
//! Statements list one booking per line:
//!
//! ```text
//! 06.02.2022 Go & Grow Zinsen 0,22 € 1.228,18 €
//! 02/19/2023 Go & Grow Zinsen €1.62 €9,056.75
//! 06-10-2020 Überweisen 4,91 € 104,91 €
//! ```
//!
//! The separator of the date decides the number convention of the amounts.

use crate::convert::{parse_amount, parse_date, resolve_currency, DateOrder, NumberFormat};
use crate::engine::{
    Block, CaptureSet, DocumentType, PatternExtractor, PatternRule, Section, Transaction,
};
use crate::error::{ConfigurationError, ConversionError};
use crate::models::{AccountTransaction, ExtractedItem, TransactionType};

pub const LABEL: &str = "Bondora Capital";

const CURRENCY: &str = "EUR";

const BOOKING_LINE: &str = r"^([\d]{2}.[\d]{2}.[\d]{4}|[\d]{4}.[\d]{2}.[\d]{2}) .*$";

const NOTES: &str = r".berweisen|Transfer|Abheben|Go & Grow Zinsen|Go & Grow returns|Withdrawal";

/// Build the Bondora Capital extractor.
pub fn extractor() -> Result<PatternExtractor, ConfigurationError> {
    let transaction = Transaction::builder()
        .subject(|| AccountTransaction::new(TransactionType::Interest))
        .section(
            Section::new("type").optional().rule(
                PatternRule::new(format!(
                    r"^([\d]{{2}}.[\d]{{2}}.[\d]{{4}}|[\d]{{4}}.[\d]{{2}}.[\d]{{2}}) (?<type>{NOTES}) .*$"
                ))
                .attributes(["type"])
                .assign(|t: &mut AccountTransaction, v: &CaptureSet| {
                    match v.require("type")? {
                        "Überweisen" | "Transfer" => t.kind = TransactionType::Deposit,
                        "Abheben" | "Withdrawal" => t.kind = TransactionType::Removal,
                        _ => {}
                    }
                    Ok(())
                }),
            ),
        )
        .one_of(vec![dotted(), slashed(), dashed()])
        .wrap(ExtractedItem::Transaction)
        .build()?;

    let block = Block::builder(BOOKING_LINE)
        .max_size(1)
        .transaction(transaction)
        .build()?;

    PatternExtractor::builder(LABEL)
        .bank_identifiers(["Zusammenfassung", "Summary"])
        .document_type(
            DocumentType::builder("(Zusammenfassung|Summary)")
                .block(block)
                .build()?,
        )
        .build()
}

/// The booking-line pattern for one date separator and amount character class.
fn booking(separator: &str, amount: &str) -> String {
    let s = separator;
    format!(
        r"^(?<date>([\d]{{2}}{s}[\d]{{2}}{s}[\d]{{4}}|[\d]{{4}}{s}[\d]{{2}}{s}[\d]{{2}})) (?<note>({NOTES})) (\p{{Sc}})?(\W)?(?<amount>{amount}+)(\W)?(\p{{Sc}})(\W)?(\-)?{amount}+(\W)?(\p{{Sc}})?$"
    )
}

fn section(name: &str, pattern: String, bind: Binding) -> Section<AccountTransaction> {
    Section::new(name).rule(
        PatternRule::new(pattern)
            .attributes(["date", "note", "amount"])
            .assign(move |t: &mut AccountTransaction, v: &CaptureSet| {
                let (date, amount) = bind(v)?;
                t.date = Some(date);
                t.amount = amount;
                t.currency = resolve_currency(None, Some(CURRENCY))?;
                t.note = Some(v.require("note")?.trim().to_string());
                Ok(())
            }),
    )
}

type Binding = fn(&CaptureSet) -> Result<(chrono::NaiveDate, i64), ConversionError>;

// 07.02.2022 Überweisen 1.000 € 2.228,18 €
// 25.10.2020 Go & Grow Zinsen 1 € 5'630,99 €
fn dotted() -> Section<AccountTransaction> {
    section("dotted", booking(r"\.", r"[\.,'\d\s]"), |v| {
        let date = parse_date(v.require("date")?, DateOrder::DayFirst)?;

        let raw: String = v.require("amount")?.split_whitespace().collect();
        let format = if raw.contains('\'') {
            NumberFormat::for_locale("de", "CH")
        } else {
            NumberFormat::for_locale("de", "DE")
        };

        Ok((date, parse_amount(&raw, format)?))
    })
}

// 02/19/2023 Go & Grow Zinsen €1.62 €9,056.75
fn slashed() -> Section<AccountTransaction> {
    section("slashed", booking("/", r"[\.,\d]"), |v| {
        let date = parse_date(v.require("date")?, DateOrder::MonthFirst)?;
        Ok((date, parse_amount(v.require("amount")?, NumberFormat::for_locale("en", "US"))?))
    })
}

// 06-10-2020 Go & Grow Zinsen 0,02 € 154,93 €
fn dashed() -> Section<AccountTransaction> {
    section("dashed", booking("-", r"[\.,\d]"), |v| {
        let date = parse_date(v.require("date")?, DateOrder::DayFirst)?;
        Ok((date, parse_amount(v.require("amount")?, NumberFormat::for_locale("de", "DE"))?))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StatementExtractor;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn extract(lines: &[&str]) -> Vec<AccountTransaction> {
        let text = format!("Bondora Capital OÜ\nZusammenfassung\n{}\n", lines.join("\n"));
        extractor()
            .unwrap()
            .extract(&text)
            .unwrap()
            .items
            .iter()
            .filter_map(ExtractedItem::transaction)
            .cloned()
            .collect()
    }

    fn expected(date: (i32, u32, u32), kind: TransactionType, amount: i64, note: &str) -> AccountTransaction {
        AccountTransaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            kind,
            amount,
            currency: "EUR".to_string(),
            note: Some(note.to_string()),
        }
    }

    #[test]
    fn test_german_deposit() {
        assert_eq!(
            extract(&["07.02.2022 Überweisen 1.000 € 2.228,18 €"]),
            vec![expected((2022, 2, 7), TransactionType::Deposit, 100000, "Überweisen")]
        );
    }

    #[test]
    fn test_german_interest() {
        assert_eq!(
            extract(&["06.02.2022 Go & Grow Zinsen 0,22 € 1.228,18 €"]),
            vec![expected((2022, 2, 6), TransactionType::Interest, 22, "Go & Grow Zinsen")]
        );
    }

    #[test]
    fn test_swiss_grouping() {
        assert_eq!(
            extract(&[
                "25.10.2020 Go & Grow Zinsen 1 € 5'630,99 €",
                "26.10.2020 Go & Grow Zinsen 1,01 € 5'632 €",
                "27.10.2020 Überweisen 5'630,99 € 11'262,99 €",
            ]),
            vec![
                expected((2020, 10, 25), TransactionType::Interest, 100, "Go & Grow Zinsen"),
                expected((2020, 10, 26), TransactionType::Interest, 101, "Go & Grow Zinsen"),
                expected((2020, 10, 27), TransactionType::Deposit, 563099, "Überweisen"),
            ]
        );
    }

    #[test]
    fn test_us_layout() {
        assert_eq!(
            extract(&["02/19/2023 Go & Grow Zinsen €1.62 €9,056.75"]),
            vec![expected((2023, 2, 19), TransactionType::Interest, 162, "Go & Grow Zinsen")]
        );
    }

    #[test]
    fn test_dashed_layout_and_withdrawal() {
        assert_eq!(
            extract(&[
                "06-10-2020 Überweisen 4,91 € 104,91 €",
                "07-10-2020 Abheben 50 € 54,91 €",
            ]),
            vec![
                expected((2020, 10, 6), TransactionType::Deposit, 491, "Überweisen"),
                expected((2020, 10, 7), TransactionType::Removal, 5000, "Abheben"),
            ]
        );
    }

    #[test]
    fn test_unmatched_line_is_dropped() {
        let text = "Summary\n\
            07.02.2022 Kontostand 2.228,18 €\n\
            06.02.2022 Go & Grow Zinsen 0,22 € 1.228,18 €\n";
        let result = extractor().unwrap().extract(text).unwrap();

        assert_eq!(result.blocks_total, 2);
        assert_eq!(result.blocks_failed, 1);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].transaction().map(|t| t.amount), Some(22));
    }

    #[test]
    fn test_other_documents_are_ignored() {
        let extractor = extractor().unwrap();
        assert!(extractor.extract("Kontoauszug\n07.02.2022 Überweisen 1.000 € 2.228,18 €").is_none());
    }
}
