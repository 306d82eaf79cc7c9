//! Delimited export of extracted account transactions.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::convert::{format_amount, NumberFormat, DEFAULT_SCALE};
use crate::error::Result;
use crate::models::config::ExportConfig;
use crate::models::AccountTransaction;

/// Column names of the account transaction export.
pub const HEADER: [&str; 5] = ["Date", "Type", "Value", "Currency", "Note"];

/// Writes account transactions as `Date;Type;Value;Currency;Note` rows.
///
/// Dates are ISO formatted and values use `#,##0.00`.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    delimiter: u8,
    include_header: bool,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::from_config(&ExportConfig::default())
    }

    /// Exporter with the delimiter and header setting of `config`.
    ///
    /// Delimiters outside ASCII fall back to `;`.
    pub fn from_config(config: &ExportConfig) -> Self {
        let delimiter = if config.delimiter.is_ascii() {
            config.delimiter as u8
        } else {
            b';'
        };

        Self {
            delimiter,
            include_header: config.include_header,
        }
    }

    /// Write `transactions` to `writer`.
    pub fn write<'a, W, I>(&self, writer: W, transactions: I) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = &'a AccountTransaction>,
    {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        if self.include_header {
            csv.write_record(HEADER)?;
        }

        let mut rows = 0;
        for t in transactions {
            let date = t.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
            let value = format_amount(t.amount, NumberFormat::ENGLISH, DEFAULT_SCALE);

            csv.write_record([
                date.as_str(),
                t.kind.as_str(),
                value.as_str(),
                t.currency.as_str(),
                t.note.as_deref().unwrap_or(""),
            ])?;
            rows += 1;
        }

        csv.flush()?;
        Ok(rows)
    }

    /// Write `transactions` to a new file at `path`.
    pub fn export_file<'a, I>(&self, path: &Path, transactions: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a AccountTransaction>,
    {
        let file = File::create(path)?;
        let rows = self.write(file, transactions)?;
        debug!(path = %path.display(), rows, "exported transactions");
        Ok(rows)
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}
