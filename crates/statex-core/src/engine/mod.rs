//! Generic block-pattern extraction engine.
//!
//! An extractor is declared as data: literal issuer markers, document types
//! gated by a regex, and per document type a list of blocks. A block splits
//! the text at lines matching its start pattern and feeds every span through
//! a [`Transaction`] pipeline of sections and alternations that populate a
//! fresh subject. Only fully successful blocks are wrapped into
//! [`ExtractedItem`](crate::models::ExtractedItem)s; failed blocks are dropped
//! without affecting the rest of the document.
//!
//! Definitions compile all patterns up front and are immutable afterwards,
//! so one definition can serve any number of documents concurrently.

mod block;
mod document;
mod extractor;
mod marker;
mod rule;
mod section;
mod transaction;

pub use block::{Block, BlockBuilder, BlockSpan, BlockSplitter, Blocks};
pub use document::{DocumentType, DocumentTypeBuilder};
pub use extractor::{ExtractionResult, PatternExtractor, PatternExtractorBuilder, StatementExtractor};
pub use marker::DocumentMarker;
pub use rule::{Binder, CaptureSet, PatternRule};
pub use section::{AlternationGroup, Section, Step};
pub use transaction::{BlockParser, BuilderState, Transaction, TransactionBuilder};

use regex::{Regex, RegexBuilder};

use crate::error::ConfigurationError;

/// Upper bound on the compiled size of a single pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Compile a definition pattern.
///
/// Multi-line mode is on, so `^` and `$` anchor at line boundaries inside a
/// multi-line block. CRLF mode makes `\r\n` a line terminator and keeps `.`
/// from consuming the `\r`. The `regex` crate matches in linear time; the size limit
/// keeps a pathological pattern from blowing up at compile time instead.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, ConfigurationError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .crlf(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|source| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_pattern_is_multi_line() {
        let re = compile_pattern(r"^b$").unwrap();
        assert!(re.is_match("a\nb\nc"));
    }

    #[test]
    fn test_compile_pattern_handles_crlf() {
        let re = compile_pattern(r"^Amount (?<amount>.*)$").unwrap();
        let caps = re.captures("Amount 5,00\r\nEND\r\n").unwrap();
        assert_eq!(&caps["amount"], "5,00");
    }

    #[test]
    fn test_compile_pattern_reports_source() {
        let err = compile_pattern(r"(unclosed").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }
}
