//! Document types: a regex gate, document-level context, and blocks.

use regex::Regex;
use tracing::trace;

use super::block::{Block, BlockSpan};
use super::compile_pattern;
use super::rule::CaptureSet;
use crate::error::ConfigurationError;
use crate::models::ExtractedItem;

/// One layout of an issuer's documents.
pub struct DocumentType {
    pattern: Regex,
    blocks: Vec<Block>,
    context: Vec<Regex>,
}

/// Items and block counts produced by one document type over one document.
#[derive(Debug, Default)]
pub(crate) struct DocumentPass<'t> {
    /// Items keyed by the start offset of the block that produced them.
    pub items: Vec<(usize, ExtractedItem)>,
    pub blocks_total: usize,
    pub failed: Vec<BlockSpan<'t>>,
}

impl DocumentType {
    /// Declare a document type gated by `pattern`.
    pub fn builder(pattern: impl Into<String>) -> DocumentTypeBuilder {
        DocumentTypeBuilder {
            pattern: pattern.into(),
            blocks: Vec::new(),
            context: Vec::new(),
        }
    }

    /// Whether the gate pattern occurs anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Document-level captures: the named groups of every context pattern
    /// that matches, later patterns overwriting earlier ones.
    pub fn context(&self, text: &str) -> CaptureSet {
        let mut context = CaptureSet::new();
        for regex in &self.context {
            if let Some(caps) = regex.captures(text) {
                context.merge(CaptureSet::from_captures(regex, &caps));
            }
        }
        context
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Run every block definition over `text`.
    ///
    /// The caller checks [`matches`](Self::matches) first.
    pub(crate) fn run<'t>(&self, text: &'t str) -> DocumentPass<'t> {
        let context = self.context(text);
        let mut pass = DocumentPass::default();

        for block in &self.blocks {
            for span in block.splitter().split(text) {
                pass.blocks_total += 1;
                match block.parser().parse(&span, &context) {
                    Some(item) => pass.items.push((span.start_offset, item)),
                    None => {
                        trace!(line = span.start_line + 1, "block produced no item");
                        pass.failed.push(span);
                    }
                }
            }
        }

        pass
    }
}

/// Builder for [`DocumentType`].
pub struct DocumentTypeBuilder {
    pattern: String,
    blocks: Vec<Block>,
    context: Vec<String>,
}

impl DocumentTypeBuilder {
    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// A pattern whose named groups seed every block's captures.
    pub fn context(mut self, pattern: impl Into<String>) -> Self {
        self.context.push(pattern.into());
        self
    }

    pub fn build(self) -> Result<DocumentType, ConfigurationError> {
        let pattern = compile_pattern(&self.pattern)?;
        let context = self
            .context
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocumentType {
            pattern,
            blocks: self.blocks,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{parse_amount, NumberFormat};
    use crate::engine::{PatternRule, Section, Transaction};
    use crate::models::{AccountTransaction, TransactionType};
    use pretty_assertions::assert_eq;

    fn fee_block() -> Block {
        let transaction = Transaction::builder()
            .subject(|| AccountTransaction::new(TransactionType::Fees))
            .section(Section::new("fee").rule(
                PatternRule::new(r"^Fee (?<amount>[\d,]+)$")
                    .attributes(["amount"])
                    .assign(|t: &mut AccountTransaction, v: &CaptureSet| {
                        t.amount = parse_amount(v.require("amount")?, NumberFormat::GERMAN)?;
                        t.currency = v.require("currency")?.to_string();
                        Ok(())
                    }),
            ))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();

        Block::builder(r"^Fee ").max_size(1).transaction(transaction).build().unwrap()
    }

    #[test]
    fn test_gate_and_context() {
        let document = DocumentType::builder(r"Account statement")
            .context(r"Currency: (?<currency>[A-Z]{3})")
            .block(fee_block())
            .build()
            .unwrap();

        let text = "Account statement\nCurrency: CHF\nFee 1,50\nFee x\nFee 2,00";
        assert!(document.matches(text));
        assert!(!document.matches("Depot statement"));
        assert_eq!(document.context(text).get("currency"), Some("CHF"));

        let pass = document.run(text);
        assert_eq!(pass.blocks_total, 3);
        assert_eq!(pass.failed.len(), 1);
        assert_eq!(pass.failed[0].text, "Fee x");

        let amounts: Vec<(i64, &str)> = pass
            .items
            .iter()
            .filter_map(|(_, item)| item.transaction())
            .map(|t| (t.amount, t.currency.as_str()))
            .collect();
        assert_eq!(amounts, vec![(150, "CHF"), (200, "CHF")]);
    }

    #[test]
    fn test_multi_line_block_with_crlf_endings() {
        let transaction = Transaction::builder()
            .subject(|| AccountTransaction::new(TransactionType::Deposit))
            .section(Section::new("amount").rule(
                PatternRule::new(r"^Amount (?<amount>[\d,]+)$")
                    .attributes(["amount"])
                    .assign(|t: &mut AccountTransaction, v: &CaptureSet| {
                        t.amount = parse_amount(v.require("amount")?, NumberFormat::GERMAN)?;
                        Ok(())
                    }),
            ))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();
        let block = Block::builder(r"^BEGIN$")
            .end(r"^END$")
            .transaction(transaction)
            .build()
            .unwrap();
        let document = DocumentType::builder(r"^Statement$")
            .context(r"^Currency: (?<currency>.+)$")
            .block(block)
            .build()
            .unwrap();

        for text in [
            "Statement\nCurrency: EUR\nBEGIN\nAmount 5,00\nEND\n",
            "Statement\r\nCurrency: EUR\r\nBEGIN\r\nAmount 5,00\r\nEND\r\n",
        ] {
            assert!(document.matches(text));
            assert_eq!(document.context(text).get("currency"), Some("EUR"));

            let pass = document.run(text);
            assert_eq!(pass.blocks_total, 1);
            assert!(pass.failed.is_empty());
            let amounts: Vec<i64> = pass
                .items
                .iter()
                .filter_map(|(_, item)| item.transaction())
                .map(|t| t.amount)
                .collect();
            assert_eq!(amounts, vec![500]);
        }
    }

    #[test]
    fn test_invalid_gate_is_configuration_error() {
        let err = DocumentType::builder(r"(Summary").build().err().unwrap();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }
}
