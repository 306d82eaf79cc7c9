//! Per-block transaction assembly.

use std::sync::Arc;

use tracing::trace;

use super::block::BlockSpan;
use super::rule::CaptureSet;
use super::section::{AlternationGroup, CompiledStep, Section, Step};
use crate::error::ConfigurationError;
use crate::models::ExtractedItem;

/// The in-progress subject of one block plus everything captured so far.
///
/// Owned by a single block evaluation and dropped with it.
#[derive(Debug, Clone)]
pub struct BuilderState<T> {
    pub subject: T,
    pub captures: CaptureSet,
}

impl<T> BuilderState<T> {
    pub fn new(subject: T, captures: CaptureSet) -> Self {
        Self { subject, captures }
    }
}

/// Turns one block into at most one item.
pub trait BlockParser: Send + Sync {
    /// Parse `block`; `context` holds document-level captures that seed the
    /// block's capture set.
    fn parse(&self, block: &BlockSpan<'_>, context: &CaptureSet) -> Option<ExtractedItem>;
}

type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;
type Wrap<T> = Arc<dyn Fn(T) -> ExtractedItem + Send + Sync>;

/// A compiled pipeline: subject factory, ordered steps, and wrap function.
pub struct Transaction<T> {
    subject: Factory<T>,
    steps: Vec<CompiledStep<T>>,
    wrap: Wrap<T>,
}

impl<T: Clone> Transaction<T> {
    pub fn builder() -> TransactionBuilder<T> {
        TransactionBuilder::new()
    }

    /// Run the pipeline over `text` without wrapping.
    ///
    /// Returns the populated subject, or `None` if a required section or an
    /// alternation failed.
    pub fn run(&self, text: &str, context: &CaptureSet) -> Option<T> {
        let mut state = BuilderState::new((self.subject)(), context.clone());

        for step in &self.steps {
            match step {
                CompiledStep::Section(section) => {
                    if section.evaluate(text, &mut state) {
                        continue;
                    }
                    if section.is_optional() {
                        trace!(section = %section.name(), "optional section skipped");
                        continue;
                    }
                    trace!(section = %section.name(), "required section failed");
                    return None;
                }
                CompiledStep::OneOf(group) => {
                    group.evaluate(text, &mut state)?;
                }
            }
        }

        Some(state.subject)
    }
}

impl<T: Clone + 'static> BlockParser for Transaction<T> {
    fn parse(&self, block: &BlockSpan<'_>, context: &CaptureSet) -> Option<ExtractedItem> {
        self.run(block.text, context).map(|subject| (self.wrap)(subject))
    }
}

/// Builder for [`Transaction`]; patterns are compiled in [`build`](Self::build).
pub struct TransactionBuilder<T> {
    subject: Option<Factory<T>>,
    steps: Vec<Step<T>>,
    wrap: Option<Wrap<T>>,
}

impl<T> TransactionBuilder<T> {
    pub fn new() -> Self {
        Self {
            subject: None,
            steps: Vec::new(),
            wrap: None,
        }
    }

    /// Factory for the fresh subject of every block.
    pub fn subject<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.subject = Some(Arc::new(factory));
        self
    }

    /// Append a section (required unless the section says otherwise).
    pub fn section(mut self, section: Section<T>) -> Self {
        self.steps.push(Step::Section(section));
        self
    }

    /// Append an alternation of sections.
    pub fn one_of(mut self, sections: Vec<Section<T>>) -> Self {
        self.steps.push(Step::OneOf(AlternationGroup::new(sections)));
        self
    }

    /// Conversion of the finished subject into an item.
    pub fn wrap<F>(mut self, wrap: F) -> Self
    where
        F: Fn(T) -> ExtractedItem + Send + Sync + 'static,
    {
        self.wrap = Some(Arc::new(wrap));
        self
    }

    /// Compile every pattern and check the pipeline is complete.
    pub fn build(self) -> Result<Transaction<T>, ConfigurationError> {
        let subject = self.subject.ok_or(ConfigurationError::MissingSubject)?;
        let wrap = self.wrap.ok_or(ConfigurationError::MissingWrap)?;

        if self.steps.is_empty() {
            return Err(ConfigurationError::EmptyPipeline);
        }

        let steps = self
            .steps
            .into_iter()
            .map(Step::compile)
            .collect::<Result<Vec<_>, _>>()?;

        // A broken factory fails here rather than on the first block.
        let _ = (subject)();

        Ok(Transaction { subject, steps, wrap })
    }
}

impl<T> Default for TransactionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{parse_amount, NumberFormat};
    use crate::engine::PatternRule;
    use crate::models::{AccountTransaction, TransactionType};

    fn amount_rule(pattern: &str) -> PatternRule<AccountTransaction> {
        PatternRule::new(pattern)
            .attributes(["amount"])
            .assign(|t: &mut AccountTransaction, v: &CaptureSet| {
                t.amount = parse_amount(v.require("amount")?, NumberFormat::GERMAN)?;
                Ok(())
            })
    }

    fn interest() -> AccountTransaction {
        AccountTransaction::new(TransactionType::Interest)
    }

    #[test]
    fn test_missing_parts_are_configuration_errors() {
        let no_subject = Transaction::<AccountTransaction>::builder()
            .section(Section::new("a").rule(amount_rule(r"(?<amount>\d+)")))
            .wrap(ExtractedItem::Transaction)
            .build();
        assert!(matches!(no_subject.err(), Some(ConfigurationError::MissingSubject)));

        let no_wrap = Transaction::builder()
            .subject(interest)
            .section(Section::new("a").rule(amount_rule(r"(?<amount>\d+)")))
            .build();
        assert!(matches!(no_wrap.err(), Some(ConfigurationError::MissingWrap)));

        let no_steps = Transaction::builder()
            .subject(interest)
            .wrap(ExtractedItem::Transaction)
            .build();
        assert!(matches!(no_steps.err(), Some(ConfigurationError::EmptyPipeline)));
    }

    #[test]
    #[should_panic(expected = "no subject")]
    fn test_failing_subject_factory_surfaces_at_build() {
        let _ = Transaction::<AccountTransaction>::builder()
            .subject(|| panic!("no subject"))
            .section(Section::new("a").rule(amount_rule(r"(?<amount>\d+)")))
            .wrap(ExtractedItem::Transaction)
            .build();
    }

    #[test]
    fn test_subject_factory_runs_once_per_block() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let transaction = Transaction::builder()
            .subject(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                interest()
            })
            .section(Section::new("a").rule(amount_rule(r"(?<amount>\d+)")))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(transaction.run("12", &CaptureSet::new()).is_some());
        assert!(transaction.run("ab", &CaptureSet::new()).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_optional_section_is_skipped() {
        let transaction = Transaction::builder()
            .subject(interest)
            .section(
                Section::new("type").optional().rule(PatternRule::new(r"Deposit").assign(
                    |t: &mut AccountTransaction, _: &CaptureSet| {
                        t.kind = TransactionType::Deposit;
                        Ok(())
                    },
                )),
            )
            .section(Section::new("amount").rule(amount_rule(r"Amount (?<amount>[\d.,]+)")))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();

        let subject = transaction.run("Amount 0,22", &CaptureSet::new()).unwrap();
        assert_eq!(subject.kind, TransactionType::Interest);
        assert_eq!(subject.amount, 22);
    }

    #[test]
    fn test_required_section_failure_discards_block() {
        let transaction = Transaction::builder()
            .subject(interest)
            .section(Section::new("amount").rule(amount_rule(r"Amount (?<amount>[\d.,]+)")))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();

        assert!(transaction.run("Balance 12,00", &CaptureSet::new()).is_none());
    }

    #[test]
    fn test_context_seeds_captures() {
        let transaction = Transaction::builder()
            .subject(interest)
            .section(Section::new("amount").rule(
                PatternRule::new(r"Amount (?<amount>[\d.,]+)").assign(
                    |t: &mut AccountTransaction, v: &CaptureSet| {
                        t.amount = parse_amount(v.require("amount")?, NumberFormat::GERMAN)?;
                        t.currency = v.require("currency")?.to_string();
                        Ok(())
                    },
                ),
            ))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();

        let context: CaptureSet = [("currency", "CHF")].into_iter().collect();
        let subject = transaction.run("Amount 5,00", &context).unwrap();
        assert_eq!(subject.currency, "CHF");

        assert!(transaction.run("Amount 5,00", &CaptureSet::new()).is_none());
    }

    #[test]
    fn test_each_block_gets_a_fresh_subject() {
        let transaction = Transaction::builder()
            .subject(interest)
            .section(Section::new("amount").rule(amount_rule(r"Amount (?<amount>[\d.,]+)")))
            .wrap(ExtractedItem::Transaction)
            .build()
            .unwrap();

        let first = transaction.run("Amount 1,00", &CaptureSet::new()).unwrap();
        let second = transaction.run("Amount 2,00", &CaptureSet::new()).unwrap();
        assert_eq!((first.amount, second.amount), (100, 200));
    }
}
