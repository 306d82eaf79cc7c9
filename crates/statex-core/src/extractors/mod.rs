//! Issuer catalogue and the registry that runs it.

pub mod bondora;

use tracing::{debug, warn};

use crate::engine::{ExtractionResult, StatementExtractor};
use crate::error::ConfigurationError;
use crate::models::config::ExtractionConfig;

/// Ordered set of statement extractors.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn StatementExtractor>>,
}

impl ExtractorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in issuer definition.
    pub fn with_builtin() -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        registry.register(bondora::extractor()?);
        Ok(registry)
    }

    pub fn register<E: StatementExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Box::new(extractor));
    }

    pub fn labels(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run every extractor against `text` with default settings.
    pub fn extract(&self, text: &str) -> Vec<ExtractionResult> {
        self.extract_with(text, &ExtractionConfig::default())
    }

    /// Run the enabled extractors against `text`, in registration order.
    ///
    /// Only extractors that accept the document contribute a result.
    pub fn extract_with(&self, text: &str, config: &ExtractionConfig) -> Vec<ExtractionResult> {
        let text = truncate(text, config.max_text_length);
        let mut results = Vec::new();

        for extractor in &self.extractors {
            let label = extractor.label();
            if !config.is_enabled(label) {
                debug!(extractor = %label, "extractor disabled");
                continue;
            }

            let Some(mut result) = extractor.extract(text) else {
                continue;
            };

            if config.warn_on_failed_blocks {
                for warning in &result.warnings {
                    warn!(extractor = %label, "{}", warning);
                }
            } else {
                result.warnings.clear();
            }

            results.push(result);
        }

        results
    }
}

/// Cut `text` to at most `limit` bytes on a char boundary (0 = unlimited).
fn truncate(text: &str, limit: usize) -> &str {
    if limit == 0 || text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    debug!(length = text.len(), limit, "truncating document");
    &text[..end]
}
