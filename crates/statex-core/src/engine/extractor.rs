//! Statement extractors assembled from markers and document types.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use super::document::DocumentType;
use super::marker::DocumentMarker;
use crate::error::ConfigurationError;
use crate::models::ExtractedItem;

/// Items extracted by one extractor from one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Label of the extractor that accepted the document.
    pub extractor: String,
    /// Extracted items in document order.
    pub items: Vec<ExtractedItem>,
    /// Number of blocks the splitters produced.
    pub blocks_total: usize,
    /// Number of blocks that yielded no item.
    pub blocks_failed: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Anything that can pull items out of a statement's text.
pub trait StatementExtractor: Send + Sync {
    /// Human readable issuer label.
    fn label(&self) -> &str;

    /// Extract items from `text`.
    ///
    /// Returns `None` when the document is not one this extractor handles.
    fn extract(&self, text: &str) -> Option<ExtractionResult>;
}

/// Declarative extractor: issuer markers plus a list of document types.
pub struct PatternExtractor {
    label: String,
    markers: Option<DocumentMarker>,
    documents: Vec<DocumentType>,
}

impl PatternExtractor {
    pub fn builder(label: impl Into<String>) -> PatternExtractorBuilder {
        PatternExtractorBuilder {
            label: label.into(),
            markers: Vec::new(),
            documents: Vec::new(),
        }
    }

    /// Whether the issuer markers occur in `text`. Always true without markers.
    pub fn is_issuer(&self, text: &str) -> bool {
        self.markers.as_ref().is_none_or(|m| m.matches(text))
    }

    pub fn document_types(&self) -> &[DocumentType] {
        &self.documents
    }
}

impl StatementExtractor for PatternExtractor {
    fn label(&self) -> &str {
        &self.label
    }

    fn extract(&self, text: &str) -> Option<ExtractionResult> {
        let start = Instant::now();

        if !self.is_issuer(text) {
            debug!(extractor = %self.label, "no issuer marker found");
            return None;
        }

        let mut accepted = false;
        let mut items = Vec::new();
        let mut blocks_total = 0;
        let mut warnings = Vec::new();
        let mut blocks_failed = 0;

        for (index, document) in self.documents.iter().enumerate() {
            if !document.matches(text) {
                debug!(extractor = %self.label, document = index, "document type not matched");
                continue;
            }
            accepted = true;

            let pass = document.run(text);
            blocks_total += pass.blocks_total;
            blocks_failed += pass.failed.len();
            items.extend(pass.items);
            warnings.extend(pass.failed.iter().map(|span| {
                format!("line {}: no pattern matched `{}`", span.start_line + 1, span.text)
            }));
        }

        if !accepted {
            return None;
        }

        // Document types run one after another; restore document order.
        items.sort_by_key(|(offset, _)| *offset);

        info!(
            extractor = %self.label,
            items = items.len(),
            blocks = blocks_total,
            failed = blocks_failed,
            "extraction finished"
        );

        Some(ExtractionResult {
            extractor: self.label.clone(),
            items: items.into_iter().map(|(_, item)| item).collect(),
            blocks_total,
            blocks_failed,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Builder for [`PatternExtractor`].
pub struct PatternExtractorBuilder {
    label: String,
    markers: Vec<String>,
    documents: Vec<DocumentType>,
}

impl PatternExtractorBuilder {
    /// Literal issuer marker; any one of them must occur in the document.
    pub fn bank_identifier(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn bank_identifiers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.extend(markers.into_iter().map(Into::into));
        self
    }

    pub fn document_type(mut self, document: DocumentType) -> Self {
        self.documents.push(document);
        self
    }

    pub fn build(self) -> Result<PatternExtractor, ConfigurationError> {
        let markers = if self.markers.is_empty() {
            None
        } else {
            Some(DocumentMarker::new(self.markers)?)
        };

        Ok(PatternExtractor {
            label: self.label,
            markers,
            documents: self.documents,
        })
    }
}
