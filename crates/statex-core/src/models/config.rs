//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for statex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatexConfig {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Text front-end configuration.
    pub input: InputConfig,

    /// Export writer configuration.
    pub export: ExportConfig,
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extractor labels to run (empty = all registered).
    pub enabled_extractors: Vec<String>,

    /// Record a warning for every block that matched no section.
    pub warn_on_failed_blocks: bool,

    /// Truncate documents longer than this many bytes before matching (0 = unlimited).
    pub max_text_length: usize,
}

impl ExtractionConfig {
    /// Whether an extractor label is enabled (case-insensitive).
    pub fn is_enabled(&self, label: &str) -> bool {
        self.enabled_extractors.is_empty()
            || self
                .enabled_extractors
                .iter()
                .any(|l| l.eq_ignore_ascii_case(label))
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enabled_extractors: Vec::new(),
            warn_on_failed_blocks: true,
            max_text_length: 0,
        }
    }
}

/// Text front-end configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Minimum text length to consider a document readable.
    pub min_text_length: usize,

    /// Separator inserted between PDF pages.
    pub pdf_page_separator: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            pdf_page_separator: "\n".to_string(),
        }
    }
}

/// Export writer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Field delimiter.
    pub delimiter: char,

    /// Write the fixed header row.
    pub include_header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            include_header: true,
        }
    }
}

impl StatexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Whether an extractor label is enabled.
    pub fn is_enabled(&self, label: &str) -> bool {
        self.extraction.is_enabled(label)
    }
}
