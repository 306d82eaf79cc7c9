//! Text front end: turns statement files into plain text.

use std::path::Path;

use tracing::debug;

use crate::error::{InputError, Result};
use crate::models::config::InputConfig;

/// Kind of input a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Already converted plain text.
    Text,
    /// PDF with a text layer.
    Pdf,
}

impl InputKind {
    /// Detect the kind from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Read the text of a statement file.
///
/// Documents with fewer than `config.min_text_length` non-whitespace
/// characters are rejected as empty.
pub fn load_text(path: &Path, config: &InputConfig) -> Result<String> {
    let kind = InputKind::from_path(path)
        .ok_or_else(|| InputError::UnsupportedFormat(path.display().to_string()))?;

    let text = match kind {
        InputKind::Text => std::fs::read_to_string(path)?,
        InputKind::Pdf => pdf_text(&std::fs::read(path)?, &config.pdf_page_separator)?,
    };

    check_length(text, config.min_text_length)
}

fn check_length(text: String, min_text_length: usize) -> Result<String> {
    let length = text.chars().filter(|c| !c.is_whitespace()).count();
    debug!("loaded {} characters of text", length);

    if length < min_text_length {
        return Err(InputError::Empty(length).into());
    }
    Ok(text)
}

/// Extract the text layer of a PDF, joining pages with `separator`.
#[cfg(feature = "pdf")]
pub fn pdf_text(data: &[u8], separator: &str) -> std::result::Result<String, InputError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(data)
        .map_err(|e| InputError::TextExtraction(e.to_string()))?;

    debug!("extracted {} PDF pages", pages.len());
    Ok(pages.join(separator))
}

#[cfg(not(feature = "pdf"))]
pub fn pdf_text(_data: &[u8], _separator: &str) -> std::result::Result<String, InputError> {
    Err(InputError::UnsupportedFormat("pdf (built without the `pdf` feature)".to_string()))
}
