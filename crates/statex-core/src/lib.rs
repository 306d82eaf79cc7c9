//! Core library for statement text extraction.
//!
//! This crate provides:
//! - A declarative block-pattern engine (issuer markers, document types,
//!   block splitting, sections and alternations)
//! - Locale-aware amount, date, and currency conversion
//! - Account transaction models and JSON configuration
//! - The built-in issuer catalogue
//! - Text front end (plain text and PDF) and CSV export

pub mod convert;
pub mod engine;
pub mod error;
pub mod export;
pub mod extractors;
pub mod input;
pub mod models;

pub use convert::{format_amount, parse_amount, parse_date, DateOrder, NumberFormat};
pub use engine::{ExtractionResult, PatternExtractor, StatementExtractor};
pub use error::{ConfigurationError, ConversionError, InputError, Result, StatexError};
pub use export::CsvExporter;
pub use extractors::ExtractorRegistry;
pub use input::{load_text, InputKind};
pub use models::{AccountTransaction, ExtractedItem, StatexConfig, TransactionType};
