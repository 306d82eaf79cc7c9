//! Error types for the statex-core library.

use thiserror::Error;

/// Main error type for the statex library.
#[derive(Error, Debug)]
pub enum StatexError {
    /// Text front-end error.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Extraction definition is malformed.
    #[error("definition error: {0}")]
    Definition(#[from] ConfigurationError),

    /// Export writer error.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to turning a source document into text.
#[derive(Error, Debug)]
pub enum InputError {
    /// Failed to extract text from a PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The document yielded too little text to be a statement.
    #[error("document has no usable text ({0} characters)")]
    Empty(usize),

    /// The input file type is not handled by the front end.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Caller bugs in an extraction definition, reported when the definition is built.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A required attribute names a group the pattern does not define.
    #[error("pattern `{pattern}` has no capture group named `{group}`")]
    UnknownGroup { pattern: String, group: String },

    /// A required attribute is listed twice on the same rule.
    #[error("capture group `{0}` is required more than once")]
    DuplicateGroup(String),

    /// A section has no rules.
    #[error("section `{0}` has no patterns")]
    EmptySection(String),

    /// An alternation has no member sections.
    #[error("alternation has no sections")]
    EmptyAlternation,

    /// A transaction pipeline has no steps.
    #[error("transaction has no sections")]
    EmptyPipeline,

    /// No subject factory was supplied.
    #[error("transaction has no subject factory")]
    MissingSubject,

    /// No wrap function was supplied.
    #[error("transaction has no wrap function")]
    MissingWrap,

    /// A block was declared without a transaction.
    #[error("block `{0}` has no transaction")]
    MissingTransaction(String),

    /// `max_size` must be at least one line.
    #[error("block max size must be positive")]
    InvalidMaxSize,

    /// A marker set must contain at least one non-empty marker.
    #[error("marker set is empty")]
    EmptyMarkers,

    /// Failed to build the literal marker automaton.
    #[error("invalid markers: {0}")]
    InvalidMarkers(String),
}

/// Failures converting a captured substring into a typed value.
///
/// The engine treats these exactly like a pattern that did not match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The amount contains characters that are not digits or separators.
    #[error("invalid amount `{value}`: {reason}")]
    InvalidAmount { value: String, reason: String },

    /// The amount has more fractional digits than the declared scale.
    #[error("amount `{value}` exceeds {scale} fractional digits")]
    PrecisionExceeded { value: String, scale: u32 },

    /// The amount does not fit into a 64-bit minor-unit integer.
    #[error("amount `{0}` is out of range")]
    OutOfRange(String),

    /// The date is malformed or not a calendar date.
    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// The currency symbol or code is not recognized.
    #[error("unknown currency `{0}`")]
    UnknownCurrency(String),

    /// A binder asked for a capture that is not present.
    #[error("missing capture `{0}`")]
    MissingCapture(String),
}

/// Result type for the statex library.
pub type Result<T> = std::result::Result<T, StatexError>;
