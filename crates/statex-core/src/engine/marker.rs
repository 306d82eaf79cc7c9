//! Literal issuer markers used to recognize a statement's bank.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::error::ConfigurationError;

/// A set of literal strings, any one of which identifies a document's issuer.
#[derive(Debug, Clone)]
pub struct DocumentMarker {
    automaton: AhoCorasick,
    markers: Vec<String>,
}

impl DocumentMarker {
    pub fn new<I, S>(markers: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers
            .into_iter()
            .map(Into::into)
            .filter(|m| !m.is_empty())
            .collect();

        if markers.is_empty() {
            return Err(ConfigurationError::EmptyMarkers);
        }

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&markers)
            .map_err(|e| ConfigurationError::InvalidMarkers(e.to_string()))?;

        Ok(Self { automaton, markers })
    }

    /// Whether any marker occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.automaton.is_match(text)
    }

    /// The first marker found in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        self.automaton
            .find(text)
            .map(|m| self.markers[m.pattern().as_usize()].as_str())
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}
