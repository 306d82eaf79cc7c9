//! Pattern rules and the captures they accumulate.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, trace};

use super::compile_pattern;
use super::transaction::BuilderState;
use crate::error::{ConfigurationError, ConversionError};

/// Writes captured values into the subject.
///
/// A binder error is not reported anywhere: the rule simply counts as not
/// matched and the subject keeps its previous state.
pub type Binder<T> = Arc<dyn Fn(&mut T, &CaptureSet) -> Result<(), ConversionError> + Send + Sync>;

/// Named captures accumulated over one block.
///
/// Later rules overwrite values of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSet {
    values: HashMap<String, String>,
}

impl CaptureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Captured value for `name`, or a conversion error naming it.
    pub fn require(&self, name: &str) -> Result<&str, ConversionError> {
        self.get(name)
            .ok_or_else(|| ConversionError::MissingCapture(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Merge `other` into `self`, overwriting same-named values.
    pub fn merge(&mut self, other: CaptureSet) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Collect the named groups of a match that took part in it.
    pub(crate) fn from_captures(regex: &Regex, caps: &regex::Captures<'_>) -> Self {
        let mut set = Self::new();
        for name in regex.capture_names().flatten() {
            if let Some(m) = caps.name(name) {
                set.insert(name, m.as_str());
            }
        }
        set
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CaptureSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Declarative capture rule: a pattern, the groups it must capture, and a binder.
pub struct PatternRule<T> {
    pattern: String,
    attributes: Vec<String>,
    optional: bool,
    binder: Option<Binder<T>>,
}

impl<T> PatternRule<T> {
    /// A required rule for `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            attributes: Vec::new(),
            optional: false,
            binder: None,
        }
    }

    /// Groups that must take part in the match for the rule to count.
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Let the enclosing section succeed without this rule.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Binder invoked with the block's accumulated captures after a match.
    pub fn assign<F>(mut self, binder: F) -> Self
    where
        F: Fn(&mut T, &CaptureSet) -> Result<(), ConversionError> + Send + Sync + 'static,
    {
        self.binder = Some(Arc::new(binder));
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub(crate) fn compile(self) -> Result<CompiledRule<T>, ConfigurationError> {
        let regex = compile_pattern(&self.pattern)?;
        let names: HashSet<&str> = regex.capture_names().flatten().collect();

        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.as_str()) {
                return Err(ConfigurationError::DuplicateGroup(attribute.clone()));
            }
            if !names.contains(attribute.as_str()) {
                return Err(ConfigurationError::UnknownGroup {
                    pattern: self.pattern.clone(),
                    group: attribute.clone(),
                });
            }
        }

        Ok(CompiledRule {
            regex,
            attributes: self.attributes,
            optional: self.optional,
            binder: self.binder,
        })
    }
}

impl<T> Clone for PatternRule<T> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            attributes: self.attributes.clone(),
            optional: self.optional,
            binder: self.binder.clone(),
        }
    }
}

impl<T> fmt::Debug for PatternRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("pattern", &self.pattern)
            .field("attributes", &self.attributes)
            .field("optional", &self.optional)
            .field("binder", &self.binder.is_some())
            .finish()
    }
}

/// A rule with its pattern compiled.
pub(crate) struct CompiledRule<T> {
    regex: Regex,
    attributes: Vec<String>,
    optional: bool,
    binder: Option<Binder<T>>,
}

impl<T: Clone> CompiledRule<T> {
    pub(crate) fn is_optional(&self) -> bool {
        self.optional
    }

    /// Match against `text` and bind into `state`.
    ///
    /// Returns `false` when the pattern does not match, a required attribute
    /// is absent, or the binder fails. `state` is untouched in that case.
    pub(crate) fn apply(&self, text: &str, state: &mut BuilderState<T>) -> bool {
        let Some(caps) = self.regex.captures(text) else {
            trace!(pattern = self.regex.as_str(), "pattern did not match");
            return false;
        };

        let captured = CaptureSet::from_captures(&self.regex, &caps);
        if let Some(missing) = self.attributes.iter().find(|a| captured.get(a).is_none()) {
            trace!(pattern = self.regex.as_str(), attribute = %missing, "required attribute missing");
            return false;
        }

        let mut draft = state.clone();
        draft.captures.merge(captured);

        if let Some(binder) = &self.binder {
            if let Err(err) = binder(&mut draft.subject, &draft.captures) {
                debug!(pattern = self.regex.as_str(), "binder rejected match: {}", err);
                return false;
            }
        }

        *state = draft;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{parse_amount, NumberFormat};

    fn state() -> BuilderState<i64> {
        BuilderState::new(0, CaptureSet::new())
    }

    #[test]
    fn test_unknown_attribute_is_configuration_error() {
        let err = PatternRule::<i64>::new(r"(?<amount>\d+)")
            .attributes(["amount", "date"])
            .compile()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::UnknownGroup { ref group, .. } if group == "date"));
    }

    #[test]
    fn test_duplicate_attribute_is_configuration_error() {
        let err = PatternRule::<i64>::new(r"(?<amount>\d+)")
            .attributes(["amount", "amount"])
            .compile()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::DuplicateGroup(ref g) if g == "amount"));
    }

    #[test]
    fn test_duplicate_group_in_pattern_is_configuration_error() {
        let err = PatternRule::<i64>::new(r"(?<a>\d)(?<a>\d)").compile().err().unwrap();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_apply_binds_and_merges_captures() {
        let rule = PatternRule::new(r"Total (?<amount>[\d.,]+)")
            .attributes(["amount"])
            .assign(|t: &mut i64, v: &CaptureSet| {
                *t = parse_amount(v.require("amount")?, NumberFormat::GERMAN)?;
                Ok(())
            })
            .compile()
            .unwrap();

        let mut state = state();
        assert!(rule.apply("Total 1.234,50", &mut state));
        assert_eq!(state.subject, 123450);
        assert_eq!(state.captures.get("amount"), Some("1.234,50"));
    }

    #[test]
    fn test_binder_failure_leaves_state_untouched() {
        let rule = PatternRule::new(r"Total (?<amount>\S+)")
            .assign(|t: &mut i64, v: &CaptureSet| {
                *t = 99;
                *t = parse_amount(v.require("amount")?, NumberFormat::GERMAN)?;
                Ok(())
            })
            .compile()
            .unwrap();

        let mut state = state();
        assert!(!rule.apply("Total abc", &mut state));
        assert_eq!(state.subject, 0);
        assert!(state.captures.is_empty());
    }

    #[test]
    fn test_optional_group_required_as_attribute() {
        let rule = PatternRule::<i64>::new(r"Fee(?: (?<fee>\d+))?")
            .attributes(["fee"])
            .compile()
            .unwrap();

        let mut state = state();
        assert!(!rule.apply("Fee", &mut state));
        assert!(rule.apply("Fee 3", &mut state));
        assert_eq!(state.captures.get("fee"), Some("3"));
    }

    #[test]
    fn test_later_capture_overwrites_earlier() {
        let mut set: CaptureSet = [("note", "first")].into_iter().collect();
        set.merge([("note", "second"), ("date", "x")].into_iter().collect());
        assert_eq!(set.get("note"), Some("second"));
        assert_eq!(set.len(), 2);
    }
}
