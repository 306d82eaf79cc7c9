//! Sections, alternation groups, and their evaluation against a block.

use tracing::trace;

use super::rule::{CompiledRule, PatternRule};
use super::transaction::BuilderState;
use crate::error::ConfigurationError;

/// An ordered list of rules evaluated as a unit.
pub struct Section<T> {
    name: String,
    rules: Vec<PatternRule<T>>,
    optional: bool,
}

impl<T> Section<T> {
    /// A required section; `name` only shows up in logs and errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            optional: false,
        }
    }

    /// Skip this section instead of failing the block when it does not match.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Append a rule.
    pub fn rule(mut self, rule: PatternRule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn compile(self) -> Result<CompiledSection<T>, ConfigurationError> {
        if self.rules.is_empty() {
            return Err(ConfigurationError::EmptySection(self.name));
        }

        let rules = self
            .rules
            .into_iter()
            .map(PatternRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledSection {
            name: self.name,
            rules,
            optional: self.optional,
        })
    }
}

/// Mutually exclusive sections; the first one that succeeds wins.
///
/// Callers order the alternatives from most to least specific.
pub struct AlternationGroup<T> {
    sections: Vec<Section<T>>,
}

impl<T> AlternationGroup<T> {
    pub fn new(sections: Vec<Section<T>>) -> Self {
        Self { sections }
    }

    pub(crate) fn compile(self) -> Result<CompiledAlternation<T>, ConfigurationError> {
        if self.sections.is_empty() {
            return Err(ConfigurationError::EmptyAlternation);
        }

        let sections = self
            .sections
            .into_iter()
            .map(Section::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledAlternation { sections })
    }
}

/// One step of a transaction pipeline.
pub enum Step<T> {
    Section(Section<T>),
    OneOf(AlternationGroup<T>),
}

impl<T> Step<T> {
    pub(crate) fn compile(self) -> Result<CompiledStep<T>, ConfigurationError> {
        Ok(match self {
            Step::Section(section) => CompiledStep::Section(section.compile()?),
            Step::OneOf(group) => CompiledStep::OneOf(group.compile()?),
        })
    }
}

pub(crate) struct CompiledSection<T> {
    name: String,
    rules: Vec<CompiledRule<T>>,
    optional: bool,
}

impl<T: Clone> CompiledSection<T> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_optional(&self) -> bool {
        self.optional
    }

    /// Run every rule in order against `text`.
    ///
    /// Succeeds iff all non-optional rules matched. On failure `state` is
    /// left exactly as it was before the section started.
    pub(crate) fn evaluate(&self, text: &str, state: &mut BuilderState<T>) -> bool {
        let mut draft = state.clone();

        for (index, rule) in self.rules.iter().enumerate() {
            if !rule.apply(text, &mut draft) && !rule.is_optional() {
                trace!(section = %self.name, rule = index, "required rule failed");
                return false;
            }
        }

        *state = draft;
        true
    }
}

pub(crate) struct CompiledAlternation<T> {
    sections: Vec<CompiledSection<T>>,
}

impl<T: Clone> CompiledAlternation<T> {
    /// Try each alternative in declaration order and commit to the first
    /// that succeeds. Returns its index.
    pub(crate) fn evaluate(&self, text: &str, state: &mut BuilderState<T>) -> Option<usize> {
        let chosen = self
            .sections
            .iter()
            .position(|section| section.evaluate(text, state));

        match chosen {
            Some(index) => trace!(alternative = index, section = %self.sections[index].name(), "alternative selected"),
            None => trace!(alternatives = self.sections.len(), "no alternative matched"),
        }

        chosen
    }
}

pub(crate) enum CompiledStep<T> {
    Section(CompiledSection<T>),
    OneOf(CompiledAlternation<T>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CaptureSet;

    fn state() -> BuilderState<Vec<String>> {
        BuilderState::new(Vec::new(), CaptureSet::new())
    }

    fn tagging(pattern: &str, tag: &'static str) -> PatternRule<Vec<String>> {
        PatternRule::new(pattern).assign(move |t: &mut Vec<String>, _: &CaptureSet| {
            t.push(tag.to_string());
            Ok(())
        })
    }

    #[test]
    fn test_optional_rule_absence_does_not_fail_section() {
        let section = Section::new("mixed")
            .rule(tagging(r"^Date \d+$", "date"))
            .rule(tagging(r"^Note .*$", "note").optional())
            .compile()
            .unwrap();

        let mut state = state();
        assert!(section.evaluate("Date 7\nAmount 3", &mut state));
        assert_eq!(state.subject, vec!["date"]);
    }

    #[test]
    fn test_required_rule_failure_rolls_back_section() {
        let section = Section::new("strict")
            .rule(tagging(r"Date", "date"))
            .rule(tagging(r"Amount", "amount"))
            .compile()
            .unwrap();

        let mut state = state();
        assert!(!section.evaluate("Date only", &mut state));
        assert!(state.subject.is_empty());
    }

    #[test]
    fn test_alternation_prefers_first_declared() {
        let group = AlternationGroup::new(vec![
            Section::new("specific").rule(tagging(r"Zinsen \d", "first")),
            Section::new("general").rule(tagging(r"Zinsen", "second")),
        ])
        .compile()
        .unwrap();

        let mut state = state();
        assert_eq!(group.evaluate("Go & Grow Zinsen 1", &mut state), Some(0));
        assert_eq!(state.subject, vec!["first"]);
    }

    #[test]
    fn test_failed_alternative_leaves_no_trace() {
        let group = AlternationGroup::new(vec![
            Section::new("two-part")
                .rule(tagging(r"Zinsen", "partial"))
                .rule(tagging(r"never", "never")),
            Section::new("fallback").rule(tagging(r"Zinsen", "fallback")),
        ])
        .compile()
        .unwrap();

        let mut state = state();
        assert_eq!(group.evaluate("Zinsen", &mut state), Some(1));
        assert_eq!(state.subject, vec!["fallback"]);
    }

    #[test]
    fn test_alternation_without_match() {
        let group = AlternationGroup::new(vec![Section::new("a").rule(tagging(r"x", "x"))])
            .compile()
            .unwrap();

        let mut state = state();
        assert_eq!(group.evaluate("y", &mut state), None);
    }

    #[test]
    fn test_empty_definitions_are_rejected() {
        assert!(matches!(
            Section::<Vec<String>>::new("empty").compile().err(),
            Some(ConfigurationError::EmptySection(name)) if name == "empty"
        ));
        assert!(matches!(
            AlternationGroup::<Vec<String>>::new(Vec::new()).compile().err(),
            Some(ConfigurationError::EmptyAlternation)
        ));
    }
}
