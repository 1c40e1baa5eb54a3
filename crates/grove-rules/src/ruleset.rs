//! Rename rule sets
//!
//! Combines declared modification pairs with caller arguments into a
//! concrete map of path pattern → expanded values. Built fresh per
//! operation and threaded immutably through the copy traversal.

use crate::expand::{ExpandError, ExpansionContext};
use crate::pattern::{PathPattern, PatternError, RuleTarget, NAME_MARKER};

/// One resolved rename rule
#[derive(Debug, Clone, PartialEq)]
pub struct RenameRule {
    pattern: PathPattern,
    values: Vec<String>,
}

impl RenameRule {
    /// The pre-split pattern
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Expanded replacement values in order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Immutable set of rename rules for one operation
///
/// Keys are the normalised pattern renderings; rules whose keys normalise
/// identically accumulate by appending values. Lookup iterates rules in
/// key order, which keeps every traversal deterministic.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: im::OrdMap<String, RenameRule>,
}

impl RuleSet {
    /// Empty rule set
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from key/raw-token pairs against an expansion context
    ///
    /// Tokens expanding to nothing are skipped; a key whose every token
    /// skipped is left unset. Rules over open-ended (`*`) fields are
    /// reported and dropped.
    ///
    /// # Errors
    /// Returns an error for an unparseable key or a malformed `$now`
    /// expression.
    pub fn from_pairs<'a, I>(pairs: I, ctx: &ExpansionContext<'_>) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = Self::empty();
        for (key, token) in pairs {
            let values = ctx.expand(token)?;
            if values.is_empty() {
                tracing::debug!(key, token, "token expanded to nothing, skipped");
                continue;
            }
            set = set.with_values(key, values)?;
        }
        Ok(set)
    }

    /// Build from a flat alternating key/token sequence
    ///
    /// A dangling trailing key is ignored.
    ///
    /// # Errors
    /// Same conditions as [`RuleSet::from_pairs`].
    pub fn from_flat(flat: &[String], ctx: &ExpansionContext<'_>) -> Result<Self, RuleError> {
        if flat.len() % 2 != 0 {
            tracing::debug!(key = %flat[flat.len() - 1], "dangling rule key without token, ignored");
        }
        Self::from_pairs(
            flat.chunks_exact(2).map(|pair| (pair[0].as_str(), pair[1].as_str())),
            ctx,
        )
    }

    /// Insert already-concrete values for a key, accumulating
    ///
    /// Used by the façade for explicit overrides (e.g. the target name of
    /// a duplicate).
    ///
    /// # Errors
    /// Returns an error for an unparseable key.
    pub fn with_values(
        mut self,
        key: &str,
        values: Vec<String>,
    ) -> Result<Self, RuleError> {
        let pattern = PathPattern::parse(key)?;
        if pattern.is_unsupported() {
            tracing::warn!(key, "open-ended field path in rename rule is unsupported, rule skipped");
            return Ok(self);
        }
        let normalised = pattern.to_string();
        match self.rules.get_mut(&normalised) {
            Some(rule) => rule.values.extend(values),
            None => {
                self.rules.insert(normalised, RenameRule { pattern, values });
            }
        }
        Ok(self)
    }

    /// Convenience: a root-name rule mapping to one value
    ///
    /// # Errors
    /// Never fails for a plain name; kept fallible for uniformity.
    pub fn with_root_name(self, name: impl Into<String>) -> Result<Self, RuleError> {
        self.with_values(&format!("./{NAME_MARKER}"), vec![name.into()])
    }

    /// Merge another rule set into this one, accumulating per key
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        for (key, rule) in &other.rules {
            match self.rules.get_mut(key) {
                Some(existing) => existing.values.extend(rule.values.iter().cloned()),
                None => {
                    self.rules.insert(key.clone(), rule.clone());
                }
            }
        }
        self
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check for an empty set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Substituted name at the current stack, first match wins
    #[must_use]
    pub fn name_for(&self, stack: &[String]) -> Option<&str> {
        self.first_value_for(stack, |t| matches!(t, RuleTarget::Name))
    }

    /// Substituted primary type at the current stack, first match wins
    #[must_use]
    pub fn type_for(&self, stack: &[String]) -> Option<&str> {
        self.first_value_for(stack, |t| matches!(t, RuleTarget::PrimaryType))
    }

    /// Accumulated mixin substitutions at the current stack
    ///
    /// Unlike names and types, every matching mixin rule contributes.
    #[must_use]
    pub fn mixins_for(&self, stack: &[String]) -> Option<Vec<String>> {
        let mut found = false;
        let mut mixins = Vec::new();
        for rule in self.rules.values() {
            if matches!(rule.pattern.target(), RuleTarget::Mixins)
                && rule.pattern.matches(stack)
            {
                found = true;
                mixins.extend(rule.values.iter().cloned());
            }
        }
        found.then_some(mixins)
    }

    /// Replacement values for a property at the current stack
    ///
    /// `index` selects an index-specific rule; `None` selects the plain
    /// property rule.
    #[must_use]
    pub fn property_for(
        &self,
        stack: &[String],
        property: &str,
        index: Option<usize>,
    ) -> Option<&[String]> {
        self.rules.values().find_map(|rule| {
            match rule.pattern.target() {
                RuleTarget::Property { name, index: i }
                    if name == property && *i == index && rule.pattern.matches(stack) =>
                {
                    Some(rule.values.as_slice())
                }
                _ => None,
            }
        })
    }

    fn first_value_for(
        &self,
        stack: &[String],
        select: impl Fn(&RuleTarget) -> bool,
    ) -> Option<&str> {
        self.rules.values().find_map(|rule| {
            if select(rule.pattern.target()) && rule.pattern.matches(stack) {
                rule.values.first().map(String::as_str)
            } else {
                None
            }
        })
    }
}

/// Errors from rule set construction
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Rule key failed to parse
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Token expansion failed
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;

    fn ctx() -> ExpansionContext<'static> {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
            .unwrap();
        ExpansionContext::new(now, "alice").with_arg("name", "press-release")
    }

    fn stack(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn builds_name_and_property_rules() {
        let ctx = ctx();
        let rules = RuleSet::from_pairs(
            [("./_name", "$name"), ("./title", "$holder")],
            &ctx,
        )
        .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.name_for(&stack(&["proto"])), Some("press-release"));
        assert_eq!(
            rules.property_for(&stack(&["proto"]), "title", None),
            Some(&["alice".to_string()][..])
        );
    }

    #[test]
    fn skipped_token_leaves_key_unset() {
        let ctx = ctx();
        let rules = RuleSet::from_pairs([("./title", "$absent")], &ctx).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn same_key_accumulates_values() {
        let ctx = ctx();
        let rules = RuleSet::from_pairs(
            [("./tags", "base"), ("./tags", "$holder")],
            &ctx,
        )
        .unwrap();

        assert_eq!(
            rules.property_for(&stack(&["p"]), "tags", None),
            Some(&["base".to_string(), "alice".to_string()][..])
        );
    }

    #[test]
    fn partially_skipped_key_keeps_expanded_values() {
        let ctx = ctx();
        let rules = RuleSet::from_pairs(
            [("./tags", "$absent"), ("./tags", "kept")],
            &ctx,
        )
        .unwrap();

        assert_eq!(
            rules.property_for(&stack(&["p"]), "tags", None),
            Some(&["kept".to_string()][..])
        );
    }

    #[test]
    fn from_flat_pairs_up_the_sequence() {
        let ctx = ctx();
        let flat: Vec<String> = ["./_name", "$name", "./title", "$holder", "dangling"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let rules = RuleSet::from_flat(&flat, &ctx).unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn wildcard_rule_is_dropped_not_fatal() {
        let ctx = ctx();
        let rules =
            RuleSet::from_pairs([("./*", "$name"), ("./_name", "$name")], &ctx).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.name_for(&stack(&["p"])), Some("press-release"));
    }

    #[test]
    fn indexed_property_rules_are_distinct() {
        let ctx = ctx();
        let rules = RuleSet::from_pairs(
            [("./tags[1]", "second"), ("./tags", "all")],
            &ctx,
        )
        .unwrap();

        assert_eq!(
            rules.property_for(&stack(&["p"]), "tags", Some(1)),
            Some(&["second".to_string()][..])
        );
        assert_eq!(
            rules.property_for(&stack(&["p"]), "tags", None),
            Some(&["all".to_string()][..])
        );
        assert_eq!(rules.property_for(&stack(&["p"]), "tags", Some(0)), None);
    }

    #[test]
    fn mixin_rules_accumulate_across_patterns() {
        let ctx = ctx();
        let rules = RuleSet::from_pairs(
            [("./_mixins", "sys:versioned"), ("./_mixins", "sys:tracked")],
            &ctx,
        )
        .unwrap();

        assert_eq!(
            rules.mixins_for(&stack(&["p"])).unwrap(),
            vec!["sys:versioned", "sys:tracked"]
        );
        assert!(rules.mixins_for(&stack(&["p", "child"])).is_none());
    }

    #[test]
    fn merged_sets_accumulate() {
        let ctx = ctx();
        let base = RuleSet::from_pairs([("./title", "one")], &ctx).unwrap();
        let over = RuleSet::from_pairs([("./title", "two")], &ctx).unwrap();
        let merged = base.merged(&over);
        assert_eq!(
            merged.property_for(&stack(&["p"]), "title", None),
            Some(&["one".to_string(), "two".to_string()][..])
        );
    }

    #[test]
    fn with_root_name_targets_the_root() {
        let rules = RuleSet::empty().with_root_name("Copy of Doc").unwrap();
        assert_eq!(rules.name_for(&stack(&["Doc"])), Some("Copy of Doc"));
        assert_eq!(rules.name_for(&stack(&["Doc", "inner"])), None);
    }
}
