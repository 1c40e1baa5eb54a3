//! Path patterns for rename rules
//!
//! A rule key is a slash-separated pattern whose final segment is a leaf
//! marker: a structural marker (`_name`, `_type`, `_mixins`) or a property
//! name with an optional positional index (`title[1]`). The remaining
//! segments are matched against the traversal path stack.
//!
//! Patterns are split once per operation; [`PathPattern::matches`] is a
//! pure predicate over the current stack, called for every node and
//! property visited.

use std::fmt::{self, Display, Formatter};

/// Segment matching only the root position
pub const ROOT_MARKER: &str = ".";
/// Segment matching any node name at its depth
pub const ANY_NODE_MARKER: &str = "_node";
/// Leaf marker targeting the node name
pub const NAME_MARKER: &str = "_name";
/// Leaf marker targeting the primary type
pub const TYPE_MARKER: &str = "_type";
/// Leaf marker targeting the mixin set
pub const MIXINS_MARKER: &str = "_mixins";
/// Open-ended schema field; rules touching it are unsupported
pub const WILDCARD: &str = "*";

/// What a rule targets at the matched position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    /// The node name
    Name,
    /// The primary type name
    PrimaryType,
    /// The mixin set (values accumulate)
    Mixins,
    /// A property, optionally one slot of a multi-valued property
    Property {
        /// Property name
        name: String,
        /// Positional index for multi-valued properties
        index: Option<usize>,
    },
}

/// Pre-split rule pattern
///
/// # Invariants
/// - `segments` never contains the leaf marker
/// - matching is O(segment count) and side-effect free
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<String>,
    target: RuleTarget,
    unsupported: bool,
}

impl PathPattern {
    /// Split a rule key into path segments and leaf marker
    ///
    /// # Errors
    /// Returns an error for an empty key, an empty segment, or a leaf
    /// index that does not parse.
    pub fn parse(key: &str) -> Result<Self, PatternError> {
        if key.is_empty() {
            return Err(PatternError::EmptyKey);
        }
        let mut segments: Vec<String> = Vec::new();
        for seg in key.split('/') {
            if seg.is_empty() {
                return Err(PatternError::EmptySegment(key.to_string()));
            }
            segments.push(seg.to_string());
        }
        let leaf = segments.pop().ok_or(PatternError::EmptyKey)?;
        let unsupported =
            leaf == WILDCARD || segments.iter().any(|s| s == WILDCARD);
        let target = parse_leaf(&leaf)?;
        Ok(Self {
            segments,
            target,
            unsupported,
        })
    }

    /// What this rule targets
    #[inline]
    #[must_use]
    pub fn target(&self) -> &RuleTarget {
        &self.target
    }

    /// Path segments without the leaf marker
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the pattern involves an open-ended (`*`) field
    ///
    /// Unsupported patterns never match; callers report them once and
    /// move on rather than failing the operation.
    #[inline]
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.unsupported
    }

    /// Match the pattern against the current traversal stack
    ///
    /// The stack holds one name per visited level, traversal root first.
    /// The match requires equal lengths; `.` matches only the root
    /// position, `_node` matches any name at its depth, anything else
    /// must equal the stack entry exactly. No prefix matching.
    #[must_use]
    pub fn matches(&self, stack: &[String]) -> bool {
        if self.unsupported || stack.len() != self.segments.len() {
            return false;
        }
        self.segments.iter().enumerate().all(|(i, seg)| {
            match seg.as_str() {
                ROOT_MARKER => i == 0,
                ANY_NODE_MARKER => true,
                other => other == stack[i],
            }
        })
    }
}

fn parse_leaf(leaf: &str) -> Result<RuleTarget, PatternError> {
    match leaf {
        NAME_MARKER => Ok(RuleTarget::Name),
        TYPE_MARKER => Ok(RuleTarget::PrimaryType),
        MIXINS_MARKER => Ok(RuleTarget::Mixins),
        _ => {
            if let Some(open) = leaf.find('[') {
                let Some(inner) = leaf[open..].strip_prefix('[').and_then(|r| r.strip_suffix(']'))
                else {
                    return Err(PatternError::BadIndex(leaf.to_string()));
                };
                let index: usize = inner
                    .parse()
                    .map_err(|_| PatternError::BadIndex(leaf.to_string()))?;
                Ok(RuleTarget::Property {
                    name: leaf[..open].to_string(),
                    index: Some(index),
                })
            } else {
                Ok(RuleTarget::Property {
                    name: leaf.to_string(),
                    index: None,
                })
            }
        }
    }
}

impl Display for PathPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            write!(f, "{seg}/")?;
        }
        match &self.target {
            RuleTarget::Name => write!(f, "{NAME_MARKER}"),
            RuleTarget::PrimaryType => write!(f, "{TYPE_MARKER}"),
            RuleTarget::Mixins => write!(f, "{MIXINS_MARKER}"),
            RuleTarget::Property { name, index: None } => write!(f, "{name}"),
            RuleTarget::Property {
                name,
                index: Some(i),
            } => write!(f, "{name}[{i}]"),
        }
    }
}

/// Errors from rule key parsing
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Key was empty
    #[error("empty rule key")]
    EmptyKey,

    /// Key contained an empty segment
    #[error("rule key contains empty segment: {0}")]
    EmptySegment(String),

    /// Property index did not parse
    #[error("bad property index in rule leaf: {0}")]
    BadIndex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parse_structural_markers() {
        assert_eq!(
            PathPattern::parse("./_name").unwrap().target(),
            &RuleTarget::Name
        );
        assert_eq!(
            PathPattern::parse("./_type").unwrap().target(),
            &RuleTarget::PrimaryType
        );
        assert_eq!(
            PathPattern::parse("./_mixins").unwrap().target(),
            &RuleTarget::Mixins
        );
    }

    #[test]
    fn parse_property_leaf() {
        let plain = PathPattern::parse("./title").unwrap();
        assert_eq!(
            plain.target(),
            &RuleTarget::Property {
                name: "title".to_string(),
                index: None
            }
        );

        let indexed = PathPattern::parse("./title[2]").unwrap();
        assert_eq!(
            indexed.target(),
            &RuleTarget::Property {
                name: "title".to_string(),
                index: Some(2)
            }
        );
    }

    #[test]
    fn parse_rejects_bad_keys() {
        assert!(matches!(
            PathPattern::parse(""),
            Err(PatternError::EmptyKey)
        ));
        assert!(matches!(
            PathPattern::parse(".//title"),
            Err(PatternError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("./title[x]"),
            Err(PatternError::BadIndex(_))
        ));
        assert!(matches!(
            PathPattern::parse("./title[1"),
            Err(PatternError::BadIndex(_))
        ));
    }

    #[test]
    fn root_marker_matches_only_root_position() {
        let p = PathPattern::parse("./_name").unwrap();
        assert!(p.matches(&stack(&["anything"])));
        assert!(!p.matches(&stack(&["a", "b"])));

        // `.` below the root never matches
        let nested = PathPattern::parse("a/./_name").unwrap();
        assert!(!nested.matches(&stack(&["a", "b"])));
    }

    #[test]
    fn any_node_matches_any_name_at_depth() {
        let p = PathPattern::parse("./_node/title").unwrap();
        assert!(p.matches(&stack(&["root", "left"])));
        assert!(p.matches(&stack(&["root", "right"])));
        assert!(!p.matches(&stack(&["root"])));
        assert!(!p.matches(&stack(&["root", "x", "y"])));
    }

    #[test]
    fn literal_segments_match_exactly() {
        let p = PathPattern::parse("page/body/_name").unwrap();
        assert!(p.matches(&stack(&["page", "body"])));
        assert!(!p.matches(&stack(&["page", "header"])));
    }

    #[test]
    fn no_prefix_matching() {
        let p = PathPattern::parse("page/_name").unwrap();
        assert!(!p.matches(&stack(&["page", "body"])));
    }

    #[test]
    fn wildcard_marks_unsupported() {
        let leaf = PathPattern::parse("./*").unwrap();
        assert!(leaf.is_unsupported());
        assert!(!leaf.matches(&stack(&["root"])));

        let segment = PathPattern::parse("./*/title").unwrap();
        assert!(segment.is_unsupported());
        assert!(!segment.matches(&stack(&["root", "x"])));
    }

    #[test]
    fn display_round_trips() {
        for key in ["./_name", "page/_node/_mixins", "./title[3]", "a/b/c"] {
            assert_eq!(PathPattern::parse(key).unwrap().to_string(), key);
        }
    }
}

#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Renaming intermediate nodes never changes whether a `_node`
        // pattern applies, as long as relative depth is unchanged.
        #[test]
        fn any_node_is_invariant_to_intermediate_names(
            middle in "[a-z]{1,12}",
            other in "[a-z]{1,12}",
        ) {
            let p = PathPattern::parse("./_node/title").unwrap();
            let a = vec!["root".to_string(), middle];
            let b = vec!["root".to_string(), other];
            prop_assert_eq!(p.matches(&a), p.matches(&b));
            prop_assert!(p.matches(&a));
        }

        #[test]
        fn root_marker_is_invariant_to_root_name(root in "[a-zA-Z0-9 ]{1,16}") {
            let p = PathPattern::parse("./_name").unwrap();
            prop_assert!(p.matches(&[root]));
        }

        #[test]
        fn depth_mismatch_never_matches(extra in 1usize..4) {
            let p = PathPattern::parse("./_node/title").unwrap();
            let mut stack = vec!["root".to_string(), "mid".to_string()];
            for i in 0..extra {
                stack.push(format!("deep{i}"));
            }
            prop_assert!(!p.matches(&stack));
        }
    }
}
