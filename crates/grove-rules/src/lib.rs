//! Grove rename rules
//!
//! The small pattern-matching and variable-expansion language driving
//! template materialisation:
//!
//! - [`PathPattern`]: pre-split rule keys matched against the traversal
//!   path stack (`.` root marker, `_node` wildcard, structural leaf
//!   markers)
//! - [`ExpansionContext`]: resolves substitution tokens (`$name`,
//!   `$holder`, `$now` date math, `$inherit`, `$uuid`, argument keys)
//! - [`RuleSet`]: immutable per-operation map of pattern → expanded
//!   values, accumulated by key
//!
//! # Example
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use grove_rules::{ExpansionContext, RuleSet};
//!
//! let now = FixedOffset::east_opt(0).unwrap()
//!     .with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
//! let ctx = ExpansionContext::new(now, "alice").with_arg("name", "press-release");
//! let rules = RuleSet::from_pairs(
//!     [("./_name", "$name"), ("./title", "$holder")],
//!     &ctx,
//! ).unwrap();
//!
//! let stack = vec!["prototype".to_string()];
//! assert_eq!(rules.name_for(&stack), Some("press-release"));
//! ```

mod expand;
mod pattern;
mod ruleset;

pub use expand::{ExpandError, ExpansionContext, InheritanceSource, NoInheritance};
pub use pattern::{
    PathPattern, PatternError, RuleTarget, ANY_NODE_MARKER, MIXINS_MARKER, NAME_MARKER,
    ROOT_MARKER, TYPE_MARKER, WILDCARD,
};
pub use ruleset::{RenameRule, RuleError, RuleSet};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
