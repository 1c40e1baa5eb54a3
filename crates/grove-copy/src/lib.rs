//! Grove expanding copy transformer
//!
//! [`ExpandingCopy`] walks a source subtree and reconstructs it beneath a
//! destination node, applying a [`RuleSet`] to names, primary types,
//! mixin sets, and property values along the way. The destination's
//! structural legality can veto a substituted name; the transformer then
//! retries once with the original name and the substituted type before
//! failing.
//!
//! The rule set is built once per operation and threaded immutably
//! through the traversal; the only mutable traversal state is the path
//! stack of names.

mod transform;

pub use transform::{CopyError, ExpandingCopy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
