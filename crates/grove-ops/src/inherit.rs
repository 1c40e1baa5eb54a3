//! Ancestor property lookup over a content store

use grove_model::NodePath;
use grove_rules::InheritanceSource;
use grove_store::ContentStore;

/// Resolves `$inherit` tokens against the destination's ancestry
///
/// Walks from the destination node upward; the first node defining the
/// property supplies all of its values.
pub struct StoreInheritance<'a> {
    store: &'a dyn ContentStore,
    base: NodePath,
}

impl<'a> StoreInheritance<'a> {
    /// Anchor inheritance at a destination path
    #[must_use]
    pub fn new(store: &'a dyn ContentStore, base: NodePath) -> Self {
        Self { store, base }
    }
}

impl InheritanceSource for StoreInheritance<'_> {
    fn inherited(&self, property: &str) -> Option<Vec<String>> {
        for path in self.base.ancestors_and_self() {
            let Ok(node) = self.store.resolve_path(&path) else {
                continue;
            };
            if let Some(value) = node.property(property) {
                return Some(value.render_all());
            }
        }
        None
    }
}
