//! Rule-driven subtree reconstruction

use grove_model::{ContentNode, NodeId, PropertyValue, Value};
use grove_rules::RuleSet;
use grove_store::{ContentStore, StoreError};

/// Errors from the copy transformer
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// No legal shape for this child, even after the original-name retry
    #[error("no legal shape for child '{name}' of type {primary_type} under {parent}")]
    StructuralConstraint {
        /// Path of the parent that rejected the child
        parent: String,
        /// Last attempted child name
        name: String,
        /// Attempted primary type
        primary_type: String,
        /// The store's constraint report
        #[source]
        source: StoreError,
    },

    /// Store failure propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The two-attempt create state machine
///
/// `Substituted` holds the rule-supplied name; a constraint violation
/// demotes it to `Original`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateAttempt<'a> {
    Substituted(&'a str),
    Original,
}

/// Expanding copy transformer
///
/// Mirrors a source subtree beneath a destination, applying rename
/// rules as it reconstructs. Holds no traversal state between calls.
pub struct ExpandingCopy<'a> {
    store: &'a dyn ContentStore,
    rules: RuleSet,
    excluded_mixins: Vec<String>,
}

impl std::fmt::Debug for ExpandingCopy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpandingCopy")
            .field("rules", &self.rules)
            .field("excluded_mixins", &self.excluded_mixins)
            .finish_non_exhaustive()
    }
}

impl<'a> ExpandingCopy<'a> {
    /// Create a transformer over a store and a per-operation rule set
    #[must_use]
    pub fn new(store: &'a dyn ContentStore, rules: RuleSet) -> Self {
        Self {
            store,
            rules,
            excluded_mixins: Vec::new(),
        }
    }

    /// Drop the given mixins from every copied node (builder style)
    ///
    /// Used by duplicate/copy to strip version- and branch-tracking
    /// mixins from the new subtree.
    #[must_use]
    pub fn excluding_mixins<I, S>(mut self, mixins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_mixins = mixins.into_iter().map(Into::into).collect();
        self
    }

    /// Materialise `source` as a new child subtree of `destination`
    ///
    /// Returns the created subtree as seen by the store. Structural
    /// mutations happen in prototype traversal order, so identical
    /// inputs against an equivalent store state reproduce an identical
    /// tree shape.
    ///
    /// # Errors
    /// [`CopyError::StructuralConstraint`] when no legal child shape
    /// exists even after the original-name retry; any other store
    /// failure is propagated unchanged.
    pub fn materialize(
        &self,
        source: &ContentNode,
        destination: NodeId,
    ) -> Result<ContentNode, CopyError> {
        let mut stack: Vec<String> = Vec::new();
        let root_id = self.copy_node(source, destination, &mut stack)?;
        Ok(self.store.resolve_id(root_id)?)
    }

    fn copy_node(
        &self,
        source: &ContentNode,
        parent: NodeId,
        stack: &mut Vec<String>,
    ) -> Result<NodeId, CopyError> {
        // Name rules see the original name on the stack; everything
        // after them is keyed off the substituted name.
        stack.push(source.name().to_string());
        let substituted_name = self.rules.name_for(stack).map(str::to_string);
        if let (Some(name), Some(top)) = (&substituted_name, stack.last_mut()) {
            top.clone_from(name);
        }

        let primary_type = self
            .rules
            .type_for(stack)
            .unwrap_or_else(|| source.primary_type())
            .to_string();
        let mixins = self
            .rules
            .mixins_for(stack)
            .unwrap_or_else(|| source.mixins().to_vec());

        let created = self.create_with_fallback(
            parent,
            source.name(),
            substituted_name.as_deref(),
            &primary_type,
        )?;
        let created_id = created.id();

        for mixin in &mixins {
            if self.excluded_mixins.iter().any(|m| m == mixin) {
                continue;
            }
            self.store.add_mixin(created_id, mixin)?;
        }

        for (name, value) in source.properties() {
            let value = self.substitute_property(stack, name, value);
            self.store.set_property(created_id, name, value)?;
        }

        for child in source.children() {
            self.copy_node(child, created_id, stack)?;
        }

        stack.pop();
        Ok(created_id)
    }

    fn create_with_fallback(
        &self,
        parent: NodeId,
        original_name: &str,
        substituted_name: Option<&str>,
        primary_type: &str,
    ) -> Result<ContentNode, CopyError> {
        let mut attempt = match substituted_name {
            Some(name) if name != original_name => CreateAttempt::Substituted(name),
            _ => CreateAttempt::Original,
        };
        loop {
            let name = match attempt {
                CreateAttempt::Substituted(name) => name,
                CreateAttempt::Original => original_name,
            };
            match self.store.create_child(parent, name, primary_type) {
                Ok(node) => return Ok(node),
                Err(err @ StoreError::ConstraintViolation { .. }) => {
                    if let CreateAttempt::Substituted(rejected) = attempt {
                        tracing::debug!(
                            rejected,
                            fallback = original_name,
                            "substituted name violates destination constraints, retrying with original"
                        );
                        attempt = CreateAttempt::Original;
                        continue;
                    }
                    let parent_path = self
                        .store
                        .path_of(parent)
                        .map_or_else(|_| parent.to_string(), |p| p.to_string());
                    return Err(CopyError::StructuralConstraint {
                        parent: parent_path,
                        name: name.to_string(),
                        primary_type: primary_type.to_string(),
                        source: err,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Apply property rules at the current stack position
    ///
    /// Index-specific rules win per slot; a plain rule's values map by
    /// position; every remaining slot keeps its original value. A
    /// single-valued property takes the first candidate.
    fn substitute_property(
        &self,
        stack: &[String],
        name: &str,
        value: &PropertyValue,
    ) -> PropertyValue {
        match value {
            PropertyValue::Single(original) => {
                match self.rules.property_for(stack, name, None) {
                    Some(values) => match values.first() {
                        Some(first) => PropertyValue::Single(Value::String(first.clone())),
                        None => PropertyValue::Single(original.clone()),
                    },
                    None => value.clone(),
                }
            }
            PropertyValue::Multi(originals) => {
                let plain = self.rules.property_for(stack, name, None);
                let plain_len = plain.map_or(0, <[String]>::len);
                let len = originals.len().max(plain_len);
                let mut matched = plain.is_some();
                let mut result = Vec::with_capacity(len);
                for i in 0..len {
                    if let Some(first) = self
                        .rules
                        .property_for(stack, name, Some(i))
                        .and_then(<[String]>::first)
                    {
                        matched = true;
                        result.push(Value::String(first.clone()));
                    } else if let Some(candidate) = plain.and_then(|c| c.get(i)) {
                        result.push(Value::String(candidate.clone()));
                    } else if let Some(original) = originals.get(i) {
                        result.push(original.clone());
                    }
                }
                if matched {
                    PropertyValue::Multi(result)
                } else {
                    value.clone()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use grove_model::vocab::{mixins, types};
    use grove_rules::ExpansionContext;
    use grove_store::{MemoryStore, NodeTypeDef, TypeRegistry};
    use pretty_assertions::assert_eq;

    fn ctx() -> ExpansionContext<'static> {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
            .unwrap();
        ExpansionContext::new(now, "alice").with_arg("name", "press-release")
    }

    fn rules(pairs: &[(&str, &str)]) -> RuleSet {
        let ctx = ctx();
        RuleSet::from_pairs(pairs.iter().copied(), &ctx).unwrap()
    }

    fn source_handle() -> ContentNode {
        ContentNode::new("prototype", types::HANDLE).with_child(
            ContentNode::new("prototype", types::CONTENT)
                .with_property("title", PropertyValue::string("Untitled"))
                .with_property("tags", PropertyValue::strings(["a", "b", "c"]))
                .with_child(ContentNode::new("body", types::CONTENT_NODE)),
        )
    }

    #[test]
    fn copies_structure_without_rules() {
        let store = MemoryStore::with_defaults();
        let copy = ExpandingCopy::new(&store, RuleSet::empty());
        let created = copy.materialize(&source_handle(), store.root_id()).unwrap();

        assert_eq!(created.name(), "prototype");
        assert!(created.is_type(types::HANDLE));
        let variant = created.child("prototype").unwrap();
        assert_eq!(
            variant.property("title").unwrap().render_all(),
            vec!["Untitled"]
        );
        assert!(variant.child("body").is_some());
    }

    #[test]
    fn substitutes_root_and_nested_names() {
        let store = MemoryStore::with_defaults();
        let set = rules(&[("./_name", "$name"), ("./_node/_name", "$name")]);
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source_handle(), store.root_id())
            .unwrap();

        assert_eq!(created.name(), "press-release");
        // The nested rule is keyed through the substituted root name
        assert!(created.child("press-release").is_some());
    }

    #[test]
    fn property_rules_key_off_substituted_name() {
        let store = MemoryStore::with_defaults();
        let set = rules(&[
            ("./_name", "$name"),
            ("press-release/_node/title", "$holder"),
        ]);
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source_handle(), store.root_id())
            .unwrap();

        let variant = created.child("prototype").unwrap();
        assert_eq!(variant.property("title").unwrap().render_all(), vec!["alice"]);
    }

    #[test]
    fn substitutes_primary_type() {
        let store = MemoryStore::with_defaults();
        let source = ContentNode::new("box", types::FOLDER);
        let set = rules(&[("./_type", "grove:handle")]);
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source, store.root_id())
            .unwrap();

        assert!(created.is_type(types::HANDLE));
    }

    #[test]
    fn mixin_rules_replace_the_mixin_set() {
        let store = MemoryStore::with_defaults();
        let set = rules(&[
            ("./_node/_mixins", "sys:versioned"),
            ("./_node/_mixins", "sys:tracked"),
        ]);
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source_handle(), store.root_id())
            .unwrap();

        let variant = created.child("prototype").unwrap();
        assert!(variant.has_mixin(mixins::VERSIONED));
        assert!(variant.has_mixin(mixins::TRACKED));
    }

    #[test]
    fn excluded_mixins_are_stripped() {
        let store = MemoryStore::with_defaults();
        let source = ContentNode::new("doc", types::HANDLE).with_child(
            ContentNode::new("doc", types::CONTENT)
                .with_mixin(mixins::TRACKED)
                .with_mixin(mixins::VERSIONED),
        );
        let created = ExpandingCopy::new(&store, RuleSet::empty())
            .excluding_mixins([mixins::TRACKED])
            .materialize(&source, store.root_id())
            .unwrap();

        let variant = created.child("doc").unwrap();
        assert!(variant.has_mixin(mixins::VERSIONED));
        assert!(!variant.has_mixin(mixins::TRACKED));
    }

    #[test]
    fn falls_back_to_original_name_on_constraint_violation() {
        // The slot type only admits a child named "body"; the folder
        // root stays unregistered so the page itself can be created
        let registry = TypeRegistry::new().register(
            "strict:page",
            NodeTypeDef::new().with_named_child("body", [types::CONTENT_NODE]),
        );
        let store = MemoryStore::new(registry);
        let page = store
            .create_child(store.root_id(), "page", "strict:page")
            .unwrap();

        let source = ContentNode::new("body", types::CONTENT_NODE);
        let set = rules(&[("./_name", "renamed")]);
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source, page.id())
            .unwrap();

        assert_eq!(created.name(), "body");
        assert!(created.is_type(types::CONTENT_NODE));
    }

    #[test]
    fn fails_when_no_legal_shape_exists() {
        let registry = TypeRegistry::new().register(
            "strict:page",
            NodeTypeDef::new().with_named_child("body", [types::CONTENT_NODE]),
        );
        let store = MemoryStore::new(registry);
        let page = store
            .create_child(store.root_id(), "page", "strict:page")
            .unwrap();

        // Wrong type for the only admissible slot: both attempts fail
        let source = ContentNode::new("body", types::CONTENT);
        let set = rules(&[("./_name", "renamed")]);
        let result = ExpandingCopy::new(&store, set).materialize(&source, page.id());

        assert!(matches!(
            result,
            Err(CopyError::StructuralConstraint { .. })
        ));
    }

    #[test]
    fn multi_valued_index_rules_override_per_slot() {
        let store = MemoryStore::with_defaults();
        let set = rules(&[("prototype/_node/tags[1]", "replaced")]);
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source_handle(), store.root_id())
            .unwrap();

        let variant = created.child("prototype").unwrap();
        assert_eq!(
            variant.property("tags").unwrap().render_all(),
            vec!["a", "replaced", "c"]
        );
    }

    #[test]
    fn multi_valued_plain_rule_maps_by_position() {
        let store = MemoryStore::with_defaults();
        // Two candidates for three original values: the tail survives
        let ctx = ctx();
        let set = RuleSet::from_pairs(
            [
                ("prototype/_node/tags", "x"),
                ("prototype/_node/tags", "y"),
            ],
            &ctx,
        )
        .unwrap();
        let created = ExpandingCopy::new(&store, set)
            .materialize(&source_handle(), store.root_id())
            .unwrap();

        let variant = created.child("prototype").unwrap();
        assert_eq!(
            variant.property("tags").unwrap().render_all(),
            vec!["x", "y", "c"]
        );
    }

    #[test]
    fn unmatched_properties_copy_unchanged() {
        let store = MemoryStore::with_defaults();
        let source = ContentNode::new("doc", types::HANDLE).with_child(
            ContentNode::new("doc", types::CONTENT)
                .with_property("count", PropertyValue::Single(Value::Long(7))),
        );
        let created = ExpandingCopy::new(&store, rules(&[("./title", "ignored")]))
            .materialize(&source, store.root_id())
            .unwrap();

        let variant = created.child("doc").unwrap();
        assert_eq!(
            variant.property("count").unwrap().values(),
            &[Value::Long(7)]
        );
    }
}
