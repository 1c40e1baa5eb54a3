//! Content node representation
//!
//! [`ContentNode`] is the transient, disposable view of a tree node used
//! during a single operation. The store owns the persisted nodes; this
//! type is pure data with accessors.

use crate::id::NodeId;
use crate::value::PropertyValue;
use crate::vocab;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// In-memory tree node
///
/// # Invariants
/// - `id` is store-assigned and immutable once set
/// - `mixins` holds no duplicates and preserves insertion order
/// - `children` ordering is significant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    id: NodeId,
    name: String,
    sibling_index: u32,
    primary_type: String,
    mixins: Vec<String>,
    properties: IndexMap<String, PropertyValue>,
    children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a node with a fresh identifier
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self::with_id(NodeId::new(), name, primary_type)
    }

    /// Create a node with an existing identifier
    #[inline]
    #[must_use]
    pub fn with_id(
        id: NodeId,
        name: impl Into<String>,
        primary_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            sibling_index: 0,
            primary_type: primary_type.into(),
            mixins: Vec::new(),
            properties: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Stable identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index among same-name siblings (0 for the first)
    #[inline]
    #[must_use]
    pub fn sibling_index(&self) -> u32 {
        self.sibling_index
    }

    /// Primary type name
    #[inline]
    #[must_use]
    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Mixin type names in insertion order
    #[inline]
    #[must_use]
    pub fn mixins(&self) -> &[String] {
        &self.mixins
    }

    /// Check for a mixin
    #[inline]
    #[must_use]
    pub fn has_mixin(&self, mixin: &str) -> bool {
        self.mixins.iter().any(|m| m == mixin)
    }

    /// Check the primary type
    #[inline]
    #[must_use]
    pub fn is_type(&self, primary_type: &str) -> bool {
        self.primary_type == primary_type
    }

    /// Ordered property map
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    /// Look up a property
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Ordered children
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    /// First child with the given name
    #[inline]
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ContentNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Children outside the protected namespace
    pub fn real_children(&self) -> impl Iterator<Item = &ContentNode> {
        self.children
            .iter()
            .filter(|c| !vocab::is_system_name(&c.name))
    }

    /// Set the name (builder style)
    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the sibling index (builder style)
    #[inline]
    #[must_use]
    pub fn at_sibling_index(mut self, index: u32) -> Self {
        self.sibling_index = index;
        self
    }

    /// Add a mixin, ignoring duplicates (builder style)
    #[inline]
    #[must_use]
    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        self.add_mixin(mixin);
        self
    }

    /// Set a property (builder style)
    #[inline]
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Append a child (builder style)
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add a mixin, ignoring duplicates
    pub fn add_mixin(&mut self, mixin: impl Into<String>) {
        let mixin = mixin.into();
        if !self.has_mixin(&mixin) {
            self.mixins.push(mixin);
        }
    }

    /// Remove a mixin if present
    pub fn remove_mixin(&mut self, mixin: &str) {
        self.mixins.retain(|m| m != mixin);
    }

    /// Set a property
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    /// Append a child
    pub fn push_child(&mut self, child: ContentNode) {
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{mixins, types};
    use pretty_assertions::assert_eq;

    #[test]
    fn node_builder() {
        let node = ContentNode::new("article", types::CONTENT)
            .with_mixin(mixins::VERSIONED)
            .with_property("title", PropertyValue::string("Hello"))
            .with_child(ContentNode::new("body", types::CONTENT_NODE));

        assert_eq!(node.name(), "article");
        assert!(node.is_type(types::CONTENT));
        assert!(node.has_mixin(mixins::VERSIONED));
        assert_eq!(node.property("title").unwrap().render_all(), vec!["Hello"]);
        assert!(node.child("body").is_some());
        assert_eq!(node.sibling_index(), 0);
    }

    #[test]
    fn mixins_deduplicate() {
        let mut node = ContentNode::new("n", types::CONTENT);
        node.add_mixin(mixins::VERSIONED);
        node.add_mixin(mixins::VERSIONED);
        assert_eq!(node.mixins().len(), 1);

        node.remove_mixin(mixins::VERSIONED);
        assert!(node.mixins().is_empty());
    }

    #[test]
    fn properties_keep_insertion_order() {
        let node = ContentNode::new("n", types::CONTENT)
            .with_property("b", PropertyValue::string("2"))
            .with_property("a", PropertyValue::string("1"));

        let keys: Vec<&str> = node.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn node_survives_json_round_trip() {
        let node = ContentNode::new("article", types::CONTENT)
            .with_mixin(mixins::VERSIONED)
            .with_property("tags", PropertyValue::strings(["a", "b"]))
            .with_child(ContentNode::new("body", types::CONTENT_NODE));

        let json = serde_json::to_string(&node).unwrap();
        let back: ContentNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn real_children_skip_system_namespace() {
        let node = ContentNode::new("n", types::HANDLE)
            .with_child(ContentNode::new("sys:versions", types::CONTENT_NODE))
            .with_child(ContentNode::new("article", types::CONTENT));

        let real: Vec<&str> = node.real_children().map(ContentNode::name).collect();
        assert_eq!(real, vec!["article"]);
    }
}
