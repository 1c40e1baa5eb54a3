//! Node-type legality rules
//!
//! [`TypeRegistry`] answers the one structural question the engine asks:
//! may a parent of type T gain a child with this name and type? Types
//! declare named child slots and an optional residual set for all other
//! names. Unregistered parent types accept anything.

use grove_model::vocab::types;
use indexmap::IndexMap;

/// Child legality definition for one node type
#[derive(Debug, Clone, Default)]
pub struct NodeTypeDef {
    named_children: IndexMap<String, Vec<String>>,
    residual: Option<Vec<String>>,
    orderable: bool,
}

impl NodeTypeDef {
    /// New definition with no allowed children
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a specific child name restricted to the given types
    #[must_use]
    pub fn with_named_child<I, S>(mut self, name: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.named_children
            .insert(name.into(), allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Allow any child name restricted to the given types
    #[must_use]
    pub fn with_residual<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.residual = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Mark children as explicitly orderable
    #[must_use]
    pub fn orderable(mut self) -> Self {
        self.orderable = true;
        self
    }

    /// Whether this type supports explicit child ordering
    #[inline]
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.orderable
    }

    fn allows(&self, child_name: &str, child_type: &str) -> bool {
        if let Some(allowed) = self.named_children.get(child_name) {
            return allowed.iter().any(|t| t == child_type);
        }
        match &self.residual {
            Some(allowed) => allowed.iter().any(|t| t == child_type),
            None => false,
        }
    }
}

/// Registry of node-type definitions
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    defs: IndexMap<String, NodeTypeDef>,
}

impl TypeRegistry {
    /// Empty registry: every parent type accepts every child
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry wired with the grove vocabulary
    ///
    /// Folders group folders and handles, handles group content
    /// variants, content carries structured data nodes.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .register(
                types::FOLDER,
                NodeTypeDef::new()
                    .with_residual([types::FOLDER, types::HANDLE])
                    .orderable(),
            )
            .register(
                types::HANDLE,
                NodeTypeDef::new().with_residual([types::CONTENT]).orderable(),
            )
            .register(
                types::CONTENT,
                NodeTypeDef::new()
                    .with_residual([types::CONTENT_NODE])
                    .orderable(),
            )
            .register(
                types::CONTENT_NODE,
                NodeTypeDef::new()
                    .with_residual([types::CONTENT_NODE])
                    .orderable(),
            )
    }

    /// Register or replace a definition (builder style)
    #[must_use]
    pub fn register(mut self, type_name: impl Into<String>, def: NodeTypeDef) -> Self {
        self.defs.insert(type_name.into(), def);
        self
    }

    /// Whether `parent_type` accepts a child of this name and type
    ///
    /// Unregistered parent types accept anything; constraints come only
    /// from explicit definitions.
    #[must_use]
    pub fn allows_child(&self, parent_type: &str, child_name: &str, child_type: &str) -> bool {
        match self.defs.get(parent_type) {
            Some(def) => def.allows(child_name, child_type),
            None => true,
        }
    }

    /// Whether `type_name` supports explicit child ordering
    ///
    /// Unregistered types are treated as orderable.
    #[must_use]
    pub fn is_orderable(&self, type_name: &str) -> bool {
        self.defs
            .get(type_name)
            .map_or(true, NodeTypeDef::is_orderable)
    }
}
