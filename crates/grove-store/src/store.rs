//! Content store contract
//!
//! The narrow in-process boundary the engine mutates content through.
//! All durable I/O, locking, and conflict detection live behind this
//! trait; the engine only sequences calls and propagates failures.

use crate::error::StoreError;
use grove_model::{ContentNode, NodeId, NodePath, PropertyValue};

/// Capability checked before mutating a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read content
    Read,
    /// Create and modify content
    Write,
    /// Remove content
    Remove,
}

/// Hierarchical persistence and versioning service
///
/// Node-addressed calls take the stable [`NodeId`]; path addressing is
/// only used to enter the tree. Mutations apply to uncommitted working
/// state until [`ContentStore::commit`]; [`ContentStore::discard`] drops
/// uncommitted changes.
///
/// Implementations decide conflict semantics; a conflicting commit
/// surfaces as [`StoreError::Conflict`].
pub trait ContentStore {
    /// Materialise the subtree at a path
    ///
    /// # Errors
    /// [`StoreError::PathNotFound`] if no node exists there.
    fn resolve_path(&self, path: &NodePath) -> Result<ContentNode, StoreError>;

    /// Materialise the subtree of a node by identifier
    ///
    /// # Errors
    /// [`StoreError::IdNotFound`] if the identifier is unknown.
    fn resolve_id(&self, id: NodeId) -> Result<ContentNode, StoreError>;

    /// Current path of a node
    ///
    /// # Errors
    /// [`StoreError::IdNotFound`] if the identifier is unknown.
    fn path_of(&self, id: NodeId) -> Result<NodePath, StoreError>;

    /// Create a child, checking the parent type's structural legality
    ///
    /// # Errors
    /// [`StoreError::ConstraintViolation`] when the parent's node type
    /// does not allow this child shape; [`StoreError::CheckedIn`] when
    /// the parent is not mutable.
    fn create_child(
        &self,
        parent: NodeId,
        name: &str,
        primary_type: &str,
    ) -> Result<ContentNode, StoreError>;

    /// Set or replace a property
    ///
    /// # Errors
    /// Identifier or mutability failures as above.
    fn set_property(
        &self,
        node: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), StoreError>;

    /// Remove a property if present
    ///
    /// # Errors
    /// Identifier or mutability failures as above.
    fn remove_property(&self, node: NodeId, name: &str) -> Result<(), StoreError>;

    /// Add a mixin, ignoring duplicates
    ///
    /// # Errors
    /// Identifier or mutability failures as above.
    fn add_mixin(&self, node: NodeId, mixin: &str) -> Result<(), StoreError>;

    /// Remove a mixin if present
    ///
    /// # Errors
    /// Identifier or mutability failures as above.
    fn remove_mixin(&self, node: NodeId, mixin: &str) -> Result<(), StoreError>;

    /// Structural move (no re-creation, identifier preserved)
    ///
    /// # Errors
    /// [`StoreError::MoveIntoSelf`] for a move into the node's own
    /// subtree; constraint and mutability failures as above.
    fn move_node(
        &self,
        node: NodeId,
        new_parent: NodeId,
        new_name: &str,
    ) -> Result<(), StoreError>;

    /// Remove a node and its subtree
    ///
    /// # Errors
    /// Identifier failures as above.
    fn remove_node(&self, node: NodeId) -> Result<(), StoreError>;

    /// Whether a node's type supports explicit child ordering
    ///
    /// # Errors
    /// Identifier failures as above.
    fn supports_ordering(&self, node: NodeId) -> Result<bool, StoreError>;

    /// Reposition `child` immediately before `before` (or last for None)
    ///
    /// # Errors
    /// [`StoreError::NoSuchChild`] when either node is not a child of
    /// `parent`.
    fn order_before(
        &self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), StoreError>;

    /// Transition a node into the mutable (checked-out) state
    ///
    /// # Errors
    /// Identifier failures as above.
    fn checkout(&self, node: NodeId) -> Result<(), StoreError>;

    /// Whether the node is currently mutable
    ///
    /// # Errors
    /// Identifier failures as above.
    fn is_checked_out(&self, node: NodeId) -> Result<bool, StoreError>;

    /// Record the node's current state in its version history
    ///
    /// # Errors
    /// [`StoreError::NotVersionable`] when the node carries no version
    /// history.
    fn checkpoint_version(&self, node: NodeId) -> Result<(), StoreError>;

    /// Whether the caller holds a capability on a path
    fn has_permission(&self, path: &NodePath, capability: Capability) -> bool;

    /// Publish uncommitted changes
    ///
    /// # Errors
    /// [`StoreError::Conflict`] on optimistic-concurrency failure.
    fn commit(&self) -> Result<(), StoreError>;

    /// Drop uncommitted changes
    fn discard(&self);
}
