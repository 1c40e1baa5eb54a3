//! Store-level errors

use grove_model::{NodeId, PathError};

/// Errors reported by a content store
///
/// The engine propagates these unchanged; no store failure is retried.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No node at the given path
    #[error("no node at {0}")]
    PathNotFound(String),

    /// No node with the given identifier
    #[error("no node with id {0}")]
    IdNotFound(NodeId),

    /// The destination node type does not allow this child shape
    #[error("type {parent_type} does not allow child '{child_name}' of type {child_type}")]
    ConstraintViolation {
        /// Node type of the would-be parent
        parent_type: String,
        /// Requested child name
        child_name: String,
        /// Requested child primary type
        child_type: String,
    },

    /// Mutation attempted on a checked-in node
    #[error("node at {0} is checked in")]
    CheckedIn(String),

    /// Version operation on a node without version history
    #[error("node at {0} is not versionable")]
    NotVersionable(String),

    /// Move would place a node beneath itself
    #[error("cannot move {0} beneath its own subtree")]
    MoveIntoSelf(String),

    /// Child not found during an ordering operation
    #[error("no child '{child}' under {parent}")]
    NoSuchChild {
        /// Parent path
        parent: String,
        /// Missing child name or id
        child: String,
    },

    /// Malformed path
    #[error(transparent)]
    Path(#[from] PathError),

    /// Optimistic-concurrency conflict reported on commit
    #[error("commit conflict: {0}")]
    Conflict(String),

    /// Any other backend failure (connectivity, quota, ...)
    #[error("store failure: {0}")]
    Backend(String),
}
