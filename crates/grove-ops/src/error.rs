//! Operation error taxonomy
//!
//! Every public operation surfaces exactly one of these; nothing is
//! retried internally. Callers translate kinds into user-facing text.

use grove_copy::CopyError;
use grove_model::PathError;
use grove_rules::RuleError;
use grove_store::StoreError;

/// Folder operation errors
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    /// No prototype matches the requested type under the category
    #[error("no matching prototype for type '{type_name}' in category '{category}'")]
    NoPrototype {
        /// Requested category
        category: String,
        /// Requested content type
        type_name: String,
    },

    /// Target name already exists at the destination
    #[error("'{name}' already exists at {parent}")]
    Collision {
        /// Destination path
        parent: String,
        /// Conflicting name
        name: String,
    },

    /// Caller lacks the authoring capability on the destination
    #[error("no authoring permission on {0}")]
    PermissionDenied(String),

    /// Delete requested on a container with real children
    #[error("{0} is not empty")]
    NotEmpty(String),

    /// Archival requested without a configured retention root
    #[error("no retention area configured")]
    AtticUnconfigured,

    /// Copy transformation failed (structural constraint or store)
    #[error(transparent)]
    Copy(#[from] CopyError),

    /// Rename rule construction failed
    #[error(transparent)]
    Rules(#[from] RuleError),

    /// Malformed path argument or result
    #[error(transparent)]
    Path(#[from] PathError),

    /// Store failure propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OpsError {
    /// Whether the failure is a structural-constraint violation
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Copy(CopyError::StructuralConstraint { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_names_both_sides() {
        let err = OpsError::Collision {
            parent: "/site/press".to_string(),
            name: "Copy of Doc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/site/press"));
        assert!(msg.contains("Copy of Doc"));
    }

    #[test]
    fn structural_detection() {
        let err = OpsError::Store(StoreError::Backend("x".to_string()));
        assert!(!err.is_structural());
    }
}
