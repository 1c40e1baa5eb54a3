//! Node-type and mixin vocabulary
//!
//! Names the primary types, mixins, and system properties the engine
//! reads and writes. The `sys:` namespace is protected: system properties
//! survive tombstoning and system children do not count toward emptiness.

/// Primary node types
pub mod types {
    /// Plain folder grouping other folders and handles
    pub const FOLDER: &str = "grove:folder";
    /// Container grouping one or more content variants under one name
    pub const HANDLE: &str = "grove:handle";
    /// A concrete content variant beneath a handle
    pub const CONTENT: &str = "grove:content";
    /// Structured data node beneath a content variant
    pub const CONTENT_NODE: &str = "grove:contentNode";
}

/// Mixin type names
pub mod mixins {
    /// Node participates in version history
    pub const VERSIONED: &str = "sys:versioned";
    /// Node is tracked against a source branch; stripped from copies
    pub const TRACKED: &str = "sys:tracked";
    /// Node is an archived tombstone record
    pub const TOMBSTONE: &str = "sys:tombstone";
}

/// System property names
pub mod props {
    /// Deletion timestamp written on tombstones
    pub const DELETED_ON: &str = "sys:deletedOn";
    /// Acting identity written on tombstones
    pub const DELETED_BY: &str = "sys:deletedBy";
    /// Flat key/token pairs a folder applies to nodes copied into it
    pub const MODIFY_ON_COPY: &str = "modifyOnCopy";
}

/// Protected namespace prefix
pub const SYSTEM_PREFIX: &str = "sys:";

/// Check whether a property or child name is in the protected namespace
#[inline]
#[must_use]
pub fn is_system_name(name: &str) -> bool {
    name.starts_with(SYSTEM_PREFIX)
}
