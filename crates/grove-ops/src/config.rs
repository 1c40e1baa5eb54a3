//! Engine configuration and operation session

use chrono::{DateTime, FixedOffset, Utc};
use grove_model::NodePath;
use serde::{Deserialize, Serialize};

/// Folder operation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    /// Root of the sharded retention area; archival fails when unset
    pub attic_root: Option<NodePath>,
    /// Prefix for default duplicate names
    pub copy_name_prefix: String,
}

impl OpsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a retention root (builder style)
    #[inline]
    #[must_use]
    pub fn with_attic_root(mut self, path: NodePath) -> Self {
        self.attic_root = Some(path);
        self
    }

    /// With a duplicate-name prefix (builder style)
    #[inline]
    #[must_use]
    pub fn with_copy_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.copy_name_prefix = prefix.into();
        self
    }
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            attic_root: None,
            copy_name_prefix: "Copy of ".to_string(),
        }
    }
}

/// Explicit per-caller session state
///
/// Threaded through every operation instead of ambient or thread-local
/// state: the acting identity and the wall clock an operation expands
/// `$now` and stamps tombstones with.
#[derive(Debug, Clone)]
pub struct StoreSession {
    holder: String,
    now: DateTime<FixedOffset>,
}

impl StoreSession {
    /// Session for an identity, clocked at the current wall time
    #[must_use]
    pub fn new(holder: impl Into<String>) -> Self {
        Self::at(holder, Utc::now().fixed_offset())
    }

    /// Session with an explicit clock
    #[must_use]
    pub fn at(holder: impl Into<String>, now: DateTime<FixedOffset>) -> Self {
        Self {
            holder: holder.into(),
            now,
        }
    }

    /// Acting identity
    #[inline]
    #[must_use]
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Session clock
    #[inline]
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}
