//! Prototype locator contract
//!
//! Prototypes are template subtrees provisioning new content. The
//! locator resolves every prototype registered under a category; the
//! engine then picks one by type name.

use crate::error::StoreError;
use grove_model::ContentNode;
use indexmap::IndexMap;

/// A template subtree with its declared modification pairs
#[derive(Debug, Clone)]
pub struct Prototype {
    type_name: String,
    root: ContentNode,
    modifications: Vec<String>,
}

impl Prototype {
    /// Create a prototype
    ///
    /// `modifications` is the flat alternating key/raw-token sequence
    /// the template declares for materialisation.
    #[must_use]
    pub fn new(
        type_name: impl Into<String>,
        root: ContentNode,
        modifications: Vec<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            root,
            modifications,
        }
    }

    /// Content type this prototype provisions
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Template subtree
    #[inline]
    #[must_use]
    pub fn root(&self) -> &ContentNode {
        &self.root
    }

    /// Declared flat key/token modification pairs
    #[inline]
    #[must_use]
    pub fn modifications(&self) -> &[String] {
        &self.modifications
    }
}

/// Resolves prototypes by category
pub trait PrototypeLocator {
    /// All prototypes registered under a category
    ///
    /// An unknown category yields an empty sequence, not an error.
    ///
    /// # Errors
    /// Only underlying store failures.
    fn find_prototypes(&self, category: &str) -> Result<Vec<Prototype>, StoreError>;
}

/// In-memory locator over registered prototypes
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    by_category: IndexMap<String, Vec<Prototype>>,
}

impl StaticLocator {
    /// Empty locator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prototype under a category (builder style)
    #[must_use]
    pub fn with_prototype(mut self, category: impl Into<String>, prototype: Prototype) -> Self {
        self.by_category
            .entry(category.into())
            .or_default()
            .push(prototype);
        self
    }
}

impl PrototypeLocator for StaticLocator {
    fn find_prototypes(&self, category: &str) -> Result<Vec<Prototype>, StoreError> {
        Ok(self.by_category.get(category).cloned().unwrap_or_default())
    }
}
