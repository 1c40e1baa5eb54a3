//! Folder operation façade
//!
//! One entry point per operation: add, duplicate, copy, move, rename,
//! archive, reorder, delete. Every operation is a single synchronous
//! transaction: it either commits or discards uncommitted store state
//! before surfacing its error. No state is kept between operations.

use crate::attic::SHARD_DEPTH;
use crate::config::{OpsConfig, StoreSession};
use crate::error::OpsError;
use crate::inherit::StoreInheritance;
use grove_copy::ExpandingCopy;
use grove_model::vocab::{self, mixins, props, types};
use grove_model::{ContentNode, NodeId, NodePath, PropertyValue, Value};
use grove_rules::{ExpansionContext, RuleSet};
use grove_store::{Capability, ContentStore, PrototypeLocator, StoreError};
use indexmap::IndexMap;

/// Caller-supplied operation arguments (feed `$<key>` expansions)
pub type Arguments = IndexMap<String, String>;

/// Template-based content provisioning and archival operations
///
/// Stateless beyond its collaborators: the content store, the prototype
/// locator, the engine configuration, and the caller session.
pub struct FolderOps<'a> {
    store: &'a dyn ContentStore,
    locator: &'a dyn PrototypeLocator,
    config: OpsConfig,
    session: StoreSession,
}

impl std::fmt::Debug for FolderOps<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderOps")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<'a> FolderOps<'a> {
    /// Create the façade over its collaborators
    #[must_use]
    pub fn new(
        store: &'a dyn ContentStore,
        locator: &'a dyn PrototypeLocator,
        config: OpsConfig,
        session: StoreSession,
    ) -> Self {
        Self {
            store,
            locator,
            config,
            session,
        }
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OpsConfig {
        &self.config
    }

    /// Provision a new content node from a prototype
    ///
    /// Resolves the prototype for `(category, type_name)`, builds rename
    /// rules from its declared modifications plus `name` and the extra
    /// arguments, and materialises it inside `folder`. A handle-shaped
    /// prototype creates (or reuses) the container first, then
    /// materialises the content variants inside it.
    ///
    /// # Errors
    /// [`OpsError::NoPrototype`] when the category holds no prototype of
    /// that type; otherwise rule, copy, or store failures.
    pub fn add(
        &self,
        folder: &NodePath,
        category: &str,
        type_name: &str,
        name: &str,
        extra: &Arguments,
    ) -> Result<NodePath, OpsError> {
        self.transact("add", || self.add_inner(folder, category, type_name, name, extra))
    }

    /// Duplicate a subtree under its own parent
    ///
    /// The copy is named `target_name`, or "Copy of " + the source name
    /// by default. Version- and branch-tracking mixins are stripped.
    ///
    /// # Errors
    /// [`OpsError::Collision`] when the name is taken; copy or store
    /// failures otherwise.
    pub fn duplicate(
        &self,
        source: &NodePath,
        target_name: Option<&str>,
    ) -> Result<NodePath, OpsError> {
        self.transact("duplicate", || self.duplicate_inner(source, target_name))
    }

    /// Copy a subtree into another folder
    ///
    /// Copying into the source's own parent is a duplicate. Otherwise
    /// the destination is permission-checked, collision-checked, and
    /// checked out if necessary; rename rules merge the destination's
    /// modify-on-copy configuration with the explicit name override.
    /// Branch-tracking mixins are stripped.
    ///
    /// # Errors
    /// [`OpsError::PermissionDenied`], [`OpsError::Collision`], or copy
    /// and store failures.
    pub fn copy_to(
        &self,
        source: &NodePath,
        destination: &NodePath,
        target_name: Option<&str>,
    ) -> Result<NodePath, OpsError> {
        self.transact("copy", || self.copy_inner(source, destination, target_name))
    }

    /// Move a subtree into another folder (structural, no re-creation)
    ///
    /// Inner variants named after the old container are renamed to the
    /// new container name.
    ///
    /// # Errors
    /// [`OpsError::PermissionDenied`], [`OpsError::Collision`], or store
    /// failures.
    pub fn move_to(
        &self,
        source: &NodePath,
        destination: &NodePath,
        target_name: Option<&str>,
    ) -> Result<NodePath, OpsError> {
        self.transact("move", || self.move_inner(source, destination, target_name))
    }

    /// Rename a node in place, preserving its sibling position
    ///
    /// The next sibling is captured before the same-parent move and the
    /// renamed node is reinserted before it afterwards (no-op when it
    /// was last).
    ///
    /// # Errors
    /// [`OpsError::Collision`] when the new name is taken; store
    /// failures otherwise.
    pub fn rename(&self, node: &NodePath, new_name: &str) -> Result<NodePath, OpsError> {
        self.transact("rename", || self.rename_inner(node, new_name))
    }

    /// Archive a container into the sharded retention area
    ///
    /// Derives the retention path from the node identifier, creating
    /// shard folders lazily, and moves the container there. Versionable
    /// variants are checkpointed and rewritten as tombstones; other
    /// variants are removed outright.
    ///
    /// # Errors
    /// [`OpsError::AtticUnconfigured`] without a retention root; store
    /// failures otherwise.
    pub fn archive(&self, node: &NodePath) -> Result<NodePath, OpsError> {
        self.transact("archive", || self.archive_inner(node))
    }

    /// Bring a folder's children into the given name order
    ///
    /// Names resolve to stable identifiers first; children are then
    /// repositioned iteratively until the live order matches exactly.
    /// Unlisted children end up after the listed ones.
    ///
    /// # Errors
    /// Store failures, including unknown child names.
    pub fn reorder(&self, folder: &NodePath, desired: &[&str]) -> Result<(), OpsError> {
        self.transact("reorder", || self.reorder_inner(folder, desired))
    }

    /// Delete an empty container
    ///
    /// A single-variant container is resolved to its container first.
    ///
    /// # Errors
    /// [`OpsError::NotEmpty`] when real children remain; store failures
    /// otherwise.
    pub fn delete(&self, node: &NodePath) -> Result<(), OpsError> {
        self.transact("delete", || self.delete_inner(node))
    }

    // ------------------------------------------------------------------
    // Transaction wrapper
    // ------------------------------------------------------------------

    fn transact<T>(
        &self,
        op: &'static str,
        f: impl FnOnce() -> Result<T, OpsError>,
    ) -> Result<T, OpsError> {
        tracing::info!(op, holder = self.session.holder(), "folder operation started");
        let result = f().and_then(|value| {
            self.store.commit()?;
            Ok(value)
        });
        match &result {
            Ok(_) => tracing::info!(op, "folder operation committed"),
            Err(err) => {
                tracing::warn!(op, %err, "folder operation failed, discarding uncommitted state");
                self.store.discard();
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Operation bodies
    // ------------------------------------------------------------------

    fn add_inner(
        &self,
        folder: &NodePath,
        category: &str,
        type_name: &str,
        name: &str,
        extra: &Arguments,
    ) -> Result<NodePath, OpsError> {
        let dest = self.store.resolve_path(folder)?;
        let prototypes = self.locator.find_prototypes(category)?;
        let prototype = prototypes
            .iter()
            .find(|p| p.type_name() == type_name)
            .ok_or_else(|| OpsError::NoPrototype {
                category: category.to_string(),
                type_name: type_name.to_string(),
            })?;

        let inherit = StoreInheritance::new(self.store, folder.clone());
        let mut ctx = ExpansionContext::new(self.session.now(), self.session.holder())
            .with_inheritance(&inherit);
        for (key, value) in extra {
            ctx = ctx.with_arg(key.clone(), value.clone());
        }
        let ctx = ctx.with_arg("name", name);
        let rules = RuleSet::from_flat(prototype.modifications(), &ctx)?;

        let root = prototype.root();
        let copy = ExpandingCopy::new(self.store, rules);
        if root.is_type(types::HANDLE) {
            let container_id = match dest.child(name) {
                Some(existing) => {
                    tracing::debug!(container = name, "reusing existing container");
                    existing.id()
                }
                None => self.create_container(dest.id(), name, root)?,
            };
            for variant in root.children() {
                copy.materialize(variant, container_id)?;
            }
            Ok(folder.child(name)?)
        } else {
            let created = copy.materialize(root, dest.id())?;
            Ok(folder.child(created.name())?)
        }
    }

    fn create_container(
        &self,
        parent: NodeId,
        name: &str,
        template: &ContentNode,
    ) -> Result<NodeId, OpsError> {
        let created = self
            .store
            .create_child(parent, name, template.primary_type())?;
        for mixin in template.mixins() {
            self.store.add_mixin(created.id(), mixin)?;
        }
        for (prop, value) in template.properties() {
            self.store.set_property(created.id(), prop, value.clone())?;
        }
        Ok(created.id())
    }

    fn duplicate_inner(
        &self,
        source: &NodePath,
        target_name: Option<&str>,
    ) -> Result<NodePath, OpsError> {
        let source_node = self.store.resolve_path(source)?;
        let parent_path = source
            .parent()
            .ok_or_else(|| StoreError::Backend("cannot duplicate the root".to_string()))?;
        let parent = self.store.resolve_path(&parent_path)?;

        let name = target_name.map_or_else(
            || format!("{}{}", self.config.copy_name_prefix, source_node.name()),
            str::to_string,
        );
        self.ensure_vacant(&parent, &parent_path, &name)?;

        let rules = RuleSet::empty().with_root_name(name.clone())?;
        let created = ExpandingCopy::new(self.store, rules)
            .excluding_mixins([mixins::VERSIONED, mixins::TRACKED])
            .materialize(&source_node, parent.id())?;
        self.align_variants(created.id(), source_node.name(), created.name())?;
        Ok(parent_path.child(created.name())?)
    }

    fn copy_inner(
        &self,
        source: &NodePath,
        destination: &NodePath,
        target_name: Option<&str>,
    ) -> Result<NodePath, OpsError> {
        let source_parent = source
            .parent()
            .ok_or_else(|| StoreError::Backend("cannot copy the root".to_string()))?;
        if *destination == source_parent {
            return self.duplicate_inner(source, target_name);
        }

        self.ensure_writable(destination)?;
        let source_node = self.store.resolve_path(source)?;
        let dest = self.store.resolve_path(destination)?;
        let name = target_name.map_or_else(|| source_node.name().to_string(), str::to_string);
        self.ensure_vacant(&dest, destination, &name)?;

        if !self.store.is_checked_out(dest.id())? {
            tracing::debug!(destination = %destination, "checking out destination");
            self.store.checkout(dest.id())?;
        }

        let inherit = StoreInheritance::new(self.store, destination.clone());
        let ctx = ExpansionContext::new(self.session.now(), self.session.holder())
            .with_arg("name", name.clone())
            .with_inheritance(&inherit);
        let declared = match dest.property(props::MODIFY_ON_COPY) {
            Some(value) => RuleSet::from_flat(&value.render_all(), &ctx)?,
            None => RuleSet::empty(),
        };
        let overrides = RuleSet::empty().with_root_name(name)?;
        let rules = declared.merged(&overrides);

        let created = ExpandingCopy::new(self.store, rules)
            .excluding_mixins([mixins::TRACKED])
            .materialize(&source_node, dest.id())?;
        self.align_variants(created.id(), source_node.name(), created.name())?;
        Ok(destination.child(created.name())?)
    }

    fn move_inner(
        &self,
        source: &NodePath,
        destination: &NodePath,
        target_name: Option<&str>,
    ) -> Result<NodePath, OpsError> {
        self.ensure_writable(destination)?;
        let source_node = self.store.resolve_path(source)?;
        let dest = self.store.resolve_path(destination)?;
        let old_name = source_node.name().to_string();
        let name = target_name.unwrap_or(&old_name);
        self.ensure_vacant(&dest, destination, name)?;

        self.store.move_node(source_node.id(), dest.id(), name)?;
        self.align_variants(source_node.id(), &old_name, name)?;
        Ok(destination.child(name)?)
    }

    fn rename_inner(&self, node: &NodePath, new_name: &str) -> Result<NodePath, OpsError> {
        let target = self.store.resolve_path(node)?;
        let parent_path = node
            .parent()
            .ok_or_else(|| StoreError::Backend("cannot rename the root".to_string()))?;
        let parent = self.store.resolve_path(&parent_path)?;
        let old_name = target.name().to_string();
        if new_name != old_name {
            self.ensure_vacant(&parent, &parent_path, new_name)?;
        }

        self.rename_in_place(parent.id(), target.id(), new_name)?;
        self.align_variants(target.id(), &old_name, new_name)?;
        Ok(parent_path.child(new_name)?)
    }

    fn archive_inner(&self, node: &NodePath) -> Result<NodePath, OpsError> {
        let attic_root = self
            .config
            .attic_root
            .clone()
            .ok_or(OpsError::AtticUnconfigured)?;
        let target = self.store.resolve_path(node)?;
        let attic = self.store.resolve_path(&attic_root)?;

        // Shard folders come into being on first use
        let mut cursor = attic.id();
        let rendered = target.id().to_string();
        for c in rendered.chars().take(SHARD_DEPTH) {
            let segment = c.to_string();
            let current = self.store.resolve_id(cursor)?;
            cursor = match current.child(&segment) {
                Some(existing) => existing.id(),
                None => self.store.create_child(cursor, &segment, types::FOLDER)?.id(),
            };
        }

        self.store.move_node(target.id(), cursor, target.name())?;

        let retained = self.store.resolve_id(target.id())?;
        for variant in retained.children() {
            if !variant.is_type(types::CONTENT) {
                continue;
            }
            if variant.has_mixin(mixins::VERSIONED) {
                self.store.checkpoint_version(variant.id())?;
                self.tombstone(variant)?;
            } else {
                self.store.remove_node(variant.id())?;
            }
        }
        Ok(self.store.path_of(target.id())?)
    }

    /// Rewrite a variant as a tombstone record
    ///
    /// Keeps protected (`sys:`) properties and children and the
    /// versioning mixin; everything else goes. The record carries the
    /// deletion timestamp and the acting identity.
    fn tombstone(&self, variant: &ContentNode) -> Result<(), OpsError> {
        for name in variant.properties().keys() {
            if !vocab::is_system_name(name) {
                self.store.remove_property(variant.id(), name)?;
            }
        }
        for child in variant.children() {
            if !vocab::is_system_name(child.name()) {
                self.store.remove_node(child.id())?;
            }
        }
        for mixin in variant.mixins() {
            if mixin != mixins::VERSIONED {
                self.store.remove_mixin(variant.id(), mixin)?;
            }
        }
        self.store.add_mixin(variant.id(), mixins::TOMBSTONE)?;
        self.store.set_property(
            variant.id(),
            props::DELETED_ON,
            PropertyValue::Single(Value::Date(self.session.now())),
        )?;
        self.store.set_property(
            variant.id(),
            props::DELETED_BY,
            PropertyValue::string(self.session.holder()),
        )?;
        Ok(())
    }

    fn reorder_inner(&self, folder: &NodePath, desired: &[&str]) -> Result<(), OpsError> {
        let node = self.store.resolve_path(folder)?;
        if !self.store.supports_ordering(node.id())? {
            return Err(OpsError::Store(StoreError::Backend(format!(
                "{folder} does not support explicit ordering"
            ))));
        }

        // Names pin to stable identifiers before anything moves
        let mut required = Vec::with_capacity(desired.len());
        for name in desired {
            let child = node.child(name).ok_or_else(|| StoreError::NoSuchChild {
                parent: folder.to_string(),
                child: (*name).to_string(),
            })?;
            required.push(child.id());
        }

        for (position, required_id) in required.iter().enumerate() {
            let live = self.store.resolve_id(node.id())?;
            let current = live.children().get(position).map(ContentNode::id);
            if current != Some(*required_id) {
                self.store.order_before(node.id(), *required_id, current)?;
            }
        }
        Ok(())
    }

    fn delete_inner(&self, node: &NodePath) -> Result<(), OpsError> {
        let mut target = self.store.resolve_path(node)?;
        let mut target_path = node.clone();

        // A lone variant stands for its container
        if target.is_type(types::CONTENT) {
            if let Some(parent_path) = node.parent() {
                let parent = self.store.resolve_path(&parent_path)?;
                if parent.is_type(types::HANDLE) && parent.real_children().count() == 1 {
                    target = parent;
                    target_path = parent_path;
                }
            }
        }

        let is_handle = target.is_type(types::HANDLE);
        let blocked = target
            .real_children()
            .any(|child| !(is_handle && child.is_type(types::CONTENT)));
        if blocked {
            return Err(OpsError::NotEmpty(target_path.to_string()));
        }

        self.store.remove_node(target.id())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    fn ensure_vacant(
        &self,
        parent: &ContentNode,
        parent_path: &NodePath,
        name: &str,
    ) -> Result<(), OpsError> {
        if parent.child(name).is_some() {
            return Err(OpsError::Collision {
                parent: parent_path.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_writable(&self, path: &NodePath) -> Result<(), OpsError> {
        if !self.store.has_permission(path, Capability::Write) {
            return Err(OpsError::PermissionDenied(path.to_string()));
        }
        Ok(())
    }

    /// Same-parent rename that keeps the node's sibling position
    fn rename_in_place(
        &self,
        parent: NodeId,
        child: NodeId,
        new_name: &str,
    ) -> Result<(), OpsError> {
        let next = if self.store.supports_ordering(parent)? {
            let parent_node = self.store.resolve_id(parent)?;
            let children = parent_node.children();
            children
                .iter()
                .position(|c| c.id() == child)
                .and_then(|pos| children.get(pos + 1))
                .map(ContentNode::id)
        } else {
            None
        };
        self.store.move_node(child, parent, new_name)?;
        if let Some(anchor) = next {
            self.store.order_before(parent, child, Some(anchor))?;
        }
        Ok(())
    }

    /// Rename inner variants that carried the old container name
    fn align_variants(
        &self,
        container: NodeId,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), OpsError> {
        if old_name == new_name {
            return Ok(());
        }
        let container_node = self.store.resolve_id(container)?;
        if !container_node.is_type(types::HANDLE) {
            return Ok(());
        }
        for variant in container_node.children() {
            if variant.name() == old_name {
                self.rename_in_place(container, variant.id(), new_name)?;
            }
        }
        Ok(())
    }
}
