//! In-memory reference store
//!
//! [`MemoryStore`] backs the engine's tests and serves as the reference
//! for store semantics: id-keyed records with ordered child vectors,
//! working/committed snapshot pairs for commit/discard, same-name
//! siblings with increasing sibling indices, and a deny-list for
//! permission decisions.

use crate::error::StoreError;
use crate::registry::TypeRegistry;
use crate::store::{Capability, ContentStore};
use grove_model::{vocab::types, ContentNode, NodeId, NodePath, PropertyValue};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct NodeRecord {
    name: String,
    primary_type: String,
    mixins: Vec<String>,
    properties: IndexMap<String, PropertyValue>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    checked_out: bool,
    version_count: u32,
}

impl NodeRecord {
    fn new(name: &str, primary_type: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            primary_type: primary_type.to_string(),
            mixins: Vec::new(),
            properties: IndexMap::new(),
            parent,
            children: Vec::new(),
            checked_out: true,
            version_count: 0,
        }
    }
}

type Tree = im::HashMap<NodeId, NodeRecord>;

#[derive(Debug)]
struct State {
    working: Tree,
    committed: Tree,
}

/// In-memory content store with snapshot commit/discard
pub struct MemoryStore {
    registry: TypeRegistry,
    root: NodeId,
    write_denied: Vec<NodePath>,
    state: RwLock<State>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create a store whose root is a checked-out folder
    #[must_use]
    pub fn new(registry: TypeRegistry) -> Self {
        let root = NodeId::new();
        let mut tree = Tree::new();
        tree.insert(root, NodeRecord::new("", types::FOLDER, None));
        Self {
            registry,
            root,
            write_denied: Vec::new(),
            state: RwLock::new(State {
                working: tree.clone(),
                committed: tree,
            }),
        }
    }

    /// Store with the default grove type registry
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(TypeRegistry::with_defaults())
    }

    /// Deny write and remove capabilities under a path (builder style)
    #[must_use]
    pub fn deny_write(mut self, path: NodePath) -> Self {
        self.write_denied.push(path);
        self
    }

    /// Root node identifier
    #[inline]
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Seed a subtree beneath a parent, preserving the given node ids
    ///
    /// Fixture helper: bypasses type legality and mutability so tests
    /// can install arbitrary shapes with chosen identifiers.
    ///
    /// # Errors
    /// [`StoreError::IdNotFound`] if the parent is unknown.
    pub fn insert_tree(&self, parent: NodeId, node: &ContentNode) -> Result<NodeId, StoreError> {
        let mut state = self.state.write();
        if !state.working.contains_key(&parent) {
            return Err(StoreError::IdNotFound(parent));
        }
        let id = insert_subtree(&mut state.working, parent, node);
        Ok(id)
    }

    /// Mark a node checked in (immutable) — fixture helper
    ///
    /// # Errors
    /// [`StoreError::IdNotFound`] if the node is unknown.
    pub fn check_in(&self, node: NodeId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let record = state
            .working
            .get_mut(&node)
            .ok_or(StoreError::IdNotFound(node))?;
        record.checked_out = false;
        Ok(())
    }

    /// Number of recorded versions — fixture helper
    ///
    /// # Errors
    /// [`StoreError::IdNotFound`] if the node is unknown.
    pub fn version_count(&self, node: NodeId) -> Result<u32, StoreError> {
        let state = self.state.read();
        Ok(record(&state.working, node)?.version_count)
    }
}

fn insert_subtree(tree: &mut Tree, parent: NodeId, node: &ContentNode) -> NodeId {
    let id = node.id();
    let mut record = NodeRecord::new(node.name(), node.primary_type(), Some(parent));
    record.mixins = node.mixins().to_vec();
    record.properties = node.properties().clone();
    tree.insert(id, record);
    if let Some(parent_record) = tree.get_mut(&parent) {
        parent_record.children.push(id);
    }
    for child in node.children() {
        insert_subtree(tree, id, child);
    }
    id
}

fn record(tree: &Tree, id: NodeId) -> Result<&NodeRecord, StoreError> {
    tree.get(&id).ok_or(StoreError::IdNotFound(id))
}

fn record_mut(tree: &mut Tree, id: NodeId) -> Result<&mut NodeRecord, StoreError> {
    tree.get_mut(&id).ok_or(StoreError::IdNotFound(id))
}

fn mutable_record_mut(tree: &mut Tree, id: NodeId) -> Result<&mut NodeRecord, StoreError> {
    let path = path_in(tree, id)?;
    let rec = record_mut(tree, id)?;
    if !rec.checked_out {
        return Err(StoreError::CheckedIn(path.to_string()));
    }
    Ok(rec)
}

fn path_in(tree: &Tree, id: NodeId) -> Result<NodePath, StoreError> {
    let mut segments = Vec::new();
    let mut cursor = id;
    loop {
        let rec = record(tree, cursor)?;
        match rec.parent {
            Some(parent) => {
                segments.push(rec.name.clone());
                cursor = parent;
            }
            None => break,
        }
    }
    segments.reverse();
    NodePath::new(segments).map_err(StoreError::from)
}

fn materialize(tree: &Tree, id: NodeId) -> Result<ContentNode, StoreError> {
    materialize_at(tree, id, 0)
}

fn materialize_at(tree: &Tree, id: NodeId, sibling_index: u32) -> Result<ContentNode, StoreError> {
    let rec = record(tree, id)?;
    let mut node =
        ContentNode::with_id(id, rec.name.clone(), rec.primary_type.clone())
            .at_sibling_index(sibling_index);
    for mixin in &rec.mixins {
        node.add_mixin(mixin.clone());
    }
    for (name, value) in &rec.properties {
        node.set_property(name.clone(), value.clone());
    }
    let mut seen: HashMap<&str, u32> = HashMap::new();
    for child_id in &rec.children {
        let child_rec = record(tree, *child_id)?;
        let index = seen.entry(child_rec.name.as_str()).or_insert(0);
        let child = materialize_at(tree, *child_id, *index)?;
        *index += 1;
        node.push_child(child);
    }
    Ok(node)
}

fn find_child(tree: &Tree, parent: NodeId, name: &str) -> Result<Option<NodeId>, StoreError> {
    let rec = record(tree, parent)?;
    for child_id in &rec.children {
        if record(tree, *child_id)?.name == name {
            return Ok(Some(*child_id));
        }
    }
    Ok(None)
}

fn is_in_subtree(tree: &Tree, candidate: NodeId, ancestor: NodeId) -> Result<bool, StoreError> {
    let mut cursor = Some(candidate);
    while let Some(id) = cursor {
        if id == ancestor {
            return Ok(true);
        }
        cursor = record(tree, id)?.parent;
    }
    Ok(false)
}

fn drop_subtree(tree: &mut Tree, id: NodeId) {
    let children = tree.get(&id).map(|r| r.children.clone()).unwrap_or_default();
    for child in children {
        drop_subtree(tree, child);
    }
    tree.remove(&id);
}

impl ContentStore for MemoryStore {
    fn resolve_path(&self, path: &NodePath) -> Result<ContentNode, StoreError> {
        let state = self.state.read();
        let mut cursor = self.root;
        for segment in path.segments() {
            cursor = find_child(&state.working, cursor, segment)?
                .ok_or_else(|| StoreError::PathNotFound(path.to_string()))?;
        }
        materialize(&state.working, cursor)
    }

    fn resolve_id(&self, id: NodeId) -> Result<ContentNode, StoreError> {
        let state = self.state.read();
        materialize(&state.working, id)
    }

    fn path_of(&self, id: NodeId) -> Result<NodePath, StoreError> {
        let state = self.state.read();
        path_in(&state.working, id)
    }

    fn create_child(
        &self,
        parent: NodeId,
        name: &str,
        primary_type: &str,
    ) -> Result<ContentNode, StoreError> {
        let mut state = self.state.write();
        let parent_rec = record(&state.working, parent)?;
        let parent_type = parent_rec.primary_type.clone();
        if !parent_rec.checked_out {
            let path = path_in(&state.working, parent)?;
            return Err(StoreError::CheckedIn(path.to_string()));
        }
        if !self.registry.allows_child(&parent_type, name, primary_type) {
            return Err(StoreError::ConstraintViolation {
                parent_type,
                child_name: name.to_string(),
                child_type: primary_type.to_string(),
            });
        }
        let id = NodeId::new();
        state
            .working
            .insert(id, NodeRecord::new(name, primary_type, Some(parent)));
        record_mut(&mut state.working, parent)?.children.push(id);
        materialize(&state.working, id)
    }

    fn set_property(
        &self,
        node: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let rec = mutable_record_mut(&mut state.working, node)?;
        rec.properties.insert(name.to_string(), value);
        Ok(())
    }

    fn remove_property(&self, node: NodeId, name: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let rec = mutable_record_mut(&mut state.working, node)?;
        rec.properties.shift_remove(name);
        Ok(())
    }

    fn add_mixin(&self, node: NodeId, mixin: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let rec = mutable_record_mut(&mut state.working, node)?;
        if !rec.mixins.iter().any(|m| m == mixin) {
            rec.mixins.push(mixin.to_string());
        }
        Ok(())
    }

    fn remove_mixin(&self, node: NodeId, mixin: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let rec = mutable_record_mut(&mut state.working, node)?;
        rec.mixins.retain(|m| m != mixin);
        Ok(())
    }

    fn move_node(
        &self,
        node: NodeId,
        new_parent: NodeId,
        new_name: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let node_path = path_in(&state.working, node)?;
        let old_parent = record(&state.working, node)?
            .parent
            .ok_or_else(|| StoreError::Backend("cannot move the root".to_string()))?;
        if is_in_subtree(&state.working, new_parent, node)? {
            return Err(StoreError::MoveIntoSelf(node_path.to_string()));
        }
        let new_parent_rec = record(&state.working, new_parent)?;
        if !new_parent_rec.checked_out {
            let path = path_in(&state.working, new_parent)?;
            return Err(StoreError::CheckedIn(path.to_string()));
        }
        let node_type = record(&state.working, node)?.primary_type.clone();
        let parent_type = new_parent_rec.primary_type.clone();
        if !self.registry.allows_child(&parent_type, new_name, &node_type) {
            return Err(StoreError::ConstraintViolation {
                parent_type,
                child_name: new_name.to_string(),
                child_type: node_type,
            });
        }
        record_mut(&mut state.working, old_parent)?
            .children
            .retain(|c| *c != node);
        record_mut(&mut state.working, new_parent)?.children.push(node);
        let rec = record_mut(&mut state.working, node)?;
        rec.parent = Some(new_parent);
        rec.name = new_name.to_string();
        Ok(())
    }

    fn remove_node(&self, node: NodeId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let rec = record(&state.working, node)?;
        if let Some(parent) = rec.parent {
            record_mut(&mut state.working, parent)?
                .children
                .retain(|c| *c != node);
        }
        drop_subtree(&mut state.working, node);
        Ok(())
    }

    fn supports_ordering(&self, node: NodeId) -> Result<bool, StoreError> {
        let state = self.state.read();
        let rec = record(&state.working, node)?;
        Ok(self.registry.is_orderable(&rec.primary_type))
    }

    fn order_before(
        &self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let parent_path = path_in(&state.working, parent)?;
        let rec = record_mut(&mut state.working, parent)?;
        if !rec.children.contains(&child) {
            return Err(StoreError::NoSuchChild {
                parent: parent_path.to_string(),
                child: child.to_string(),
            });
        }
        rec.children.retain(|c| *c != child);
        match before {
            Some(anchor) => {
                let Some(pos) = rec.children.iter().position(|c| *c == anchor) else {
                    return Err(StoreError::NoSuchChild {
                        parent: parent_path.to_string(),
                        child: anchor.to_string(),
                    });
                };
                rec.children.insert(pos, child);
            }
            None => rec.children.push(child),
        }
        Ok(())
    }

    fn checkout(&self, node: NodeId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        record_mut(&mut state.working, node)?.checked_out = true;
        Ok(())
    }

    fn is_checked_out(&self, node: NodeId) -> Result<bool, StoreError> {
        let state = self.state.read();
        Ok(record(&state.working, node)?.checked_out)
    }

    fn checkpoint_version(&self, node: NodeId) -> Result<(), StoreError> {
        use grove_model::vocab::mixins;
        let mut state = self.state.write();
        let path = path_in(&state.working, node)?;
        let rec = record_mut(&mut state.working, node)?;
        if !rec.mixins.iter().any(|m| m == mixins::VERSIONED) {
            return Err(StoreError::NotVersionable(path.to_string()));
        }
        rec.version_count += 1;
        Ok(())
    }

    fn has_permission(&self, path: &NodePath, capability: Capability) -> bool {
        match capability {
            Capability::Read => true,
            Capability::Write | Capability::Remove => {
                !self.write_denied.iter().any(|denied| denied.contains(path))
            }
        }
    }

    fn commit(&self) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state.committed = state.working.clone();
        Ok(())
    }

    fn discard(&self) {
        let mut state = self.state.write();
        state.working = state.committed.clone();
        tracing::debug!("uncommitted store state discarded");
    }
}
