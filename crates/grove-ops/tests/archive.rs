//! Archival and retention layout tests

use grove_model::vocab::{mixins, props, types};
use grove_model::{ContentNode, NodeId, NodePath, PropertyValue};
use grove_ops::{attic, FolderOps, OpsConfig, StoreSession};
use grove_store::{ContentStore, MemoryStore, StaticLocator};
use grove_test_utils::{fixed_now, init_tracing, seeded_store};
use pretty_assertions::assert_eq;
use std::str::FromStr;

fn session() -> StoreSession {
    StoreSession::at("alice", fixed_now())
}

fn path(s: &str) -> NodePath {
    s.parse().expect("test path")
}

fn config() -> OpsConfig {
    OpsConfig::new().with_attic_root(path("/attic"))
}

/// Handle with a versioned variant (title, body) and an unversioned one
fn seed_archivable(store: &MemoryStore, id: NodeId, name: &str) {
    let versioned = ContentNode::new(name, types::CONTENT)
        .with_mixin(mixins::VERSIONED)
        .with_mixin(mixins::TRACKED)
        .with_property("title", PropertyValue::string("Hello"))
        .with_property("sys:created", PropertyValue::string("2020-01-01"))
        .with_child(ContentNode::new("body", types::CONTENT_NODE));
    let scratch = ContentNode::new("scratch", types::CONTENT);
    let handle = ContentNode::with_id(id, name, types::HANDLE)
        .with_child(versioned)
        .with_child(scratch);

    let press = store.resolve_path(&path("/site/press")).expect("press");
    store.insert_tree(press.id(), &handle).expect("seed handle");
    store.commit().expect("commit seed");
}

#[test]
fn archive_moves_into_the_sharded_layout() {
    init_tracing();
    let store = seeded_store();
    let locator = StaticLocator::new();
    let id = NodeId::from_str("0a1b2c3d-0000-4000-8000-000000000000").unwrap();
    seed_archivable(&store, id, "doc");

    let ops = FolderOps::new(&store, &locator, config(), session());
    let retained = ops.archive(&path("/site/press/doc")).unwrap();

    assert_eq!(retained.to_string(), "/attic/0/a/1/b/doc");
    assert_eq!(retained, attic::shard_path(&path("/attic"), id, "doc").unwrap());
    assert!(store.resolve_path(&path("/site/press/doc")).is_err());

    // Shard folders were created lazily as plain folders
    let shard = store.resolve_path(&path("/attic/0/a/1/b")).unwrap();
    assert!(shard.is_type(types::FOLDER));
}

#[test]
fn archive_rewrites_versionable_variants_as_tombstones() {
    let store = seeded_store();
    let locator = StaticLocator::new();
    let id = NodeId::from_str("12345678-0000-4000-8000-000000000000").unwrap();
    seed_archivable(&store, id, "doc");

    let ops = FolderOps::new(&store, &locator, config(), session());
    let retained = ops.archive(&path("/site/press/doc")).unwrap();

    let handle = store.resolve_path(&retained).unwrap();
    // The unversioned variant is gone outright
    assert!(handle.child("scratch").is_none());

    let tombstone = handle.child("doc").expect("versioned variant retained");
    // Version history was checkpointed before the rewrite
    assert_eq!(store.version_count(tombstone.id()).unwrap(), 1);
    // Non-protected state is stripped, protected state survives
    assert!(tombstone.property("title").is_none());
    assert!(tombstone.property("sys:created").is_some());
    assert!(tombstone.child("body").is_none());
    // Only the versioning mixin survives, plus the tombstone marker
    assert!(tombstone.has_mixin(mixins::VERSIONED));
    assert!(tombstone.has_mixin(mixins::TOMBSTONE));
    assert!(!tombstone.has_mixin(mixins::TRACKED));
    // Deletion timestamp and acting identity are recorded
    assert_eq!(
        tombstone.property(props::DELETED_BY).unwrap().render_all(),
        vec!["alice"]
    );
    assert_eq!(
        tombstone.property(props::DELETED_ON).unwrap().render_all(),
        vec!["2024-06-01T10:30:00.000+01:00"]
    );
}

#[test]
fn shared_identifier_prefix_shares_a_shard_without_overwrite() {
    let store = seeded_store();
    let locator = StaticLocator::new();
    let first = NodeId::from_str("abcd1111-0000-4000-8000-000000000000").unwrap();
    let second = NodeId::from_str("abcd2222-0000-4000-8000-000000000000").unwrap();
    seed_archivable(&store, first, "one");
    seed_archivable(&store, second, "two");

    let ops = FolderOps::new(&store, &locator, config(), session());
    let one = ops.archive(&path("/site/press/one")).unwrap();
    let two = ops.archive(&path("/site/press/two")).unwrap();

    assert_eq!(one.parent(), two.parent());
    let shard = store.resolve_path(&one.parent().unwrap()).unwrap();
    assert!(shard.child("one").is_some());
    assert!(shard.child("two").is_some());
}

#[test]
fn archive_is_deterministic_for_an_identifier() {
    let attic_root = path("/attic");
    let id = NodeId::from_str("fedc0123-0000-4000-8000-000000000000").unwrap();
    let a = attic::shard_path(&attic_root, id, "doc").unwrap();
    let b = attic::shard_path(&attic_root, id, "doc").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "/attic/f/e/d/c/doc");
}
