//! Testing utilities for the grove workspace
//!
//! Shared fixtures: populated stores, prototypes, and a deterministic
//! test clock.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset, TimeZone};
use grove_model::vocab::types;
use grove_model::{ContentNode, PropertyValue};
use grove_store::{ContentStore, MemoryStore, Prototype, StaticLocator};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install an env-filtered subscriber once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic clock for expansion and tombstone assertions
pub fn fixed_now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 10, 30, 0)
        .unwrap()
}

/// Store seeded with `/site/press` folders and an `/attic` retention
/// root, all committed
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::with_defaults();
    let site = store
        .create_child(store.root_id(), "site", types::FOLDER)
        .expect("seed /site");
    store
        .create_child(site.id(), "press", types::FOLDER)
        .expect("seed /site/press");
    store
        .create_child(site.id(), "archive", types::FOLDER)
        .expect("seed /site/archive");
    store
        .create_child(store.root_id(), "attic", types::FOLDER)
        .expect("seed /attic");
    store.commit().expect("commit seed");
    store
}

/// Handle-shaped article prototype
///
/// The declared modifications name the variant after `$name` and stamp
/// the author from the acting identity.
pub fn article_prototype() -> Prototype {
    let variant = ContentNode::new("article", types::CONTENT)
        .with_property("title", PropertyValue::string("Untitled"))
        .with_property("author", PropertyValue::string("nobody"))
        .with_child(ContentNode::new("body", types::CONTENT_NODE));
    let root = ContentNode::new("article", types::HANDLE).with_child(variant);
    Prototype::new(
        "article",
        root,
        flat(&[("./_name", "$name"), ("./author", "$holder")]),
    )
}

/// Plain (non-container) folder prototype
pub fn note_prototype() -> Prototype {
    let root = ContentNode::new("note", types::FOLDER)
        .with_property("kind", PropertyValue::string("note"));
    Prototype::new("note", root, flat(&[("./_name", "$name")]))
}

/// Locator with the editorial prototypes registered
pub fn editorial_locator() -> StaticLocator {
    StaticLocator::new()
        .with_prototype("editorial", article_prototype())
        .with_prototype("editorial", note_prototype())
}

/// Flatten key/token pairs into the declared-modification shape
pub fn flat(pairs: &[(&str, &str)]) -> Vec<String> {
    pairs
        .iter()
        .flat_map(|(k, v)| [(*k).to_string(), (*v).to_string()])
        .collect()
}
