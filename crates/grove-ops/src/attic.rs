//! Retention path derivation
//!
//! Archived content moves under a sharded layout keyed by the node
//! identifier: `<attic>/<id[0]>/<id[1]>/<id[2]>/<id[3]>/<name>`, one
//! path segment per leading identifier character. Nodes whose
//! identifiers share a four-character prefix share a shard; the layout
//! is a compatibility contract with existing retained data.

use grove_model::{NodeId, NodePath, PathError};

/// Number of one-character shard segments
pub const SHARD_DEPTH: usize = 4;

/// Retention path for a node, derived from its identifier and name
///
/// Deterministic: the same identifier and name always land at the same
/// path, regardless of where the node lived before archival.
///
/// # Errors
/// Only when `name` is not a legal path segment.
pub fn shard_path(attic_root: &NodePath, id: NodeId, name: &str) -> Result<NodePath, PathError> {
    Ok(shard_folder(attic_root, id)?.child(name)?)
}

/// Shard folder for an identifier (without the node name)
///
/// # Errors
/// Never in practice; identifier characters are legal segments.
pub fn shard_folder(attic_root: &NodePath, id: NodeId) -> Result<NodePath, PathError> {
    let rendered = id.to_string();
    let mut path = attic_root.clone();
    for c in rendered.chars().take(SHARD_DEPTH) {
        path = path.child(c.to_string())?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn attic() -> NodePath {
        "/attic".parse().unwrap()
    }

    #[test]
    fn layout_is_one_character_per_segment() {
        let id = NodeId::from_str("0a1b2c3d-0000-4000-8000-000000000000").unwrap();
        let path = shard_path(&attic(), id, "Doc").unwrap();
        assert_eq!(path.to_string(), "/attic/0/a/1/b/Doc");
    }

    #[test]
    fn derivation_is_deterministic() {
        let id = NodeId::new();
        let a = shard_path(&attic(), id, "Doc").unwrap();
        let b = shard_path(&attic(), id, "Doc").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn shared_prefix_shares_the_shard_folder() {
        let a = NodeId::from_str("abcd1111-0000-4000-8000-000000000000").unwrap();
        let b = NodeId::from_str("abcd2222-0000-4000-8000-000000000000").unwrap();
        assert_eq!(shard_folder(&attic(), a).unwrap(), shard_folder(&attic(), b).unwrap());

        let c = NodeId::from_str("abce3333-0000-4000-8000-000000000000").unwrap();
        assert_ne!(shard_folder(&attic(), a).unwrap(), shard_folder(&attic(), c).unwrap());
    }
}
