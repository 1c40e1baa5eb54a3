//! Grove content node model
//!
//! Transient in-memory representation of hierarchical content:
//!
//! - [`NodeId`]: stable store-assigned identifier
//! - [`NodePath`]: absolute slash-separated content path
//! - [`Value`] / [`PropertyValue`]: tagged single/multi property values
//! - [`ContentNode`]: tree node (name, type, mixins, properties, children)
//! - [`vocab`]: type and mixin vocabulary plus the protected namespace
//!
//! The model carries no behavior beyond accessors; persisted nodes are
//! owned by the content store.

mod id;
mod node;
mod path;
mod value;

pub mod vocab;

pub use id::NodeId;
pub use node::ContentNode;
pub use path::{NodePath, PathError};
pub use value::{PropertyValue, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
