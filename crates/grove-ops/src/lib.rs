//! Grove folder operations
//!
//! The engine's public surface: template-based provisioning and
//! archival of hierarchical content.
//!
//! - [`FolderOps`]: add, duplicate, copy, move, rename, archive,
//!   reorder, delete — each a single synchronous transaction against
//!   the content store
//! - [`OpsConfig`] / [`StoreSession`]: explicit configuration and
//!   caller session, no ambient state
//! - [`OpsError`]: the operation error taxonomy
//! - [`attic`]: deterministic sharded retention path derivation
//!
//! Operations sequence store mutations deterministically; replaying the
//! same inputs against an equivalent store yields an identical tree.
//! Cross-caller concurrency is the store's concern, not this engine's.

pub mod attic;
mod config;
mod error;
mod inherit;
mod ops;

pub use config::{OpsConfig, StoreSession};
pub use error::OpsError;
pub use inherit::StoreInheritance;
pub use ops::{Arguments, FolderOps};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
