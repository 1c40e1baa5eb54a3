//! Grove store contracts
//!
//! The engine's boundary to persistence and templates:
//!
//! - [`ContentStore`]: hierarchical persistence and versioning contract
//! - [`PrototypeLocator`] / [`Prototype`]: template resolution contract
//! - [`TypeRegistry`] / [`NodeTypeDef`]: node-type child legality
//! - [`MemoryStore`]: in-memory reference implementation with
//!   commit/discard snapshots
//!
//! The engine performs no durable I/O itself; every store call may fail
//! with a [`StoreError`] that is propagated unchanged.

mod error;
mod locator;
mod memory;
mod registry;
mod store;

pub use error::StoreError;
pub use locator::{Prototype, PrototypeLocator, StaticLocator};
pub use memory::MemoryStore;
pub use registry::{NodeTypeDef, TypeRegistry};
pub use store::{Capability, ContentStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
