//! Static container catalog and name resolution
//!
//! The fleet is small and fixed, so the catalog is a plain static table
//! rather than a discovery mechanism: every handler is auditable in one
//! place at build time.

mod catalog;
mod descriptor;

pub use catalog::{all, resolve, CONTAINERS};
pub use descriptor::{ContainerDescriptor, SyncTarget, DEFAULT_SHELL};
