//! Branch catalog and geospatial resolver.
//!
//! Branches are administered externally; the core only needs CRUD plus the
//! nearest-branch proximity query, answered from an R-tree rather than a
//! linear scan.

mod memory;
mod store;
mod types;

pub use memory::MemoryBranchStore;
pub use store::BranchStore;
pub use types::*;
