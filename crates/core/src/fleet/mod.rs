//! Fleet registry: authoritative store of drone identity and state.
//!
//! All other components read and write drone state through the
//! [`FleetStore`] trait. The in-memory implementation lives in
//! [`memory::MemoryFleet`].

mod memory;
mod store;
mod types;

pub use memory::MemoryFleet;
pub use store::FleetStore;
pub use types::*;
