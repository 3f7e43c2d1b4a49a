//! Dispatch coordination.
//!
//! Entry point for delivery requests: validates input, selects and reserves
//! a drone, announces the assignment, and hands the trip to the flight
//! simulator.

mod coordinator;
mod types;

pub use coordinator::DispatchCoordinator;
pub use types::*;
