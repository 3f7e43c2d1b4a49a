//! Flight simulation.
//!
//! Each trip is one owned tokio task driving a fixed-period tick loop from
//! reservation to completion. Trips are never shared: the task owns its
//! [`Trip`] value and its own interval timer.

mod simulator;
mod types;

pub use simulator::FlightSimulator;
pub use types::{Trip, TripHandle};
