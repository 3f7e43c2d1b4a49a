//! Delivery event broadcast fabric.
//!
//! Subscribers join a broadcast scope named by order id; the dispatch
//! coordinator and flight simulator publish into it. Delivery is best-effort
//! and at-most-once with no replay.

mod broadcaster;
mod types;

pub use broadcaster::DeliveryBroadcaster;
pub use types::*;
