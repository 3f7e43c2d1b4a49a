//! Order-status synchronizer.
//!
//! Propagates dispatch and flight milestones to the external order service.
//! Callers treat these calls as fire-and-forget: failures are logged and the
//! drone's own state machine keeps moving.

mod http;
mod types;

pub use http::HttpOrderStatusClient;
pub use types::*;
