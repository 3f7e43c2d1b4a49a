//! Testing utilities and mock implementations.
//!
//! Mocks for the external-service traits, so dispatch and flight behavior
//! can be tested end to end without real infrastructure.

mod mock_order_client;

pub use mock_order_client::{MockOrderClient, RecordedStatusUpdate};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::branch::CreateBranchRequest;
    use crate::fleet::CreateDroneRequest;
    use crate::geo::Location;

    /// Demo route start: Independence Palace, Ho Chi Minh City.
    pub const RESTAURANT: Location = Location {
        lat: 10.7769,
        lng: 106.7009,
    };

    /// Demo route end: Ben Thanh Market, Ho Chi Minh City.
    pub const CUSTOMER: Location = Location {
        lat: 10.7626,
        lng: 106.6602,
    };

    /// Create a drone registration request with reasonable defaults.
    pub fn drone(name: &str, battery: u8) -> CreateDroneRequest {
        CreateDroneRequest {
            name: name.to_string(),
            status: None,
            battery: Some(battery),
            location: Some(RESTAURANT),
        }
    }

    /// Create a branch registration request at the given point.
    pub fn branch(name: &str, lat: f64, lng: f64) -> CreateBranchRequest {
        CreateBranchRequest {
            name: name.to_string(),
            address: format!("{} test address", name),
            location: Location::new(lat, lng),
            operating_hours: None,
            phone_number: None,
        }
    }
}
