//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic point (WGS84 latitude/longitude in degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates parse as finite numbers.
    ///
    /// Request validation rejects NaN/infinite coordinates before any
    /// drone state is touched.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Linear interpolation between two points, per axis.
    ///
    /// Not real navigation: the flight model is a deliberate straight-line
    /// approximation, so plain per-axis lerp matches it.
    pub fn lerp(start: Location, end: Location, progress: f64) -> Location {
        Location {
            lat: start.lat + (end.lat - start.lat) * progress,
            lng: start.lng + (end.lng - start.lng) * progress,
        }
    }

    /// Project onto the unit sphere as a 3-D cartesian point.
    ///
    /// Chord distance between unit-sphere points is monotonic in great-circle
    /// distance, which lets an R-tree answer nearest-neighbour queries in
    /// euclidean space and still return the great-circle nearest point.
    pub fn to_unit_sphere(&self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lng = self.lng.to_radians();
        [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
    }
}

/// Great-circle distance between two points in kilometers (haversine).
pub fn haversine_km(a: Location, b: Location) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
