//! Geographic coordinates and angle helpers
//!
//! All public geometry in this crate is expressed as [`GeoPoint`] values in
//! degrees, with longitudes in the geographic convention (-180, 180].

pub mod angle;
pub mod sphere;

pub use angle::{
    angular_difference, normalize_degrees, normalize_longitude, unwrap_degrees,
};
pub use sphere::{great_circle_distance, unit_vector};

use serde::{Deserialize, Serialize};

/// A point on the Earth's surface, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Geographic longitude in degrees, east positive
    pub lon: f64,
    /// Geographic latitude in degrees, north positive
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Same latitude, longitude folded into (-180, 180]
    pub fn wrapped(&self) -> Self {
        Self::new(normalize_longitude(self.lon), self.lat)
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Great-circle distance to another point in degrees
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        great_circle_distance(self, other)
    }

    /// `[lon, lat]` pair as used by GeoJSON
    pub fn to_pair(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// Largest absolute longitude step between consecutive points
pub fn max_longitude_step(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|w| (w[1].lon - w[0].lon).abs())
        .fold(0.0, f64::max)
}

/// Latitude extent `(min, max)` of a path, or `None` when it is empty
pub fn latitude_range(path: &[GeoPoint]) -> Option<(f64, f64)> {
    path.iter().fold(None, |acc, p| match acc {
        None => Some((p.lat, p.lat)),
        Some((lo, hi)) => Some((lo.min(p.lat), hi.max(p.lat))),
    })
}
