//! Unit-sphere geometry
//!
//! Points are lifted to unit vectors in an Earth-fixed frame (X toward
//! longitude 0 on the equator, Z toward the north pole) so distances stay
//! well conditioned for both tiny and near-antipodal separations.

use super::GeoPoint;
use crate::constants::{DEG2RAD, RAD2DEG};
use nalgebra::Vector3;

/// Unit vector for a geographic point
///
/// Longitude need not be wrapped: an unwrapped value maps to the same
/// direction as its wrapped equivalent.
pub fn unit_vector(point: &GeoPoint) -> Vector3<f64> {
    let lon = point.lon * DEG2RAD;
    let lat = point.lat * DEG2RAD;
    let cos_lat = lat.cos();
    Vector3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
}

/// Great-circle separation in degrees
///
/// Uses `atan2(|a × b|, a · b)`, which keeps full precision near 0° and 180°
/// where an `acos` of the dot product would not.
pub fn great_circle_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let va = unit_vector(a);
    let vb = unit_vector(b);
    va.cross(&vb).norm().atan2(va.dot(&vb)) * RAD2DEG
}
