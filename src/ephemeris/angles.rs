//! Ascendant and Midheaven relations
//!
//! Standard spherical astronomy (Meeus, "Astronomical Algorithms", ch. 13;
//! Montenbruck & Pfleger). All angles are in degrees at the API; `θ` is the
//! local sidereal time, i.e. the right ascension of the meridian (RAMC).

use crate::constants::{DEG2RAD, RAD2DEG};
use crate::coordinates::normalize_degrees;

/// Ecliptic longitude of the MC, [0, 360)
///
/// `tan λ_MC = tan θ / cos ε`, quadrant taken from θ.
pub fn midheaven_longitude_deg(lst_deg: f64, obliquity_rad: f64) -> f64 {
    let theta = lst_deg * DEG2RAD;
    normalize_degrees(theta.sin().atan2(theta.cos() * obliquity_rad.cos()) * RAD2DEG)
}

/// Local sidereal time whose MC falls on ecliptic longitude `target_deg`, [0, 360)
///
/// Inverse of [`midheaven_longitude_deg`]: `tan θ = tan λ · cos ε`.
pub fn sidereal_time_for_midheaven_deg(target_deg: f64, obliquity_rad: f64) -> f64 {
    let lambda = target_deg * DEG2RAD;
    normalize_degrees((lambda.sin() * obliquity_rad.cos()).atan2(lambda.cos()) * RAD2DEG)
}

/// Ecliptic longitude of the Ascendant, [0, 360)
///
/// `λ_ASC = atan2(cos θ, -(sin θ cos ε + tan φ sin ε))`
///
/// Undefined at the geographic poles, where the result is NaN.
pub fn ascendant_longitude_deg(lst_deg: f64, obliquity_rad: f64, latitude_deg: f64) -> f64 {
    if latitude_deg.abs() >= 90.0 {
        return f64::NAN;
    }
    let theta = lst_deg * DEG2RAD;
    let phi = latitude_deg * DEG2RAD;
    let y = theta.cos();
    let x = -(theta.sin() * obliquity_rad.cos() + phi.tan() * obliquity_rad.sin());
    normalize_degrees(y.atan2(x) * RAD2DEG)
}
