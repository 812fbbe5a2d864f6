//! Obliquity of the ecliptic and nutation
//!
//! The MC relation depends on the true obliquity of date. Using the mean
//! J2000 value alone biases every MC-aspect line by the nutation in
//! obliquity (up to ~9.2"), so both terms are provided here.
//!
//! Mean obliquity: IAU 1980 (Lieske), Meeus eq. 22.2.
//! Nutation: the low-precision four-term series of Meeus ch. 22, good to
//! 0.5" in longitude and 0.1" in obliquity.

use crate::constants::{ASEC2RAD, DEG2RAD};

/// Nutation angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutation {
    /// Nutation in longitude (Δψ)
    pub longitude_rad: f64,
    /// Nutation in obliquity (Δε)
    pub obliquity_rad: f64,
}

/// Mean obliquity of the ecliptic in radians
///
/// `t` = Julian centuries since J2000.0.
pub fn mean_obliquity_rad(t: f64) -> f64 {
    let arcsec = 84_381.448 - 46.815_0 * t - 0.000_59 * t * t + 0.001_813 * t * t * t;
    arcsec * ASEC2RAD
}

/// Nutation in longitude and obliquity
///
/// `t` = Julian centuries since J2000.0.
pub fn nutation(t: f64) -> Nutation {
    // Longitude of the Moon's ascending node
    let omega = (125.044_52 - 1_934.136_261 * t) * DEG2RAD;
    // Mean longitudes of the Sun and Moon
    let l_sun = (280.466_5 + 36_000.769_8 * t) * DEG2RAD;
    let l_moon = (218.316_5 + 481_267.881_3 * t) * DEG2RAD;

    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin() - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos() + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos();

    Nutation {
        longitude_rad: dpsi * ASEC2RAD,
        obliquity_rad: deps * ASEC2RAD,
    }
}

/// True obliquity of date in radians: mean obliquity plus Δε
pub fn true_obliquity_rad(t: f64) -> f64 {
    mean_obliquity_rad(t) + nutation(t).obliquity_rad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{J2000, RAD2DEG};
    use approx::assert_abs_diff_eq;

    // Meeus example 22.a: 1987 April 10, 0h TD
    const T_1987: f64 = (2_446_895.5 - J2000) / 36_525.0;

    #[test]
    fn test_mean_obliquity_j2000() {
        let eps = mean_obliquity_rad(0.0) * RAD2DEG;
        assert_abs_diff_eq!(eps, 23.439_291_1, epsilon = 1e-7);
    }

    #[test]
    fn test_nutation_meeus_example() {
        let n = nutation(T_1987);
        let dpsi_arcsec = n.longitude_rad / ASEC2RAD;
        let deps_arcsec = n.obliquity_rad / ASEC2RAD;
        assert_abs_diff_eq!(dpsi_arcsec, -3.788, epsilon = 0.5);
        assert_abs_diff_eq!(deps_arcsec, 9.443, epsilon = 0.15);
    }

    #[test]
    fn test_true_obliquity_meeus_example() {
        // 23°26'36.850"
        let expected = 23.0 + 26.0 / 60.0 + 36.850 / 3600.0;
        let eps = true_obliquity_rad(T_1987) * RAD2DEG;
        assert_abs_diff_eq!(eps, expected, epsilon = 0.15 / 3600.0);
    }
}
