//! # Angle Normalisation Module
//!
//! Helpers for folding angles into the ranges used throughout the crate:
//!
//! - ephemeris angles (right ascension, ecliptic longitude, sidereal time)
//!   live in [0, 360)
//! - geographic longitudes live in (-180, 180]
//! - differences between two angles are measured the short way round,
//!   in (-180, 180]
//!
//! Unwrapping turns a sequence of wrapped longitudes back into a continuous
//! real-valued angle so curve fitting does not see spurious 360° jumps.

use crate::constants::FULL_CIRCLE_DEG;

/// Folds an angle into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let folded = angle.rem_euclid(FULL_CIRCLE_DEG);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if folded >= FULL_CIRCLE_DEG {
        0.0
    } else {
        folded
    }
}

/// Folds a longitude into (-180, 180]
///
/// # Examples
///
/// ```rust
/// use astrocarto::coordinates::normalize_longitude;
///
/// assert_eq!(normalize_longitude(190.0), -170.0);
/// assert_eq!(normalize_longitude(180.0), 180.0);
/// assert_eq!(normalize_longitude(-180.0), 180.0);
/// ```
pub fn normalize_longitude(lon: f64) -> f64 {
    let folded = normalize_degrees(lon);
    if folded > 180.0 {
        folded - FULL_CIRCLE_DEG
    } else {
        folded
    }
}

/// Signed short-way difference `a - b`, in (-180, 180]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    normalize_longitude(a - b)
}

/// Removes 360° discontinuities from a sequence of angles
///
/// Any step larger than 180° in magnitude is replaced by its short-way
/// equivalent, so the output is continuous. A step of exactly 180° is
/// ambiguous and is left unchanged.
pub fn unwrap_degrees(angles: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(angles.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;

    for &a in angles {
        if let Some(p) = prev {
            let step = a - p;
            if step.abs() > 180.0 {
                offset -= FULL_CIRCLE_DEG * (step / FULL_CIRCLE_DEG).round();
            }
        }
        out.push(a + offset);
        prev = Some(a);
    }

    out
}
