//! Time module for request epochs and sidereal time
//!
//! An [`Epoch`] pins every calculation in a request to one instant, given as
//! a Julian date on the UT scale. Sidereal time follows Meeus,
//! "Astronomical Algorithms" (2nd ed), eq. 12.4.

use crate::constants::{DAYS_PER_CENTURY, DAY_S, J2000, UNIX_EPOCH_JD};
use crate::coordinates::normalize_degrees;
use crate::nutationlib;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

impl From<TimeError> for crate::CartographyError {
    fn from(err: TimeError) -> Self {
        crate::CartographyError::InvalidInput(err.to_string())
    }
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// A single instant, stored as a Julian date (UT)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Epoch {
    jd_ut: f64,
}

impl Epoch {
    /// Create an epoch from a Julian date on the UT scale
    pub fn from_julian_day(jd_ut: f64) -> Result<Self> {
        if !jd_ut.is_finite() {
            return Err(TimeError::OutOfRange(format!(
                "Julian date must be finite, got {}",
                jd_ut
            )));
        }
        Ok(Self { jd_ut })
    }

    /// Create an epoch from a UTC timestamp
    ///
    /// UTC is used as UT directly; the sub-second DUT1 offset is below the
    /// resolution of any line this crate draws.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
        Self {
            jd_ut: UNIX_EPOCH_JD + seconds / DAY_S,
        }
    }

    /// Parse an RFC 3339 timestamp such as `1990-06-15T14:30:00Z`
    pub fn parse_rfc3339(text: &str) -> Result<Self> {
        let dt = DateTime::parse_from_rfc3339(text)
            .map_err(|e| TimeError::InvalidFormat(format!("{}: {}", text, e)))?;
        Ok(Self::from_datetime(dt.with_timezone(&Utc)))
    }

    /// J2000.0 (2000-01-01T12:00:00)
    pub fn j2000() -> Self {
        Self { jd_ut: J2000 }
    }

    /// Julian date (UT)
    pub fn jd(&self) -> f64 {
        self.jd_ut
    }

    /// Julian centuries since J2000.0
    pub fn julian_centuries(&self) -> f64 {
        (self.jd_ut - J2000) / DAYS_PER_CENTURY
    }

    /// Greenwich mean sidereal time in degrees, [0, 360)
    pub fn gmst_deg(&self) -> f64 {
        gmst_deg(self.jd_ut)
    }

    /// Greenwich apparent sidereal time in degrees, [0, 360)
    ///
    /// GMST plus the equation of the equinoxes (Δψ · cos ε).
    pub fn gast_deg(&self) -> f64 {
        let t = self.julian_centuries();
        let nutation = nutationlib::nutation(t);
        let eps = nutationlib::mean_obliquity_rad(t) + nutation.obliquity_rad;
        normalize_degrees(self.gmst_deg() + nutation.longitude_rad.to_degrees() * eps.cos())
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.6} UT", self.jd_ut)
    }
}

/// Greenwich mean sidereal time in degrees for a Julian date (UT), [0, 360)
pub fn gmst_deg(jd_ut: f64) -> f64 {
    let d = jd_ut - J2000;
    let t = d / DAYS_PER_CENTURY;
    let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    normalize_degrees(theta)
}
