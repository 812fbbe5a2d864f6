//! Ephemeris boundary
//!
//! Line generation never computes planetary positions itself. Everything it
//! needs from the sky arrives through the [`Ephemeris`] trait, passed
//! explicitly into each request:
//!
//! - body positions (equatorial and ecliptic) at an epoch,
//! - Greenwich sidereal time,
//! - the true obliquity of date,
//! - the Ascendant's ecliptic longitude for a site.
//!
//! [`ChartEphemeris`] is a ready-made implementation backed by a table of
//! supplied positions.

pub mod angles;
pub mod chart;

pub use chart::ChartEphemeris;

use crate::time::Epoch;
use crate::{CartographyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bodies that can carry astrocartography lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    NorthNode,
    SouthNode,
    Chiron,
    Pholus,
    Ceres,
    Pallas,
    Juno,
    Vesta,
    Lilith,
}

impl Body {
    /// Every supported body, in display order
    pub const ALL: [Body; 19] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::NorthNode,
        Body::SouthNode,
        Body::Chiron,
        Body::Pholus,
        Body::Ceres,
        Body::Pallas,
        Body::Juno,
        Body::Vesta,
        Body::Lilith,
    ];

    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::NorthNode => "North Node",
            Body::SouthNode => "South Node",
            Body::Chiron => "Chiron",
            Body::Pholus => "Pholus",
            Body::Ceres => "Ceres",
            Body::Pallas => "Pallas Athena",
            Body::Juno => "Juno",
            Body::Vesta => "Vesta",
            Body::Lilith => "Black Moon Lilith",
        }
    }

    /// Sun through Pluto plus Chiron: the bodies paran crossings are drawn for
    pub fn is_major(&self) -> bool {
        matches!(
            self,
            Body::Sun
                | Body::Moon
                | Body::Mercury
                | Body::Venus
                | Body::Mars
                | Body::Jupiter
                | Body::Saturn
                | Body::Uranus
                | Body::Neptune
                | Body::Pluto
                | Body::Chiron
        )
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = CartographyError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Body::ALL
            .iter()
            .copied()
            .find(|b| {
                b.name().eq_ignore_ascii_case(wanted) || format!("{:?}", b).eq_ignore_ascii_case(wanted)
            })
            .or(match wanted.to_ascii_lowercase().as_str() {
                "pallas" => Some(Body::Pallas),
                "lunar node" | "mean node" => Some(Body::NorthNode),
                _ => None,
            })
            .ok_or_else(|| CartographyError::InvalidInput(format!("Unknown body: {}", s)))
    }
}

/// Position of one body at one epoch, as supplied by the ephemeris
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: Body,
    /// Ecliptic longitude of date, degrees
    pub ecliptic_longitude: f64,
    /// Ecliptic latitude, degrees
    #[serde(default)]
    pub ecliptic_latitude: f64,
    /// Equatorial right ascension, degrees
    pub right_ascension: f64,
    /// Equatorial declination, degrees
    pub declination: f64,
    /// Distance in AU
    #[serde(default)]
    pub distance: f64,
    /// Daily motion in ecliptic longitude, degrees per day
    #[serde(default)]
    pub daily_motion: f64,
}

impl BodyPosition {
    /// Checks the fields a line generator depends on
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.ecliptic_longitude,
            self.ecliptic_latitude,
            self.right_ascension,
            self.declination,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(CartographyError::InvalidInput(format!(
                "{}: non-finite position",
                self.body
            )));
        }
        if self.declination.abs() > 90.0 {
            return Err(CartographyError::InvalidInput(format!(
                "{}: |declination| > 90 (got {})",
                self.body, self.declination
            )));
        }
        Ok(())
    }
}

/// Capability object through which generators read the sky
///
/// Implementations must be deterministic for a given epoch, and one request
/// must use one house system throughout.
pub trait Ephemeris {
    /// Position of `body` at `epoch`
    fn body_position(&self, epoch: Epoch, body: Body) -> Result<BodyPosition>;

    /// Greenwich sidereal time in degrees
    fn sidereal_time_deg(&self, epoch: Epoch) -> Result<f64>;

    /// Mean obliquity plus nutation, in radians
    fn true_obliquity_rad(&self, epoch: Epoch) -> Result<f64>;

    /// Ecliptic longitude of the Ascendant at a site, in degrees
    fn ascendant_ecliptic_longitude(
        &self,
        epoch: Epoch,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64>;
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn body_position(&self, epoch: Epoch, body: Body) -> Result<BodyPosition> {
        (**self).body_position(epoch, body)
    }

    fn sidereal_time_deg(&self, epoch: Epoch) -> Result<f64> {
        (**self).sidereal_time_deg(epoch)
    }

    fn true_obliquity_rad(&self, epoch: Epoch) -> Result<f64> {
        (**self).true_obliquity_rad(epoch)
    }

    fn ascendant_ecliptic_longitude(
        &self,
        epoch: Epoch,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64> {
        (**self).ascendant_ecliptic_longitude(epoch, latitude, longitude)
    }
}
